//! Property-based tests for the delivery ledger.
//!
//! These tests use proptest to verify the ledger's invariants across a wide
//! range of inputs: permutation independence, tie-break determinism, and the
//! shape of the status lifecycle.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use readymix_api::actor::ActorRole;
use readymix_api::entities::delivery::{self, DeliveryStatus};
use readymix_api::ledger::{
    compute_running_volumes, order_totals, request_status_transition, LifecycleVariant,
};

const ORDER_ID: i64 = 7;

fn trip(id: i64, sequence_key: i64, volume: Decimal) -> delivery::Model {
    delivery::Model {
        id,
        order_id: ORDER_ID,
        mp_no: format!("MP-{:04}", id),
        equipment_id: None,
        volume,
        status: DeliveryStatus::Batching,
        sequence_key,
        schedule_date: None,
        schedule_time: None,
        version: 0,
        created_at: Utc::now(),
        updated_at: None,
    }
}

/// Up to a dozen trips: volumes in cents (exact two-decimal quantities),
/// sequence keys deliberately drawn from a small range so ties are common.
fn trips_strategy() -> impl Strategy<Value = Vec<delivery::Model>> {
    prop::collection::vec((0i64..8, 0u32..100_000), 0..12).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (seq, cents))| trip(i as i64 + 1, seq, Decimal::new(cents as i64, 2)))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn output_is_independent_of_input_order(records in trips_strategy()) {
        let baseline = compute_running_volumes(records.clone()).unwrap();

        let mut reversed = records.clone();
        reversed.reverse();
        prop_assert_eq!(&compute_running_volumes(reversed).unwrap(), &baseline);

        // Rotate as a second, distinct permutation.
        let mut rotated = records;
        if !rotated.is_empty() {
            rotated.rotate_left(1);
        }
        prop_assert_eq!(&compute_running_volumes(rotated).unwrap(), &baseline);
    }

    #[test]
    fn recomputation_is_idempotent(records in trips_strategy()) {
        let first = compute_running_volumes(records.clone()).unwrap();
        let second = compute_running_volumes(records).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn final_total_is_the_exact_sum(records in trips_strategy()) {
        let expected: Decimal = records.iter().map(|r| r.volume).sum();
        let entries = compute_running_volumes(records).unwrap();
        let last = entries.last().map(|e| e.running_volume).unwrap_or(Decimal::ZERO);
        prop_assert_eq!(last, expected);
    }

    #[test]
    fn entries_are_sorted_and_totals_never_decrease(records in trips_strategy()) {
        let entries = compute_running_volumes(records).unwrap();

        for pair in entries.windows(2) {
            let a = &pair[0];
            let b = &pair[1];
            prop_assert!(
                (a.delivery.sequence_key, a.delivery.id) < (b.delivery.sequence_key, b.delivery.id),
                "entries must be strictly ordered by (sequence_key, id)"
            );
            prop_assert!(a.running_volume <= b.running_volume);
        }

        for (i, entry) in entries.iter().enumerate() {
            prop_assert_eq!(entry.trip_no as usize, i + 1);
        }
    }

    #[test]
    fn remaining_is_clamped_and_over_delivery_flagged(
        records in trips_strategy(),
        contracted_cents in 0u32..1_000_000,
    ) {
        let contracted = Decimal::new(contracted_cents as i64, 2);
        let entries = compute_running_volumes(records).unwrap();
        let totals = order_totals(contracted, &entries);

        prop_assert!(totals.remaining >= Decimal::ZERO);
        prop_assert_eq!(totals.over_delivered, totals.delivered > contracted);
        if !totals.over_delivered {
            prop_assert_eq!(totals.remaining, contracted - totals.delivered);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The full lifecycle matrix: staff move forward one step, the client
    /// has exactly the receipt-confirmation step and its reversal.
    #[test]
    fn lifecycle_matrix_is_exactly_as_specified(from_idx in 0usize..5, to_idx in 0usize..5) {
        let states = LifecycleVariant::Full.active_states();
        let from = states[from_idx];
        let to = states[to_idx];

        let staff = request_status_transition(from, to, ActorRole::Admin, LifecycleVariant::Full);
        prop_assert_eq!(staff.is_ok(), to_idx == from_idx + 1);

        let client = request_status_transition(from, to, ActorRole::Client, LifecycleVariant::Full);
        let client_allowed = (from == DeliveryStatus::OutForDelivery && to == DeliveryStatus::Delivered)
            || (from == DeliveryStatus::Delivered && to == DeliveryStatus::OutForDelivery);
        prop_assert_eq!(client.is_ok(), client_allowed);
    }
}
