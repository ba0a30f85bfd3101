//! Delivery ledger: the ordered, annotated view of one order's deliveries.
//!
//! Everything in this module is pure and synchronous. The persistence layer
//! hands over whatever rows it has, in whatever order; the ledger sorts by
//! `(sequence_key, id)`, walks once, and annotates each trip with its
//! position and running cumulative volume. Totals are computed here at read
//! time and never stored, so editing or deleting a mid-sequence trip is
//! reflected in every later trip on the next read.

mod lifecycle;

pub use lifecycle::{request_status_transition, LifecycleVariant, TransitionError};

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::entities::delivery;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Records from more than one order were passed together. A prefix sum
    /// over a mixed set is a silently wrong business number, so this fails
    /// fast instead.
    #[error("Deliveries from order {found} mixed into ledger for order {expected}")]
    MixedOrders { expected: i64, found: i64 },
}

/// One delivery annotated with its place in the order's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub delivery: delivery::Model,
    /// 1-based position in delivery order.
    pub trip_no: u32,
    /// Sum of `volume` over this trip and every earlier trip.
    pub running_volume: Decimal,
}

/// Contracted-versus-delivered summary for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub contracted: Decimal,
    pub delivered: Decimal,
    /// Clamped at zero; see `over_delivered` for the unclamped condition.
    pub remaining: Decimal,
    /// Deliveries exceed the contracted volume. A data-quality condition to
    /// surface, not to hide behind the clamp.
    pub over_delivered: bool,
}

/// Orders the records by `(sequence_key, id)` ascending and computes each
/// record's running cumulative volume.
///
/// Deterministic for any permutation of the same input set, and idempotent:
/// the sort key is total (ties on `sequence_key` fall back to `id`, which is
/// unique), and the accumulation is exact decimal arithmetic.
///
/// An empty input is valid and yields an empty ledger.
pub fn compute_running_volumes(
    records: Vec<delivery::Model>,
) -> Result<Vec<LedgerEntry>, LedgerError> {
    let mut records = records;

    if let Some(first) = records.first() {
        let expected = first.order_id;
        if let Some(stray) = records.iter().find(|r| r.order_id != expected) {
            return Err(LedgerError::MixedOrders {
                expected,
                found: stray.order_id,
            });
        }
    }

    records.sort_by_key(|r| (r.sequence_key, r.id));

    let mut running = Decimal::ZERO;
    let entries = records
        .into_iter()
        .enumerate()
        .map(|(i, delivery)| {
            running += delivery.volume;
            LedgerEntry {
                delivery,
                trip_no: (i + 1) as u32,
                running_volume: running,
            }
        })
        .collect();

    Ok(entries)
}

/// Combines an order's contracted volume with the ledger's final running
/// total. Pure function of its inputs; no independent state.
pub fn order_totals(contracted: Decimal, entries: &[LedgerEntry]) -> OrderTotals {
    let delivered = entries
        .last()
        .map(|e| e.running_volume)
        .unwrap_or(Decimal::ZERO);
    let over_delivered = delivered > contracted;
    let remaining = if over_delivered {
        Decimal::ZERO
    } else {
        contracted - delivered
    };
    OrderTotals {
        contracted,
        delivered,
        remaining,
        over_delivered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::delivery::DeliveryStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn trip(id: i64, order_id: i64, sequence_key: i64, volume: Decimal) -> delivery::Model {
        delivery::Model {
            id,
            order_id,
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

    fn totals_of(entries: &[LedgerEntry]) -> Vec<Decimal> {
        entries.iter().map(|e| e.running_volume).collect()
    }

    #[test]
    fn running_totals_follow_sequence_order() {
        // Input deliberately shuffled relative to sequence_key.
        let records = vec![
            trip(3, 7, 3, dec!(7.00)),
            trip(1, 7, 1, dec!(5.00)),
            trip(2, 7, 2, dec!(3.25)),
        ];
        let entries = compute_running_volumes(records).unwrap();

        assert_eq!(
            totals_of(&entries),
            vec![dec!(5.00), dec!(8.25), dec!(15.25)]
        );
        assert_eq!(
            entries.iter().map(|e| e.trip_no).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn output_is_independent_of_input_permutation() {
        let base = vec![
            trip(1, 7, 1, dec!(5.00)),
            trip(2, 7, 2, dec!(3.25)),
            trip(3, 7, 3, dec!(7.00)),
        ];
        let expected = compute_running_volumes(base.clone()).unwrap();

        let mut reversed = base;
        reversed.reverse();
        assert_eq!(compute_running_volumes(reversed).unwrap(), expected);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let records = vec![trip(1, 7, 1, dec!(2.50)), trip(2, 7, 2, dec!(4.00))];
        let first = compute_running_volumes(records.clone()).unwrap();
        let second = compute_running_volumes(records).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_yields_empty_ledger() {
        assert_eq!(compute_running_volumes(vec![]).unwrap(), vec![]);
    }

    #[test]
    fn singleton_running_total_is_its_own_volume() {
        let entries = compute_running_volumes(vec![trip(9, 7, 1, dec!(4.5))]).unwrap();
        assert_eq!(totals_of(&entries), vec![dec!(4.5)]);
    }

    #[test]
    fn equal_sequence_keys_break_ties_by_id() {
        // Two trips racing on the same sequence_key: id decides, every run.
        let records = vec![
            trip(12, 7, 5, dec!(1.00)),
            trip(11, 7, 5, dec!(2.00)),
        ];
        let entries = compute_running_volumes(records).unwrap();
        assert_eq!(
            entries.iter().map(|e| e.delivery.id).collect::<Vec<_>>(),
            vec![11, 12]
        );
        assert_eq!(totals_of(&entries), vec![dec!(2.00), dec!(3.00)]);
    }

    #[test]
    fn removing_a_trip_recomputes_later_totals() {
        let full = vec![
            trip(1, 7, 1, dec!(5.00)),
            trip(2, 7, 2, dec!(3.25)),
            trip(3, 7, 3, dec!(7.00)),
        ];
        assert_eq!(
            totals_of(&compute_running_volumes(full.clone()).unwrap()),
            vec![dec!(5.00), dec!(8.25), dec!(15.25)]
        );

        let without_middle: Vec<_> = full.into_iter().filter(|r| r.id != 2).collect();
        assert_eq!(
            totals_of(&compute_running_volumes(without_middle).unwrap()),
            vec![dec!(5.00), dec!(12.00)]
        );
    }

    #[test]
    fn mixed_orders_fail_fast() {
        let records = vec![trip(1, 7, 1, dec!(5.00)), trip(2, 8, 2, dec!(3.25))];
        assert_eq!(
            compute_running_volumes(records),
            Err(LedgerError::MixedOrders {
                expected: 7,
                found: 8
            })
        );
    }

    #[test]
    fn totals_report_remaining_volume() {
        let entries =
            compute_running_volumes(vec![trip(1, 7, 1, dec!(6.00)), trip(2, 7, 2, dec!(4.00))])
                .unwrap();
        let totals = order_totals(dec!(25.00), &entries);
        assert_eq!(totals.delivered, dec!(10.00));
        assert_eq!(totals.remaining, dec!(15.00));
        assert!(!totals.over_delivered);
    }

    #[test]
    fn totals_clamp_remaining_and_flag_over_delivery() {
        let entries =
            compute_running_volumes(vec![trip(1, 7, 1, dec!(30.00))]).unwrap();
        let totals = order_totals(dec!(25.00), &entries);
        assert_eq!(totals.remaining, Decimal::ZERO);
        assert!(totals.over_delivered);
    }

    #[test]
    fn totals_of_empty_ledger_leave_full_contract_remaining() {
        let totals = order_totals(dec!(25.00), &[]);
        assert_eq!(totals.delivered, Decimal::ZERO);
        assert_eq!(totals.remaining, dec!(25.00));
        assert!(!totals.over_delivered);
    }
}
