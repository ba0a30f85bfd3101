//! Delivery status lifecycle.
//!
//! Two historical schemas used the same linear lifecycle at different
//! widths; which subset is active is a deployment-time constant, never a
//! per-record choice. Transition validation checks the shape of the move
//! (forward one step, or the single sanctioned step back) against the actor
//! role the caller supplies; who that actor is, is the caller's problem.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::actor::ActorRole;
use crate::entities::delivery::DeliveryStatus;

const FULL_STATES: &[DeliveryStatus] = &[
    DeliveryStatus::Created,
    DeliveryStatus::Scheduled,
    DeliveryStatus::Batching,
    DeliveryStatus::OutForDelivery,
    DeliveryStatus::Delivered,
];

const CONDENSED_STATES: &[DeliveryStatus] = &[
    DeliveryStatus::Batching,
    DeliveryStatus::OutForDelivery,
    DeliveryStatus::Delivered,
];

/// Which slice of the lifecycle this deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleVariant {
    /// All five states, starting at `SO Created`.
    Full,
    /// `Batching on Process` onward, the newer dispatch-floor flow.
    #[default]
    Condensed,
}

impl LifecycleVariant {
    pub fn active_states(self) -> &'static [DeliveryStatus] {
        match self {
            LifecycleVariant::Full => FULL_STATES,
            LifecycleVariant::Condensed => CONDENSED_STATES,
        }
    }

    /// Status assigned to a freshly created delivery.
    pub fn initial_status(self) -> DeliveryStatus {
        self.active_states()[0]
    }

    fn position_of(self, status: DeliveryStatus) -> Option<usize> {
        self.active_states().iter().position(|s| *s == status)
    }
}

impl FromStr for LifecycleVariant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "full" => Ok(LifecycleVariant::Full),
            "condensed" => Ok(LifecycleVariant::Condensed),
            other => Err(format!(
                "Unknown delivery lifecycle '{}' (expected \"full\" or \"condensed\")",
                other
            )),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The requested move is not a lifecycle edge: a skip, a jump, a repeat,
    /// a step back beyond the sanctioned one, or a status outside the
    /// active subset.
    #[error("Cannot move delivery from '{from}' to '{to}'")]
    InvalidStep {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },

    /// The move is a lifecycle edge, but not one this actor role may take.
    #[error("A {role} actor may not move delivery from '{from}' to '{to}'")]
    NotPermitted {
        role: ActorRole,
        from: DeliveryStatus,
        to: DeliveryStatus,
    },
}

/// Validates a requested status change.
///
/// Staff walk the lifecycle forward one step at a time. The owning client
/// has exactly two moves: confirming receipt (`Out for Delivery` →
/// `Delivered`) and taking that confirmation back (`Delivered` → `Out for
/// Delivery`). `Delivered` is terminal in every other respect; the one step
/// back is a deliberate allowance, not a general reopen.
pub fn request_status_transition(
    current: DeliveryStatus,
    requested: DeliveryStatus,
    role: ActorRole,
    variant: LifecycleVariant,
) -> Result<(), TransitionError> {
    let invalid = || TransitionError::InvalidStep {
        from: current,
        to: requested,
    };

    let from = variant.position_of(current).ok_or_else(invalid)?;
    let to = variant.position_of(requested).ok_or_else(invalid)?;
    let last = variant.active_states().len() - 1;

    if to == from + 1 {
        let allowed = role.is_staff()
            || (role == ActorRole::Client && requested == DeliveryStatus::Delivered);
        return if allowed {
            Ok(())
        } else {
            Err(TransitionError::NotPermitted {
                role,
                from: current,
                to: requested,
            })
        };
    }

    if from == last && to + 1 == last && requested == DeliveryStatus::OutForDelivery {
        return if role == ActorRole::Client {
            Ok(())
        } else {
            Err(TransitionError::NotPermitted {
                role,
                from: current,
                to: requested,
            })
        };
    }

    Err(invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use DeliveryStatus::*;
    use LifecycleVariant::*;

    #[test]
    fn staff_walk_forward_one_step_at_a_time() {
        for window in Full.active_states().windows(2) {
            assert_eq!(
                request_status_transition(window[0], window[1], ActorRole::Admin, Full),
                Ok(())
            );
        }
    }

    #[test]
    fn staff_may_not_skip_states() {
        assert_matches!(
            request_status_transition(Batching, Delivered, ActorRole::Admin, Condensed),
            Err(TransitionError::InvalidStep { .. })
        );
        assert_matches!(
            request_status_transition(Created, Batching, ActorRole::Superadmin, Full),
            Err(TransitionError::InvalidStep { .. })
        );
    }

    #[test]
    fn staff_may_not_step_backward() {
        assert_matches!(
            request_status_transition(Delivered, OutForDelivery, ActorRole::Prd, Condensed),
            Err(TransitionError::NotPermitted { .. })
        );
    }

    #[test]
    fn client_confirms_receipt_and_may_take_it_back() {
        assert_eq!(
            request_status_transition(OutForDelivery, Delivered, ActorRole::Client, Condensed),
            Ok(())
        );
        assert_eq!(
            request_status_transition(Delivered, OutForDelivery, ActorRole::Client, Condensed),
            Ok(())
        );
    }

    #[test]
    fn client_has_no_other_moves() {
        assert_matches!(
            request_status_transition(Batching, OutForDelivery, ActorRole::Client, Condensed),
            Err(TransitionError::NotPermitted { .. })
        );
        assert_matches!(
            request_status_transition(Delivered, Batching, ActorRole::Client, Condensed),
            Err(TransitionError::InvalidStep { .. })
        );
    }

    #[test]
    fn repeating_the_current_status_is_rejected() {
        assert_matches!(
            request_status_transition(Batching, Batching, ActorRole::Admin, Condensed),
            Err(TransitionError::InvalidStep { .. })
        );
    }

    #[test]
    fn condensed_variant_excludes_the_early_states() {
        assert_matches!(
            request_status_transition(Created, Scheduled, ActorRole::Admin, Condensed),
            Err(TransitionError::InvalidStep { .. })
        );
    }

    #[test]
    fn variants_pick_their_initial_status() {
        assert_eq!(Full.initial_status(), Created);
        assert_eq!(Condensed.initial_status(), Batching);
    }
}
