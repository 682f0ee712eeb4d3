//! Threshold-crossing detection.
//!
//! Policy: an alert is queued only on a **downward crossing** (the previous
//! value was strictly above the threshold, or unknown). Updates that keep
//! stock flatly low produce no new alert; clearing depends only on the
//! current value so it stays idempotent even when the previous value is
//! missing or garbled.

use serde::{Deserialize, Serialize};

/// Action derived from one inventory-level observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdAction {
    /// Stock crossed down to or at the threshold: queue an alert.
    Enqueue,
    /// Stock is above the threshold: clear any active alert.
    Clear,
    /// No transition (stock was already low and still is).
    Noop,
}

/// Decide enqueue/clear/no-op from one inventory observation.
///
/// Total over `i64` including negatives: a negative available quantity is a
/// valid low-stock signal (oversold), not an error. An unknown previous
/// value enqueues, since the first sighting of already-low stock must still
/// alert.
pub fn evaluate(
    available: i64,
    threshold: i64,
    previous_available: Option<i64>,
) -> ThresholdAction {
    if available > threshold {
        return ThresholdAction::Clear;
    }

    match previous_available {
        Some(previous) if previous <= threshold => ThresholdAction::Noop,
        _ => ThresholdAction::Enqueue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downward_crossing_enqueues() {
        assert_eq!(evaluate(4, 5, Some(10)), ThresholdAction::Enqueue);
        assert_eq!(evaluate(5, 5, Some(6)), ThresholdAction::Enqueue);
        assert_eq!(evaluate(3, 5, Some(10)), ThresholdAction::Enqueue);
    }

    #[test]
    fn unknown_previous_enqueues_when_low() {
        assert_eq!(evaluate(3, 5, None), ThresholdAction::Enqueue);
        assert_eq!(evaluate(-2, 0, None), ThresholdAction::Enqueue);
    }

    #[test]
    fn recovery_clears_regardless_of_previous() {
        assert_eq!(evaluate(6, 5, Some(3)), ThresholdAction::Clear);
        assert_eq!(evaluate(6, 5, Some(10)), ThresholdAction::Clear);
        assert_eq!(evaluate(6, 5, None), ThresholdAction::Clear);
    }

    #[test]
    fn already_low_is_a_noop() {
        assert_eq!(evaluate(2, 5, Some(2)), ThresholdAction::Noop);
        assert_eq!(evaluate(1, 5, Some(2)), ThresholdAction::Noop);
        assert_eq!(evaluate(5, 5, Some(5)), ThresholdAction::Noop);
    }

    #[test]
    fn negative_quantities_are_valid_signals() {
        assert_eq!(evaluate(-1, 5, Some(10)), ThresholdAction::Enqueue);
        assert_eq!(evaluate(-3, 5, Some(-1)), ThresholdAction::Noop);
        assert_eq!(evaluate(1, -2, Some(-5)), ThresholdAction::Clear);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 512,
                ..ProptestConfig::default()
            })]

            /// Property: anything above the threshold clears, whatever the
            /// previous value was.
            #[test]
            fn above_threshold_always_clears(
                threshold in -1_000i64..1_000,
                delta in 1i64..1_000,
                previous in proptest::option::of(-1_000i64..1_000),
            ) {
                let available = threshold + delta;
                prop_assert_eq!(
                    evaluate(available, threshold, previous),
                    ThresholdAction::Clear
                );
            }

            /// Property: a strictly-above previous value plus an at-or-below
            /// current value is always a crossing.
            #[test]
            fn crossing_always_enqueues(
                threshold in -1_000i64..1_000,
                below in 0i64..1_000,
                above in 1i64..1_000,
            ) {
                let available = threshold - below;
                let previous = threshold + above;
                prop_assert_eq!(
                    evaluate(available, threshold, Some(previous)),
                    ThresholdAction::Enqueue
                );
            }

            /// Property: already-low stock staying low never re-enqueues.
            #[test]
            fn already_low_never_reenqueues(
                threshold in -1_000i64..1_000,
                below_prev in 0i64..1_000,
                below_now in 0i64..1_000,
            ) {
                let previous = threshold - below_prev;
                let available = threshold - below_now;
                prop_assert_eq!(
                    evaluate(available, threshold, Some(previous)),
                    ThresholdAction::Noop
                );
            }
        }
    }
}
