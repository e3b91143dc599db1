//! Notification delivery tests
//!
//! Tests for the mail delivery report and the commit policy that decides
//! whether a dispatched alert batch counts as sent.

use proptest::prelude::*;

use spm_backend::external::{DeliveryReport, RecipientOutcome};

fn report(accepted: &[bool]) -> DeliveryReport {
    DeliveryReport {
        outcomes: accepted
            .iter()
            .enumerate()
            .map(|(i, ok)| RecipientOutcome {
                address: format!("recipient{}@example.com", i),
                accepted: *ok,
                error: if *ok {
                    None
                } else {
                    Some("relay rejected".to_string())
                },
            })
            .collect(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_counts() {
        let report = report(&[true, false, true]);
        assert_eq!(report.delivered_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert!(report.any_delivered());
        assert!(!report.all_delivered());
    }

    #[test]
    fn test_all_delivered_requires_every_recipient() {
        assert!(report(&[true, true]).all_delivered());
        assert!(!report(&[true, false]).all_delivered());
    }

    /// An empty report delivered to nobody
    #[test]
    fn test_empty_report() {
        let empty = report(&[]);
        assert!(!empty.any_delivered());
        assert!(!empty.all_delivered());
        assert!(!empty.satisfies(false));
        assert!(!empty.satisfies(true));
    }

    /// The default policy commits on any successful recipient
    #[test]
    fn test_lenient_policy() {
        assert!(report(&[true, false]).satisfies(false));
        assert!(!report(&[false, false]).satisfies(false));
    }

    /// The strict policy commits only on full delivery
    #[test]
    fn test_strict_policy() {
        assert!(report(&[true, true]).satisfies(true));
        assert!(!report(&[true, false]).satisfies(true));
    }

    #[test]
    fn test_failures_lists_rejected_recipients() {
        let report = report(&[true, false, false]);
        let failed: Vec<_> = report.failures().map(|o| o.address.clone()).collect();
        assert_eq!(
            failed,
            vec![
                "recipient1@example.com".to_string(),
                "recipient2@example.com".to_string()
            ]
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn outcomes_strategy() -> impl Strategy<Value = Vec<bool>> {
        prop::collection::vec(any::<bool>(), 0..10)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Delivered and failed counts always cover every recipient
        #[test]
        fn prop_counts_partition_recipients(accepted in outcomes_strategy()) {
            let report = report(&accepted);
            prop_assert_eq!(
                report.delivered_count() + report.failed_count(),
                accepted.len()
            );
        }

        /// The lenient policy commits exactly when someone got the mail
        #[test]
        fn prop_lenient_policy_is_any(accepted in outcomes_strategy()) {
            let report = report(&accepted);
            prop_assert_eq!(report.satisfies(false), accepted.iter().any(|ok| *ok));
        }

        /// The strict policy commits exactly on full, non-empty delivery
        #[test]
        fn prop_strict_policy_is_all(accepted in outcomes_strategy()) {
            let report = report(&accepted);
            let expected = !accepted.is_empty() && accepted.iter().all(|ok| *ok);
            prop_assert_eq!(report.satisfies(true), expected);
        }

        /// Whatever satisfies the strict policy satisfies the lenient one
        #[test]
        fn prop_strict_implies_lenient(accepted in outcomes_strategy()) {
            let report = report(&accepted);
            if report.satisfies(true) {
                prop_assert!(report.satisfies(false));
            }
        }
    }
}
