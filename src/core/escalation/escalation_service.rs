// Severity policy - core business logic for offense escalation.
//
// This is a pure function over persisted offense history: it mutates
// nothing. Callers are responsible for counting prior incidents for the
// exact sender -> victim direction and for serializing the surrounding
// read-then-write sequence per pair.

use super::escalation_models::{EscalationSettings, Severity};

/// Map an offense count (1-based: prior incidents + 1) to a severity tier
/// under the victim's settings.
///
/// A count at exactly the warn threshold is still a plain warning; the
/// block threshold is inclusive.
pub fn assess(offense_count: u32, settings: &EscalationSettings) -> Severity {
    if offense_count >= settings.block_threshold {
        Severity::Blocked
    } else if offense_count <= settings.warn_threshold {
        Severity::Warning
    } else {
        Severity::FinalWarning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::escalation::Sensitivity;

    fn sequence(sensitivity: Sensitivity, upto: u32) -> Vec<Severity> {
        let settings = EscalationSettings::for_sensitivity(sensitivity);
        (1..=upto).map(|count| assess(count, &settings)).collect()
    }

    #[test]
    fn medium_escalates_warning_final_blocked() {
        assert_eq!(
            sequence(Sensitivity::Medium, 4),
            vec![
                Severity::Warning,
                Severity::FinalWarning,
                Severity::Blocked,
                Severity::Blocked,
            ]
        );
    }

    #[test]
    fn high_blocks_on_second_offense() {
        assert_eq!(
            sequence(Sensitivity::High, 2),
            vec![Severity::Warning, Severity::Blocked]
        );
    }

    #[test]
    fn low_allows_two_warnings_first() {
        assert_eq!(
            sequence(Sensitivity::Low, 4),
            vec![
                Severity::Warning,
                Severity::Warning,
                Severity::FinalWarning,
                Severity::Blocked,
            ]
        );
    }

    #[test]
    fn warn_threshold_boundary_stays_a_warning() {
        let settings = EscalationSettings {
            sensitivity: Sensitivity::Medium,
            warn_threshold: 2,
            block_threshold: 5,
        };
        assert_eq!(assess(2, &settings), Severity::Warning);
        assert_eq!(assess(3, &settings), Severity::FinalWarning);
    }
}
