// Escalation domain models - data structures for the abuse escalation policy.
//
// These are pure domain types with no transport or storage dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How aggressively a victim wants incoming abuse escalated.
///
/// Thresholds are victim-controlled: the recipient decides how quickly an
/// offender moves from warnings to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    Low,
    Medium,
    High,
}

impl Sensitivity {
    /// (warn_threshold, block_threshold) pairs per sensitivity.
    pub fn thresholds(&self) -> (u32, u32) {
        match self {
            Sensitivity::Low => (2, 4),
            Sensitivity::High => (1, 2),
            Sensitivity::Medium => (1, 3),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
        }
    }

    /// Lenient parse for caller-supplied values; anything unrecognized
    /// maps to the medium default.
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" => Sensitivity::Low,
            "high" => Sensitivity::High,
            _ => Sensitivity::Medium,
        }
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Sensitivity::Medium
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-victim escalation configuration.
///
/// One row per victim identity; a missing row reads as the medium default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationSettings {
    pub sensitivity: Sensitivity,
    pub warn_threshold: u32,
    pub block_threshold: u32,
}

impl EscalationSettings {
    pub fn for_sensitivity(sensitivity: Sensitivity) -> Self {
        let (warn_threshold, block_threshold) = sensitivity.thresholds();
        Self {
            sensitivity,
            warn_threshold,
            block_threshold,
        }
    }
}

impl Default for EscalationSettings {
    fn default() -> Self {
        Self::for_sensitivity(Sensitivity::Medium)
    }
}

/// Escalation tier assigned to a detected offense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    FinalWarning,
    Blocked,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::FinalWarning => "final_warning",
            Severity::Blocked => "blocked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "warning" => Some(Severity::Warning),
            "final_warning" => Some(Severity::FinalWarning),
            "blocked" => Some(Severity::Blocked),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitivity_threshold_table() {
        assert_eq!(Sensitivity::Low.thresholds(), (2, 4));
        assert_eq!(Sensitivity::Medium.thresholds(), (1, 3));
        assert_eq!(Sensitivity::High.thresholds(), (1, 2));
    }

    #[test]
    fn unknown_sensitivity_falls_back_to_medium() {
        assert_eq!(Sensitivity::parse_or_default("HIGH"), Sensitivity::High);
        assert_eq!(Sensitivity::parse_or_default(" low "), Sensitivity::Low);
        assert_eq!(Sensitivity::parse_or_default("extreme"), Sensitivity::Medium);
        assert_eq!(Sensitivity::parse_or_default(""), Sensitivity::Medium);
    }

    #[test]
    fn severity_round_trips_through_strings() {
        for severity in [Severity::Warning, Severity::FinalWarning, Severity::Blocked] {
            assert_eq!(Severity::parse(severity.as_str()), Some(severity));
        }
        assert_eq!(Severity::parse("banned"), None);
    }
}
