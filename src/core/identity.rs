// Participant identity - the key for sessions, blocks, and settings.
//
// Usernames are opaque, caller-supplied strings. Two names refer to the
// same participant iff their normalized forms match, so normalization
// happens once at construction and every lookup goes through an Identity.

use std::fmt;

/// A normalized (trimmed, lowercased) participant name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    /// Build an identity from raw user input.
    pub fn normalize(raw: &str) -> Self {
        Identity(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the raw input contained nothing but whitespace.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(Identity::normalize("  Alice ").as_str(), "alice");
        assert_eq!(Identity::normalize("BOB"), Identity::normalize("bob"));
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = Identity::normalize("  MiXeD Case  ");
        let twice = Identity::normalize(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert!(Identity::normalize("   ").is_empty());
        assert!(!Identity::normalize("x").is_empty());
    }
}
