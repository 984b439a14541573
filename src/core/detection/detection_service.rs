// Abuse detection - pure lexicon matching, no storage or transport here.
//
// Tokenizes on alphanumeric/apostrophe runs, case-folds, and compares
// whole tokens against a fixed term set. No substring matching: "idiotic"
// is not a hit.

use std::collections::BTreeSet;

/// Simple v1 abusive lexicon. Extend as needed.
const ABUSIVE_WORDS: &[&str] = &[
    // English
    "idiot", "stupid", "loser", "moron", "bitch", "slut", "dumb", "fool", "trash", "whore",
    "bastard", "asshole", "hate", "kill",
    // Basic Hindi/hinglish
    "chutiya", "gandu", "randi", "kutte", "kamina", "bewakoof", "bhosdike",
];

/// Scan `text` for abusive terms.
///
/// Returns whether anything matched plus the matched terms, lowercased,
/// deduplicated, and sorted. Empty input matches nothing. Runs in one pass
/// over the input.
pub fn detect_abuse(text: &str) -> (bool, Vec<String>) {
    if text.is_empty() {
        return (false, Vec::new());
    }

    let mut hits: BTreeSet<String> = BTreeSet::new();
    let mut token = String::new();

    let mut check = |token: &mut String| {
        if !token.is_empty() {
            if ABUSIVE_WORDS.contains(&token.as_str()) {
                hits.insert(std::mem::take(token));
            } else {
                token.clear();
            }
        }
    };

    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '\'' {
            for lower in ch.to_lowercase() {
                token.push(lower);
            }
        } else {
            check(&mut token);
        }
    }
    check(&mut token);

    let found = !hits.is_empty();
    (found, hits.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_matches_nothing() {
        assert_eq!(detect_abuse(""), (false, Vec::new()));
    }

    #[test]
    fn clean_text_matches_nothing() {
        let (found, words) = detect_abuse("hello there, how are you?");
        assert!(!found);
        assert!(words.is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let (found, words) = detect_abuse("You IDIOT");
        assert!(found);
        assert_eq!(words, vec!["idiot".to_string()]);
    }

    #[test]
    fn whole_tokens_only() {
        let (found, words) = detect_abuse("that was idiotic of me");
        assert!(!found);
        assert!(words.is_empty());
    }

    #[test]
    fn hits_are_sorted_and_deduplicated() {
        let (found, words) = detect_abuse("stupid idiot! such an idiot...");
        assert!(found);
        assert_eq!(words, vec!["idiot".to_string(), "stupid".to_string()]);
    }

    #[test]
    fn punctuation_separates_tokens() {
        let (found, words) = detect_abuse("moron,loser;trash");
        assert!(found);
        assert_eq!(
            words,
            vec!["loser".to_string(), "moron".to_string(), "trash".to_string()]
        );
    }

    #[test]
    fn apostrophes_stay_inside_tokens() {
        // "idiot's" is a different token than "idiot".
        let (found, words) = detect_abuse("the idiot's keyboard");
        assert!(!found);
        assert!(words.is_empty());
    }
}
