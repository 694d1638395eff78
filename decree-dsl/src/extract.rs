//! Snippet extraction from raw oracle output
//!
//! Oracle output may interleave prose and policy lines. Extraction
//! keeps only the lines that pass snippet validation and reassembles
//! them into a candidate policy. It never degrades its input: already
//! valid text passes through unchanged, and a candidate that still
//! fails full validation falls back to the raw text.

use crate::validator::{validate_policy, validate_snippet};

/// Result of extracting a candidate policy from raw oracle output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Whether the returned policy passed full validation.
    pub valid: bool,
    /// The candidate policy (or the raw input when extraction failed).
    pub policy: String,
    /// 1-based indices of input lines dropped by snippet filtering.
    /// Informational only; dropping lines is not an error.
    pub dropped_lines: Vec<usize>,
}

/// Extract a candidate policy from raw oracle output.
pub fn extract_policy(raw: &str) -> Extraction {
    // Already a fully valid policy: hand it back untouched.
    if validate_policy(raw).ok {
        return Extraction {
            valid: true,
            policy: raw.to_string(),
            dropped_lines: Vec::new(),
        };
    }

    let mut kept = Vec::new();
    let mut dropped_lines = Vec::new();

    for (index, line) in raw.lines().enumerate() {
        if validate_snippet(line) {
            kept.push(line);
        } else {
            dropped_lines.push(index + 1);
        }
    }

    let candidate = kept.join("\n");

    if validate_policy(&candidate).ok {
        Extraction {
            valid: true,
            policy: candidate,
            dropped_lines,
        }
    } else {
        Extraction {
            valid: false,
            policy: raw.to_string(),
            dropped_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input_returned_unchanged() {
        let raw = "allow alice read on file:reports\n\ndeny bob write on db:users";
        let extraction = extract_policy(raw);
        assert!(extraction.valid);
        assert_eq!(extraction.policy, raw);
        assert!(extraction.dropped_lines.is_empty());
    }

    #[test]
    fn test_prose_lines_stripped() {
        let raw = "Here is the translated policy:\n\
                   allow alice read on file:reports\n\
                   Hope this helps!";
        let extraction = extract_policy(raw);
        assert!(extraction.valid);
        assert_eq!(extraction.policy, "allow alice read on file:reports");
        assert_eq!(extraction.dropped_lines, vec![1, 3]);
    }

    #[test]
    fn test_guard_continuation_line_survives_extraction() {
        let raw = "Sure thing:\n\
                   allow alice read on file:reports\n\
                   when department == \"sales\"";
        let extraction = extract_policy(raw);
        assert!(extraction.valid);
        assert_eq!(
            extraction.policy,
            "allow alice read on file:reports\nwhen department == \"sales\""
        );
    }

    #[test]
    fn test_fallback_returns_raw_input() {
        let raw = "I could not produce a policy for that request.";
        let extraction = extract_policy(raw);
        assert!(!extraction.valid);
        assert_eq!(extraction.policy, raw);
    }

    #[test]
    fn test_empty_input_is_invalid() {
        let extraction = extract_policy("");
        assert!(!extraction.valid);
        assert_eq!(extraction.policy, "");
    }

    #[test]
    fn test_snippet_valid_lines_can_still_fail_whole_policy() {
        // A lone deny is snippet-valid but not policy-valid (no allow),
        // so extraction falls back to the raw text.
        let raw = "The policy you asked for:\ndeny bob write on db:users";
        let extraction = extract_policy(raw);
        assert!(!extraction.valid);
        assert_eq!(extraction.policy, raw);
    }
}
