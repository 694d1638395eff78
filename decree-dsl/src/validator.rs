//! Validation protocol
//!
//! Free functions composing the grammar engine and the semantic
//! checker. Both are pure functions of the input text: no state is
//! retained between calls and they are safe to invoke concurrently.

use crate::checker::{check_fragment, check_policy, CheckMode};
use crate::parser::{parse_policy, parse_snippet};
use decree_core::{Diagnostic, ValidationResult};

/// Validate a complete policy document.
///
/// Parses with the policy start rule, then runs the strict semantic
/// check. The first failure from either phase becomes the diagnostic;
/// a successful result carries none.
pub fn validate_policy(source: &str) -> ValidationResult {
    let ast = match parse_policy(source) {
        Ok(ast) => ast,
        Err(err) => {
            return ValidationResult::invalid(Diagnostic::at(err.message, err.line, err.column));
        }
    };

    match check_policy(&ast, CheckMode::Strict) {
        Ok(()) => ValidationResult::valid(),
        Err(err) => {
            let message = err.to_string();
            let diagnostic = match err.line() {
                Some(line) => Diagnostic::at_line(message, line),
                None => Diagnostic::new(message),
            };
            ValidationResult::invalid(diagnostic)
        }
    }
}

/// Validate a single statement-level snippet.
///
/// Parses with the snippet start rule, then runs the relaxed check.
/// Used purely as a filter, so any failure collapses to `false` and
/// no diagnostic is surfaced.
pub fn validate_snippet(source: &str) -> bool {
    match parse_snippet(source) {
        Ok(fragment) => check_fragment(&fragment).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_policy() {
        let result = validate_policy("allow alice read on file:reports");
        assert!(result.ok);
        assert!(result.diagnostic.is_none());
    }

    #[test]
    fn test_syntax_failure_carries_position() {
        let result = validate_policy("alice read on file:reports");
        assert!(!result.ok);
        let diag = result.diagnostic.unwrap();
        assert_eq!(diag.line, Some(1));
        assert!(diag.column.is_some());
    }

    #[test]
    fn test_semantic_failure_carries_message() {
        let result = validate_policy("deny bob write on db:users");
        assert!(!result.ok);
        let diag = result.diagnostic.unwrap();
        assert!(diag.message.contains("no allow statement"));
        assert!(diag.column.is_none());
    }

    #[test]
    fn test_snippet_filter_semantics() {
        assert!(validate_snippet("deny bob write on db:users"));
        assert!(validate_snippet("when clearance >= 3"));
        assert!(!validate_snippet("here is your policy:"));
        assert!(!validate_snippet(""));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let source = "allow alice read on file:x\nallow alice frobnicate on file:y";
        let first = validate_policy(source);
        let second = validate_policy(source);
        assert_eq!(first, second);
    }
}
