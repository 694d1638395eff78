//! Validation diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;

/// A structured record of the first syntax or semantic failure found
/// while validating a policy. Position is best-effort: grammar errors
/// carry line/column, checker errors usually carry only a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Diagnostic {
    /// Create a diagnostic with no position information.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Create a diagnostic anchored at a line.
    pub fn at_line(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            column: None,
        }
    }

    /// Create a diagnostic anchored at a line and column.
    pub fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "line {}, column {}: {}", line, column, self.message)
            }
            (Some(line), None) => write!(f, "line {}: {}", line, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Outcome of whole-policy validation.
///
/// A successful result never carries a diagnostic; the constructors
/// are the only way to build one, so the pairing holds everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub diagnostic: Option<Diagnostic>,
}

impl ValidationResult {
    /// A successful validation. Carries no diagnostic.
    pub fn valid() -> Self {
        Self {
            ok: true,
            diagnostic: None,
        }
    }

    /// A failed validation with the first failure found.
    pub fn invalid(diagnostic: Diagnostic) -> Self {
        Self {
            ok: false,
            diagnostic: Some(diagnostic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_full_position() {
        let d = Diagnostic::at("unexpected token", 3, 7);
        assert_eq!(d.to_string(), "line 3, column 7: unexpected token");
    }

    #[test]
    fn test_display_line_only() {
        let d = Diagnostic::at_line("duplicate statement", 2);
        assert_eq!(d.to_string(), "line 2: duplicate statement");
    }

    #[test]
    fn test_display_message_only() {
        let d = Diagnostic::new("policy contains no allow statement");
        assert_eq!(d.to_string(), "policy contains no allow statement");
    }

    #[test]
    fn test_valid_result_has_no_diagnostic() {
        let r = ValidationResult::valid();
        assert!(r.ok);
        assert!(r.diagnostic.is_none());
    }

    #[test]
    fn test_invalid_result_carries_diagnostic() {
        let r = ValidationResult::invalid(Diagnostic::new("bad"));
        assert!(!r.ok);
        assert_eq!(r.diagnostic.unwrap().message, "bad");
    }
}
