//! DECREE DSL - Formal Policy Language
//!
//! Lexer, parser, semantic checker, and validation protocol for the
//! Decree access-policy language.
//!
//! Architecture:
//! ```text
//! Policy Source (text)
//!     ↓
//! Lexer (tokens with positions)
//!     ↓
//! Parser (Policy or Snippet start rule)
//!     ↓
//! Checker (Strict or Relaxed semantic rules)
//!     ↓
//! ValidationResult / snippet verdict
//! ```
//!
//! The language is line-oriented. A policy is one or more statements:
//!
//! ```text
//! allow alice read on file:reports when department == "sales"
//! deny * delete on db:accounts
//! allow group:auditors list on log:*
//!     when clearance >= 3 and not region in ("test", "staging")
//! ```
//!
//! A statement is `allow|deny <subject> <action> on <resource>` with
//! an optional `when` clause, which may continue on the following
//! line. Keywords are case-insensitive; `//` starts a line comment.

pub mod checker;
pub mod extract;
pub mod lexer;
pub mod parser;
pub mod validator;

// Re-export key types for convenience
pub use checker::{check_fragment, check_policy, CheckError, CheckMode};
pub use extract::{extract_policy, Extraction};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{parse_policy, parse_snippet, Fragment, ParseError, PolicyAst, Statement};
pub use validator::{validate_policy, validate_snippet};
