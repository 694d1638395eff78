//! DECREE CORE - Shared Types
//!
//! Foundation types used across the Decree workspace: validation
//! diagnostics, oracle conversations, knowledge-base records, and the
//! error taxonomy. This crate has no I/O and no async surface; every
//! type here is plain data.

pub mod conversation;
pub mod diagnostic;
pub mod error;
pub mod knowledge;

pub use conversation::{ChatMessage, Conversation, Role};
pub use diagnostic::{Diagnostic, ValidationResult};
pub use error::{ConfigError, DecreeError, DecreeResult, OracleError};
pub use knowledge::{ExampleTranslation, InputRecord, KnowledgeBase};
