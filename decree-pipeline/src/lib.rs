//! DECREE PIPELINE - Translation Orchestration
//!
//! Drives the oracle through translation attempts:
//!
//! ```text
//! natural text
//!     ↓
//! learning prompt + task query (Conversation)
//!     ↓
//! oracle → raw text → snippet extraction → full validation
//!     ↓ invalid                                  ↓ valid
//! retry with diagnostic feedback            accepted policy
//! (bounded by the retry budget)                  ↓
//!     ↓ budget exhausted             back-translate + equivalence
//! reported failure                            verdict
//! ```

pub mod equivalence;
pub mod pipeline;
pub mod prompt;

pub use equivalence::{is_affirmative, EquivalenceConfig, SemanticEquivalence};
pub use pipeline::{
    ItemReport, PipelineConfig, PipelineState, RetryBudget, Translation, TranslationOutcome,
    TranslationPipeline,
};
pub use prompt::LearningPrompt;
