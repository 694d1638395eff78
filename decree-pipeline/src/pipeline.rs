//! Translation pipeline state machine
//!
//! One pipeline instance translates one natural-language input into a
//! validated policy, retrying with diagnostic feedback while the
//! retry budget lasts. State transitions are synchronous and CPU-only
//! except for `AwaitingOracle`, the single suspension point.

use crate::prompt::{LearningPrompt, USER_QUERY_TEXT_TO_POLICY};
use decree_core::{ChatMessage, Conversation, DecreeResult, Diagnostic};
use decree_dsl::{extract_policy, validate_policy};
use decree_llm::{Oracle, SamplingParams};
use std::sync::Arc;
use tracing::debug;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Total oracle attempts allowed (initial call + retries).
    pub max_attempts: u32,
    /// Sampling temperature for the translation stage.
    pub temperature: f32,
    /// Skip all oracle calls; raw output is the empty string.
    pub dry_run: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            temperature: 0.5,
            dry_run: false,
        }
    }
}

/// Bounded, monotonically decreasing attempt counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
}

impl RetryBudget {
    pub fn new(attempts: u32) -> Self {
        Self {
            remaining: attempts,
        }
    }

    /// Take one attempt. Returns false when nothing is left.
    pub fn consume(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }

    pub fn exhausted(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

/// Named states of the translation state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Init,
    AwaitingOracle,
    Extracting {
        raw: String,
    },
    Validating {
        candidate: String,
    },
    RetryPending {
        candidate: String,
        diagnostic: Diagnostic,
    },
    Accepted {
        policy: String,
    },
    Exhausted {
        candidate: String,
        diagnostic: Diagnostic,
    },
}

/// Terminal result of the translation phase.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    /// Syntactically valid policy, ready for the equivalence check.
    Accepted { policy: String },
    /// Budget ran out; the last candidate and its diagnostic.
    Exhausted {
        candidate: String,
        diagnostic: Diagnostic,
    },
}

/// Full report of one translation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub outcome: TranslationOutcome,
    /// Oracle attempts consumed (dry runs count attempts too).
    pub attempts: u32,
    /// Final conversation length; grows by two turns per retry.
    pub turns: usize,
}

/// Per-item report assembled by callers after the equivalence check.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub text: String,
    pub outcome: TranslationOutcome,
    /// Present only when the translation was accepted.
    pub equivalent: Option<bool>,
}

/// The translation pipeline.
pub struct TranslationPipeline {
    oracle: Arc<dyn Oracle>,
    prompt: LearningPrompt,
    config: PipelineConfig,
}

impl TranslationPipeline {
    pub fn new(oracle: Arc<dyn Oracle>, prompt: LearningPrompt, config: PipelineConfig) -> Self {
        Self {
            oracle,
            prompt,
            config,
        }
    }

    /// Translate one natural-language input into a policy.
    ///
    /// Validation failures are recovered by retrying with feedback
    /// until the budget runs out; oracle transport errors abort the
    /// run immediately.
    pub async fn translate(&self, text: &str) -> DecreeResult<Translation> {
        let mut conversation = Conversation::new();
        let mut budget = RetryBudget::new(self.config.max_attempts);
        let mut attempts = 0u32;
        let mut state = PipelineState::Init;

        loop {
            state = match state {
                PipelineState::Init => {
                    conversation.push(ChatMessage::system(self.prompt.as_str()));
                    conversation.push(ChatMessage::user(format!(
                        "{}\"{}\"\n",
                        USER_QUERY_TEXT_TO_POLICY, text
                    )));
                    PipelineState::AwaitingOracle
                }

                PipelineState::AwaitingOracle => {
                    if !budget.consume() {
                        PipelineState::Exhausted {
                            candidate: String::new(),
                            diagnostic: Diagnostic::new("retry budget exhausted before any attempt"),
                        }
                    } else {
                        attempts += 1;
                        let raw = if self.config.dry_run {
                            String::new()
                        } else {
                            let sampling =
                                SamplingParams::with_temperature(self.config.temperature);
                            self.oracle.infer(&conversation, &sampling).await?.content
                        };
                        PipelineState::Extracting { raw }
                    }
                }

                PipelineState::Extracting { raw } => {
                    let extraction = extract_policy(&raw);
                    if !extraction.dropped_lines.is_empty() {
                        debug!(
                            dropped = ?extraction.dropped_lines,
                            "dropped oracle output lines that failed snippet validation"
                        );
                    }
                    PipelineState::Validating {
                        candidate: extraction.policy,
                    }
                }

                PipelineState::Validating { candidate } => {
                    let result = validate_policy(&candidate);
                    if result.ok {
                        PipelineState::Accepted { policy: candidate }
                    } else {
                        let diagnostic = result
                            .diagnostic
                            .unwrap_or_else(|| Diagnostic::new("policy rejected"));
                        if budget.exhausted() {
                            PipelineState::Exhausted {
                                candidate,
                                diagnostic,
                            }
                        } else {
                            PipelineState::RetryPending {
                                candidate,
                                diagnostic,
                            }
                        }
                    }
                }

                PipelineState::RetryPending {
                    candidate,
                    diagnostic,
                } => {
                    debug!(reason = %diagnostic, "translation rejected; retrying with feedback");
                    conversation.push(ChatMessage::assistant(candidate));
                    conversation.push(ChatMessage::user(retry_instruction(&diagnostic)));
                    PipelineState::AwaitingOracle
                }

                PipelineState::Accepted { policy } => {
                    return Ok(Translation {
                        outcome: TranslationOutcome::Accepted { policy },
                        attempts,
                        turns: conversation.len(),
                    });
                }

                PipelineState::Exhausted {
                    candidate,
                    diagnostic,
                } => {
                    debug!(reason = %diagnostic, "retry budget exhausted; reporting failure");
                    return Ok(Translation {
                        outcome: TranslationOutcome::Exhausted {
                            candidate,
                            diagnostic,
                        },
                        attempts,
                        turns: conversation.len(),
                    });
                }
            };
        }
    }
}

/// The feedback turn appended after a rejected candidate.
fn retry_instruction(diagnostic: &Diagnostic) -> String {
    format!(
        "Your translation is invalid due to the following reason.\nReason:\n{}\nPlease try again.",
        diagnostic
    )
}
