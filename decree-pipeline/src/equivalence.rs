//! Semantic equivalence via oracle round-trip
//!
//! Once a policy is syntactically accepted, it is translated back to
//! natural language and the oracle is asked whether the original and
//! the back-translation describe the same policy, considering only
//! action and condition. No grammar is involved here.

use crate::prompt::{LearningPrompt, USER_QUERY_EQUIVALENCE, USER_QUERY_POLICY_TO_TEXT};
use decree_core::{ChatMessage, Conversation, DecreeResult};
use decree_llm::{Oracle, SamplingParams};
use std::sync::Arc;
use tracing::debug;

/// The only answers accepted as affirmative, after normalization.
/// Deliberately a closed literal set: paraphrased affirmatives are
/// negatives, not errors.
pub const AFFIRMATIVE_ANSWERS: [&str; 3] = ["yes", "true", "correct"];

/// Normalize an oracle verdict and test it against the affirmative
/// set. Surrounding whitespace and periods are trimmed and case is
/// folded; anything beyond that must match exactly.
pub fn is_affirmative(answer: &str) -> bool {
    let normalized = answer
        .trim_matches(|c: char| c.is_whitespace() || c == '.')
        .to_lowercase();
    AFFIRMATIVE_ANSWERS.contains(&normalized.as_str())
}

/// Equivalence-check configuration.
#[derive(Debug, Clone)]
pub struct EquivalenceConfig {
    /// Sampling temperature for back-translation.
    pub back_translation_temperature: f32,
    /// Sampling temperature for the yes/no equivalence question.
    pub equivalence_temperature: f32,
    /// Skip all oracle calls; verdict is negative.
    pub dry_run: bool,
}

impl Default for EquivalenceConfig {
    fn default() -> Self {
        Self {
            back_translation_temperature: 0.7,
            equivalence_temperature: 0.7,
            dry_run: false,
        }
    }
}

/// Oracle-backed semantic equivalence checker.
pub struct SemanticEquivalence {
    oracle: Arc<dyn Oracle>,
    prompt: LearningPrompt,
    config: EquivalenceConfig,
}

impl SemanticEquivalence {
    /// `prompt` must be the policy-to-text learning prompt.
    pub fn new(oracle: Arc<dyn Oracle>, prompt: LearningPrompt, config: EquivalenceConfig) -> Self {
        Self {
            oracle,
            prompt,
            config,
        }
    }

    /// Translate an accepted policy back to natural language.
    pub async fn back_translate(&self, policy: &str) -> DecreeResult<String> {
        if self.config.dry_run {
            return Ok(String::new());
        }

        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::system(self.prompt.as_str()));
        conversation.push(ChatMessage::user(format!(
            "{}\"{}\"\n",
            USER_QUERY_POLICY_TO_TEXT, policy
        )));

        let sampling = SamplingParams::with_temperature(self.config.back_translation_temperature);
        let reply = self.oracle.infer(&conversation, &sampling).await?;
        Ok(reply.content)
    }

    /// Ask the oracle whether two policy texts are equivalent,
    /// considering only action and condition.
    pub async fn is_equivalent(&self, original: &str, back_translated: &str) -> DecreeResult<bool> {
        if self.config.dry_run {
            return Ok(false);
        }

        let mut question = String::from(USER_QUERY_EQUIVALENCE);
        question.push_str("1: ");
        question.push_str(original);
        question.push('\n');
        question.push_str("2: ");
        question.push_str(back_translated);
        question.push('\n');

        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::user(question));

        let sampling = SamplingParams::with_temperature(self.config.equivalence_temperature);
        let reply = self.oracle.infer(&conversation, &sampling).await?;

        debug!(answer = %reply.content, "equivalence verdict from oracle");
        Ok(is_affirmative(&reply.content))
    }

    /// Full round-trip verdict for an accepted policy.
    pub async fn verdict(&self, original_text: &str, policy: &str) -> DecreeResult<bool> {
        let back = self.back_translate(policy).await?;
        self.is_equivalent(original_text, &back).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_tokens_accepted() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("Yes."));
        assert!(is_affirmative(" TRUE "));
        assert!(is_affirmative("Correct"));
    }

    #[test]
    fn test_everything_else_is_negative() {
        assert!(!is_affirmative("yes, definitely"));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("probably"));
        assert!(!is_affirmative("the policies are equivalent"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("y e s"));
    }

    #[test]
    fn test_punctuation_trim_is_only_surrounding() {
        assert!(is_affirmative("...yes..."));
        assert!(!is_affirmative("y.es"));
    }
}
