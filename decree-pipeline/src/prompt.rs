//! Learning prompt construction
//!
//! The learning prompt teaches the oracle the policy language from
//! the tutorial and the worked examples for one category. It is built
//! once per item and never mutated; pipeline code takes it by
//! reference.

use decree_core::KnowledgeBase;

pub const SYSTEM_CONTEXT_TEXT_TO_POLICY: &str = "\nYou are a plain text to formal policy \
     translator. I will teach you how to translate a plain text to formal policy with a \
     tutorial and some examples.\n";

pub const SYSTEM_CONTEXT_POLICY_TO_TEXT: &str = "\nYou are a formal policy to plain text \
     translator. I will teach you how to translate a formal policy to plain text with a \
     tutorial and some examples.\n";

pub const USER_QUERY_TEXT_TO_POLICY: &str = "\nTranslate the following natural text to formal \
     policy. Only provide the translated formal policy itself without any explanations or \
     extra words.\n";

pub const USER_QUERY_POLICY_TO_TEXT: &str = "\nTranslate the following formal policy to plain \
     text. Only provide the translation itself in plain text without any explanations or \
     extra words.\n";

pub const USER_QUERY_EQUIVALENCE: &str = "\nAre the following two policies equivalent? \
     Consider only action and condition. Answer Yes or No\n\n";

/// An immutable learning prompt for one translation direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningPrompt(String);

impl LearningPrompt {
    /// Build the text-to-policy learning prompt from the tutorial and
    /// the examples matching `category`.
    pub fn text_to_policy(knowledge: &KnowledgeBase, category: &str) -> Self {
        let mut prompt = String::from(SYSTEM_CONTEXT_TEXT_TO_POLICY);
        prompt.push_str("Tutorial:\n");
        prompt.push_str(&knowledge.tutorial);
        prompt.push_str("\n\nExample Translations:\n");

        let examples = knowledge.examples_for(category);
        if examples.is_empty() {
            prompt.push_str("No examples provided\n\n");
        } else {
            for example in examples {
                prompt.push_str("Text:\n");
                prompt.push_str(&example.text);
                prompt.push_str("\nPolicy:\n");
                prompt.push_str(&example.policy);
                prompt.push_str("\n\n");
            }
        }

        Self(prompt)
    }

    /// Build the mirror-image policy-to-text learning prompt.
    pub fn policy_to_text(knowledge: &KnowledgeBase, category: &str) -> Self {
        let mut prompt = String::from(SYSTEM_CONTEXT_POLICY_TO_TEXT);
        prompt.push_str("Tutorial:\n");
        prompt.push_str(&knowledge.tutorial);
        prompt.push_str("\n\nExamples:\n");

        let examples = knowledge.examples_for(category);
        if examples.is_empty() {
            prompt.push_str("No examples provided\n\n");
        } else {
            for example in examples {
                prompt.push_str("Policy:\n");
                prompt.push_str(&example.policy);
                prompt.push_str("\n\nText:\n");
                prompt.push_str(&example.text);
                prompt.push('\n');
            }
        }

        Self(prompt)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
