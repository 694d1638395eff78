//! Reference knowledge base records
//!
//! The knowledge base is loaded once at startup and held read-only
//! for the life of the process; pipeline instances share it freely.

use serde::{Deserialize, Serialize};

/// A worked translation example used to teach the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleTranslation {
    pub category: String,
    pub text: String,
    pub policy: String,
}

/// One batch input record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub text: String,
    pub category: String,
}

/// Tutorial document plus ordered worked examples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub tutorial: String,
    pub examples: Vec<ExampleTranslation>,
}

impl KnowledgeBase {
    pub fn new(tutorial: impl Into<String>, examples: Vec<ExampleTranslation>) -> Self {
        Self {
            tutorial: tutorial.into(),
            examples,
        }
    }

    /// Examples matching a category, in their original order.
    pub fn examples_for(&self, category: &str) -> Vec<&ExampleTranslation> {
        self.examples
            .iter()
            .filter(|example| example.category == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KnowledgeBase {
        KnowledgeBase::new(
            "tutorial text",
            vec![
                ExampleTranslation {
                    category: "basic".to_string(),
                    text: "Let alice read reports".to_string(),
                    policy: "allow alice read on file:reports".to_string(),
                },
                ExampleTranslation {
                    category: "advanced".to_string(),
                    text: "Nobody deletes accounts".to_string(),
                    policy: "deny * delete on db:accounts".to_string(),
                },
                ExampleTranslation {
                    category: "basic".to_string(),
                    text: "Bob may list logs".to_string(),
                    policy: "allow bob list on log:audit".to_string(),
                },
            ],
        )
    }

    #[test]
    fn test_examples_for_filters_by_category() {
        let kb = sample();
        let basic = kb.examples_for("basic");
        assert_eq!(basic.len(), 2);
        assert_eq!(basic[0].text, "Let alice read reports");
        assert_eq!(basic[1].text, "Bob may list logs");
    }

    #[test]
    fn test_examples_for_unknown_category_is_empty() {
        let kb = sample();
        assert!(kb.examples_for("nonexistent").is_empty());
    }

    #[test]
    fn test_input_record_deserializes() {
        let json = r#"{"text": "Allow Alice to read file X", "category": "basic"}"#;
        let record: InputRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.category, "basic");
    }
}
