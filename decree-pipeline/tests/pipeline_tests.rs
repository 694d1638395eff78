//! End-to-end pipeline scenarios against a scripted oracle

use decree_core::{ExampleTranslation, KnowledgeBase};
use decree_llm::{NullOracle, Oracle, ScriptedOracle};
use decree_pipeline::{
    EquivalenceConfig, LearningPrompt, PipelineConfig, SemanticEquivalence, Translation,
    TranslationOutcome, TranslationPipeline,
};
use std::sync::Arc;

const VALID_POLICY: &str = "allow alice read on file:reports";
const INVALID_OUTPUT: &str = "I think the policy you want is probably fine";

fn knowledge() -> KnowledgeBase {
    KnowledgeBase::new(
        "Statements look like: allow <subject> <action> on <resource>.",
        vec![ExampleTranslation {
            category: "basic".to_string(),
            text: "Let alice read reports".to_string(),
            policy: VALID_POLICY.to_string(),
        }],
    )
}

fn pipeline_with(oracle: Arc<dyn Oracle>, config: PipelineConfig) -> TranslationPipeline {
    let prompt = LearningPrompt::text_to_policy(&knowledge(), "basic");
    TranslationPipeline::new(oracle, prompt, config)
}

async fn translate(oracle: Arc<dyn Oracle>, config: PipelineConfig) -> Translation {
    pipeline_with(oracle, config)
        .translate("Allow Alice to read file X")
        .await
        .unwrap()
}

#[tokio::test]
async fn scenario_a_first_attempt_accepted() {
    let oracle = Arc::new(ScriptedOracle::new([VALID_POLICY]));
    let translation = translate(oracle.clone(), PipelineConfig::default()).await;

    assert_eq!(
        translation.outcome,
        TranslationOutcome::Accepted {
            policy: VALID_POLICY.to_string()
        }
    );
    assert_eq!(translation.attempts, 1);
    assert_eq!(oracle.calls(), 1);
    // learning prompt + task query only; no retry turns
    assert_eq!(translation.turns, 2);
}

#[tokio::test]
async fn scenario_b_accepted_after_two_retries() {
    let oracle = Arc::new(ScriptedOracle::new([
        INVALID_OUTPUT,
        INVALID_OUTPUT,
        VALID_POLICY,
    ]));
    let translation = translate(oracle.clone(), PipelineConfig::default()).await;

    assert!(matches!(
        translation.outcome,
        TranslationOutcome::Accepted { .. }
    ));
    assert_eq!(translation.attempts, 3);
    assert_eq!(oracle.calls(), 3);
    // Two retries, each adding an assistant turn and a user turn.
    assert_eq!(translation.turns, 2 + 2 * 2);
}

#[tokio::test]
async fn scenario_c_exhausted_with_final_diagnostic() {
    let oracle = Arc::new(ScriptedOracle::new([
        INVALID_OUTPUT,
        INVALID_OUTPUT,
        INVALID_OUTPUT,
    ]));
    let translation = translate(oracle.clone(), PipelineConfig::default()).await;

    match translation.outcome {
        TranslationOutcome::Exhausted {
            candidate,
            diagnostic,
        } => {
            assert_eq!(candidate, INVALID_OUTPUT);
            assert!(!diagnostic.message.is_empty());
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }
    assert_eq!(translation.attempts, 3);
    assert_eq!(oracle.calls(), 3);
}

#[tokio::test]
async fn budget_caps_oracle_calls() {
    // More invalid responses available than the budget permits.
    let oracle = Arc::new(ScriptedOracle::new(vec![INVALID_OUTPUT; 10]));
    let config = PipelineConfig {
        max_attempts: 2,
        ..PipelineConfig::default()
    };
    let translation = translate(oracle.clone(), config).await;

    assert!(matches!(
        translation.outcome,
        TranslationOutcome::Exhausted { .. }
    ));
    assert_eq!(oracle.calls(), 2);
    assert_eq!(translation.attempts, 2);
}

#[tokio::test]
async fn dry_run_never_calls_oracle() {
    // ScriptedOracle would answer if asked; dry-run must not ask.
    let oracle = Arc::new(ScriptedOracle::new([VALID_POLICY]));
    let config = PipelineConfig {
        dry_run: true,
        ..PipelineConfig::default()
    };
    let translation = translate(oracle.clone(), config).await;

    assert_eq!(oracle.calls(), 0);
    match translation.outcome {
        TranslationOutcome::Exhausted { candidate, .. } => assert_eq!(candidate, ""),
        other => panic!("expected Exhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn dry_run_works_with_null_oracle() {
    let oracle = Arc::new(NullOracle::new());
    let config = PipelineConfig {
        dry_run: true,
        ..PipelineConfig::default()
    };
    let translation = translate(oracle, config).await;
    assert!(matches!(
        translation.outcome,
        TranslationOutcome::Exhausted { .. }
    ));
}

#[tokio::test]
async fn oracle_errors_abort_instead_of_retrying() {
    // An empty script makes the first call fail with a transport-class
    // error; the pipeline must propagate it, not convert it to a retry.
    let oracle = Arc::new(ScriptedOracle::new(Vec::<String>::new()));
    let result = pipeline_with(oracle.clone(), PipelineConfig::default())
        .translate("Allow Alice to read file X")
        .await;

    assert!(result.is_err());
    assert_eq!(oracle.calls(), 1);
}

#[tokio::test]
async fn prose_wrapped_policy_is_extracted_and_accepted() {
    let wrapped = format!("Here is the policy you asked for:\n{}\nHope this helps!", VALID_POLICY);
    let oracle = Arc::new(ScriptedOracle::new([wrapped]));
    let translation = translate(oracle, PipelineConfig::default()).await;

    assert_eq!(
        translation.outcome,
        TranslationOutcome::Accepted {
            policy: VALID_POLICY.to_string()
        }
    );
    assert_eq!(translation.attempts, 1);
}

#[tokio::test]
async fn equivalence_round_trip_affirmative() {
    let oracle = Arc::new(ScriptedOracle::new([
        "Alice may read the reports file", // back-translation
        "Yes.",                            // verdict
    ]));
    let prompt = LearningPrompt::policy_to_text(&knowledge(), "basic");
    let checker = SemanticEquivalence::new(oracle.clone(), prompt, EquivalenceConfig::default());

    let verdict = checker
        .verdict("Allow Alice to read file X", VALID_POLICY)
        .await
        .unwrap();

    assert!(verdict);
    assert_eq!(oracle.calls(), 2);
}

#[tokio::test]
async fn equivalence_rejects_elaborated_affirmative() {
    let oracle = Arc::new(ScriptedOracle::new([
        "Alice may read the reports file",
        "yes, definitely",
    ]));
    let prompt = LearningPrompt::policy_to_text(&knowledge(), "basic");
    let checker = SemanticEquivalence::new(oracle, prompt, EquivalenceConfig::default());

    let verdict = checker
        .verdict("Allow Alice to read file X", VALID_POLICY)
        .await
        .unwrap();

    assert!(!verdict);
}

#[tokio::test]
async fn equivalence_dry_run_is_negative_without_calls() {
    let oracle = Arc::new(ScriptedOracle::new(["unused"]));
    let prompt = LearningPrompt::policy_to_text(&knowledge(), "basic");
    let config = EquivalenceConfig {
        dry_run: true,
        ..EquivalenceConfig::default()
    };
    let checker = SemanticEquivalence::new(oracle.clone(), prompt, config);

    let verdict = checker
        .verdict("Allow Alice to read file X", VALID_POLICY)
        .await
        .unwrap();

    assert!(!verdict);
    assert_eq!(oracle.calls(), 0);
}
