//! Decree batch runner
//!
//! Translates natural-language access rules from a batch input file
//! into formal policy, one item at a time. A failed item is reported
//! and the batch continues; only configuration problems (missing
//! credential, unsupported model, unreadable files) are fatal.

use clap::Parser;
use decree_core::{DecreeResult, InputRecord, KnowledgeBase};
use decree_llm::{AnthropicChatOracle, Model, NullOracle, OpenAIChatOracle, Oracle, Provider};
use decree_pipeline::{
    EquivalenceConfig, ItemReport, LearningPrompt, PipelineConfig, SemanticEquivalence,
    TranslationOutcome, TranslationPipeline,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "decree", about = "Translate natural policy text to formal policy")]
struct Args {
    /// Skip all oracle calls
    #[arg(long)]
    dry_run: bool,

    /// Model to use (e.g. gpt-3.5-turbo, gpt-4-turbo, claude-3-5-sonnet-latest)
    #[arg(short, long, default_value = "gpt-3.5-turbo")]
    model: String,

    /// Verbose diagnostic output
    #[arg(short, long)]
    debug: bool,

    /// Tutorial document for the learning prompt
    #[arg(long, default_value = "knowledge-base/tutorial.md")]
    tutorial: PathBuf,

    /// Worked example translations (JSON)
    #[arg(long, default_value = "knowledge-base/examples.json")]
    examples: PathBuf,

    /// Batch input records (JSON)
    #[arg(long, default_value = "inputs.json")]
    inputs: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> DecreeResult<()> {
    let model: Model = args.model.parse()?;

    let tutorial = read_file(&args.tutorial)?;
    let examples = serde_json::from_str(&read_file(&args.examples)?)
        .map_err(|e| invalid_file(&args.examples, e))?;
    let inputs: Vec<InputRecord> = serde_json::from_str(&read_file(&args.inputs)?)
        .map_err(|e| invalid_file(&args.inputs, e))?;

    let knowledge = KnowledgeBase::new(tutorial, examples);

    // Dry runs never touch the network, so they need no credential.
    let oracle: Arc<dyn Oracle> = if args.dry_run {
        Arc::new(NullOracle::new())
    } else {
        match model.provider() {
            Provider::OpenAI => Arc::new(OpenAIChatOracle::from_env(model)?),
            Provider::Anthropic => Arc::new(AnthropicChatOracle::from_env(model)?),
        }
    };

    for input in &inputs {
        println!("\nText: {}", input.text);
        match process_item(&knowledge, oracle.clone(), args.dry_run, input).await {
            Ok(report) => print_report(&report),
            Err(err) => {
                // One item's oracle failure never stops the batch.
                error!(%err, "oracle failure; item abandoned");
                println!("Translation aborted: {}", err);
            }
        }
    }

    Ok(())
}

/// Translate one item and, on syntactic acceptance, run the semantic
/// round-trip check.
async fn process_item(
    knowledge: &KnowledgeBase,
    oracle: Arc<dyn Oracle>,
    dry_run: bool,
    input: &InputRecord,
) -> DecreeResult<ItemReport> {
    let prompt = LearningPrompt::text_to_policy(knowledge, &input.category);
    let pipeline = TranslationPipeline::new(
        oracle.clone(),
        prompt,
        PipelineConfig {
            dry_run,
            ..PipelineConfig::default()
        },
    );

    let translation = pipeline.translate(&input.text).await?;

    let equivalent = match &translation.outcome {
        TranslationOutcome::Accepted { policy } => {
            let prompt = LearningPrompt::policy_to_text(knowledge, &input.category);
            let checker = SemanticEquivalence::new(
                oracle,
                prompt,
                EquivalenceConfig {
                    dry_run,
                    ..EquivalenceConfig::default()
                },
            );
            Some(checker.verdict(&input.text, policy).await?)
        }
        TranslationOutcome::Exhausted { .. } => None,
    };

    Ok(ItemReport {
        text: input.text.clone(),
        outcome: translation.outcome,
        equivalent,
    })
}

fn print_report(report: &ItemReport) {
    match &report.outcome {
        TranslationOutcome::Accepted { policy } => {
            println!("\nTranslated Policy:\n-----------------\n{}", policy);
            if let Some(verdict) = report.equivalent {
                println!("\nSemantically valid: {}", verdict);
            }
        }
        TranslationOutcome::Exhausted { diagnostic, .. } => {
            println!("Translation failed");
            println!("Reason: {}", diagnostic);
        }
    }
}

fn read_file(path: &PathBuf) -> DecreeResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        decree_core::ConfigError::InvalidValue {
            field: "file".to_string(),
            value: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn invalid_file(path: &std::path::Path, err: serde_json::Error) -> decree_core::DecreeError {
    decree_core::ConfigError::InvalidValue {
        field: "file".to_string(),
        value: path.display().to_string(),
        reason: err.to_string(),
    }
    .into()
}
