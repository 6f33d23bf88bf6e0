//! CLI command definitions for idea-forge.
//!
//! `generate` runs one idea generation, either awaiting the result directly
//! or streaming progress events from a background worker. `models` lists the
//! models the configured endpoint offers.

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::agents::{AgentError, IdeaOrchestrator, IdeaResult};
use crate::config::Settings;
use crate::llm::LiteLlmClient;
use crate::pipeline::GenerationStream;

/// Default wildness when none is given.
const DEFAULT_WILDNESS: i32 = 50;

/// Never-before-thought idea generator.
#[derive(Parser)]
#[command(name = "idea-forge")]
#[command(about = "Generate speculative never-before-thought ideas with LLMs")]
#[command(version)]
#[command(
    long_about = "idea-forge mines the assumptions behind a topic, inverts one of them into a speculative paragraph, scores it for coherence and novelty, and polishes the result.\n\nConfiguration comes from the environment (or a .env file): GEMINI_API_KEY, GOOGLE_API_KEY or LLM_API_KEY, LLM_API_BASE, LLM_MODEL and per-stage MINER_MODEL/COMPOSER_MODEL/JUDGE_MODEL/REWRITER_MODEL.\n\nExample usage:\n  idea-forge generate --topic gravity --wildness 80"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate one idea about a topic.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// List the models available at the configured endpoint.
    Models(ModelsArgs),
}

/// Arguments for `idea-forge generate`.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Topic to generate an idea about.
    #[arg(short, long)]
    pub topic: String,

    /// How wild the idea should be, 0-100. Values outside the range are clamped.
    #[arg(short, long, default_value_t = DEFAULT_WILDNESS, allow_negative_numbers = true)]
    pub wildness: i32,

    /// Stream progress events as server-sent-event frames.
    #[arg(short, long)]
    pub stream: bool,

    /// Use this model for every stage, overriding the environment.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output the result as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `idea-forge models`.
#[derive(Parser, Debug)]
pub struct ModelsArgs {
    /// Only show models whose id contains this text.
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    match cli.command {
        Commands::Generate(args) => run_generate_command(args, settings).await,
        Commands::Models(args) => run_models_command(args, settings).await,
    }
}

/// Applies a single-model override to every stage.
fn apply_model_override(mut settings: Settings, model: Option<&str>) -> Settings {
    if let Some(model) = model {
        settings.models.default = model.to_string();
        settings.models.miner = model.to_string();
        settings.models.composer = model.to_string();
        settings.models.judge = model.to_string();
        settings.models.rewriter = model.to_string();
    }
    settings
}

async fn run_generate_command(args: GenerateArgs, settings: Settings) -> anyhow::Result<()> {
    let settings = apply_model_override(settings, args.model.as_deref());
    info!(
        api_base = %settings.api_base,
        composer_model = %settings.models.composer,
        "Starting idea generation"
    );

    let orchestrator = Arc::new(IdeaOrchestrator::from_settings(&settings)?);

    if args.stream {
        let stream = GenerationStream::spawn(orchestrator, args.topic, args.wildness);
        let stdout = std::io::stdout();
        stream
            .forward(|event| {
                let mut out = stdout.lock();
                out.write_all(event.to_sse_frame()?.as_bytes())
                    .and_then(|_| out.flush())
                    .map_err(|e| AgentError::ChannelError(e.to_string()))
            })
            .await?;
        return Ok(());
    }

    let result = orchestrator
        .generate_idea(&args.topic, args.wildness, None)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &IdeaResult) {
    println!("{}", result.idea);
    println!();
    println!(
        "novelty: {:.2}  coherence: {:.2}  version: {}",
        result.novelty, result.coherence, result.version
    );
}

async fn run_models_command(args: ModelsArgs, settings: Settings) -> anyhow::Result<()> {
    let client = LiteLlmClient::from_settings(&settings)?;
    let models = client.list_models().await?;

    let filter = args.filter.map(|f| f.to_lowercase());
    let shown: Vec<&String> = models
        .iter()
        .filter(|id| {
            filter
                .as_ref()
                .map(|f| id.to_lowercase().contains(f))
                .unwrap_or(true)
        })
        .collect();

    if shown.is_empty() {
        println!("No models found at {}", settings.api_base);
        return Ok(());
    }

    println!("Models available at {}:", settings.api_base);
    for id in shown {
        println!("  {}", id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_command_defaults() {
        let cli = Cli::try_parse_from(["idea-forge", "generate", "--topic", "gravity"])
            .expect("should parse");

        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.topic, "gravity");
                assert_eq!(args.wildness, DEFAULT_WILDNESS);
                assert!(!args.stream);
                assert!(!args.json);
                assert!(args.model.is_none());
            }
            _ => panic!("Expected Generate command"),
        }
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_generate_command_with_all_options() {
        let cli = Cli::try_parse_from([
            "idea-forge",
            "gen",
            "-t",
            "time",
            "-w",
            "-5",
            "--stream",
            "-m",
            "gemini-2.5-pro",
            "--json",
            "--log-level",
            "debug",
        ])
        .expect("should parse");

        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.topic, "time");
                assert_eq!(args.wildness, -5);
                assert!(args.stream);
                assert!(args.json);
                assert_eq!(args.model.as_deref(), Some("gemini-2.5-pro"));
            }
            _ => panic!("Expected Generate command"),
        }
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_generate_requires_topic() {
        assert!(Cli::try_parse_from(["idea-forge", "generate"]).is_err());
    }

    #[test]
    fn test_models_command() {
        let cli = Cli::try_parse_from(["idea-forge", "models", "--filter", "flash"])
            .expect("should parse");
        match cli.command {
            Commands::Models(args) => assert_eq!(args.filter.as_deref(), Some("flash")),
            _ => panic!("Expected Models command"),
        }
    }

    #[test]
    fn test_model_override_applies_to_every_stage() {
        let settings = Settings::from_vars([("GEMINI_API_KEY", "k")]).expect("valid");
        let settings = apply_model_override(settings, Some("one-model"));
        assert_eq!(settings.models.miner, "one-model");
        assert_eq!(settings.models.composer, "one-model");
        assert_eq!(settings.models.judge, "one-model");
        assert_eq!(settings.models.rewriter, "one-model");

        let untouched = Settings::from_vars([("GEMINI_API_KEY", "k")]).expect("valid");
        let untouched = apply_model_override(untouched, None);
        assert_eq!(untouched.models.rewriter, crate::config::DEFAULT_REWRITER_MODEL);
    }
}
