//! Binary entry point for aimind.
//!
//! This binary provides the CLI interface for the aimind emotion pipeline.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use aimind::classifier::{EmotionClassifier, shared_classifier};
use aimind::config::AimindConfig;
use aimind::llm::{LlmProvider, OpenAiClient};
use aimind::models::{ExtendedEmotion, Guidance};
use aimind::observability::{self, ObservabilityConfig};
use aimind::services::{ChatService, EmotionPipeline, PipelineStores};
use aimind::storage::{GuidanceStore, MessageStore, SqliteStore};
use aimind::CrisisDetector;
use anyhow::{Context, bail};
use chrono::{DateTime, Datelike, Days, NaiveTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Minimum text length accepted by `analyze`.
const MIN_ANALYZE_CHARS: usize = 3;

/// Aimind - emotion detection and prompt grounding for an empathetic assistant.
#[derive(Parser)]
#[command(name = "aimind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "AIMIND_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Serve Prometheus metrics over HTTP while the command runs.
    #[arg(long, global = true)]
    expose_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Check a message for crisis indicators.
    Detect {
        /// Message text.
        text: String,
    },

    /// Classify a message and normalize its emotion.
    Analyze {
        /// Message text.
        text: String,
    },

    /// Build the prompt for a message without calling the completion model.
    Prompt {
        /// User identifier.
        #[arg(short, long)]
        user: String,

        /// Message text.
        text: String,
    },

    /// Run a full chat turn.
    Chat {
        /// User identifier.
        #[arg(short, long)]
        user: String,

        /// Message text.
        text: String,
    },

    /// Show recent conversation turns.
    History {
        /// User identifier.
        #[arg(short, long)]
        user: String,

        /// Maximum number of turns.
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Summarize detected emotions over a period.
    Summary {
        /// User identifier.
        #[arg(short, long)]
        user: String,

        /// Period to summarize.
        #[arg(short, long, value_enum, default_value = "week")]
        period: Period,
    },

    /// Manage techniques and warnings per emotion.
    Guidance {
        #[command(subcommand)]
        action: GuidanceAction,
    },

    /// Show configuration.
    Config {
        /// Show resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Guidance subcommands.
#[derive(Subcommand)]
enum GuidanceAction {
    /// Register techniques and warnings for an emotion.
    Set {
        /// Extended emotion label.
        emotion: String,

        /// Recommended techniques.
        #[arg(short, long)]
        techniques: Option<String>,

        /// Warnings.
        #[arg(short, long)]
        warnings: Option<String>,
    },

    /// Show the guidance for an emotion.
    Show {
        /// Extended emotion label.
        emotion: String,
    },
}

/// Summary period.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Period {
    /// Since Monday 00:00 of the current week.
    Week,
    /// Since the first of the current month at 00:00.
    Month,
}

impl Period {
    /// Start of the current calendar period containing `now`, in UTC.
    fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let start = match self {
            Self::Week => today - Days::new(u64::from(today.weekday().num_days_from_monday())),
            Self::Month => today - Days::new(u64::from(today.day0())),
        };
        start.and_time(NaiveTime::MIN).and_utc()
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Week => "this week",
            Self::Month => "this month",
        }
    }
}

/// Main entry point.
fn main() -> ExitCode {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match AimindConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let observability = match observability::init(ObservabilityConfig::from_config(
        &config,
        cli.verbose,
        cli.expose_metrics,
    )) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to initialize observability: {e}");
            return ExitCode::FAILURE;
        },
    };

    let result = run_command(&cli, &config);

    if cli.verbose
        && let Some(rendered) = observability.render_metrics()
    {
        eprintln!("{rendered}");
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: &Cli, config: &AimindConfig) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Detect { text } => cmd_detect(config, text, cli.json),
        Commands::Analyze { text } => cmd_analyze(config, text, cli.json),
        Commands::Prompt { user, text } => cmd_prompt(config, user, text, cli.json),
        Commands::Chat { user, text } => cmd_chat(config, user, text, cli.json),
        Commands::History { user, limit } => cmd_history(config, user, *limit),
        Commands::Summary { user, period } => cmd_summary(config, user, *period, cli.json),
        Commands::Guidance { action } => cmd_guidance(config, action),
        Commands::Config { show } => cmd_config(config, *show),
    }
}

/// Opens the configured database.
fn open_store(config: &AimindConfig) -> anyhow::Result<Arc<SqliteStore>> {
    let path = config.database_path();
    let store = SqliteStore::new(&path)
        .with_context(|| format!("opening database at {}", path.display()))?;
    Ok(Arc::new(store))
}

/// Builds the pipeline over the shared classifier and the configured store.
fn build_pipeline(config: &AimindConfig, store: Arc<SqliteStore>) -> anyhow::Result<EmotionPipeline> {
    let classifier: Arc<dyn EmotionClassifier> = shared_classifier(&config.classifier)?;
    let pipeline = EmotionPipeline::from_config(config, classifier, PipelineStores::shared(store))?;
    Ok(pipeline)
}

/// Detect command.
fn cmd_detect(config: &AimindConfig, text: &str, json: bool) -> anyhow::Result<()> {
    let detector = CrisisDetector::new()
        .with_similarity_threshold(config.crisis.similarity_threshold)?
        .with_extra_patterns(&config.crisis.extra_patterns);

    let found = detector.find_match(text);
    if json {
        let value = serde_json::json!({
            "crisis": found.is_some(),
            "phrase": found.as_ref().map(|m| m.phrase),
            "kind": found.as_ref().map(|m| m.kind.as_str()),
            "similarity": found.as_ref().and_then(|m| m.similarity),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match found {
        Some(m) => println!("crisis: yes ({} match on \"{}\")", m.kind.as_str(), m.phrase),
        None => println!("crisis: no"),
    }
    Ok(())
}

/// Analyze command.
fn cmd_analyze(config: &AimindConfig, text: &str, json: bool) -> anyhow::Result<()> {
    if text.trim().chars().count() < MIN_ANALYZE_CHARS {
        bail!("text must have at least {MIN_ANALYZE_CHARS} characters");
    }

    let pipeline = build_pipeline(config, open_store(config)?)?;
    let analysis = pipeline.analyze(text)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    if let Some(dominant) = analysis.classification.dominant() {
        println!("Dominant: {} ({:.3})", dominant.label, dominant.score);
    }
    println!("Scores:");
    for score in analysis.classification.ranked() {
        println!("  {:<10} {:.3}", score.label.as_str(), score.score);
    }
    println!("Emotion: {} (rule: {})", analysis.emotion, analysis.rule.as_str());
    println!("Crisis: {}", if analysis.crisis { "yes" } else { "no" });
    println!(
        "Pet affect: {} ({})",
        analysis.pet_affect,
        analysis.pet_affect.asset_key()
    );
    Ok(())
}

/// Prompt command.
fn cmd_prompt(config: &AimindConfig, user: &str, text: &str, json: bool) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config, open_store(config)?)?;
    let output = pipeline.prepare(user, text)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", output.prompt);
    }
    Ok(())
}

/// Chat command.
fn cmd_chat(config: &AimindConfig, user: &str, text: &str, json: bool) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config, open_store(config)?)?;
    let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiClient::from_config(&config.llm));
    let service = ChatService::new(pipeline, llm);

    let turn = service.send(user, text)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turn)?);
        return Ok(());
    }

    println!("{}", turn.reply);
    println!();
    println!("[emotion: {} | pet: {}]", turn.emotion, turn.pet_affect);
    if turn.critical_event {
        eprintln!("A critical event was recorded for follow-up.");
    }
    Ok(())
}

/// History command.
fn cmd_history(config: &AimindConfig, user: &str, limit: usize) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let turns = store.recent_turns(user, limit)?;

    if turns.is_empty() {
        println!("No messages for {user}");
        return Ok(());
    }
    for turn in turns.iter().rev() {
        println!("{}: {}", turn.role.localized(), turn.content);
    }
    Ok(())
}

/// Summary command.
fn cmd_summary(config: &AimindConfig, user: &str, period: Period, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let since = period.since(Utc::now());
    let counts = store.emotion_counts(user, since)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    if counts.is_empty() {
        println!("No messages {} (since {})", period.label(), since.format("%Y-%m-%d"));
        return Ok(());
    }
    let total: u64 = counts.iter().map(|c| c.count).sum();
    println!(
        "Emotions {} since {} ({total} messages):",
        period.label(),
        since.format("%Y-%m-%d")
    );
    for count in &counts {
        println!("  {:<28} {}", count.emotion, count.count);
    }
    Ok(())
}

/// Guidance command.
fn cmd_guidance(config: &AimindConfig, action: &GuidanceAction) -> anyhow::Result<()> {
    let store = open_store(config)?;

    match action {
        GuidanceAction::Set {
            emotion,
            techniques,
            warnings,
        } => {
            if techniques.is_none() && warnings.is_none() {
                bail!("provide --techniques and/or --warnings");
            }
            let guidance = Guidance {
                techniques: techniques.clone(),
                warnings: warnings.clone(),
            };
            store.upsert(&ExtendedEmotion::new(emotion.as_str()), &guidance)?;
            println!("Guidance stored for {emotion}");
        },
        GuidanceAction::Show { emotion } => {
            let found = store.lookup(&ExtendedEmotion::new(emotion.as_str()))?;
            let (techniques, warnings) = Guidance::resolve(found);
            println!("Emotion: {emotion}");
            println!("Techniques: {techniques}");
            println!("Warnings: {warnings}");
        },
    }
    Ok(())
}

/// Config command.
fn cmd_config(config: &AimindConfig, show: bool) -> anyhow::Result<()> {
    if !show {
        println!("Use --show to display the resolved configuration");
        return Ok(());
    }

    let redact = |key: Option<&secrecy::SecretString>| {
        key.map_or("(not set)", |k| {
            if k.expose_secret().is_empty() { "(empty)" } else { "********" }
        })
    };

    println!("Aimind Configuration");
    println!("====================");
    println!("Data directory: {}", config.data_dir.display());
    println!("Database: {}", config.database_path().display());
    println!();
    println!("Classifier:");
    println!("  endpoint: {}", config.classifier.endpoint);
    println!("  model: {}", config.classifier.model);
    println!("  api_key: {}", redact(config.classifier.api_key.as_ref()));
    println!("  timeout: {}ms", config.classifier.timeout.as_millis());
    println!("Crisis:");
    println!("  similarity_threshold: {}", config.crisis.similarity_threshold);
    println!("  extra_patterns: {}", config.crisis.extra_patterns.len());
    println!("Normalizer:");
    println!("  min_confidence: {}", config.normalizer.min_confidence);
    println!("  prefer_combinations: {}", config.normalizer.prefer_combinations);
    println!("History:");
    println!("  max_pairs: {}", config.history.max_pairs);
    println!("Prompt:");
    println!(
        "  request_affect_annotation: {}",
        config.prompt.request_affect_annotation
    );
    println!("LLM:");
    println!(
        "  endpoint: {}",
        config.llm.endpoint.as_deref().unwrap_or(OpenAiClient::DEFAULT_ENDPOINT)
    );
    println!(
        "  model: {}",
        config.llm.model.as_deref().unwrap_or(OpenAiClient::DEFAULT_MODEL)
    );
    println!("  api_key: {}", redact(config.llm.api_key.as_ref()));
    println!("  max_tokens: {}", config.llm.max_tokens);
    println!("Logging:");
    println!("  format: {}", config.logging.format.as_deref().unwrap_or("pretty"));
    println!("  level: {}", config.logging.level.as_deref().unwrap_or("info"));
    if let Some(file) = &config.logging.file {
        println!("  file: {}", file.display());
    }
    println!("Metrics:");
    println!("  enabled: {}", config.metrics.enabled);
    println!("  port: {}", config.metrics.port);
    Ok(())
}
