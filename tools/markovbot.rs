//! markovbot CLI: train a chain model from sampled notes and print a new one.
//!
//! Usage:
//!   markovbot train --corpus notes.jsonl --output model.ron
//!   markovbot generate --corpus notes.jsonl [--max-length 140] [WORD]
//!   markovbot generate --model model.ron [WORD]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use markovbot::core::corpus;
use markovbot::core::filter::LineFilter;
use markovbot::core::generator::Generator;
use markovbot::core::markov::{self, ChainModel};
use markovbot::schema::config::BotConfig;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "markovbot")]
#[command(version)]
#[command(about = "Markov-chain note generator trained on sampled timeline lines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a RON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Regular expression of blocked content
    #[arg(long, global = true, env = "MARKOVBOT_NGWORDS")]
    ng_words: Option<String>,

    /// Path to the author ignore list
    #[arg(long, global = true, env = "IGNORES")]
    ignores: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from a JSON Lines corpus and save it as RON
    Train {
        /// Path to input events JSONL file
        #[arg(long)]
        corpus: PathBuf,

        /// Path to output model file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate one note and print it
    Generate {
        /// Path to input events JSONL file
        #[arg(long, conflicts_with = "model")]
        corpus: Option<PathBuf>,

        /// Path to a previously trained model
        #[arg(long)]
        model: Option<PathBuf>,

        /// Maximum output length in characters
        #[arg(long)]
        max_length: Option<usize>,

        /// Attempt budget shared by start selection and generation
        #[arg(long)]
        attempts: Option<u32>,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Word to open the first attempt with
        word: Option<String>,
    },

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn print_example_config() {
    let example = r#"// markovbot configuration file
(
    // Blocked content, also settable via MARKOVBOT_NGWORDS
    ng_words: Some("宣伝|広告"),
    ignores_file: "ignores.txt",
    max_length: Some(140),
    attempt_budget: 500,
    seed: None,
)"#;
    println!("{example}");
}

fn load_config(cli: &Cli) -> Result<BotConfig> {
    let mut config = match &cli.config {
        Some(path) => BotConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => BotConfig::default(),
    };
    if let Some(ng_words) = &cli.ng_words {
        config.ng_words = Some(ng_words.clone());
    }
    if let Some(ignores) = &cli.ignores {
        config.ignores_file = ignores.clone();
    }
    Ok(config)
}

fn train_from_corpus(config: &BotConfig, path: &Path) -> Result<ChainModel> {
    let filter_config = config
        .filter_config()
        .context("Failed to load ignore list")?;
    let filter = LineFilter::new(filter_config).context("Invalid NG word pattern")?;
    let events = corpus::load_events(path)
        .with_context(|| format!("Failed to read corpus {:?}", path))?;
    info!(count = events.len(), "Loaded events");
    Ok(corpus::train_events(&filter, &events))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match &cli.command {
        Commands::Example => {
            print_example_config();
        }

        Commands::Train { corpus, output } => {
            let config = load_config(&cli)?;
            let model = train_from_corpus(&config, corpus)?;
            markov::save_model(&model, output)
                .with_context(|| format!("Failed to save model to {:?}", output))?;
            info!(path = ?output, "Model saved");
        }

        Commands::Generate {
            corpus,
            model,
            max_length,
            attempts,
            seed,
            word,
        } => {
            let config = load_config(&cli)?;
            let chain = match (corpus, model) {
                (Some(path), _) => train_from_corpus(&config, path)?,
                (None, Some(path)) => markov::load_model(path)
                    .with_context(|| format!("Failed to load model from {:?}", path))?,
                (None, None) => bail!("either --corpus or --model is required"),
            };

            let mut generator = Generator::builder()
                .with_model(chain)
                .max_length(max_length.or(config.max_length))
                .attempt_budget(attempts.unwrap_or(config.attempt_budget))
                .seed(seed.or(config.seed))
                .build();

            let text = generator
                .generate(word.as_deref())
                .context("Generation failed")?;
            println!("{text}");
        }
    }

    Ok(())
}
