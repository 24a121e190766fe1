//! Interactive title-parser tester
//!
//! Randomly picks titles from a dataset that have not been judged for the
//! current parser version, shows what the parser made of them, and records
//! the operator's verdict. Results accumulate per version so accuracy can be
//! compared across parser releases.
//!
//! # Usage
//!
//! ```bash
//! # Test new random titles against version 1.5.3
//! title-tester titles.txt --version 1.5.3
//!
//! # Re-judge everything tested so far
//! title-tester titles.txt --version 1.6.0 --retest
//!
//! # Parse a single title and record the verdict
//! title-tester --title "Show.S01E02.1080p" --save
//! ```

mod config;
mod console;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use config::TesterConfig;
use console::ConsoleOperator;
use tracing::info;
use tracking::{
    load_dataset, report, CommandParser, Operator, OperatorInput, ResultStore, Sampler, Session,
    SessionMode, TitleParser,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    about = "Interactive torrent title parser tester",
    long_about = None
)]
pub struct Args {
    /// Path to the text file containing titles, one per line
    pub dataset: Option<PathBuf>,

    /// Process a single title instead of reading from a file
    #[arg(short = 't', long)]
    pub title: Option<String>,

    /// Path to save test results (overrides TITLE_TESTER_RESULTS)
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// Version of the parser being tested (overrides TITLE_TESTER_VERSION)
    #[arg(long = "version", id = "library_version")]
    pub library_version: Option<String>,

    /// Retest previously tested titles
    #[arg(long, default_value_t = false)]
    pub retest: bool,

    /// Print statistics and exit
    #[arg(long, default_value_t = false)]
    pub stats: bool,

    /// Save the result when testing a single title
    #[arg(short = 's', long, default_value_t = false)]
    pub save: bool,

    /// Parser command line; the title is appended as the last argument
    /// (overrides TITLE_TESTER_PARSER_CMD)
    #[arg(long)]
    pub parser_cmd: Option<String>,

    /// Seed for reproducible title sampling (overrides TITLE_TESTER_SEED)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Count each (title, version) pair once, even when re-judged
    #[arg(long, default_value_t = false)]
    pub distinct_counts: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.dataset.is_none() && args.title.is_none() {
        Args::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "Either a dataset file or a single title (--title) is required",
            )
            .exit();
    }

    let config = TesterConfig::from_env().with_args(&args);
    info!(
        version = %config.version,
        results = %config.results_path.display(),
        "Title tester starting"
    );

    let mut store = ResultStore::open(&config.results_path)
        .with_context(|| {
            format!("Failed to open results {}", config.results_path.display())
        })?
        .with_policy(config.recount);
    let parser = CommandParser::from_command_line(&config.parser_command)
        .context("Invalid parser command")?;
    let titles = match args.dataset {
        Some(ref path) => load_dataset(path)?,
        None => Vec::new(),
    };
    let mut operator = ConsoleOperator::new()?;

    if let Some(ref title) = args.title {
        if !args.save {
            let parsed = parser.parse(title)?;
            operator.present(title, &parsed);
            return Ok(());
        }
        return run_session(
            &config,
            SessionMode::Single(title.clone()),
            titles,
            &mut store,
            &parser,
            &mut operator,
        );
    }

    if args.stats {
        let snapshot = report(store.document(), &titles, &config.version);
        operator.show_stats(&snapshot);
        return Ok(());
    }

    println!("Testing parser version: {}", config.version);
    if let Some(ref path) = args.dataset {
        println!("Dataset: {}", path.display());
    }
    println!(
        "Results will be saved to: {}",
        config.results_path.display()
    );
    let mode = if args.retest {
        println!("Mode: Retesting previously tested titles");
        SessionMode::Retest
    } else {
        println!("Mode: Testing new random titles");
        SessionMode::Fresh
    };

    if operator.read_line("Press Enter to begin testing...") == OperatorInput::Interrupted {
        return Ok(());
    }

    run_session(&config, mode, titles, &mut store, &parser, &mut operator)
}

fn run_session(
    config: &TesterConfig,
    mode: SessionMode,
    titles: Vec<String>,
    store: &mut ResultStore,
    parser: &CommandParser,
    operator: &mut ConsoleOperator,
) -> Result<()> {
    let sampler = match config.seed {
        Some(seed) => Sampler::seeded(seed),
        None => Sampler::from_entropy(),
    };
    let mut session = Session::new(config.session_config(), mode, titles, sampler);
    let summary = session
        .run(store, parser, operator)
        .context("Test session aborted")?;

    info!(
        end = %summary.end,
        recorded = summary.recorded,
        skipped = summary.skipped,
        saved = summary.saved,
        "Test session complete"
    );
    Ok(())
}
