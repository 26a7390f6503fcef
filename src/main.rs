use anyhow::Result;
use clap::{Parser, Subcommand, ValueHint};

use sheetcards::commands::study::StudyOptions;
use sheetcards::commands::{forget, stats, study};
use sheetcards::config::Config;
use sheetcards::logging;

#[derive(Parser, Debug)]
#[command(
    name = "sheetcards",
    version,
    about = "Flashcards from a spreadsheet, with spaced repetition.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse or review cards
    Study {
        /// Published CSV link or local CSV file. Defaults to $SHEETCARDS_SOURCE.
        #[arg(value_name = "SOURCE", value_hint = ValueHint::AnyPath)]
        source: Option<String>,
        /// Start in review mode with today's new and due cards
        #[arg(long, default_value_t = false)]
        review: bool,
        /// Only show cards from this category
        #[arg(long, value_name = "NAME")]
        category: Option<String>,
        /// Shuffle the deck before browsing
        #[arg(long, default_value_t = false)]
        shuffle: bool,
        /// Use the cached copy of the sheet instead of loading it again
        #[arg(long, default_value_t = false)]
        offline: bool,
    },
    /// Show new, due and mastered counts
    Stats {
        #[arg(value_name = "SOURCE", value_hint = ValueHint::AnyPath)]
        source: Option<String>,
        /// Use the cached copy of the sheet instead of loading it again
        #[arg(long, default_value_t = false)]
        offline: bool,
    },
    /// Delete saved progress for a sheet
    Forget {
        #[arg(value_name = "SOURCE", value_hint = ValueHint::AnyPath)]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let _log_guard = logging::init(&config.log_dir())?;

    match cli.command {
        Command::Study {
            source,
            review,
            category,
            shuffle,
            offline,
        } => {
            let source = config.resolve_source(source)?;
            let options = StudyOptions {
                review,
                category,
                shuffle,
                offline,
            };
            study::run(&config, source, options).await?;
        }
        Command::Stats { source, offline } => {
            let source = config.resolve_source(source)?;
            stats::run(&config, source, offline).await?;
        }
        Command::Forget { source } => {
            let source = config.resolve_source(source)?;
            forget::run(&config, &source)?;
        }
    }

    Ok(())
}
