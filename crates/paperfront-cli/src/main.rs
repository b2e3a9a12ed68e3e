use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use paperfront_core::{AppConfig, ExitCode, NoteUpdater, PaperfrontError, UpdateOutcome};
use paperfront_readpaper::ReadPaperClient;

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "paperfront",
    about = "Inject ReadPaper metadata into a markdown note's frontmatter",
    version,
    long_about = None
)]
struct Cli {
    /// Markdown note to update. Its `aliases` field, or else its file name,
    /// is matched against the titles in your ReadPaper library.
    #[arg(long, value_name = "PATH")]
    md: PathBuf,
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(exit_code(&err) as i32);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = AppConfig::config_path();
    let config = AppConfig::load()
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let client = ReadPaperClient::new(&config.readpaper, &config.credentials)
        .map_err(PaperfrontError::from)?;
    let mut updater = NoteUpdater::new(client, &config);

    match updater.update_file(&cli.md).await? {
        UpdateOutcome::Updated { title } => {
            println!("Updated {} -> {title}", cli.md.display());
        }
        UpdateOutcome::Skipped => {
            println!("Skipped {}: already has a readpaper link", cli.md.display());
        }
    }
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> ExitCode {
    err.downcast_ref::<PaperfrontError>()
        .map_or(ExitCode::GeneralError, PaperfrontError::exit_code)
}
