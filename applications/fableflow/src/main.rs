/// FableFlow - ebook library import and synchronization
use clap::{Parser, Subcommand};
use fableflow::{commands, AppConfig, AppState};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fableflow")]
#[command(about = "Ebook library import and synchronization", long_about = None)]
struct Cli {
    /// Configuration file path (default: config.toml when present)
    #[arg(short, long, global = true, env = "FABLE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import every book in the import directory
    Import {
        /// Report what would happen without touching the filesystem
        #[arg(long)]
        dry_run: bool,
    },
    /// Add catalog entries for new files in the library
    Scan {
        /// Directory to scan (default: configured library directory)
        path: Option<PathBuf>,
    },
    /// Add new files and drop entries whose file is gone
    Rescan {
        /// Directory to rescan (default: configured library directory)
        path: Option<PathBuf>,
    },
    /// List import session logs
    Logs,
    /// Show one import session log
    Log {
        /// Session ID, e.g. import_1700000000000
        id: String,
    },
    /// List quarantined files and why they were rejected
    Quarantine,
    /// Extract the cover image of an ebook
    Cover {
        /// Ebook file
        file: PathBuf,
        /// Write a thumbnail instead of the original image
        #[arg(long)]
        thumbnail: bool,
        /// Write the original image as base64 text
        #[arg(long, conflicts_with = "thumbnail")]
        base64: bool,
        /// Output image path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fableflow=info,fable_importer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;
    let state = AppState::initialize(config).await?;

    match cli.command {
        Commands::Import { dry_run } => {
            let session = commands::import(&state, dry_run).await?;
            print_session(&session);
        }
        Commands::Scan { path } => {
            let added = commands::scan(&state, path.as_deref()).await?;
            println!("Added {added} books");
        }
        Commands::Rescan { path } => {
            let outcome = commands::rescan(&state, path.as_deref()).await?;
            println!("Added {} books, removed {}", outcome.added, outcome.removed);
        }
        Commands::Logs => {
            let logs = commands::logs(&state)?;
            println!("Import sessions:");
            for log in logs {
                println!(
                    "  {} [{}{}] {} processed, {} imported, {} quarantined, {} skipped",
                    log.session_id,
                    log.status,
                    if log.dry_run { ", dry run" } else { "" },
                    log.processed_files,
                    log.imported_files,
                    log.quarantined_files,
                    log.skipped_files
                );
            }
        }
        Commands::Log { id } => {
            let session = commands::log(&state, &id)?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        Commands::Quarantine => {
            let files = commands::quarantine(&state)?;
            println!("Quarantined files:");
            for file in files {
                let reason = file
                    .reason
                    .as_ref()
                    .map_or("unknown reason", |r| r.reason.as_str());
                println!(
                    "  {} ({} bytes) - {} by {}: {}",
                    file.file_name,
                    file.file_size,
                    file.metadata.title,
                    file.metadata.author,
                    reason
                );
            }
        }
        Commands::Cover {
            file,
            thumbnail,
            base64,
            output,
        } => {
            let written = if base64 {
                commands::cover_base64(&state, &file, &output)?
            } else {
                commands::cover(&state, &file, thumbnail, &output)?
            };
            println!("Wrote {written} bytes to {}", output.display());
        }
    }

    Ok(())
}

fn print_session(session: &fable_core::ImportSession) {
    println!(
        "Session {} {}{}",
        session.id,
        session.status,
        if session.dry_run { " (dry run)" } else { "" }
    );
    println!("  Total:       {}", session.total_files);
    println!("  Processed:   {}", session.processed_files);
    println!("  Imported:    {}", session.imported_files);
    println!("  Quarantined: {}", session.quarantined_files);
    println!("  Skipped:     {}", session.skipped_files);
    for error in &session.errors {
        println!("  Error: {error}");
    }
}
