//! # Asset Ingest - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento della configurazione (file + override da CLI)
//! - Avvio dell'optimizer e traduzione dell'esito in exit code
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (root, quality, max width, remote, etc.)
//! 2. Configura il logging (`RUST_LOG`, INFO o DEBUG con --verbose)
//! 3. Individua e carica il file di configurazione
//! 4. Applica gli override e valida la configurazione
//! 5. Esegue ingestione + sync con `GitCli` sulla root del repository
//! 6. Exit code 1 se un asset o la sincronizzazione sono falliti
//!
//! ## Esempio di utilizzo:
//! ```text
//! asset-ingest /path/to/site --quality 90 --max-width 1600 --verbose
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use asset_ingest::{json_output::JsonMessage, Config, GitCli, MediaOptimizer};

#[derive(Parser)]
#[command(name = "asset-ingest")]
#[command(about = "Tokenize, optimize and publish staged media assets")]
struct Args {
    /// Repository root containing the staging and export directories
    repo_root: Option<PathBuf>,

    /// Configuration file (defaults to <REPO_ROOT>/asset-ingest.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Maximum output width in pixels
    #[arg(short = 'w', long)]
    max_width: Option<u32>,

    /// Git remote to push to
    #[arg(long)]
    remote: Option<String>,

    /// Git branch to push to
    #[arg(long)]
    branch: Option<String>,

    /// Commit message for the automated commit
    #[arg(short = 'm', long)]
    message: Option<String>,

    /// Dry run - classify and report only, touch nothing
    #[arg(long)]
    dry_run: bool,

    /// Process assets but never invoke git
    #[arg(long)]
    skip_sync: bool,

    /// Emit JSON-line events on stdout instead of a progress bar
    #[arg(long)]
    json: bool,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply_to(&self, config: &mut Config) {
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if let Some(max_width) = self.max_width {
            config.max_width = max_width;
        }
        if let Some(ref remote) = self.remote {
            config.remote = remote.clone();
        }
        if let Some(ref branch) = self.branch {
            config.branch = branch.clone();
        }
        if let Some(ref message) = self.message {
            config.commit_message = message.clone();
        }
        config.dry_run |= self.dry_run;
        config.skip_sync |= self.skip_sync;
        config.json_output |= self.json;
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for JSON events
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => Ok(code),
        Err(e) => {
            error!("{:#}", e);
            Err(e)
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let root = args.repo_root.clone().unwrap_or_else(|| PathBuf::from("."));
    if !root.is_dir() {
        return Err(anyhow::anyhow!("Repository root does not exist: {}", root.display()));
    }
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", root.display()))?;

    let mut config = match Config::locate(args.config.as_deref(), &root)? {
        Some(path) => {
            info!("Using configuration {}", path.display());
            Config::from_file(&path).await?
        }
        None => Config::default(),
    };
    config.repo_root = root.clone();
    args.apply_to(&mut config);

    if let Err(e) = config.validate() {
        if config.json_output {
            JsonMessage::error("Invalid configuration", Some(e.to_string())).emit();
        }
        return Err(e.into());
    }

    if let Some(ref path) = args.write_config {
        config.save_to_file(path).await?;
        info!("Configuration written to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let json_output = config.json_output;
    let optimizer = MediaOptimizer::new(config)?;
    let git = GitCli::new(&root);

    let report = match optimizer.run(&git).await {
        Ok(report) => report,
        Err(e) => {
            if json_output {
                JsonMessage::error("Ingestion aborted", Some(format!("{:#}", e))).emit();
            }
            return Err(e);
        }
    };

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
