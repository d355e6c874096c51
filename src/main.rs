//! # PDF Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento della configurazione (file JSON + override da CLI)
//! - Smistamento di ogni path: directory → batch, file → modalità singola
//!
//! ## Esempio di utilizzo:
//! ```bash
//! pdf-optimizer ~/Documents/scans report.pdf --verbose
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pdf_optimizer::{Config, PdfOptimizer};

#[derive(Parser)]
#[command(name = "pdf-optimizer")]
#[command(about = "Optimize PDF(s) using Ghostscript. Overwrites original file(s).")]
struct Args {
    /// Path of PDF or folder containing PDFs to be optimized
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Also print compression result of each individual PDF when operating on a folder
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (JSON); defaults to the user config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ghostscript program to run instead of the platform default
    #[arg(long)]
    ghostscript: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args_os().len() == 1 {
        Args::command().write_help(&mut std::io::stderr())?;
        std::process::exit(1);
    }

    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "info" } else { "warn" }));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match args.config.clone().or_else(Config::default_path) {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            Config::from_file(&path).await?
        }
        None => Config::default(),
    };
    if let Some(ghostscript) = args.ghostscript {
        config.ghostscript = Some(ghostscript);
    }

    let optimizer = PdfOptimizer::new(config)?;
    optimizer.check_dependencies().await?;

    optimizer.run_paths(&args.paths, args.verbose).await?;

    Ok(())
}
