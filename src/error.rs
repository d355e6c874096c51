//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - `OptimizeError`: errori fatali a livello di processo (input utente, dipendenze, config)
//! - `CompressorFailure`: fallimenti di un singolo job Ghostscript, mai propagati al batch
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `NotAPdf`: File passato in modalità singola senza suffisso `.pdf`
//! - `InvalidPath`: Path che non è né file né directory
//! - `MissingDependency`: Ghostscript non trovato
//! - `Config`: Configurazione non valida
//!
//! ## Esempio:
//! ```ignore
//! if !path.to_string_lossy().ends_with(".pdf") {
//!     return Err(OptimizeError::NotAPdf(path.to_path_buf()).into());
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;

/// Custom error types for PDF optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a PDF file: {}", .0.display())]
    NotAPdf(PathBuf),

    #[error("Not a valid path to PDF or folder containing PDFs: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Why a single compressor run did not produce a usable output
#[derive(thiserror::Error, Debug)]
pub enum CompressorFailure {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for compressor: {0}")]
    Wait(#[source] std::io::Error),

    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("exited with {}{}", exit_code_label(.code), stderr_suffix(.stderr))]
    ExitStatus { code: Option<i32>, stderr: String },

    #[error("no output file was written")]
    MissingOutput,
}

impl CompressorFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}
