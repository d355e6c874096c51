//! # PDF Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `compressor`: Invocazione di Ghostscript con timeout
//! - `file_manager`: Discovery dei PDF, file transitori, sostituzione
//! - `optimizer`: Orchestratore del batch e worker per singolo file
//! - `platform`: Comandi di piattaforma e avvio senza finestra
//! - `progress`: Progress bar e statistiche del batch
//!
//! ## Utilizzo:
//! ```ignore
//! use pdf_optimizer::{Config, PdfOptimizer};
//!
//! let optimizer = PdfOptimizer::new(Config::default())?;
//! let summary = optimizer.optimize_folder(&path, true).await?;
//! ```

pub mod compressor;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod optimizer;
pub mod platform;
pub mod progress;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use compressor::Compressor;
pub use config::Config;
pub use error::{CompressorFailure, OptimizeError};
pub use optimizer::{JobOutcome, PathRun, PdfOptimizer, SizeChange};
pub use progress::BatchSummary;
