//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche del batch.
//!
//! ## Responsabilità:
//! - Progress bar con `indicatif` per feedback real-time ("Optimizing file.pdf...")
//! - Stampa delle righe di risultato sopra la barra, anche quando la barra è nascosta
//! - `BatchSummary`: totali prima/dopo e rapporto di compressione
//!
//! ## Statistiche tracciate:
//! - **files_found**: PDF candidati trovati nella directory
//! - **files_optimized**: File sostituiti con una versione più piccola
//! - **files_unchanged**: Output non più piccolo, originale intatto
//! - **failures**: Ghostscript fallito, timeout o errori di I/O
//! - **total_initial_size** / **total_final_size**: solo sui file ottimizzati
//!
//! Il `BatchSummary` viene aggiornato esclusivamente dal driver del batch,
//! un risultato alla volta, mai dai task concorrenti.
//!
//! ## Esempio:
//! ```ignore
//! let progress = ProgressManager::new(total_files);
//! let mut summary = BatchSummary::new(total_files);
//!
//! // Per ogni job completato:
//! summary.record(&outcome);
//! progress.inc();
//!
//! progress.finish();
//! summary.print();
//! ```

use crate::file_manager::FileManager;
use crate::optimizer::task_optimizer::JobOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for PDF optimization
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a progress bar for a batch of files
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Create a spinner for a single file
    pub fn spinner() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A manager that draws nothing
    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Mark one file as done
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Print a line to stdout above the bar
    pub fn println(&self, line: &str) {
        self.bar.suspend(|| println!("{}", line));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Aggregated results of one batch run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchSummary {
    pub files_found: usize,
    pub files_optimized: usize,
    pub files_unchanged: usize,
    pub failures: usize,
    pub total_initial_size: u64,
    pub total_final_size: u64,
}

impl BatchSummary {
    pub fn new(files_found: usize) -> Self {
        Self {
            files_found,
            ..Self::default()
        }
    }

    /// Fold one job outcome into the totals
    pub fn record(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Optimized(change) => {
                self.files_optimized += 1;
                self.total_initial_size += change.initial_size;
                self.total_final_size += change.final_size;
            }
            JobOutcome::NotSmaller { .. } => self.files_unchanged += 1,
            JobOutcome::Failed(_) => self.failures += 1,
        }
    }

    /// A job that ended in an error before producing an outcome
    pub fn record_error(&mut self) {
        self.failures += 1;
    }

    /// Proportion of size removed, `None` when nothing was optimized
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.total_initial_size == 0 {
            None
        } else {
            Some(1.0 - self.total_final_size as f64 / self.total_initial_size as f64)
        }
    }

    pub fn format_ratio(&self) -> String {
        match self.compression_ratio() {
            Some(ratio) => format!("{:.2}%", ratio * 100.0),
            None => "N/A".to_string(),
        }
    }

    pub fn format_totals(&self) -> String {
        format!(
            "{} -> {}, Compression ratio = {}",
            FileManager::format_size(self.total_initial_size),
            FileManager::format_size(self.total_final_size),
            self.format_ratio()
        )
    }

    pub fn format_counts(&self) -> String {
        format!(
            "Found: {} | Optimized: {} | Unchanged: {} | Failed: {}",
            self.files_found, self.files_optimized, self.files_unchanged, self.failures
        )
    }

    /// Print the final report to stdout
    pub fn print(&self) {
        println!("Final compression stats:");
        println!("{}", self.format_totals());
    }
}
