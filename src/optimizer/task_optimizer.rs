//! # Task Optimizer Module
//!
//! Worker per l'ottimizzazione di un singolo PDF: Ghostscript → confronto
//! dimensioni → sostituzione o scarto dell'output transitorio.
//! Separato dall'orchestratore principale per maggiore modularità.

use crate::{
    compressor::Compressor,
    error::{CompressorFailure, OptimizeError},
    file_manager::FileManager,
    progress::ProgressManager,
};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Sizes of a PDF that was replaced by a smaller version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeChange {
    pub initial_size: u64,
    pub final_size: u64,
}

/// How a single job ended
#[derive(Debug)]
pub enum JobOutcome {
    /// Source replaced by the smaller output
    Optimized(SizeChange),
    /// Output was not smaller, source left untouched
    NotSmaller { initial_size: u64, output_size: u64 },
    /// Ghostscript did not produce a usable output
    Failed(CompressorFailure),
}

impl JobOutcome {
    /// Sizes to aggregate, absent unless the source was replaced
    pub fn size_change(&self) -> Option<SizeChange> {
        match self {
            Self::Optimized(change) => Some(*change),
            _ => None,
        }
    }

    /// Verbose progress line for this outcome
    pub fn report_line(&self, file_name: &str) -> String {
        match self {
            Self::Optimized(change) => format!(
                "{}: {} -> {}",
                file_name,
                FileManager::format_size(change.initial_size),
                FileManager::format_size(change.final_size)
            ),
            Self::NotSmaller { .. } => format!("{}: no optimization needed", file_name),
            Self::Failed(failure) => format!("{}: optimization failed ({})", file_name, failure),
        }
    }
}

/// Worker per elaborazione singoli file
#[derive(Clone)]
pub struct TaskOptimizer {
    compressor: Arc<Compressor>,
    progress: ProgressManager,
}

impl TaskOptimizer {
    pub fn new(compressor: Arc<Compressor>, progress: ProgressManager) -> Self {
        Self { compressor, progress }
    }

    /// Ottimizza un PDF, restituendo le dimensioni solo se è stato sostituito
    pub async fn optimize(&self, source: &Path, verbose: bool) -> Result<Option<SizeChange>> {
        Ok(self.process_single_file(source, verbose).await?.size_change())
    }

    /// Processa un singolo file
    pub async fn process_single_file(&self, source: &Path, verbose: bool) -> Result<JobOutcome> {
        if !FileManager::is_pdf(source) {
            return Err(OptimizeError::NotAPdf(source.to_path_buf()).into());
        }

        let file_name = source
            .file_name()
            .unwrap_or(source.as_os_str())
            .to_string_lossy()
            .into_owned();

        let source_size = FileManager::file_size(source)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get file info for {}: {}", source.display(), e))?;

        let temp_path = FileManager::transient_path(source);
        self.progress.set_message(&format!("Optimizing {}...", file_name));

        let outcome = match self.compressor.invoke(source, &temp_path).await {
            Ok(()) => self.handle_compressor_output(source, &temp_path, source_size).await?,
            Err(failure) => {
                self.discard(&temp_path).await;
                JobOutcome::Failed(failure)
            }
        };

        if let JobOutcome::Failed(ref failure) = outcome {
            warn!("Optimization failed for {}: {}", source.display(), failure);
        }

        if verbose {
            self.progress.println(&outcome.report_line(&file_name));
        }

        Ok(outcome)
    }

    /// Confronta le dimensioni e sostituisce o scarta l'output
    async fn handle_compressor_output(
        &self,
        source: &Path,
        temp_path: &Path,
        source_size: u64,
    ) -> Result<JobOutcome> {
        let output_size = match FileManager::file_size(temp_path).await {
            Ok(size) => size,
            Err(e) => {
                debug!("No readable output at {}: {}", temp_path.display(), e);
                self.discard(temp_path).await;
                return Ok(JobOutcome::Failed(CompressorFailure::MissingOutput));
            }
        };

        debug!(
            "Should replace? {} (output: {}, source: {})",
            output_size < source_size,
            output_size,
            source_size
        );

        if output_size >= source_size {
            self.discard(temp_path).await;
            return Ok(JobOutcome::NotSmaller {
                initial_size: source_size,
                output_size,
            });
        }

        if let Err(e) = FileManager::replace_file(source, temp_path).await {
            if source.exists() {
                self.discard(temp_path).await;
            } else {
                error!(
                    "{} was removed but not replaced, optimized copy kept at {}",
                    source.display(),
                    temp_path.display()
                );
            }
            return Err(e.context(format!("Failed to replace {}", source.display())));
        }

        Ok(JobOutcome::Optimized(SizeChange {
            initial_size: source_size,
            final_size: output_size,
        }))
    }

    async fn discard(&self, temp_path: &Path) {
        if let Err(e) = FileManager::remove_if_exists(temp_path).await {
            warn!("Failed to remove transient file {}: {}", temp_path.display(), e);
        }
    }
}
