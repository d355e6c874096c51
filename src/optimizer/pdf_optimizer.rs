//! # PDF Optimizer Main Orchestrator
//!
//! Orchestratore principale: distribuisce i PDF di una directory su un pool
//! di worker limitato, raccoglie i risultati in ordine di completamento e
//! stampa le statistiche finali.
//!
//! ## Gestione concorrenza:
//! - Semaforo con `config.workers` permessi (default: 5)
//! - Ogni file gira in un task tokio indipendente
//! - I task restituiscono il proprio `JobOutcome`; solo il driver aggiorna il `BatchSummary`
//!
//! ## Error handling:
//! - Errori per singoli file non bloccano il batch
//! - Solo directory illeggibili, file non-PDF in modalità singola e
//!   Ghostscript mancante sono errori fatali

use crate::{
    compressor::Compressor,
    config::Config,
    error::OptimizeError,
    file_manager::FileManager,
    optimizer::task_optimizer::{SizeChange, TaskOptimizer},
    platform::PlatformCommands,
    progress::{BatchSummary, ProgressManager},
};
use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

/// Result of one command-line path
#[derive(Debug, Clone, PartialEq)]
pub enum PathRun {
    /// A directory processed in batch mode
    Folder(BatchSummary),
    /// A single file; `None` when the output was not smaller or Ghostscript failed
    File(Option<SizeChange>),
}

/// Orchestratore principale
pub struct PdfOptimizer {
    config: Config,
    compressor: Arc<Compressor>,
}

impl PdfOptimizer {
    /// Crea nuova istanza con il compressore derivato dalla configurazione
    pub fn new(config: Config) -> Result<Self> {
        let compressor = Compressor::from_config(&config);
        Self::with_compressor(config, compressor)
    }

    /// Crea nuova istanza con un compressore esplicito
    pub fn with_compressor(config: Config, compressor: Compressor) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            compressor: Arc::new(compressor),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Controlla che Ghostscript sia disponibile
    pub async fn check_dependencies(&self) -> Result<()> {
        let program = self.compressor.program();
        if !PlatformCommands::instance().is_command_available(program).await {
            return Err(OptimizeError::MissingDependency(format!(
                "{} is required for PDF optimization (install Ghostscript or set \"ghostscript\" in the config file)",
                program.display()
            ))
            .into());
        }
        Ok(())
    }

    /// Smista i path della command line: directory → batch, file → modalità singola.
    ///
    /// Single files always print their result line. The first path that is
    /// neither stops the run with `OptimizeError::InvalidPath`; earlier paths
    /// have already been processed by then.
    pub async fn run_paths(&self, paths: &[PathBuf], verbose: bool) -> Result<Vec<PathRun>> {
        self.run_paths_with_progress(paths, verbose, ProgressManager::new, ProgressManager::spinner)
            .await
    }

    async fn run_paths_with_progress(
        &self,
        paths: &[PathBuf],
        verbose: bool,
        batch_progress: fn(u64) -> ProgressManager,
        file_progress: fn() -> ProgressManager,
    ) -> Result<Vec<PathRun>> {
        let mut runs = Vec::with_capacity(paths.len());

        for path in paths {
            if path.is_dir() {
                let summary = self
                    .optimize_folder_with_progress(path, verbose, batch_progress)
                    .await?;
                runs.push(PathRun::Folder(summary));
            } else if path.is_file() {
                let change = self.optimize_file_with_progress(path, true, file_progress()).await?;
                runs.push(PathRun::File(change));
            } else {
                return Err(OptimizeError::InvalidPath(path.clone()).into());
            }
        }

        Ok(runs)
    }

    /// Ottimizza un singolo PDF
    pub async fn optimize_file(&self, source: &Path, verbose: bool) -> Result<Option<SizeChange>> {
        self.optimize_file_with_progress(source, verbose, ProgressManager::spinner())
            .await
    }

    async fn optimize_file_with_progress(
        &self,
        source: &Path,
        verbose: bool,
        progress: ProgressManager,
    ) -> Result<Option<SizeChange>> {
        let task = TaskOptimizer::new(self.compressor.clone(), progress.clone());
        let result = task.optimize(source, verbose).await;
        progress.finish();
        result
    }

    /// Ottimizza tutti i PDF di una directory
    pub async fn optimize_folder(&self, dir: &Path, verbose: bool) -> Result<BatchSummary> {
        self.optimize_folder_with_progress(dir, verbose, ProgressManager::new).await
    }

    async fn optimize_folder_with_progress(
        &self,
        dir: &Path,
        verbose: bool,
        make_progress: impl FnOnce(u64) -> ProgressManager,
    ) -> Result<BatchSummary> {
        info!("Starting PDF optimization in: {}", dir.display());

        let files = FileManager::find_pdf_files(dir)?;
        info!("Found {} PDF files to process ({} workers)", files.len(), self.config.workers);

        let mut summary = BatchSummary::new(files.len());
        let progress = make_progress(files.len() as u64);
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut pending = FuturesUnordered::new();

        for file_path in files {
            let semaphore = semaphore.clone();
            let task = TaskOptimizer::new(self.compressor.clone(), progress.clone());

            pending.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return (file_path, Err(anyhow::Error::from(e))),
                };
                let outcome = task.process_single_file(&file_path, verbose).await;
                (file_path, outcome)
            }));
        }

        // Risultati in ordine di completamento
        while let Some(joined) = pending.next().await {
            progress.inc();
            match joined {
                Ok((_, Ok(outcome))) => summary.record(&outcome),
                Ok((file_path, Err(e))) => {
                    error!("Failed to process {}: {:#}", file_path.display(), e);
                    summary.record_error();
                }
                Err(e) => {
                    error!("Optimization task aborted: {}", e);
                    summary.record_error();
                }
            }
        }

        progress.finish();
        info!("{}", summary.format_counts());
        summary.print();

        Ok(summary)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::file_manager::TRANSIENT_PREFIX;
    use crate::test_support::FakeGhostscript;
    use std::time::Duration;

    fn optimizer(fake: &FakeGhostscript, timeout: Duration) -> PdfOptimizer {
        let config = Config {
            ghostscript: None,
            workers: 5,
            timeout_secs: timeout.as_secs(),
        };
        PdfOptimizer::with_compressor(config, fake.compressor(timeout)).unwrap()
    }

    async fn run(optimizer: &PdfOptimizer, dir: &Path) -> BatchSummary {
        optimizer
            .optimize_folder_with_progress(dir, true, |_| ProgressManager::hidden())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_batch_totals() {
        let fake = FakeGhostscript::new();
        let a = fake.pdf("a.pdf", 100_000);
        fake.set_target(&a, 40_000);
        let b = fake.pdf("b.pdf", 200_000);
        fake.set_target(&b, 150_000);
        let c = fake.pdf("c.pdf", 50_000);
        let c_original = std::fs::read(&c).unwrap();

        let summary = run(&optimizer(&fake, Duration::from_secs(10)), fake.dir()).await;

        assert_eq!(summary.files_found, 3);
        assert_eq!(summary.files_optimized, 2);
        assert_eq!(summary.files_unchanged, 1);
        assert_eq!(summary.total_initial_size, 300_000);
        assert_eq!(summary.total_final_size, 190_000);
        assert_eq!(summary.format_ratio(), "36.67%");

        assert_eq!(std::fs::metadata(&a).unwrap().len(), 40_000);
        assert_eq!(std::fs::metadata(&b).unwrap().len(), 150_000);
        assert_eq!(std::fs::read(&c).unwrap(), c_original);
        assert!(fake.transient_files().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_does_not_affect_other_jobs() {
        let fake = FakeGhostscript::new();
        let fast = fake.pdf("fast.pdf", 20_000);
        fake.set_target(&fast, 5_000);
        let slow = fake.pdf("slow.pdf", 20_000);

        let summary = run(&optimizer(&fake, Duration::from_secs(1)), fake.dir()).await;

        assert_eq!(summary.files_optimized, 1);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.total_initial_size, 20_000);
        assert_eq!(summary.total_final_size, 5_000);
        assert_eq!(std::fs::metadata(&fast).unwrap().len(), 5_000);
        assert_eq!(std::fs::metadata(&slow).unwrap().len(), 20_000);
        assert!(fake.transient_files().is_empty());
    }

    #[tokio::test]
    async fn test_many_jobs_with_failures_leave_no_transient_files() {
        let fake = FakeGhostscript::new();
        let mut expected_initial = 0;
        let mut expected_final = 0;
        for i in 0..8 {
            let pdf = fake.pdf(&format!("doc{}.pdf", i), 10_000 + i as u64);
            fake.set_target(&pdf, 1_000 * (i as u64 + 1));
            expected_initial += 10_000 + i as u64;
            expected_final += 1_000 * (i as u64 + 1);
        }
        for i in 0..4 {
            fake.pdf(&format!("fail{}.pdf", i), 10_000);
        }
        fake.pdf("noout.pdf", 10_000);

        let summary = run(&optimizer(&fake, Duration::from_secs(10)), fake.dir()).await;

        assert_eq!(summary.files_found, 13);
        assert_eq!(summary.files_optimized, 8);
        assert_eq!(summary.failures, 5);
        assert_eq!(summary.total_initial_size, expected_initial);
        assert_eq!(summary.total_final_size, expected_final);
        assert!(fake.transient_files().is_empty());
    }

    #[tokio::test]
    async fn test_leftover_transient_file_is_not_a_candidate() {
        let fake = FakeGhostscript::new();
        let leftover = fake.dir().join(format!("{}deadbeef.pdf", TRANSIENT_PREFIX));
        std::fs::write(&leftover, vec![7u8; 9_000]).unwrap();
        fake.set_target(&leftover, 10);
        let real = fake.pdf("real.pdf", 9_000);
        fake.set_target(&real, 3_000);

        let summary = run(&optimizer(&fake, Duration::from_secs(10)), fake.dir()).await;

        assert_eq!(summary.files_found, 1);
        assert_eq!(summary.files_optimized, 1);
        assert_eq!(std::fs::read(&leftover).unwrap(), vec![7u8; 9_000]);
        assert_eq!(fake.transient_files(), vec![leftover]);
    }

    #[tokio::test]
    async fn test_empty_folder() {
        let fake = FakeGhostscript::new();
        let summary = run(&optimizer(&fake, Duration::from_secs(10)), fake.dir()).await;

        assert_eq!(summary, BatchSummary::new(0));
        assert_eq!(summary.format_ratio(), "N/A");
    }

    #[tokio::test]
    async fn test_single_file_mode() {
        let fake = FakeGhostscript::new();
        let source = fake.pdf("single.pdf", 8_000);
        fake.set_target(&source, 2_000);
        let optimizer = optimizer(&fake, Duration::from_secs(10));

        let result = optimizer.optimize_file(&source, true).await.unwrap();
        assert_eq!(result, Some(SizeChange { initial_size: 8_000, final_size: 2_000 }));

        let text = fake.dir().join("single.txt");
        std::fs::write(&text, b"x").unwrap();
        let err = optimizer.optimize_file(&text, true).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<OptimizeError>(), Some(OptimizeError::NotAPdf(_))));
    }

    #[tokio::test]
    async fn test_check_dependencies() {
        let fake = FakeGhostscript::new();
        assert!(optimizer(&fake, Duration::from_secs(10)).check_dependencies().await.is_ok());

        let config = Config {
            ghostscript: Some(fake.dir().join("missing-gs")),
            ..Config::default()
        };
        let err = PdfOptimizer::new(config).unwrap().check_dependencies().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<OptimizeError>(),
            Some(OptimizeError::MissingDependency(_))
        ));
    }

    async fn run_paths(optimizer: &PdfOptimizer, paths: &[PathBuf]) -> Result<Vec<PathRun>> {
        optimizer
            .run_paths_with_progress(paths, false, |_| ProgressManager::hidden(), ProgressManager::hidden)
            .await
    }

    #[tokio::test]
    async fn test_run_paths_routes_folders_and_files() {
        let folder = FakeGhostscript::new();
        let a = folder.pdf("a.pdf", 10_000);
        folder.set_target(&a, 4_000);
        folder.pdf("b.pdf", 5_000);

        let single = FakeGhostscript::new();
        let report = single.pdf("report.pdf", 8_000);
        single.set_target(&report, 2_000);
        let same = single.pdf("same.pdf", 3_000);

        let optimizer = optimizer(&folder, Duration::from_secs(10));
        // A path with a trailing `.` still names a directory and goes to batch mode
        let dotted = folder.dir().join(".");
        let paths = vec![dotted, report.clone(), same];

        let runs = run_paths(&optimizer, &paths).await.unwrap();

        assert_eq!(runs.len(), 3);
        match &runs[0] {
            PathRun::Folder(summary) => {
                assert_eq!(summary.files_found, 2);
                assert_eq!(summary.files_optimized, 1);
                assert_eq!(summary.files_unchanged, 1);
                assert_eq!(summary.total_initial_size, 10_000);
                assert_eq!(summary.total_final_size, 4_000);
            }
            other => panic!("expected a folder run, got {other:?}"),
        }
        assert_eq!(
            runs[1],
            PathRun::File(Some(SizeChange { initial_size: 8_000, final_size: 2_000 }))
        );
        assert_eq!(runs[2], PathRun::File(None));
        assert_eq!(std::fs::metadata(&report).unwrap().len(), 2_000);
    }

    #[tokio::test]
    async fn test_run_paths_stops_at_invalid_path() {
        let fake = FakeGhostscript::new();
        let first = fake.pdf("first.pdf", 6_000);
        fake.set_target(&first, 1_000);
        let last = fake.pdf("last.pdf", 6_000);
        fake.set_target(&last, 1_000);
        let missing = fake.dir().join("missing.pdf");

        let optimizer = optimizer(&fake, Duration::from_secs(10));
        let paths = vec![first.clone(), missing.clone(), last.clone()];
        let err = run_paths(&optimizer, &paths).await.unwrap_err();

        match err.downcast_ref::<OptimizeError>() {
            Some(OptimizeError::InvalidPath(path)) => assert_eq!(path, &missing),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(std::fs::metadata(&first).unwrap().len(), 1_000);
        assert_eq!(std::fs::metadata(&last).unwrap().len(), 6_000);
    }

    #[tokio::test]
    async fn test_run_paths_single_file_must_be_pdf() {
        let fake = FakeGhostscript::new();
        let text = fake.dir().join("notes.txt");
        std::fs::write(&text, b"x").unwrap();

        let optimizer = optimizer(&fake, Duration::from_secs(10));
        let err = run_paths(&optimizer, &[text]).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<OptimizeError>(), Some(OptimizeError::NotAPdf(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config {
            workers: 0,
            ..Config::default()
        };
        assert!(PdfOptimizer::new(config).is_err());
    }
}
