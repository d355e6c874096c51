//! # Ghostscript Compressor Module
//!
//! Questo modulo incapsula l'invocazione di Ghostscript per un singolo PDF.
//!
//! ## Responsabilità:
//! - Costruisce la riga di comando con il set fisso di flag `pdfwrite`
//! - Avvia il processo senza finestra (vedi `platform::WindowPolicy`)
//! - Applica un timeout wall-clock; allo scadere il processo viene terminato
//! - Riporta successo o fallimento come `Result<(), CompressorFailure>`
//!
//! ## Flag Ghostscript:
//! - Compatibilità PDF 1.5, modalità batch silenziosa
//! - Subset, compressione ed embedding dei font
//! - Downsampling bicubico delle immagini a 300 DPI
//! - Conversione colore verso RGB
//!
//! Il compressore non verifica il contenuto dell'output: è compito del
//! chiamante controllare che il file esista e confrontarne la dimensione.
//!
//! ## Esempio:
//! ```ignore
//! let compressor = Compressor::from_config(&config);
//! compressor.invoke(&source, &temp_output).await?;
//! ```

use crate::config::Config;
use crate::error::CompressorFailure;
use crate::platform::{HiddenWindow, WindowPolicy};
use crate::utils::{flag_with_path, to_string_vec};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Static contract with Ghostscript's `pdfwrite` device
pub const GHOSTSCRIPT_ARGS: &[&str] = &[
    "-sDEVICE=pdfwrite",
    "-dCompatibilityLevel=1.5",
    "-dNOPAUSE",
    "-dQUIET",
    "-dBATCH",
    "-dPrinted=false",
    "-dSubsetFonts=true",
    "-dCompressFonts=true",
    "-dEmbedAllFonts=true",
    "-dDetectDuplicateImages=true",
    "-dColorImageDownsampleType=/Bicubic",
    "-dColorImageResolution=300",
    "-dGrayImageDownsampleType=/Bicubic",
    "-dGrayImageResolution=300",
    "-dMonoImageDownsampleType=/Bicubic",
    "-dMonoImageResolution=300",
    "-dDownsampleColorImages=true",
    "-sProcessColorModel=DeviceRGB",
    "-sColorConversionStrategy=RGB",
    "-sColorConversionStrategyForImages=RGB",
    "-dConvertCMYKImagesToRGB=true",
];

/// Output file designator, immediately followed by the path
pub const OUTPUT_FILE_FLAG: &str = "-sOutputFile=";

/// Runs Ghostscript on one PDF at a time
#[derive(Debug, Clone)]
pub struct Compressor {
    program: PathBuf,
    leading_args: Vec<String>,
    fixed_args: Vec<String>,
    timeout: Duration,
    window: Arc<dyn WindowPolicy>,
}

impl Compressor {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            fixed_args: to_string_vec(GHOSTSCRIPT_ARGS.iter()),
            timeout,
            window: Arc::new(HiddenWindow),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ghostscript_program(), config.timeout())
    }

    /// Arguments placed before the Ghostscript flags, for wrappers that
    /// take a script path (`sh gs-wrapper.sh ...`).
    pub fn with_leading_args<I, T>(mut self, args: I) -> Self
    where
        T: ToString,
        I: IntoIterator<Item = T>,
    {
        self.leading_args = to_string_vec(args);
        self
    }

    pub fn with_window_policy(mut self, window: Arc<dyn WindowPolicy>) -> Self {
        self.window = window;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full argument list for one run: leading args, fixed flags, output designator, input
    pub fn build_args(&self, source: &Path, output: &Path) -> Vec<OsString> {
        self.leading_args
            .iter()
            .chain(self.fixed_args.iter())
            .map(OsString::from)
            .chain([flag_with_path(OUTPUT_FILE_FLAG, output), source.as_os_str().to_os_string()])
            .collect()
    }

    /// Compress `source` into `output`.
    ///
    /// A single attempt: the process is killed once the timeout elapses.
    pub async fn invoke(&self, source: &Path, output: &Path) -> Result<(), CompressorFailure> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.build_args(source, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        self.window.configure(&mut cmd);

        debug!("Running {} on {}", self.program.display(), source.display());
        let start_time = Instant::now();

        let child = cmd.spawn().map_err(|source| CompressorFailure::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(CompressorFailure::Wait)?,
            Err(_) => {
                warn!(
                    "Ghostscript exceeded {}s on {}, terminated",
                    self.timeout.as_secs(),
                    source.display()
                );
                return Err(CompressorFailure::TimedOut(self.timeout));
            }
        };

        debug!(
            "Ghostscript finished {} in {:.1}s ({})",
            source.display(),
            start_time.elapsed().as_secs_f64(),
            output.status
        );

        if output.status.success() {
            Ok(())
        } else {
            Err(CompressorFailure::ExitStatus {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
