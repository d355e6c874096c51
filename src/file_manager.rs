//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery dei PDF.
//!
//! ## Responsabilità:
//! - Discovery (non ricorsiva) dei PDF in una directory
//! - Riconoscimento dei file transitori (`temp_*.pdf`) lasciati da altre esecuzioni
//! - Generazione di path transitori univoci nella stessa directory del sorgente
//! - Sostituzione del sorgente con l'output ottimizzato
//! - Formattazione human-readable delle dimensioni (base 1000)
//!
//! ## Esempio:
//! ```ignore
//! let files = FileManager::find_pdf_files(Path::new("/path/to/pdfs"))?;
//! for file in files {
//!     let temp = FileManager::transient_path(&file);
//!     // ...
//! }
//! ```

use anyhow::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

/// Prefix marking Ghostscript outputs that are not final artifacts
pub const TRANSIENT_PREFIX: &str = "temp_";

/// Suffix every candidate must carry (case-sensitive)
pub const PDF_SUFFIX: &str = ".pdf";

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Get the size of a file in bytes
    pub async fn file_size(path: &Path) -> Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Whether the path ends with the literal `.pdf` suffix
    pub fn is_pdf(path: &Path) -> bool {
        path.to_string_lossy().ends_with(PDF_SUFFIX)
    }

    /// Whether the file name carries the transient prefix
    pub fn is_transient(path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().starts_with(TRANSIENT_PREFIX))
            .unwrap_or(false)
    }

    /// Whether a file should be picked up by a directory scan
    pub fn is_candidate(path: &Path) -> bool {
        Self::is_pdf(path) && !Self::is_transient(path)
    }

    /// Find the PDFs directly inside a directory (no recursion)
    pub fn find_pdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            // Follows symlinks, so a linked PDF counts and a linked directory does not
            if !path.is_file() {
                continue;
            }
            if Self::is_candidate(path) {
                files.push(path.to_path_buf());
            } else if Self::is_transient(path) {
                debug!("Ignoring transient file: {}", path.display());
            }
        }

        Ok(files)
    }

    /// Unique transient output path next to `source`
    pub fn transient_path(source: &Path) -> PathBuf {
        let name = format!("{}{}{}", TRANSIENT_PREFIX, Uuid::new_v4().simple(), PDF_SUFFIX);
        match source.parent() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    /// Remove a file, treating an already missing file as success
    pub async fn remove_if_exists(path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace `original` with `optimized`.
    ///
    /// Renames over the original. If the platform refuses that, the original
    /// is deleted first and the optimized file moved into its place.
    pub async fn replace_file(original: &Path, optimized: &Path) -> Result<()> {
        if let Err(e) = fs::rename(optimized, original).await {
            debug!("Rename over {} failed ({}), deleting first", original.display(), e);
            fs::remove_file(original).await?;
            fs::rename(optimized, original).await?;
        }
        Ok(())
    }

    /// Get human-readable file size (decimal units)
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["bytes", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1000.0 && unit_index < UNITS.len() - 1 {
            size /= 1000.0;
            unit_index += 1;
        }

        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
