//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con i parametri dell'ottimizzazione
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `ghostscript`: Programma Ghostscript da usare (default: comando di piattaforma)
//! - `workers`: Numero di job paralleli (default: 5)
//! - `timeout_secs`: Timeout per singolo job Ghostscript (default: 60)
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     workers: 8,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::OptimizeError;
use crate::platform::PlatformCommands;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default size of the worker pool
pub const DEFAULT_WORKERS: usize = 5;

/// Upper bound on the worker pool
pub const MAX_WORKERS: usize = 256;

/// Default ceiling for a single Ghostscript run
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for PDF optimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ghostscript program (None = platform default command)
    pub ghostscript: Option<PathBuf>,
    /// Number of parallel workers
    pub workers: usize,
    /// Seconds before a Ghostscript run is killed
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ghostscript: None,
            workers: DEFAULT_WORKERS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(OptimizeError::Config("Number of workers must be greater than 0".to_string()).into());
        }

        if self.workers > MAX_WORKERS {
            return Err(OptimizeError::Config(format!("Number of workers must be at most {}", MAX_WORKERS)).into());
        }

        if self.timeout_secs == 0 {
            return Err(OptimizeError::Config("Timeout must be at least 1 second".to_string()).into());
        }

        if let Some(ref program) = self.ghostscript {
            if program.as_os_str().is_empty() {
                return Err(OptimizeError::Config("Ghostscript program must not be empty".to_string()).into());
            }
        }

        Ok(())
    }

    /// Program to launch, falling back to the platform's Ghostscript command
    pub fn ghostscript_program(&self) -> PathBuf {
        self.ghostscript
            .clone()
            .unwrap_or_else(|| PathBuf::from(PlatformCommands::instance().ghostscript_command()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pdf-optimizer").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| OptimizeError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
