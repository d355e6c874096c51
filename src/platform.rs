//! # Platform-specific utilities
//!
//! Questo modulo centralizza la logica cross-platform per il lancio di
//! Ghostscript: nome del comando, verifica disponibilità e avvio del
//! processo senza finestra.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::debug;

/// Platform-specific command names
pub struct PlatformCommands {
    ghostscript: &'static str,
    which_command: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        if cfg!(windows) {
            Self {
                ghostscript: "gswin64c.exe",
                which_command: "where",
            }
        } else {
            Self {
                ghostscript: "gs",
                which_command: "which",
            }
        }
    }

    /// Ghostscript command name on this platform
    pub fn ghostscript_command(&self) -> &'static str {
        self.ghostscript
    }

    /// Get the command used to check if a program exists
    pub fn which_command(&self) -> &'static str {
        self.which_command
    }

    /// Check if a program is available, either as an explicit path or on PATH
    pub async fn is_command_available(&self, program: &Path) -> bool {
        if program.components().count() > 1 || program.is_absolute() {
            return program.is_file();
        }

        if let Some(found) = Self::find_in_system_path(program) {
            debug!("Found {} at {}", program.display(), found.display());
            return true;
        }

        // Fallback to the which/where command
        let result = Command::new(self.which_command)
            .arg(program)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await;

        match result {
            Ok(status) => status.success(),
            Err(e) => {
                debug!("{} {} failed: {}", self.which_command, program.display(), e);
                false
            }
        }
    }

    fn find_in_system_path(program: &Path) -> Option<PathBuf> {
        let add_exe = cfg!(windows) && program.extension().is_none();

        std::env::split_paths(&std::env::var_os("PATH")?)
            .map(|dir| {
                let candidate = dir.join(program);
                if add_exe {
                    candidate.with_extension("exe")
                } else {
                    candidate
                }
            })
            .find(|path| path.is_file())
    }
}

/// Controls how a child process is presented to the user.
pub trait WindowPolicy: Send + Sync + Debug {
    fn configure(&self, command: &mut Command);
}

/// Launches child processes without a console window.
///
/// Only Windows has the concept; elsewhere this leaves the command untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct HiddenWindow;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

impl WindowPolicy for HiddenWindow {
    #[cfg(windows)]
    fn configure(&self, command: &mut Command) {
        command.creation_flags(CREATE_NO_WINDOW);
    }

    #[cfg(not(windows))]
    fn configure(&self, _command: &mut Command) {}
}
