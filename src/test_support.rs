//! Fake Ghostscript used by the pipeline tests.
//!
//! The script reads `-sOutputFile=` and the trailing input path, then acts on
//! the input file name:
//! - `*fail*`: writes a partial output, prints to stderr, exits 1
//! - `*slow*`: sleeps well past any test timeout
//! - `*noout*`: exits 0 without writing anything
//! - `*grow*`: writes the input twice
//! - otherwise: copies the first N bytes, N read from `<input>.target`,
//!   or the whole input when there is no sidecar

use crate::compressor::Compressor;
use crate::file_manager::FileManager;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const SCRIPT: &str = r#"#!/bin/sh
out=""
src=""
for arg in "$@"; do
  case "$arg" in
    -sOutputFile=*) out="${arg#-sOutputFile=}" ;;
  esac
  src="$arg"
done
case "$(basename "$src")" in
  *fail*) printf 'partial' > "$out"; echo "simulated failure" >&2; exit 1 ;;
  *slow*) exec sleep 30 ;;
  *noout*) exit 0 ;;
  *grow*) cat "$src" "$src" > "$out"; exit 0 ;;
esac
if [ -f "$src.target" ]; then
  head -c "$(cat "$src.target")" "$src" > "$out"
else
  cp "$src" "$out"
fi
"#;

pub struct FakeGhostscript {
    _root: TempDir,
    script: PathBuf,
    docs: PathBuf,
}

impl Default for FakeGhostscript {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGhostscript {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let script = root.path().join("fake-gs.sh");
        std::fs::write(&script, SCRIPT).unwrap();
        let docs = root.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        Self { _root: root, script, docs }
    }

    /// Directory holding the test PDFs
    pub fn dir(&self) -> &Path {
        &self.docs
    }

    /// Compressor running the fake through `sh`
    pub fn compressor(&self, timeout: Duration) -> Compressor {
        Compressor::new("sh", timeout).with_leading_args([self.script.display()])
    }

    /// Create a file of `size` patterned bytes
    pub fn pdf(&self, name: &str, size: u64) -> PathBuf {
        let path = self.docs.join(name);
        let content: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Make the fake write only the first `size` bytes of `source`
    pub fn set_target(&self, source: &Path, size: u64) {
        let mut sidecar = source.as_os_str().to_os_string();
        sidecar.push(".target");
        std::fs::write(PathBuf::from(sidecar), size.to_string()).unwrap();
    }

    /// Transient PDFs currently present in the docs directory
    pub fn transient_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.docs)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| FileManager::is_transient(path) && FileManager::is_pdf(path))
            .collect();
        files.sort();
        files
    }
}
