//! Artifact output for QPC
//!
//! Gantree: L5_Engine → ArtifactWriter
//!
//! Resolves artifact paths under the output directory and records every
//! file written during one compile.

use qpc_core::{QpcError, QpcResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Writer for the files of one compile
/// Gantree: ArtifactWriter // 산출물 작성
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    /// Output directory; checked at the first write
    dir: Option<PathBuf>,

    /// Base name of program-level artifacts
    artifact_name: String,

    /// Files written so far
    written: Vec<PathBuf>,
}

impl ArtifactWriter {
    /// Create a writer
    pub fn new(dir: Option<PathBuf>, artifact_name: impl Into<String>) -> Self {
        Self {
            dir,
            artifact_name: artifact_name.into(),
            written: Vec::new(),
        }
    }

    /// Base name of program-level artifacts
    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }

    /// Change the base name
    pub fn rename(&mut self, artifact_name: impl Into<String>) {
        self.artifact_name = artifact_name.into();
        log::info!("artifacts renamed to '{}'", self.artifact_name);
    }

    /// Output directory
    pub fn dir(&self) -> QpcResult<&Path> {
        self.dir
            .as_deref()
            .ok_or_else(|| QpcError::Io("no output directory configured".into()))
    }

    /// Path of a file in the output directory
    pub fn file_path(&self, file_name: &str) -> QpcResult<PathBuf> {
        Ok(self.dir()?.join(file_name))
    }

    /// Path of `<artifact><suffix>`
    pub fn artifact_path(&self, suffix: &str) -> QpcResult<PathBuf> {
        self.file_path(&format!("{}{}", self.artifact_name, suffix))
    }

    /// Write a file in the output directory
    pub fn write(&mut self, file_name: &str, contents: &str) -> QpcResult<PathBuf> {
        let path = self.file_path(file_name)?;
        log::info!("writing '{}'", path.display());
        fs::write(&path, contents)?;
        self.record(path.clone());
        Ok(path)
    }

    /// Write `<artifact><suffix>`
    pub fn write_artifact(&mut self, suffix: &str, contents: &str) -> QpcResult<PathBuf> {
        let file_name = format!("{}{}", self.artifact_name, suffix);
        self.write(&file_name, contents)
    }

    /// Record a file written by someone else
    pub fn record(&mut self, path: PathBuf) {
        self.written.push(path);
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Consume the writer
    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

// ============================================================================
// Tests
// ============================================================================
