//! Scoped temp-resource management for processing jobs.

use std::path::{Path, PathBuf};

use clearcast_common::error::ClearcastResult;

/// Per-job temporary directory with an explicit ledger of files created
/// inside it.
///
/// Files are registered before they are written, so a crash mid-write still
/// gets cleaned. Cleanup removes files first, then the directory; failures
/// are logged, never escalated, and a second cleanup is a no-op.
pub struct TempWorkspace {
    dir: Option<tempfile::TempDir>,
    dir_path: PathBuf,
    registered: Vec<PathBuf>,
}

impl TempWorkspace {
    /// Create a fresh workspace directory.
    pub fn create() -> ClearcastResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("clearcast-job-")
            .tempdir()?;
        let dir_path = dir.path().to_path_buf();
        tracing::debug!(dir = %dir_path.display(), "Created job workspace");
        Ok(Self {
            dir: Some(dir),
            dir_path,
            registered: Vec::new(),
        })
    }

    /// Directory backing this workspace.
    pub fn path(&self) -> &Path {
        &self.dir_path
    }

    /// Register a file inside the workspace and return its full path.
    ///
    /// Call this before writing the file.
    pub fn register(&mut self, file_name: &str) -> PathBuf {
        let path = self.dir_path.join(file_name);
        self.registered.push(path.clone());
        path
    }

    /// Remove every registered file, then the directory. Idempotent.
    pub fn cleanup(&mut self) {
        for path in self.registered.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed temp file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp file")
                }
            }
        }

        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                tracing::warn!(
                    dir = %self.dir_path.display(),
                    error = %e,
                    "Failed to remove job workspace"
                );
            }
        }
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_removes_registered_files_and_directory() {
        let mut ws = TempWorkspace::create().unwrap();
        let dir = ws.path().to_path_buf();
        let written = ws.register("audio.wav");
        std::fs::write(&written, b"pcm").unwrap();

        ws.cleanup();
        assert!(!written.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn cleanup_is_idempotent_and_tolerates_missing_files() {
        let mut ws = TempWorkspace::create().unwrap();
        let dir = ws.path().to_path_buf();
        // Registered but never written.
        let ghost = ws.register("never-written.wav");

        ws.cleanup();
        ws.cleanup();
        assert!(!ghost.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn drop_cleans_up_without_explicit_call() {
        let dir;
        {
            let mut ws = TempWorkspace::create().unwrap();
            dir = ws.path().to_path_buf();
            let file = ws.register("orphan.bin");
            std::fs::write(&file, b"x").unwrap();
        }
        assert!(!dir.exists());
    }
}
