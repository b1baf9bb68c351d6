use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{info, warn};

const SCRATCH_PREFIX: &str = "tempdb-";
const CHAIN_DIR: &str = "chaindata";

/// Process-unique directory holding the run's chain database. Removed when
/// dropped, whichever way the run ends.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
}

impl ScratchDir {
    /// Creates the directory under `parent`, or the system temp dir.
    pub fn provision(parent: Option<&Path>) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        info!(path = %dir.path().display(), "Created scratch directory");
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        self.dir.as_ref().map(TempDir::path).unwrap_or(Path::new(""))
    }

    pub fn chain_path(&self) -> PathBuf {
        self.path().join(CHAIN_DIR)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else { return };
        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => info!(path = %path.display(), "Removed scratch directory"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove scratch directory"),
        }
    }
}
