//! Task working directory
//!
//! Each task owns a private temporary directory holding the submitted
//! source file and the per-invocation compile diagnostics file. Keeping
//! the directory an explicit handle (rather than ambient process state)
//! is what lets independent tasks run in parallel without renaming
//! conventions.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// File that captures the compiler/lint stderr stream for one compile
/// invocation. The name is part of the service's diagnostic-capture
/// contract.
pub const DIAGNOSTICS_FILE: &str = "compile.out";

/// Private working directory for a single task.
#[derive(Debug)]
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    /// Create a fresh, empty working directory.
    pub fn create() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the submitted source under the resolved filename and return
    /// its full path.
    pub fn write_source(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

/// Full path of the diagnostics file inside a working directory.
pub fn diagnostics_path(work_dir: &Path) -> PathBuf {
    work_dir.join(DIAGNOSTICS_FILE)
}

/// Capture compile-step stderr into the diagnostics file.
pub async fn write_diagnostics(work_dir: &Path, text: &str) -> Result<()> {
    tokio::fs::write(diagnostics_path(work_dir), text).await?;
    Ok(())
}

/// Read back the diagnostics file; an absent file reads as empty.
pub async fn read_diagnostics(work_dir: &Path) -> String {
    tokio::fs::read_to_string(diagnostics_path(work_dir))
        .await
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_source_into_workspace() {
        let ws = Workspace::create().unwrap();
        let path = ws.write_source("prog.sh", "ls\n").unwrap();

        assert_eq!(path, ws.path().join("prog.sh"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ls\n");
    }

    #[tokio::test]
    async fn diagnostics_round_trip() {
        let ws = Workspace::create().unwrap();
        write_diagnostics(ws.path(), "error: bad").await.unwrap();
        assert_eq!(read_diagnostics(ws.path()).await, "error: bad");
    }

    #[tokio::test]
    async fn missing_diagnostics_read_as_empty() {
        let ws = Workspace::create().unwrap();
        assert_eq!(read_diagnostics(ws.path()).await, "");
    }
}
