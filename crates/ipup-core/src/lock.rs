//! Advisory lock excluding overlapping invocations
//!
//! The external scheduler is expected to serialize invocations, but when that
//! guarantee is not available the lock keeps two concurrent cycles from
//! racing on the persisted record. The filesystem is the arbiter: creating
//! the lock file with create-new semantics either succeeds exactly once or
//! fails with `AlreadyExists`.
//!
//! A lock file left behind by a crashed invocation is not stolen — the next
//! cycle fails with a lock error and the operator removes the file. Guessing
//! at staleness from the recorded PID races with PID reuse.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::Error;

/// Held for the duration of one cycle; the file is removed on drop
#[derive(Debug)]
pub struct CycleLock {
    path: PathBuf,
}

impl CycleLock {
    /// Acquire the lock or fail if another invocation holds it
    pub fn acquire<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => Error::lock(format!(
                    "lock file {} exists; another cycle appears to be running \
                     (remove the file if it is stale)",
                    path.display()
                )),
                _ => Error::lock(format!(
                    "failed to create lock file {}: {}",
                    path.display(),
                    e
                )),
            })?;

        // The PID is diagnostic only, never trusted for staleness decisions
        let _ = writeln!(file, "{}", std::process::id());

        Ok(Self { path })
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CycleLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(
                "failed to remove lock file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
