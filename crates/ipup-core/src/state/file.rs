// # File State Store
//
// File-based implementation of StateStore.
//
// ## Durability discipline
//
// - Atomic writes: the new record is written to a `.tmp` sibling, flushed,
//   then renamed over the target. An interrupted save leaves either the old
//   record or the new one on disk, never a torn file.
// - Missing file on load is `None` (valid first-run state).
// - Any other load failure — unreadable file, invalid JSON, version the code
//   cannot interpret — is a state store error. The cycle must abort rather
//   than publish blindly over unreadable state, so no silent recovery is
//   attempted here.
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "last_published_ip": "203.0.113.5",
//   "published_at": "2025-01-09T12:00:00Z"
// }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::config::StateStoreConfig;
use crate::traits::state_store::{StateRecord, StateStore, StateStoreFactory};

/// State file format version, for future migration if the layout changes
const STATE_FILE_VERSION: &str = "1.0";

/// Serializable state file layout
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    #[serde(flatten)]
    record: StateRecord,
}

/// File-based state store with atomic writes
///
/// Construction performs no I/O; reads and writes happen in [`load`] and
/// [`save`] so their failures surface inside the cycle where they can be
/// classified.
///
/// [`load`]: StateStore::load
/// [`save`]: StateStore::save
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path used for the atomic write
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<Option<StateRecord>, Error> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("state file does not exist: {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::state_store(format!(
                    "failed to read state file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let state_file: StateFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::state_store(format!(
                "failed to parse state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if state_file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "state file version mismatch: expected {}, got {}; loading anyway",
                STATE_FILE_VERSION,
                state_file.version
            );
        }

        Ok(Some(state_file.record))
    }

    async fn save(&self, record: &StateRecord) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::state_store(format!(
                    "failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let state_file = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            record: record.clone(),
        };

        let json = serde_json::to_string_pretty(&state_file)
            .map_err(|e| Error::state_store(format!("failed to serialize state: {}", e)))?;

        // Write to the temporary sibling first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::state_store(format!(
                    "failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::state_store(format!(
                    "failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("state written to {}", self.path.display());
        Ok(())
    }
}

/// Factory for creating file state stores
pub struct FileStateStoreFactory;

impl StateStoreFactory for FileStateStoreFactory {
    fn create(&self, config: &StateStoreConfig) -> Result<Box<dyn StateStore>, Error> {
        match config {
            StateStoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(Error::config("state file path cannot be empty"));
                }
                Ok(Box::new(FileStateStore::new(path)))
            }
            _ => Err(Error::config("invalid config for file state store")),
        }
    }
}
