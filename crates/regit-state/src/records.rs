use crate::layout::StateLayout;
use regit_core::error::StateError;
use regit_core::types::DependencyRecord;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persistent storage of per-branch dependency records.
pub trait RecordStore {
    /// `None` when the branch has no record (it is unmanaged).
    fn load(&self, branch: &str) -> Result<Option<DependencyRecord>, StateError>;
    fn save(&self, branch: &str, record: &DependencyRecord) -> Result<(), StateError>;
    /// Returns whether a record existed.
    fn remove(&self, branch: &str) -> Result<bool, StateError>;
    fn exists(&self, branch: &str) -> bool;
    /// Human-readable location of the record, for messages.
    fn location(&self, branch: &str) -> PathBuf;
}

/// One JSON document per branch under `<git-dir>/regit/branches/`.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    layout: StateLayout,
}

impl FileRecordStore {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self, branch: &str) -> Result<Option<DependencyRecord>, StateError> {
        let path = self.layout.record_file(branch);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StateError::Io(err)),
        };
        let record = serde_json::from_str(&raw)
            .map_err(|e| StateError::corrupt_record(path.display().to_string(), e))?;
        Ok(Some(record))
    }

    fn save(&self, branch: &str, record: &DependencyRecord) -> Result<(), StateError> {
        self.layout.ensure_dirs()?;
        let path = self.layout.record_file(branch);
        let mut payload = serde_json::to_vec_pretty(record)
            .map_err(|e| StateError::corrupt_record(path.display().to_string(), e))?;
        payload.push(b'\n');
        atomic_write(&path, &payload)?;
        debug!(branch, path = %path.display(), "saved dependency record");
        Ok(())
    }

    fn remove(&self, branch: &str) -> Result<bool, StateError> {
        match fs::remove_file(self.layout.record_file(branch)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StateError::Io(err)),
        }
    }

    fn exists(&self, branch: &str) -> bool {
        self.layout.record_file(branch).is_file()
    }

    fn location(&self, branch: &str) -> PathBuf {
        self.layout.record_file(branch)
    }
}

/// Write through a sibling temp file so readers never observe a partial document.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StateError> {
    let dir = path.parent().ok_or_else(|| {
        StateError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("state path has no parent directory: {}", path.display()),
        ))
    })?;
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| StateError::Io(e.error))?;
    Ok(())
}
