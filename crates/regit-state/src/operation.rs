use crate::layout::StateLayout;
use crate::records::atomic_write;
use regit_core::error::StateError;
use regit_core::types::OperationState;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Single slot holding the interrupted operation, if any.
///
/// The slot is read-once: [`OperationStore::take`] removes the file after
/// reading it, and saving into an occupied slot is refused. A file that
/// fails to parse is reported and left in place for the operator.
#[derive(Debug, Clone)]
pub struct OperationStore {
    layout: StateLayout,
}

impl OperationStore {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    pub fn path(&self) -> PathBuf {
        self.layout.operation_file()
    }

    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Read the operation without consuming it.
    pub fn load(&self) -> Result<Option<OperationState>, StateError> {
        let path = self.path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StateError::Io(err)),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StateError::corrupt_operation_state(path.display().to_string(), e))
    }

    pub fn save(&self, state: &OperationState) -> Result<(), StateError> {
        let path = self.path();
        if path.exists() {
            return Err(StateError::OperationSlotOccupied {
                path: path.display().to_string(),
            });
        }
        self.layout.ensure_dirs()?;
        let mut payload = serde_json::to_vec_pretty(state)
            .map_err(|e| StateError::corrupt_operation_state(path.display().to_string(), e))?;
        payload.push(b'\n');
        atomic_write(&path, &payload)?;
        info!(
            branch = %state.branch,
            phase = %state.phase,
            path = %path.display(),
            "saved interrupted operation"
        );
        Ok(())
    }

    /// Read and clear the slot.
    pub fn take(&self) -> Result<OperationState, StateError> {
        let state = self.load()?.ok_or(StateError::NoOperationInProgress)?;
        fs::remove_file(self.path())?;
        debug!(branch = %state.branch, phase = %state.phase, "consumed operation state");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regit_core::types::OperationPhase;

    fn store() -> (tempfile::TempDir, OperationStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = OperationStore::new(StateLayout::new(tmp.path()));
        (tmp, store)
    }

    #[test]
    fn empty_slot() {
        let (_tmp, store) = store();
        assert!(!store.exists());
        assert!(store.load().unwrap().is_none());
        assert!(matches!(
            store.take().unwrap_err(),
            StateError::NoOperationInProgress
        ));
    }

    #[test]
    fn take_consumes_the_slot() {
        let (_tmp, store) = store();
        let state = OperationState::merge(
            "feature",
            "main",
            vec!["d1".to_string(), "d2".to_string()],
            "d1",
            Vec::new(),
        );
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap().as_ref(), Some(&state));
        assert!(store.exists());

        let taken = store.take().unwrap();
        assert_eq!(taken, state);
        assert!(!store.exists());
    }

    #[test]
    fn occupied_slot_refuses_second_operation() {
        let (_tmp, store) = store();
        let first = OperationState::rebase("feature", "main", Vec::new(), "abc");
        store.save(&first).unwrap();

        let second = OperationState::rebase("other", "main", Vec::new(), "def");
        let err = store.save(&second).unwrap_err();
        assert!(matches!(err, StateError::OperationSlotOccupied { .. }));
        assert_eq!(store.load().unwrap().unwrap().branch, "feature");
    }

    #[test]
    fn corrupt_state_stays_on_disk() {
        let (_tmp, store) = store();
        store.layout.ensure_dirs().unwrap();
        fs::write(store.path(), r#"{"action": "update", "phase": "squash"}"#).unwrap();

        let err = store.take().unwrap_err();
        assert!(matches!(err, StateError::CorruptOperationState { .. }));
        assert!(store.exists());
    }

    #[test]
    fn rebase_state_keeps_new_tip() {
        let (_tmp, store) = store();
        store
            .save(&OperationState::rebase("feature", "main", vec!["lib".into()], "abc"))
            .unwrap();
        let state = store.take().unwrap();
        assert_eq!(state.phase, OperationPhase::Rebase);
        assert_eq!(state.new_rebase_tip.as_deref(), Some("abc"));
    }
}
