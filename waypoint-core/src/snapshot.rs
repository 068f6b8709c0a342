//! Loading user snapshots.
//!
//! The core never owns persistence. Callers hand over a [`SnapshotSource`]
//! that materializes one user's records; the JSON implementation here backs
//! the CLI and the tests.

use crate::types::UserSnapshot;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supplies the records of one user.
pub trait SnapshotSource: Send + Sync {
    /// Load the snapshot for `user_id`. Unknown users are an error.
    fn load_snapshot(&self, user_id: &str) -> Result<UserSnapshot>;
}

/// Read a snapshot from a JSON file.
pub fn load_snapshot_file(path: &Path) -> Result<UserSnapshot> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Snapshot(format!("failed to read {:?}: {}", path, e)))?;
    let snapshot: UserSnapshot = serde_json::from_str(&content)
        .map_err(|e| Error::Snapshot(format!("failed to parse {:?}: {}", path, e)))?;
    tracing::debug!(
        path = %path.display(),
        user_id = %snapshot.user.id,
        goals = snapshot.goals.len(),
        daily_actions = snapshot.daily_actions.len(),
        cards = snapshot.cards.len(),
        "Loaded snapshot"
    );
    Ok(snapshot)
}

/// Snapshots stored as JSON on disk.
///
/// `root` is either a single snapshot file, which serves only its own user,
/// or a directory holding `<user_id>.json` files.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotSource {
    root: PathBuf,
}

impl JsonFileSnapshotSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SnapshotSource for JsonFileSnapshotSource {
    fn load_snapshot(&self, user_id: &str) -> Result<UserSnapshot> {
        if self.root.is_dir() {
            let path = self.root.join(format!("{user_id}.json"));
            if !path.exists() {
                return Err(Error::Snapshot(format!("unknown user: {user_id}")));
            }
            return load_snapshot_file(&path);
        }

        let snapshot = load_snapshot_file(&self.root)?;
        if snapshot.user.id != user_id {
            return Err(Error::Snapshot(format!("unknown user: {user_id}")));
        }
        Ok(snapshot)
    }
}

/// Snapshots held in memory, keyed by user id.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotSource {
    snapshots: HashMap<String, UserSnapshot>,
}

impl InMemorySnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, snapshot: UserSnapshot) {
        self.snapshots.insert(snapshot.user.id.clone(), snapshot);
    }
}

impl SnapshotSource for InMemorySnapshotSource {
    fn load_snapshot(&self, user_id: &str) -> Result<UserSnapshot> {
        self.snapshots
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::Snapshot(format!("unknown user: {user_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SNAPSHOT: &str = r#"{
        "user": {"id": "u1", "created_at": "2024-01-01T00:00:00Z"},
        "goals": [{
            "id": "g1", "user_id": "u1", "goal_type": "health",
            "title": "Run", "created_at": "2024-01-02T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }],
        "daily_actions": [
            {"id": "a1", "user_id": "u1", "action_date": "2024-01-03",
             "created_at": "2024-01-03T08:00:00Z"}
        ]
    }"#;

    #[test]
    fn single_file_serves_its_user() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let source = JsonFileSnapshotSource::new(&path);
        let snapshot = source.load_snapshot("u1").unwrap();
        assert_eq!(snapshot.goals.len(), 1);
        assert!(snapshot.cards.is_empty());
        assert!(matches!(source.load_snapshot("u2"), Err(Error::Snapshot(_))));
    }

    #[test]
    fn directory_is_keyed_by_user() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("u1.json"), SNAPSHOT).unwrap();

        let source = JsonFileSnapshotSource::new(dir.path());
        assert_eq!(source.load_snapshot("u1").unwrap().user.id, "u1");
        assert!(matches!(source.load_snapshot("nobody"), Err(Error::Snapshot(_))));
    }

    #[test]
    fn unparseable_file_is_snapshot_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_snapshot_file(&path), Err(Error::Snapshot(_))));
    }

    #[test]
    fn in_memory_source() {
        let snapshot: UserSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let mut source = InMemorySnapshotSource::new();
        source.insert(snapshot);
        assert!(source.load_snapshot("u1").is_ok());
        assert!(source.load_snapshot("u2").is_err());
    }
}
