//! Where seating plans are kept between edits.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;

use crate::plan::SeatingPlan;

/// Key-value storage for plans, keyed by plan id.
pub trait PlanStore {
    /// Store `plan` under `plan_id`, replacing any previous version.
    fn save(&self, plan_id: &str, plan: &SeatingPlan) -> Result<(), StoreError>;

    /// Load the plan stored under `plan_id`. `Ok(None)` if there is none.
    fn load(&self, plan_id: &str) -> Result<Option<SeatingPlan>, StoreError>;
}

/// Mint a fresh plan id.
pub fn new_plan_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Plan ids end up in file names, so only a safe alphabet is accepted.
pub fn check_plan_id(plan_id: &str) -> Result<(), StoreError> {
    let ok = !plan_id.is_empty()
        && plan_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidId(plan_id.to_string()))
    }
}

/// One TOML file per plan in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file a plan id maps to.
    pub fn path_for(&self, plan_id: &str) -> Result<PathBuf, StoreError> {
        check_plan_id(plan_id)?;
        Ok(self.dir.join(format!("{plan_id}.toml")))
    }
}

impl PlanStore for FileStore {
    fn save(&self, plan_id: &str, plan: &SeatingPlan) -> Result<(), StoreError> {
        let path = self.path_for(plan_id)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::Write {
            path: self.dir.display().to_string(),
            source: e,
        })?;

        let stored = SeatingPlan {
            id: Some(plan_id.to_string()),
            ..plan.clone()
        };
        let content = stored.to_toml()?;
        std::fs::write(&path, content).map_err(|e| StoreError::Write {
            path: path.display().to_string(),
            source: e,
        })?;

        tracing::debug!(plan_id, path = %path.display(), "saved plan");
        Ok(())
    }

    fn load(&self, plan_id: &str) -> Result<Option<SeatingPlan>, StoreError> {
        let path = self.path_for(plan_id)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Read {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };

        let mut plan = SeatingPlan::from_toml(&content)?;
        plan.id = Some(plan_id.to_string());
        Ok(Some(plan))
    }
}

/// Process-local store, for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    plans: RwLock<HashMap<String, SeatingPlan>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored plans.
    pub fn len(&self) -> Result<usize, StoreError> {
        let plans = self
            .plans
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(plans.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl PlanStore for InMemoryStore {
    fn save(&self, plan_id: &str, plan: &SeatingPlan) -> Result<(), StoreError> {
        check_plan_id(plan_id)?;
        let mut plans = self
            .plans
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let stored = SeatingPlan {
            id: Some(plan_id.to_string()),
            ..plan.clone()
        };
        plans.insert(plan_id.to_string(), stored);
        Ok(())
    }

    fn load(&self, plan_id: &str) -> Result<Option<SeatingPlan>, StoreError> {
        check_plan_id(plan_id)?;
        let plans = self
            .plans
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(plans.get(plan_id).cloned())
    }
}

/// Errors from plan storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid plan id '{0}'")]
    InvalidId(String),

    #[error("failed to read plan file '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write plan to '{path}'")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse plan file")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize plan")]
    Serialize(#[from] toml::ser::Error),

    #[error("store error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::numbered_tables;
    use crate::normalize::normalize;

    fn sample() -> SeatingPlan {
        SeatingPlan::new(numbered_tables(2, 4), normalize("Ann, Ben"))
    }

    #[test]
    fn file_store_round_trip_sets_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("plans"));

        let plan = sample();
        store.save("wedding", &plan).unwrap();
        let loaded = store.load("wedding").unwrap().unwrap();

        assert_eq!(loaded.id.as_deref(), Some("wedding"));
        assert_eq!(loaded.tables, plan.tables);
        assert_eq!(loaded.guests, plan.guests);
        assert!(dir.path().join("plans/wedding.toml").exists());
    }

    #[test]
    fn file_store_missing_plan_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.load("nothing-here").unwrap().is_none());
    }

    #[test]
    fn file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.toml"), "table = 5").unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.load("bad"), Err(StoreError::Parse(_))));
    }

    #[test]
    fn path_traversal_ids_are_rejected() {
        let store = FileStore::new("/tmp");
        for id in ["", "../etc", "a/b", "x.toml"] {
            assert!(matches!(store.path_for(id), Err(StoreError::InvalidId(_))), "{id}");
        }
    }

    #[test]
    fn in_memory_store_replaces_previous_version() {
        let store = InMemoryStore::new();
        let mut plan = sample();
        store.save("p1", &plan).unwrap();

        plan.regenerate_tables(1, 2);
        store.save("p1", &plan).unwrap();

        let loaded = store.load("p1").unwrap().unwrap();
        assert_eq!(loaded.tables.len(), 1);
        assert_eq!(store.len().unwrap(), 1);
        assert!(store.load("p2").unwrap().is_none());
    }

    #[test]
    fn poisoned_in_memory_store_reports_internal_error() {
        let store = std::sync::Arc::new(InMemoryStore::new());
        let writer = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = writer.plans.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(StoreError::Internal(_))));
        assert!(store.is_empty().is_err());
        assert!(matches!(store.load("p1"), Err(StoreError::Internal(_))));
        assert!(matches!(
            store.save("p1", &sample()),
            Err(StoreError::Internal(_))
        ));
    }
}
