//! JSON session persistence: the `StateStore` collaborator backed by
//! `.rollout/store.json`.
//!
//! The file holds the full session (versions, production marker, and an
//! open staged batch if one exists), so `ro pending` / `ro commit` /
//! `ro discard` work across invocations. Writes go to a temp file first
//! and rename into place; a failed write leaves the previous session
//! intact.

use anyhow::{bail, Context, Result};
use rollout_core::error::StorageError;
use rollout_core::ports::{SessionState, StateStore};
use rollout_core::Catalog;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{self, ProjectConfig};

pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<Option<SessionState>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                path: self.path.display().to_string(),
                source,
            })
    }

    fn save(&self, state: &SessionState) -> Result<(), StorageError> {
        let encoded = serde_json::to_string_pretty(state).map_err(StorageError::Encode)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, encoded).map_err(|source| StorageError::Write {
            path: self.path.display().to_string(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StorageError::Write {
            path: self.path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }
}

/// True when `ro init` has been run in this project root.
pub fn is_initialized(project_root: &Path) -> bool {
    project_root.join(".rollout").is_dir()
}

/// Load the session into a catalog, normalizing persisted versions on the
/// way in. Errors if the project is not initialized.
pub fn open_catalog(project_root: &Path, config: &ProjectConfig) -> Result<Catalog> {
    if !is_initialized(project_root) {
        bail!("not a rollout project (run `ro init` first)");
    }

    let store = JsonStateStore::new(config::store_path(project_root, config));
    let state = store
        .load()
        .with_context(|| format!("loading session from {}", store.path().display()))?
        .unwrap_or_default();
    Ok(Catalog::from_session(state))
}

/// Persist the catalog's session.
pub fn save_catalog(project_root: &Path, config: &ProjectConfig, catalog: &Catalog) -> Result<()> {
    let store = JsonStateStore::new(config::store_path(project_root, config));
    store
        .save(&catalog.session())
        .with_context(|| format!("saving session to {}", store.path().display()))
}

#[cfg(test)]
mod tests {
    use super::{JsonStateStore, open_catalog, save_catalog};
    use crate::config::ProjectConfig;
    use rollout_core::model::Status;
    use rollout_core::ports::StateStore;
    use rollout_core::Catalog;
    use tempfile::TempDir;

    const NOW: i64 = 1_700_000_000_000_000;

    #[test]
    fn missing_file_loads_as_empty_session() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateStore::new(dir.path().join("store.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_a_decode_error_not_a_panic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonStateStore::new(path);
        assert!(store.load().is_err());
    }

    #[test]
    fn open_batch_survives_a_save_load_cycle() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".rollout")).unwrap();
        let config = ProjectConfig::default();

        let mut catalog = Catalog::new();
        let vid = catalog.create_version("1.0", "2024-05-02", "21:30", NOW);
        let cdu = catalog.create_cdu(vid, "PORTA", NOW).unwrap();
        catalog.commit_changes();
        catalog.set_cdu_status(cdu, Status::CertifiedOk, NOW);

        save_catalog(dir.path(), &config, &catalog).unwrap();
        let mut resumed = open_catalog(dir.path(), &config).unwrap();

        assert!(resumed.is_staging());
        assert_eq!(resumed.pending().len(), 1);
        resumed.discard_changes().unwrap();
        assert_eq!(resumed.versions()[0].cdus[0].status, Status::InDevelopment);
    }

    #[test]
    fn uninitialized_project_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(open_catalog(dir.path(), &ProjectConfig::default()).is_err());
    }
}
