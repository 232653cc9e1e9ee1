//! In-memory entity store: the single source of truth for versions and
//! their work items.
//!
//! Lookup misses are no-ops surfaced as `Option`/`bool` returns so callers
//! can skip view updates without an error path. Every successful mutation
//! bumps a revision counter that views use as a cheap staleness check.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::RestoreError;
use crate::model::{AuditEntry, Cdu, CduUuid, CommentCategory, Party, Status, Version};

/// Whether a duplicated item keeps the logical identity of its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateIdentity {
    /// Copied items keep the source uuid: the copy is "the same logical
    /// item" in a new version, and unique stats count it once.
    Shared,
    /// Copied items get a fresh uuid scoped to their new store id.
    Fresh,
}

/// Version fields addressable by a single field edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionField {
    Number,
    DeployDate,
    DeployTime,
}

impl VersionField {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::DeployDate => "deploy-date",
            Self::DeployTime => "deploy-time",
        }
    }
}

/// A deep, structurally independent copy of the whole store content.
///
/// Captured lazily when a staged batch opens; restoring one rolls back
/// every edit of the batch, including creations and deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub versions: Vec<Version>,
    pub production_version_id: Option<u64>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    versions: Vec<Version>,
    production_version_id: Option<u64>,
    next_version_id: u64,
    next_cdu_id: u64,
    #[serde(skip)]
    revision: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All versions in insertion order. Unique-stats counting relies on
    /// this order (last instance of a uuid wins).
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub const fn production_version_id(&self) -> Option<u64> {
        self.production_version_id
    }

    /// Monotonic mutation counter; bumped on every successful mutation.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn version(&self, id: u64) -> Option<&Version> {
        self.versions.iter().find(|v| v.id == id)
    }

    fn version_mut(&mut self, id: u64) -> Option<&mut Version> {
        self.versions.iter_mut().find(|v| v.id == id)
    }

    /// Find a work item anywhere in the store, with its owning version.
    pub fn locate_cdu(&self, cdu_id: u64) -> Option<(&Version, &Cdu)> {
        self.versions
            .iter()
            .find_map(|v| v.cdu(cdu_id).map(|c| (v, c)))
    }

    fn cdu_mut(&mut self, cdu_id: u64) -> Option<&mut Cdu> {
        self.versions.iter_mut().find_map(|v| v.cdu_mut(cdu_id))
    }

    /// Deep copy of the current content, for batch rollback.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            versions: self.versions.clone(),
            production_version_id: self.production_version_id,
        }
    }

    // -----------------------------------------------------------------
    // Version operations
    // -----------------------------------------------------------------

    /// Create a version with the next id; returns the assigned id.
    pub fn create_version(
        &mut self,
        number: impl Into<String>,
        deploy_date: impl Into<String>,
        deploy_time: impl Into<String>,
    ) -> u64 {
        self.next_version_id += 1;
        let mut version = Version::new(self.next_version_id, number);
        version.deploy_date = deploy_date.into();
        version.deploy_time = deploy_time.into();
        let id = version.id;
        self.versions.push(version);
        self.revision += 1;
        id
    }

    /// Copy a version's work items into a new version object. Copied items
    /// get fresh store ids; their uuid follows `identity`.
    pub fn duplicate_version(
        &mut self,
        source_id: u64,
        number: impl Into<String>,
        identity: DuplicateIdentity,
    ) -> Option<u64> {
        let source = self.version(source_id)?.clone();

        self.next_version_id += 1;
        let mut copy = Version::new(self.next_version_id, number);
        for cdu in &source.cdus {
            self.next_cdu_id += 1;
            let mut item = cdu.clone();
            item.id = self.next_cdu_id;
            if identity == DuplicateIdentity::Fresh {
                item.uuid = CduUuid::derive_scoped(&item.name, item.id);
            }
            copy.cdus.push(item);
        }

        let id = copy.id;
        self.versions.push(copy);
        self.revision += 1;
        Some(id)
    }

    /// Remove a version and its whole item subtree. Clears the production
    /// marker when it pointed at the removed version.
    pub fn delete_version(&mut self, id: u64) -> Option<Version> {
        let pos = self.versions.iter().position(|v| v.id == id)?;
        let removed = self.versions.remove(pos);
        if self.production_version_id == Some(id) {
            self.production_version_id = None;
        }
        self.revision += 1;
        Some(removed)
    }

    /// Set one version field, returning the previous value.
    pub fn set_version_field(
        &mut self,
        id: u64,
        field: VersionField,
        value: impl Into<String>,
    ) -> Option<String> {
        let version = self.version_mut(id)?;
        let slot = match field {
            VersionField::Number => &mut version.number,
            VersionField::DeployDate => &mut version.deploy_date,
            VersionField::DeployTime => &mut version.deploy_time,
        };
        let previous = std::mem::replace(slot, value.into());
        self.revision += 1;
        Some(previous)
    }

    /// Mark/unmark the version deployed to production. Toggle semantics:
    /// marking the already-marked version clears the marker, marking
    /// another replaces it. Returns the new marker, or `None` when the id
    /// does not exist (no-op).
    pub fn toggle_production(&mut self, id: u64) -> Option<Option<u64>> {
        self.version(id)?;
        self.production_version_id = if self.production_version_id == Some(id) {
            None
        } else {
            Some(id)
        };
        self.revision += 1;
        Some(self.production_version_id)
    }

    // -----------------------------------------------------------------
    // Categorized comments
    // -----------------------------------------------------------------

    pub fn add_comment(
        &mut self,
        version_id: u64,
        category: CommentCategory,
        text: impl Into<String>,
    ) -> Option<usize> {
        let list = self.version_mut(version_id)?.comments.list_mut(category);
        list.push(text.into());
        let index = list.len() - 1;
        self.revision += 1;
        Some(index)
    }

    pub fn update_comment(
        &mut self,
        version_id: u64,
        category: CommentCategory,
        index: usize,
        text: impl Into<String>,
    ) -> Option<String> {
        let list = self.version_mut(version_id)?.comments.list_mut(category);
        let slot = list.get_mut(index)?;
        let previous = std::mem::replace(slot, text.into());
        self.revision += 1;
        Some(previous)
    }

    pub fn delete_comment(
        &mut self,
        version_id: u64,
        category: CommentCategory,
        index: usize,
    ) -> Option<String> {
        let list = self.version_mut(version_id)?.comments.list_mut(category);
        if index >= list.len() {
            return None;
        }
        let removed = list.remove(index);
        self.revision += 1;
        Some(removed)
    }

    // -----------------------------------------------------------------
    // Work item operations
    // -----------------------------------------------------------------

    /// Create a work item in a version; returns the assigned id. The uuid
    /// is derived from the name at creation and never changes afterwards,
    /// even if the item is renamed.
    pub fn create_cdu(&mut self, version_id: u64, name: impl Into<String>) -> Option<u64> {
        let next_id = self.next_cdu_id + 1;
        let version = self.version_mut(version_id)?;
        version.cdus.push(Cdu::new(next_id, name));
        self.next_cdu_id = next_id;
        self.revision += 1;
        Some(next_id)
    }

    pub fn delete_cdu(&mut self, cdu_id: u64) -> Option<(u64, Cdu)> {
        for version in &mut self.versions {
            if let Some(pos) = version.cdus.iter().position(|c| c.id == cdu_id) {
                let removed = version.cdus.remove(pos);
                self.revision += 1;
                return Some((version.id, removed));
            }
        }
        None
    }

    pub fn set_cdu_name(&mut self, cdu_id: u64, name: impl Into<String>) -> Option<String> {
        let cdu = self.cdu_mut(cdu_id)?;
        let previous = std::mem::replace(&mut cdu.name, name.into());
        self.revision += 1;
        Some(previous)
    }

    pub fn set_cdu_description(
        &mut self,
        cdu_id: u64,
        description: impl Into<String>,
    ) -> Option<String> {
        let cdu = self.cdu_mut(cdu_id)?;
        let previous = std::mem::replace(&mut cdu.description, description.into());
        self.revision += 1;
        Some(previous)
    }

    pub fn set_cdu_status(&mut self, cdu_id: u64, status: Status) -> Option<Status> {
        let cdu = self.cdu_mut(cdu_id)?;
        let previous = std::mem::replace(&mut cdu.status, status);
        self.revision += 1;
        Some(previous)
    }

    pub fn add_party(&mut self, cdu_id: u64, party: Party) -> Option<usize> {
        let cdu = self.cdu_mut(cdu_id)?;
        cdu.parties.push(party);
        let index = cdu.parties.len() - 1;
        self.revision += 1;
        Some(index)
    }

    pub fn update_party(&mut self, cdu_id: u64, index: usize, party: Party) -> Option<Party> {
        let slot = self.cdu_mut(cdu_id)?.parties.get_mut(index)?;
        let previous = std::mem::replace(slot, party);
        self.revision += 1;
        Some(previous)
    }

    pub fn remove_party(&mut self, cdu_id: u64, index: usize) -> Option<Party> {
        let cdu = self.cdu_mut(cdu_id)?;
        if index >= cdu.parties.len() {
            return None;
        }
        let removed = cdu.parties.remove(index);
        self.revision += 1;
        Some(removed)
    }

    pub fn add_observation(&mut self, cdu_id: u64, text: impl Into<String>) -> Option<usize> {
        let cdu = self.cdu_mut(cdu_id)?;
        cdu.observations.push(text.into());
        let index = cdu.observations.len() - 1;
        self.revision += 1;
        Some(index)
    }

    pub fn update_observation(
        &mut self,
        cdu_id: u64,
        index: usize,
        text: impl Into<String>,
    ) -> Option<String> {
        let slot = self.cdu_mut(cdu_id)?.observations.get_mut(index)?;
        let previous = std::mem::replace(slot, text.into());
        self.revision += 1;
        Some(previous)
    }

    pub fn remove_observation(&mut self, cdu_id: u64, index: usize) -> Option<String> {
        let cdu = self.cdu_mut(cdu_id)?;
        if index >= cdu.observations.len() {
            return None;
        }
        let removed = cdu.observations.remove(index);
        self.revision += 1;
        Some(removed)
    }

    pub fn append_history(&mut self, cdu_id: u64, entry: AuditEntry) -> bool {
        match self.cdu_mut(cdu_id) {
            Some(cdu) => {
                cdu.history.push(entry);
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------
    // Bulk operations
    // -----------------------------------------------------------------

    /// Replace the whole content with an already-normalized collection.
    /// Next-id counters are recomputed from the maximum ids present, and
    /// a production marker pointing at a missing version is cleared.
    pub fn replace_all(&mut self, versions: Vec<Version>, production_version_id: Option<u64>) {
        self.versions = versions;
        self.production_version_id = production_version_id
            .filter(|id| self.versions.iter().any(|v| v.id == *id));
        self.recount_ids();
        self.revision += 1;
    }

    /// Restore a snapshot, swapping content atomically.
    ///
    /// The snapshot is validated before any state is touched: on error the
    /// store is exactly as it was, so a failed rollback never leaves a
    /// half-restored state.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), RestoreError> {
        validate_snapshot(snapshot)?;
        self.versions = snapshot.versions.clone();
        self.production_version_id = snapshot.production_version_id;
        self.recount_ids();
        self.revision += 1;
        Ok(())
    }

    fn recount_ids(&mut self) {
        self.next_version_id = self.versions.iter().map(|v| v.id).max().unwrap_or(0);
        self.next_cdu_id = self
            .versions
            .iter()
            .flat_map(|v| v.cdus.iter().map(|c| c.id))
            .max()
            .unwrap_or(0);
    }
}

fn validate_snapshot(snapshot: &Snapshot) -> Result<(), RestoreError> {
    let mut version_ids = HashSet::new();
    let mut cdu_ids = HashSet::new();
    for version in &snapshot.versions {
        if !version_ids.insert(version.id) {
            return Err(RestoreError::DuplicateVersionId(version.id));
        }
        for cdu in &version.cdus {
            if !cdu_ids.insert(cdu.id) {
                return Err(RestoreError::DuplicateCduId(cdu.id));
            }
        }
    }
    if let Some(id) = snapshot.production_version_id {
        if !version_ids.contains(&id) {
            return Err(RestoreError::DanglingProduction(id));
        }
    }
    Ok(())
}
