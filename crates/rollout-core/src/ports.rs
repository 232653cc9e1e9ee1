//! Contracts for the collaborators around the core: persistence, tabular
//! import/export, and the structures handed across those seams.
//!
//! The core never does I/O itself; implementations live with the binary.

use serde::{Deserialize, Serialize};

use crate::changes::{ChangeTracker, PendingChange};
use crate::error::{ExportError, ImportError, StorageError};
use crate::model::Status;
use crate::normalize::RawVersion;
use crate::stats::{self, StatusCounts};
use crate::store::{EntityStore, Snapshot};

/// Everything a session needs to resume: store content plus an open
/// staged batch, if any. Versions are stored in the raw shape and pass
/// through normalization on load, same as any import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub versions: Vec<RawVersion>,
    pub production_version_id: Option<u64>,
    pub pending: Vec<PendingChange>,
    pub snapshot: Option<Snapshot>,
}

impl SessionState {
    /// Capture the current session for persistence.
    pub fn capture(store: &EntityStore, tracker: &ChangeTracker) -> Self {
        Self {
            versions: store.versions().iter().map(RawVersion::from).collect(),
            production_version_id: store.production_version_id(),
            pending: tracker.pending().to_vec(),
            snapshot: tracker.snapshot().cloned(),
        }
    }
}

/// Persistence collaborator. A failed read/write surfaces to the operator
/// and leaves store state untouched.
pub trait StateStore {
    /// `Ok(None)` means "no session saved yet", which is not an error.
    fn load(&self) -> Result<Option<SessionState>, StorageError>;
    fn save(&self, state: &SessionState) -> Result<(), StorageError>;
}

/// What a tabular import produces. Importers must assign a stable uuid
/// per logical item, reusing one uuid when the same item name recurs, so
/// unique-stats counting stays correct across re-imports.
#[derive(Debug, Clone, Default)]
pub struct ImportBundle {
    pub versions: Vec<RawVersion>,
    pub production_version_id: Option<u64>,
}

/// Spreadsheet import collaborator. A parse failure aborts the whole
/// import; partial imports are never committed.
pub trait SheetImporter {
    fn import(&self) -> Result<ImportBundle, ImportError>;
}

/// Spreadsheet export collaborator.
pub trait SheetExporter {
    fn export(&self, book: &ExportBook) -> Result<(), ExportError>;
}

/// One summary line per version.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub version: String,
    pub counts: StatusCounts,
    pub production: bool,
}

/// One detail line per work-item instance.
#[derive(Debug, Clone, Serialize)]
pub struct DetailRow {
    pub version: String,
    pub name: String,
    pub uuid: String,
    pub status: Status,
    pub description: String,
    pub parties: usize,
    pub observations: usize,
}

/// The tabular artifact handed to an exporter: a summary table
/// (per-version counts plus global raw and unique totals) and a detail
/// table (one row per work-item instance).
#[derive(Debug, Clone, Serialize)]
pub struct ExportBook {
    pub summary: Vec<SummaryRow>,
    pub raw_totals: StatusCounts,
    pub unique_totals: StatusCounts,
    pub detail: Vec<DetailRow>,
}

impl ExportBook {
    pub fn build(store: &EntityStore) -> Self {
        let production = store.production_version_id();
        let summary = store
            .versions()
            .iter()
            .map(|version| SummaryRow {
                version: version.number.clone(),
                counts: stats::version_counts(version),
                production: production == Some(version.id),
            })
            .collect();

        let detail = store
            .versions()
            .iter()
            .flat_map(|version| {
                version.cdus.iter().map(|cdu| DetailRow {
                    version: version.number.clone(),
                    name: cdu.name.clone(),
                    uuid: cdu.uuid.as_str().to_string(),
                    status: cdu.status,
                    description: cdu.description.clone(),
                    parties: cdu.parties.len(),
                    observations: cdu.observations.len(),
                })
            })
            .collect();

        Self {
            summary,
            raw_totals: stats::raw_counts(store.versions()),
            unique_totals: stats::unique_counts(store.versions()),
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExportBook, SessionState};
    use crate::changes::ChangeTracker;
    use crate::model::Status;
    use crate::store::{DuplicateIdentity, EntityStore};

    #[test]
    fn export_book_has_one_detail_row_per_instance() {
        let mut store = EntityStore::new();
        let v1 = store.create_version("1.0", "", "");
        store.create_cdu(v1, "PORTA");
        store.duplicate_version(v1, "2.0", DuplicateIdentity::Shared);
        store.toggle_production(v1);

        let book = ExportBook::build(&store);
        assert_eq!(book.summary.len(), 2);
        assert!(book.summary[0].production);
        assert!(!book.summary[1].production);
        assert_eq!(book.detail.len(), 2);
        assert_eq!(book.raw_totals.get(Status::InDevelopment), 2);
        assert_eq!(book.unique_totals.get(Status::InDevelopment), 1);
    }

    #[test]
    fn session_state_roundtrips_through_json() {
        let mut store = EntityStore::new();
        let v1 = store.create_version("1.0", "2024-05-02", "21:30");
        store.create_cdu(v1, "PORTA");
        let tracker = ChangeTracker::new();

        let state = SessionState::capture(&store, &tracker);
        let encoded = serde_json::to_string_pretty(&state).unwrap();
        let decoded: SessionState = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.versions.len(), 1);
        assert_eq!(decoded.versions[0].number, "1.0");
        assert_eq!(decoded.versions[0].cdus[0].name, "PORTA");
        assert!(decoded.pending.is_empty());
        assert!(decoded.snapshot.is_none());
    }
}
