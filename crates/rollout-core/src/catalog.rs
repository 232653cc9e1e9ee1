//! Orchestrating facade over the store, the change tracker, and the
//! observer list.
//!
//! This is the only mutation surface exposed to the rest of the
//! application; nothing else hands out `&mut` access to store entities.
//! An instance is passed explicitly to every consumer — there is no
//! ambient "current catalog".
//!
//! Every mutating method follows the same shape: check the target exists,
//! open the staged batch (capturing the pre-batch snapshot while the
//! store is still pristine), apply the edit, record it, then run the
//! observer pass. `full_render` is true for changes that alter table
//! shape (version/item creation and deletion, bulk replace, discard) and
//! false for field-level edits, so views can pick between a rebuild and a
//! stats-only refresh.

use serde_json::{json, Value};

use crate::changes::{ChangeKind, ChangeTarget, ChangeTracker, PendingChange};
use crate::error::RestoreError;
use crate::model::{
    AuditEntry, AuditKind, CommentCategory, Party, Status, Version,
};
use crate::normalize::{normalize_versions, RawVersion};
use crate::ports::{ExportBook, SessionState};
use crate::stats::{self, StatusCounts};
use crate::store::{DuplicateIdentity, EntityStore, VersionField};

/// Typed payload delivered to observers after every mutation.
#[derive(Debug, Clone, Copy)]
pub struct ChangeNotice<'a> {
    pub versions: &'a [Version],
    /// True when the table shape changed and a view rebuild is needed;
    /// false for field-level edits where a stats refresh is enough.
    pub full_render: bool,
}

/// A view (or any consumer) that wants to hear about mutations.
pub trait Observer {
    fn notify(&mut self, notice: ChangeNotice<'_>);
}

/// Handle returned by [`Catalog::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

pub struct Catalog {
    store: EntityStore,
    tracker: ChangeTracker,
    observers: Vec<(ObserverId, Box<dyn Observer>)>,
    next_observer_id: u64,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            store: EntityStore::new(),
            tracker: ChangeTracker::new(),
            observers: Vec::new(),
            next_observer_id: 0,
        }
    }

    /// Resume a persisted session: versions pass through the same
    /// normalization path as a bulk import, an open staged batch is
    /// restored as-is.
    pub fn from_session(state: SessionState) -> Self {
        let mut store = EntityStore::new();
        store.replace_all(normalize_versions(state.versions), state.production_version_id);
        Self {
            store,
            tracker: ChangeTracker::from_parts(state.pending, state.snapshot),
            observers: Vec::new(),
            next_observer_id: 0,
        }
    }

    /// Capture the session for persistence.
    pub fn session(&self) -> SessionState {
        SessionState::capture(&self.store, &self.tracker)
    }

    // -----------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------

    pub fn versions(&self) -> &[Version] {
        self.store.versions()
    }

    pub fn version(&self, id: u64) -> Option<&Version> {
        self.store.version(id)
    }

    pub const fn production_version_id(&self) -> Option<u64> {
        self.store.production_version_id()
    }

    pub const fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn pending(&self) -> &[PendingChange] {
        self.tracker.pending()
    }

    pub const fn is_staging(&self) -> bool {
        self.tracker.is_staging()
    }

    pub fn stats_raw(&self) -> StatusCounts {
        stats::raw_counts(self.store.versions())
    }

    pub fn stats_unique(&self) -> StatusCounts {
        stats::unique_counts(self.store.versions())
    }

    pub fn export_book(&self) -> ExportBook {
        ExportBook::build(&self.store)
    }

    // -----------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------

    pub fn subscribe(&mut self, observer: Box<dyn Observer>) -> ObserverId {
        self.next_observer_id += 1;
        let id = ObserverId(self.next_observer_id);
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    fn notify(&mut self, full_render: bool) {
        let versions = self.store.versions();
        for (_, observer) in &mut self.observers {
            observer.notify(ChangeNotice {
                versions,
                full_render,
            });
        }
    }

    // -----------------------------------------------------------------
    // Version mutations
    // -----------------------------------------------------------------

    pub fn create_version(
        &mut self,
        number: &str,
        deploy_date: &str,
        deploy_time: &str,
        now_us: i64,
    ) -> u64 {
        self.tracker.open(&self.store);
        let id = self.store.create_version(number, deploy_date, deploy_time);
        self.tracker.record(
            &self.store,
            PendingChange {
                target: ChangeTarget::Version(id),
                kind: ChangeKind::Create,
                field: None,
                index: None,
                before: Value::Null,
                after: json!({ "number": number, "date": deploy_date, "time": deploy_time }),
                item_label: String::new(),
                version_label: number.to_string(),
                ts_us: now_us,
            },
        );
        tracing::info!(version = number, id, "version created");
        self.notify(true);
        id
    }

    pub fn duplicate_version(
        &mut self,
        source_id: u64,
        number: &str,
        identity: DuplicateIdentity,
        now_us: i64,
    ) -> Option<u64> {
        let source_number = self.store.version(source_id)?.number.clone();
        self.tracker.open(&self.store);
        let id = self.store.duplicate_version(source_id, number, identity)?;
        self.tracker.record(
            &self.store,
            PendingChange {
                target: ChangeTarget::Version(id),
                kind: ChangeKind::Create,
                field: None,
                index: None,
                before: json!({ "duplicated-from": source_number }),
                after: json!({ "number": number }),
                item_label: String::new(),
                version_label: number.to_string(),
                ts_us: now_us,
            },
        );
        self.notify(true);
        Some(id)
    }

    pub fn delete_version(&mut self, id: u64, now_us: i64) -> bool {
        if self.store.version(id).is_none() {
            return false;
        }
        self.tracker.open(&self.store);
        let Some(removed) = self.store.delete_version(id) else {
            return false;
        };
        self.tracker.record(
            &self.store,
            PendingChange {
                target: ChangeTarget::Version(id),
                kind: ChangeKind::Delete,
                field: None,
                index: None,
                before: serde_json::to_value(&removed).unwrap_or(Value::Null),
                after: Value::Null,
                item_label: String::new(),
                version_label: removed.number.clone(),
                ts_us: now_us,
            },
        );
        tracing::info!(version = removed.number, "version deleted");
        self.notify(true);
        true
    }

    pub fn set_version_field(
        &mut self,
        id: u64,
        field: VersionField,
        value: &str,
        now_us: i64,
    ) -> bool {
        if self.store.version(id).is_none() {
            return false;
        }
        self.tracker.open(&self.store);
        let Some(previous) = self.store.set_version_field(id, field, value) else {
            return false;
        };
        let number = self
            .store
            .version(id)
            .map(|v| v.number.clone())
            .unwrap_or_default();
        self.tracker.record(
            &self.store,
            PendingChange {
                target: ChangeTarget::Version(id),
                kind: ChangeKind::FieldEdit,
                field: Some(field.name().to_string()),
                index: None,
                before: json!(previous),
                after: json!(value),
                item_label: String::new(),
                version_label: number,
                ts_us: now_us,
            },
        );
        self.notify(false);
        true
    }

    /// Toggle the production marker (idempotent toggle semantics, §store).
    /// Returns the new marker, `None` when the id is unknown.
    pub fn toggle_production(&mut self, id: u64, now_us: i64) -> Option<Option<u64>> {
        let number = self.store.version(id)?.number.clone();
        let previous = self.store.production_version_id();
        self.tracker.open(&self.store);
        let current = self.store.toggle_production(id)?;
        self.tracker.record(
            &self.store,
            PendingChange {
                target: ChangeTarget::Version(id),
                kind: ChangeKind::FieldEdit,
                field: Some("production".to_string()),
                index: None,
                before: json!(previous),
                after: json!(current),
                item_label: String::new(),
                version_label: number,
                ts_us: now_us,
            },
        );
        self.notify(false);
        Some(current)
    }

    // -----------------------------------------------------------------
    // Categorized comments
    // -----------------------------------------------------------------

    pub fn add_comment(
        &mut self,
        version_id: u64,
        category: CommentCategory,
        text: &str,
        now_us: i64,
    ) -> Option<usize> {
        let number = self.store.version(version_id)?.number.clone();
        self.tracker.open(&self.store);
        let index = self.store.add_comment(version_id, category, text)?;
        self.tracker.record(
            &self.store,
            PendingChange {
                target: ChangeTarget::Version(version_id),
                kind: ChangeKind::ListAdd,
                field: Some(format!("comment.{category}")),
                index: Some(index),
                before: Value::Null,
                after: json!(text),
                item_label: String::new(),
                version_label: number,
                ts_us: now_us,
            },
        );
        self.notify(false);
        Some(index)
    }

    pub fn update_comment(
        &mut self,
        version_id: u64,
        category: CommentCategory,
        index: usize,
        text: &str,
        now_us: i64,
    ) -> bool {
        let Some(version) = self.store.version(version_id) else {
            return false;
        };
        if version.comments.list(category).get(index).is_none() {
            return false;
        }
        let number = version.number.clone();
        self.tracker.open(&self.store);
        let Some(previous) = self.store.update_comment(version_id, category, index, text) else {
            return false;
        };
        self.tracker.record(
            &self.store,
            PendingChange {
                target: ChangeTarget::Version(version_id),
                kind: ChangeKind::FieldEdit,
                field: Some(format!("comment.{category}")),
                index: Some(index),
                before: json!(previous),
                after: json!(text),
                item_label: String::new(),
                version_label: number,
                ts_us: now_us,
            },
        );
        self.notify(false);
        true
    }

    pub fn delete_comment(
        &mut self,
        version_id: u64,
        category: CommentCategory,
        index: usize,
        now_us: i64,
    ) -> bool {
        let Some(version) = self.store.version(version_id) else {
            return false;
        };
        if version.comments.list(category).get(index).is_none() {
            return false;
        }
        let number = version.number.clone();
        self.tracker.open(&self.store);
        let Some(removed) = self.store.delete_comment(version_id, category, index) else {
            return false;
        };
        self.tracker.record(
            &self.store,
            PendingChange {
                target: ChangeTarget::Version(version_id),
                kind: ChangeKind::ListRemove,
                field: Some(format!("comment.{category}")),
                index: Some(index),
                before: json!(removed),
                after: Value::Null,
                item_label: String::new(),
                version_label: number,
                ts_us: now_us,
            },
        );
        self.notify(false);
        true
    }

    // -----------------------------------------------------------------
    // Work item mutations
    // -----------------------------------------------------------------

    pub fn create_cdu(&mut self, version_id: u64, name: &str, now_us: i64) -> Option<u64> {
        let number = self.store.version(version_id)?.number.clone();
        self.tracker.open(&self.store);
        let id = self.store.create_cdu(version_id, name)?;
        self.store.append_history(
            id,
            AuditEntry {
                ts_us: now_us,
                kind: AuditKind::Created,
                field: None,
                before: None,
                after: Some(name.to_string()),
            },
        );
        self.tracker.record(
            &self.store,
            PendingChange {
                target: ChangeTarget::Cdu(id),
                kind: ChangeKind::Create,
                field: None,
                index: None,
                before: Value::Null,
                after: json!(name),
                item_label: name.to_string(),
                version_label: number,
                ts_us: now_us,
            },
        );
        self.notify(true);
        Some(id)
    }

    pub fn delete_cdu(&mut self, cdu_id: u64, now_us: i64) -> bool {
        if self.store.locate_cdu(cdu_id).is_none() {
            return false;
        }
        self.tracker.open(&self.store);
        let Some((version_id, removed)) = self.store.delete_cdu(cdu_id) else {
            return false;
        };
        let number = self
            .store
            .version(version_id)
            .map(|v| v.number.clone())
            .unwrap_or_default();
        self.tracker.record(
            &self.store,
            PendingChange {
                target: ChangeTarget::Cdu(cdu_id),
                kind: ChangeKind::Delete,
                field: None,
                index: None,
                before: serde_json::to_value(&removed).unwrap_or(Value::Null),
                after: Value::Null,
                item_label: removed.name.clone(),
                version_label: number,
                ts_us: now_us,
            },
        );
        self.notify(true);
        true
    }

    pub fn set_cdu_name(&mut self, cdu_id: u64, name: &str, now_us: i64) -> bool {
        self.edit_cdu_field(cdu_id, "name", now_us, |store| {
            store.set_cdu_name(cdu_id, name).map(|prev| (prev, name.to_string()))
        })
    }

    pub fn set_cdu_description(&mut self, cdu_id: u64, description: &str, now_us: i64) -> bool {
        self.edit_cdu_field(cdu_id, "description", now_us, |store| {
            store
                .set_cdu_description(cdu_id, description)
                .map(|prev| (prev, description.to_string()))
        })
    }

    pub fn set_cdu_status(&mut self, cdu_id: u64, status: Status, now_us: i64) -> bool {
        self.edit_cdu_field(cdu_id, "status", now_us, |store| {
            store
                .set_cdu_status(cdu_id, status)
                .map(|prev| (prev.to_string(), status.to_string()))
        })
    }

    /// Shared apply/record/audit path for single-field item edits.
    fn edit_cdu_field(
        &mut self,
        cdu_id: u64,
        field: &str,
        now_us: i64,
        apply: impl FnOnce(&mut EntityStore) -> Option<(String, String)>,
    ) -> bool {
        let Some((version, cdu)) = self.store.locate_cdu(cdu_id) else {
            return false;
        };
        let item_label = cdu.name.clone();
        let version_label = version.number.clone();

        self.tracker.open(&self.store);
        let Some((before, after)) = apply(&mut self.store) else {
            return false;
        };
        self.store.append_history(
            cdu_id,
            AuditEntry {
                ts_us: now_us,
                kind: AuditKind::FieldEdit,
                field: Some(field.to_string()),
                before: Some(before.clone()),
                after: Some(after.clone()),
            },
        );
        self.tracker.record(
            &self.store,
            PendingChange {
                target: ChangeTarget::Cdu(cdu_id),
                kind: ChangeKind::FieldEdit,
                field: Some(field.to_string()),
                index: None,
                before: json!(before),
                after: json!(after),
                item_label,
                version_label,
                ts_us: now_us,
            },
        );
        self.notify(false);
        true
    }

    pub fn add_party(&mut self, cdu_id: u64, party: Party, now_us: i64) -> Option<usize> {
        let (version, cdu) = self.store.locate_cdu(cdu_id)?;
        let labels = (cdu.name.clone(), version.number.clone());
        let display = format!("{} ({})", party.name, party.role);

        self.tracker.open(&self.store);
        let index = self.store.add_party(cdu_id, party.clone())?;
        self.list_edit(
            cdu_id,
            "parties",
            index,
            ChangeKind::ListAdd,
            Value::Null,
            serde_json::to_value(&party).unwrap_or(Value::Null),
            None,
            Some(display),
            labels,
            now_us,
        );
        Some(index)
    }

    pub fn remove_party(&mut self, cdu_id: u64, index: usize, now_us: i64) -> bool {
        let Some((version, cdu)) = self.store.locate_cdu(cdu_id) else {
            return false;
        };
        if cdu.parties.get(index).is_none() {
            return false;
        }
        let labels = (cdu.name.clone(), version.number.clone());

        self.tracker.open(&self.store);
        let Some(removed) = self.store.remove_party(cdu_id, index) else {
            return false;
        };
        let display = format!("{} ({})", removed.name, removed.role);
        self.list_edit(
            cdu_id,
            "parties",
            index,
            ChangeKind::ListRemove,
            serde_json::to_value(&removed).unwrap_or(Value::Null),
            Value::Null,
            Some(display),
            None,
            labels,
            now_us,
        );
        true
    }

    pub fn add_observation(&mut self, cdu_id: u64, text: &str, now_us: i64) -> Option<usize> {
        let (version, cdu) = self.store.locate_cdu(cdu_id)?;
        let labels = (cdu.name.clone(), version.number.clone());

        self.tracker.open(&self.store);
        let index = self.store.add_observation(cdu_id, text)?;
        self.list_edit(
            cdu_id,
            "observations",
            index,
            ChangeKind::ListAdd,
            Value::Null,
            json!(text),
            None,
            Some(text.to_string()),
            labels,
            now_us,
        );
        Some(index)
    }

    pub fn remove_observation(&mut self, cdu_id: u64, index: usize, now_us: i64) -> bool {
        let Some((version, cdu)) = self.store.locate_cdu(cdu_id) else {
            return false;
        };
        if cdu.observations.get(index).is_none() {
            return false;
        }
        let labels = (cdu.name.clone(), version.number.clone());

        self.tracker.open(&self.store);
        let Some(removed) = self.store.remove_observation(cdu_id, index) else {
            return false;
        };
        self.list_edit(
            cdu_id,
            "observations",
            index,
            ChangeKind::ListRemove,
            json!(removed.clone()),
            Value::Null,
            Some(removed),
            None,
            labels,
            now_us,
        );
        true
    }

    /// Shared record/audit/notify tail for list-item edits; the store
    /// mutation already happened.
    #[allow(clippy::too_many_arguments)]
    fn list_edit(
        &mut self,
        cdu_id: u64,
        field: &str,
        index: usize,
        kind: ChangeKind,
        before: Value,
        after: Value,
        audit_before: Option<String>,
        audit_after: Option<String>,
        (item_label, version_label): (String, String),
        now_us: i64,
    ) {
        let audit_kind = if kind == ChangeKind::ListRemove {
            AuditKind::ListRemove
        } else {
            AuditKind::ListAdd
        };
        self.store.append_history(
            cdu_id,
            AuditEntry {
                ts_us: now_us,
                kind: audit_kind,
                field: Some(field.to_string()),
                before: audit_before,
                after: audit_after,
            },
        );
        self.tracker.record(
            &self.store,
            PendingChange {
                target: ChangeTarget::Cdu(cdu_id),
                kind,
                field: Some(field.to_string()),
                index: Some(index),
                before,
                after,
                item_label,
                version_label,
                ts_us: now_us,
            },
        );
        self.notify(false);
    }

    // -----------------------------------------------------------------
    // Batch lifecycle
    // -----------------------------------------------------------------

    /// Commit the staged batch: applied data stays, the buffer drains.
    /// Returns the full ordered list of applied records.
    pub fn commit_changes(&mut self) -> Vec<PendingChange> {
        let applied = self.tracker.commit();
        if !applied.is_empty() {
            tracing::info!(changes = applied.len(), "staged batch committed");
            self.notify(false);
        }
        applied
    }

    /// Discard the staged batch, rolling the store back to the pre-batch
    /// snapshot.
    ///
    /// # Errors
    ///
    /// On a validation failure the store keeps its staged content and the
    /// batch stays open; see [`ChangeTracker::discard`].
    pub fn discard_changes(&mut self) -> Result<Vec<PendingChange>, RestoreError> {
        let dropped = self.tracker.discard(&mut self.store)?;
        if !dropped.is_empty() {
            tracing::info!(changes = dropped.len(), "staged batch discarded");
            self.notify(true);
        }
        Ok(dropped)
    }

    // -----------------------------------------------------------------
    // Bulk replace
    // -----------------------------------------------------------------

    /// Replace the whole collection from an import or a restored session.
    /// Incoming records are normalized to the current schema, id counters
    /// recomputed, and the production marker revalidated. An open staged
    /// batch is superseded and dropped.
    pub fn replace_all(&mut self, raw: Vec<RawVersion>, production_version_id: Option<u64>) {
        let versions = normalize_versions(raw);
        self.tracker.reset();
        self.store.replace_all(versions, production_version_id);
        tracing::info!(versions = self.store.versions().len(), "collection replaced");
        self.notify(true);
    }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, ChangeNotice, Observer};
    use crate::model::{CommentCategory, Party, Role, Status};
    use crate::normalize::RawVersion;
    use crate::store::DuplicateIdentity;
    use std::cell::RefCell;
    use std::rc::Rc;

    const NOW: i64 = 1_700_000_000_000_000;

    /// Records the `full_render` flag of every notification.
    struct FlagLog(Rc<RefCell<Vec<bool>>>);

    impl Observer for FlagLog {
        fn notify(&mut self, notice: ChangeNotice<'_>) {
            self.0.borrow_mut().push(notice.full_render);
        }
    }

    fn catalog_with_item() -> (Catalog, u64, u64) {
        let mut catalog = Catalog::new();
        let vid = catalog.create_version("1.0", "2024-05-02", "21:30", NOW);
        let cdu = catalog.create_cdu(vid, "PORTA", NOW).unwrap();
        catalog.commit_changes();
        (catalog, vid, cdu)
    }

    #[test]
    fn structural_and_field_edits_set_the_render_flag() {
        let flags = Rc::new(RefCell::new(Vec::new()));
        let mut catalog = Catalog::new();
        catalog.subscribe(Box::new(FlagLog(Rc::clone(&flags))));

        let vid = catalog.create_version("1.0", "", "", NOW);
        let cdu = catalog.create_cdu(vid, "PORTA", NOW).unwrap();
        catalog.set_cdu_status(cdu, Status::CertifiedOk, NOW);
        catalog.toggle_production(vid, NOW);
        catalog.delete_cdu(cdu, NOW);

        assert_eq!(*flags.borrow(), vec![true, true, false, false, true]);
    }

    #[test]
    fn unsubscribed_observers_stop_hearing() {
        let flags = Rc::new(RefCell::new(Vec::new()));
        let mut catalog = Catalog::new();
        let id = catalog.subscribe(Box::new(FlagLog(Rc::clone(&flags))));

        catalog.create_version("1.0", "", "", NOW);
        assert!(catalog.unsubscribe(id));
        assert!(!catalog.unsubscribe(id));
        catalog.create_version("2.0", "", "", NOW);

        assert_eq!(flags.borrow().len(), 1);
    }

    #[test]
    fn every_edit_is_staged_exactly_once() {
        let (mut catalog, vid, cdu) = catalog_with_item();
        assert!(!catalog.is_staging());

        catalog.set_cdu_name(cdu, "PORTAL", NOW);
        catalog.set_cdu_description(cdu, "entry portal", NOW);
        catalog.add_party(cdu, Party { name: "ana".into(), role: Role::Qa }, NOW);
        catalog.add_observation(cdu, "needs retest", NOW);
        catalog.add_comment(vid, CommentCategory::Releases, "rollout wave 2", NOW);

        assert!(catalog.is_staging());
        assert_eq!(catalog.pending().len(), 5);

        let applied = catalog.commit_changes();
        assert_eq!(applied.len(), 5);
        assert!(catalog.pending().is_empty());
        assert!(!catalog.is_staging());
    }

    #[test]
    fn field_edits_append_audit_history() {
        let (mut catalog, _vid, cdu) = catalog_with_item();
        catalog.set_cdu_status(cdu, Status::PendingCertification, NOW);

        let (_, item) = catalog.store().locate_cdu(cdu).unwrap();
        let last = item.history.last().unwrap();
        assert_eq!(last.field.as_deref(), Some("status"));
        assert_eq!(last.before.as_deref(), Some("in-development"));
        assert_eq!(last.after.as_deref(), Some("pending-certification"));
    }

    #[test]
    fn pending_records_carry_review_labels() {
        let (mut catalog, _vid, cdu) = catalog_with_item();
        catalog.set_cdu_status(cdu, Status::CertifiedOk, NOW);

        let record = &catalog.pending()[0];
        assert_eq!(record.item_label, "PORTA");
        assert_eq!(record.version_label, "1.0");
        assert_eq!(record.ts_us, NOW);
    }

    #[test]
    fn edits_on_missing_targets_stage_nothing() {
        let (mut catalog, _, _) = catalog_with_item();
        assert!(!catalog.set_cdu_name(999, "X", NOW));
        assert!(!catalog.delete_version(999, NOW));
        assert!(catalog.add_observation(999, "x", NOW).is_none());
        assert!(!catalog.is_staging());
        assert!(catalog.pending().is_empty());
    }

    #[test]
    fn out_of_range_list_edits_do_not_open_a_batch() {
        let (mut catalog, vid, cdu) = catalog_with_item();
        assert!(!catalog.remove_observation(cdu, 0, NOW));
        assert!(!catalog.remove_party(cdu, 2, NOW));
        assert!(!catalog.update_comment(vid, CommentCategory::General, 0, "x", NOW));
        assert!(!catalog.delete_comment(vid, CommentCategory::General, 0, NOW));
        assert!(!catalog.is_staging());
        assert!(catalog.pending().is_empty());
    }

    #[test]
    fn duplicate_version_stages_a_create_record() {
        let (mut catalog, vid, _) = catalog_with_item();
        let copy = catalog
            .duplicate_version(vid, "2.0", DuplicateIdentity::Shared, NOW)
            .unwrap();
        assert!(catalog.version(copy).is_some());
        assert_eq!(catalog.pending().len(), 1);
        assert_eq!(catalog.stats_raw().total(), 2);
        assert_eq!(catalog.stats_unique().total(), 1);
    }

    #[test]
    fn replace_all_supersedes_an_open_batch() {
        let (mut catalog, _vid, cdu) = catalog_with_item();
        catalog.set_cdu_name(cdu, "PORTAL", NOW);
        assert!(catalog.is_staging());

        let raw: RawVersion = serde_json::from_value(serde_json::json!({
            "id": 9,
            "number": "9.0",
            "cdus": [{ "name": "SEARCH" }]
        }))
        .unwrap();
        catalog.replace_all(vec![raw], Some(9));

        assert!(!catalog.is_staging());
        assert!(catalog.pending().is_empty());
        assert_eq!(catalog.production_version_id(), Some(9));
        assert_eq!(catalog.versions().len(), 1);
        assert_eq!(catalog.versions()[0].cdus[0].name, "SEARCH");
    }

    #[test]
    fn replace_all_clears_a_dangling_production_marker() {
        let mut catalog = Catalog::new();
        let raw: RawVersion = serde_json::from_value(serde_json::json!({
            "id": 1, "number": "1.0"
        }))
        .unwrap();
        catalog.replace_all(vec![raw], Some(42));
        assert_eq!(catalog.production_version_id(), None);
    }
}
