//! Staged-change batches with snapshot rollback.
//!
//! The tracker runs one batch at a time:
//!
//! | state | pending | snapshot |
//! |---|---|---|
//! | Idle | empty | none |
//! | Staging | ≥1 record | held |
//!
//! Idle → Staging happens exactly once per batch, on the first recorded
//! change; further records only append. The batch closes through `commit`
//! (keep the applied data, drain the buffer) or `discard` (restore the
//! snapshot, drain the buffer). Nothing ever clears the buffer partially.
//!
//! Records do not replay: edits are applied to the store as they happen,
//! and discard rolls everything back by restoring the snapshot, which also
//! undoes creations and deletions without reversing individual records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RestoreError;
use crate::store::{EntityStore, Snapshot};

/// What a staged record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    Create,
    Delete,
    FieldEdit,
    ListAdd,
    ListRemove,
}

/// The entity a staged record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeTarget {
    Version(u64),
    Cdu(u64),
}

/// One staged, not-yet-committed edit.
///
/// `before`/`after` are JSON value copies (never references into the
/// store); `item_label`/`version_label` carry the human-readable names for
/// the review display so it works even after the target is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChange {
    pub target: ChangeTarget,
    pub kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub before: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub after: Value,
    pub item_label: String,
    pub version_label: String,
    /// Wall-clock timestamp in microseconds since the Unix epoch.
    pub ts_us: i64,
}

/// Where the tracker is in the batch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Staging,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ChangeTracker {
    pending: Vec<PendingChange>,
    snapshot: Option<Snapshot>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tracker from persisted session state (an open batch
    /// survives across CLI invocations).
    pub const fn from_parts(pending: Vec<PendingChange>, snapshot: Option<Snapshot>) -> Self {
        Self { pending, snapshot }
    }

    pub const fn state(&self) -> BatchState {
        if self.snapshot.is_some() {
            BatchState::Staging
        } else {
            BatchState::Idle
        }
    }

    pub const fn is_staging(&self) -> bool {
        self.snapshot.is_some()
    }

    /// The ordered buffer of staged records.
    pub fn pending(&self) -> &[PendingChange] {
        &self.pending
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Make sure a batch is open, capturing the pre-batch snapshot if the
    /// tracker was idle. Callers that apply an edit to the store before
    /// recording it MUST call this first, while the store still holds the
    /// pre-edit content; calling it again while Staging does nothing.
    pub fn open(&mut self, store: &EntityStore) {
        if self.snapshot.is_none() {
            tracing::debug!("opening staged batch, capturing snapshot");
            self.snapshot = Some(store.snapshot());
        }
    }

    /// Append a record to the current batch, opening one if the tracker
    /// was idle. The store must not yet contain the recorded edit when
    /// this call opens the batch; otherwise apply-then-record is fine.
    pub fn record(&mut self, store: &EntityStore, change: PendingChange) {
        self.open(store);
        self.pending.push(change);
    }

    /// Close the batch keeping the applied data. Returns the full ordered
    /// list of applied records for audit/reporting.
    pub fn commit(&mut self) -> Vec<PendingChange> {
        self.snapshot = None;
        std::mem::take(&mut self.pending)
    }

    /// Close the batch rolling the store back to the pre-batch snapshot.
    /// Returns the records that were thrown away.
    ///
    /// # Errors
    ///
    /// If the snapshot fails validation the store keeps its staged
    /// content, the tracker stays Staging (snapshot and buffer intact),
    /// and the error is reported. A partial rollback cannot happen.
    pub fn discard(&mut self, store: &mut EntityStore) -> Result<Vec<PendingChange>, RestoreError> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Ok(Vec::new());
        };
        store.restore(snapshot)?;
        self.snapshot = None;
        Ok(std::mem::take(&mut self.pending))
    }

    /// Drop the batch and snapshot without touching the store. Used when a
    /// bulk replace supersedes the staging session.
    pub fn reset(&mut self) {
        if self.is_staging() {
            tracing::debug!(
                dropped = self.pending.len(),
                "staged batch superseded by bulk replace"
            );
        }
        self.pending.clear();
        self.snapshot = None;
    }
}
