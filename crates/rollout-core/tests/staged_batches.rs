//! Batch semantics end to end: every sequence of staged edits followed by
//! `discard` leaves the store deep-equal to the pre-batch content, and
//! `commit` keeps exactly the applied edits while draining the buffer.

use proptest::prelude::*;
use rollout_core::model::Status;
use rollout_core::normalize::RawVersion;
use rollout_core::ports::SessionState;
use rollout_core::{Catalog, DuplicateIdentity, RestoreError, Snapshot};

const NOW: i64 = 1_700_000_000_000_000;

/// Two committed versions with a few items, batch closed.
fn seeded() -> Catalog {
    let mut catalog = Catalog::new();
    let v1 = catalog.create_version("1.0", "2024-05-02", "21:30", NOW);
    let v2 = catalog.create_version("1.1", "2024-06-14", "22:00", NOW);
    catalog.create_cdu(v1, "PORTA", NOW);
    catalog.create_cdu(v1, "LOGIN", NOW);
    catalog.create_cdu(v2, "SEARCH", NOW);
    catalog.toggle_production(v1, NOW);
    catalog.commit_changes();
    catalog
}

#[test]
fn discard_restores_creations_and_deletions() {
    let mut catalog = seeded();
    let before = catalog.store().snapshot();

    // A messy batch: a new version with an item, a deletion of an old
    // version, edits to a surviving item.
    let v3 = catalog.create_version("2.0", "", "", NOW);
    catalog.create_cdu(v3, "EXPORT", NOW);
    let v1 = catalog.versions()[0].id;
    let porta = catalog.versions()[0].cdus[0].id;
    catalog.set_cdu_status(porta, Status::InProduction, NOW);
    catalog.delete_version(v1, NOW);
    assert_eq!(catalog.pending().len(), 4);

    let dropped = catalog.discard_changes().expect("valid snapshot restores");
    assert_eq!(dropped.len(), 4);
    assert!(catalog.pending().is_empty());
    assert!(!catalog.is_staging());
    assert_eq!(catalog.store().snapshot(), before);
}

#[test]
fn status_edit_then_discard_reads_the_old_status() {
    let mut catalog = seeded();
    let cdu = catalog.versions()[0].cdus[0].id;
    assert_eq!(catalog.versions()[0].cdus[0].status, Status::InDevelopment);

    catalog.set_cdu_status(cdu, Status::CertifiedOk, NOW);
    assert_eq!(catalog.versions()[0].cdus[0].status, Status::CertifiedOk);

    catalog.discard_changes().expect("valid snapshot restores");
    assert_eq!(catalog.versions()[0].cdus[0].status, Status::InDevelopment);
    assert!(catalog.pending().is_empty());
}

#[test]
fn commit_keeps_applied_edits_and_drains_the_buffer() {
    let mut catalog = seeded();
    let cdu = catalog.versions()[0].cdus[0].id;

    catalog.set_cdu_name(cdu, "PORTAL", NOW);
    catalog.set_cdu_status(cdu, Status::PendingCertification, NOW);
    let staged_content = catalog.store().snapshot();

    let applied = catalog.commit_changes();
    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0].field.as_deref(), Some("name"));
    assert_eq!(applied[1].field.as_deref(), Some("status"));
    // Commit never touches the data, only the buffer.
    assert_eq!(catalog.store().snapshot(), staged_content);
    assert!(catalog.pending().is_empty());
    assert!(!catalog.is_staging());
}

#[test]
fn failed_restore_keeps_the_staging_state() {
    // A session whose snapshot is corrupt (duplicate version ids), as if
    // the session file had been hand-edited.
    let raw: Vec<RawVersion> = serde_json::from_value(serde_json::json!([
        { "id": 1, "number": "1.0", "cdus": [{ "name": "PORTA" }] }
    ]))
    .expect("raw versions parse");
    let corrupt: Snapshot = serde_json::from_value(serde_json::json!({
        "versions": [
            { "id": 3, "number": "3.0", "cdus": [] },
            { "id": 3, "number": "3.0-bis", "cdus": [] }
        ],
        "production_version_id": null
    }))
    .expect("snapshot parses");

    let mut catalog = Catalog::from_session(SessionState {
        versions: raw,
        production_version_id: None,
        pending: Vec::new(),
        snapshot: Some(corrupt),
    });
    let cdu = catalog.versions()[0].cdus[0].id;
    catalog.set_cdu_status(cdu, Status::CertifiedOk, NOW);
    let staged_content = catalog.store().snapshot();
    let staged_pending = catalog.pending().len();

    let err = catalog.discard_changes().expect_err("corrupt snapshot");
    assert_eq!(err, RestoreError::DuplicateVersionId(3));

    // No partial rollback: the staged content survives and the batch is
    // still open, buffer intact.
    assert!(catalog.is_staging());
    assert_eq!(catalog.store().snapshot(), staged_content);
    assert_eq!(catalog.pending().len(), staged_pending);
}

// ---------------------------------------------------------------------------
// Property: discard always restores the pre-batch snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    CreateVersion(String),
    DuplicateVersion(u64),
    DeleteVersion(u64),
    CreateCdu(u64, String),
    DeleteCdu(u64),
    SetStatus(u64, Status),
    SetName(u64, String),
    AddObservation(u64, String),
    RemoveObservation(u64, usize),
    ToggleProduction(u64),
}

fn apply(catalog: &mut Catalog, op: &Op) {
    match op {
        Op::CreateVersion(number) => {
            catalog.create_version(number, "", "", NOW);
        }
        Op::DuplicateVersion(id) => {
            catalog.duplicate_version(*id, "copy", DuplicateIdentity::Shared, NOW);
        }
        Op::DeleteVersion(id) => {
            catalog.delete_version(*id, NOW);
        }
        Op::CreateCdu(version_id, name) => {
            catalog.create_cdu(*version_id, name, NOW);
        }
        Op::DeleteCdu(id) => {
            catalog.delete_cdu(*id, NOW);
        }
        Op::SetStatus(id, status) => {
            catalog.set_cdu_status(*id, *status, NOW);
        }
        Op::SetName(id, name) => {
            catalog.set_cdu_name(*id, name, NOW);
        }
        Op::AddObservation(id, text) => {
            catalog.add_observation(*id, text, NOW);
        }
        Op::RemoveObservation(id, index) => {
            catalog.remove_observation(*id, *index, NOW);
        }
        Op::ToggleProduction(id) => {
            catalog.toggle_production(*id, NOW);
        }
    }
}

fn status_strategy() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::InDevelopment),
        Just(Status::PendingCertification),
        Just(Status::CertifiedOk),
        Just(Status::InProduction),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // Ids stay small on purpose so sequences mix hits and misses.
    let id = 1..12u64;
    let name = "[A-Z]{3,6}";
    prop_oneof![
        name.prop_map(Op::CreateVersion),
        id.clone().prop_map(Op::DuplicateVersion),
        id.clone().prop_map(Op::DeleteVersion),
        (id.clone(), name).prop_map(|(v, n)| Op::CreateCdu(v, n)),
        id.clone().prop_map(Op::DeleteCdu),
        (id.clone(), status_strategy()).prop_map(|(c, s)| Op::SetStatus(c, s)),
        (id.clone(), "[a-z]{3,8}").prop_map(|(c, n)| Op::SetName(c, n)),
        (id.clone(), "[a-z ]{0,12}").prop_map(|(c, t)| Op::AddObservation(c, t)),
        (id.clone(), 0..4usize).prop_map(|(c, i)| Op::RemoveObservation(c, i)),
        id.prop_map(Op::ToggleProduction),
    ]
}

proptest! {
    #[test]
    fn discard_always_restores_the_pre_batch_content(
        ops in proptest::collection::vec(op_strategy(), 1..24)
    ) {
        let mut catalog = seeded();
        let before = catalog.store().snapshot();

        for op in &ops {
            apply(&mut catalog, op);
        }

        catalog.discard_changes().expect("live snapshots always restore");
        prop_assert_eq!(catalog.store().snapshot(), before);
        prop_assert!(catalog.pending().is_empty());
        prop_assert!(!catalog.is_staging());
    }

    #[test]
    fn commit_drains_the_buffer_and_preserves_staged_content(
        ops in proptest::collection::vec(op_strategy(), 1..24)
    ) {
        let mut catalog = seeded();
        for op in &ops {
            apply(&mut catalog, op);
        }
        let staged_content = catalog.store().snapshot();
        let staged_count = catalog.pending().len();

        let applied = catalog.commit_changes();
        prop_assert_eq!(applied.len(), staged_count);
        prop_assert_eq!(catalog.store().snapshot(), staged_content);
        prop_assert!(catalog.pending().is_empty());
    }
}
