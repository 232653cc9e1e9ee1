//! Aggregate per-status counts over the store content.
//!
//! Two counting modes with deliberately different semantics:
//!
//! - **raw** counts every work-item instance in every version, so an item
//!   duplicated into two versions counts twice;
//! - **unique** counts distinct uuids, keeping the status of the instance
//!   met last in version insertion order.
//!
//! The two diverge exactly when a uuid recurs across versions (after
//! duplication or an import reconciliation), and unique never exceeds raw.

use serde::Serialize;
use std::collections::HashMap;

use crate::model::{Status, Version};

/// One counter per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub in_development: usize,
    pub pending_certification: usize,
    pub certified_ok: usize,
    pub in_production: usize,
}

impl StatusCounts {
    pub const fn get(&self, status: Status) -> usize {
        match status {
            Status::InDevelopment => self.in_development,
            Status::PendingCertification => self.pending_certification,
            Status::CertifiedOk => self.certified_ok,
            Status::InProduction => self.in_production,
        }
    }

    fn bump(&mut self, status: Status) {
        match status {
            Status::InDevelopment => self.in_development += 1,
            Status::PendingCertification => self.pending_certification += 1,
            Status::CertifiedOk => self.certified_ok += 1,
            Status::InProduction => self.in_production += 1,
        }
    }

    pub const fn total(&self) -> usize {
        self.in_development + self.pending_certification + self.certified_ok + self.in_production
    }

    /// (status, count) pairs in lifecycle order, for display.
    pub fn entries(&self) -> [(Status, usize); 4] {
        let mut out = [(Status::InDevelopment, 0); 4];
        for (slot, status) in out.iter_mut().zip(Status::ALL) {
            *slot = (status, self.get(status));
        }
        out
    }
}

/// Count every work-item instance across every version.
pub fn raw_counts(versions: &[Version]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for version in versions {
        for cdu in &version.cdus {
            counts.bump(cdu.status);
        }
    }
    counts
}

/// Count distinct uuids; when a uuid recurs, the instance encountered
/// last (versions in insertion order, items in list order) decides the
/// counted status.
pub fn unique_counts(versions: &[Version]) -> StatusCounts {
    let mut last_status: HashMap<&str, Status> = HashMap::new();
    for version in versions {
        for cdu in &version.cdus {
            last_status.insert(cdu.uuid.as_str(), cdu.status);
        }
    }

    let mut counts = StatusCounts::default();
    for status in last_status.into_values() {
        counts.bump(status);
    }
    counts
}

/// Per-version instance counts, for the export summary sheet.
pub fn version_counts(version: &Version) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for cdu in &version.cdus {
        counts.bump(cdu.status);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::{raw_counts, unique_counts, version_counts};
    use crate::model::Status;
    use crate::store::{DuplicateIdentity, EntityStore};

    #[test]
    fn empty_store_counts_zero() {
        let store = EntityStore::new();
        assert_eq!(raw_counts(store.versions()).total(), 0);
        assert_eq!(unique_counts(store.versions()).total(), 0);
    }

    #[test]
    fn duplication_diverges_raw_from_unique() {
        let mut store = EntityStore::new();
        let vid = store.create_version("1", "", "");
        store.create_cdu(vid, "PORTA");
        store.duplicate_version(vid, "2", DuplicateIdentity::Shared);

        let raw = raw_counts(store.versions());
        let unique = unique_counts(store.versions());

        // One logical item, two instances.
        assert_eq!(raw.get(Status::InDevelopment), 2);
        assert_eq!(unique.get(Status::InDevelopment), 1);
    }

    #[test]
    fn last_version_in_insertion_order_wins_for_unique() {
        let mut store = EntityStore::new();
        let v1 = store.create_version("1", "", "");
        store.create_cdu(v1, "PORTA");
        let v2 = store.duplicate_version(v1, "2", DuplicateIdentity::Shared).unwrap();
        let copy_id = store.version(v2).unwrap().cdus[0].id;
        store.set_cdu_status(copy_id, Status::CertifiedOk);

        let unique = unique_counts(store.versions());
        assert_eq!(unique.get(Status::CertifiedOk), 1);
        assert_eq!(unique.get(Status::InDevelopment), 0);

        // Raw still sees both instances, one per status.
        let raw = raw_counts(store.versions());
        assert_eq!(raw.get(Status::InDevelopment), 1);
        assert_eq!(raw.get(Status::CertifiedOk), 1);
    }

    #[test]
    fn unique_never_exceeds_raw() {
        let mut store = EntityStore::new();
        let v1 = store.create_version("1", "", "");
        store.create_cdu(v1, "PORTA");
        store.create_cdu(v1, "LOGIN");
        store.duplicate_version(v1, "2", DuplicateIdentity::Shared);
        let v3 = store.create_version("3", "", "");
        store.create_cdu(v3, "SEARCH");

        let raw = raw_counts(store.versions());
        let unique = unique_counts(store.versions());
        for status in Status::ALL {
            assert!(unique.get(status) <= raw.get(status));
        }
        assert_eq!(raw.total(), 5);
        assert_eq!(unique.total(), 3);
    }

    #[test]
    fn per_version_counts_feed_the_summary() {
        let mut store = EntityStore::new();
        let vid = store.create_version("1", "", "");
        let a = store.create_cdu(vid, "PORTA").unwrap();
        store.create_cdu(vid, "LOGIN");
        store.set_cdu_status(a, Status::InProduction);

        let counts = version_counts(store.version(vid).unwrap());
        assert_eq!(counts.get(Status::InProduction), 1);
        assert_eq!(counts.get(Status::InDevelopment), 1);
        assert_eq!(counts.total(), 2);
    }
}
