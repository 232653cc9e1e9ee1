//! Normalization of loaded or imported version collections.
//!
//! Persisted and imported data is untrusted and may predate the current
//! schema. Everything funnels through [`normalize_versions`] before it
//! enters the store: missing nested collections become empty containers,
//! legacy singular fields migrate to their list forms, and malformed
//! values fall back to defaults. Shape problems are recovered locally,
//! never propagated (the error path is for unreadable input, not for
//! old input).
//!
//! Unknown fields are preserved in `extra` maps during deserialization so
//! a newer file read by an older binary does not round-trip away data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use crate::model::{AuditEntry, Cdu, CduUuid, Party, Role, Status, Version, VersionComments};

/// Work item as found in a session file or import payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCdu {
    pub id: Option<u64>,
    pub uuid: Option<String>,
    pub name: String,
    pub description: String,
    pub status: Option<String>,
    /// Legacy singular field; migrates to a one-element `parties` list.
    pub responsible: Option<String>,
    pub parties: Vec<RawParty>,
    pub observations: Vec<String>,
    pub history: Vec<AuditEntry>,
    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawParty {
    pub name: String,
    pub role: Option<String>,
}

/// Version as found in a session file or import payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawVersion {
    pub id: Option<u64>,
    pub number: String,
    pub deploy_date: String,
    pub deploy_time: String,
    pub comments: VersionComments,
    /// Legacy single note; migrates into the `general` comment category.
    pub comment: Option<String>,
    pub cdus: Vec<RawCdu>,
    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl From<&Version> for RawVersion {
    fn from(version: &Version) -> Self {
        Self {
            id: Some(version.id),
            number: version.number.clone(),
            deploy_date: version.deploy_date.clone(),
            deploy_time: version.deploy_time.clone(),
            comments: version.comments.clone(),
            comment: None,
            cdus: version.cdus.iter().map(raw_cdu).collect(),
            extra: BTreeMap::new(),
        }
    }
}

fn raw_cdu(cdu: &Cdu) -> RawCdu {
    RawCdu {
        id: Some(cdu.id),
        uuid: Some(cdu.uuid.as_str().to_string()),
        name: cdu.name.clone(),
        description: cdu.description.clone(),
        status: Some(cdu.status.to_string()),
        responsible: None,
        parties: cdu
            .parties
            .iter()
            .map(|p| RawParty {
                name: p.name.clone(),
                role: Some(p.role.to_string()),
            })
            .collect(),
        observations: cdu.observations.clone(),
        history: cdu.history.clone(),
        extra: BTreeMap::new(),
    }
}

/// Bring a loaded/imported collection up to the current schema.
///
/// Ids present in the input are kept when unique — the production marker
/// and any persisted staged batch refer to them — and reassigned above
/// the maximum present otherwise. Foreign imports (sheets) carry no ids,
/// so their rows are numbered from scratch; logical identity across
/// imports rides on the `uuid`, never on the id.
pub fn normalize_versions(raw: Vec<RawVersion>) -> Vec<Version> {
    let mut next_version_id = raw.iter().filter_map(|v| v.id).max().unwrap_or(0);
    let mut next_cdu_id = raw
        .iter()
        .flat_map(|v| v.cdus.iter().filter_map(|c| c.id))
        .max()
        .unwrap_or(0);
    let mut seen_versions: HashSet<u64> = HashSet::new();
    let mut seen_cdus: HashSet<u64> = HashSet::new();

    raw.into_iter()
        .map(|raw_version| {
            let id = match raw_version.id {
                Some(id) if seen_versions.insert(id) => id,
                _ => {
                    next_version_id += 1;
                    seen_versions.insert(next_version_id);
                    next_version_id
                }
            };

            let mut version = Version::new(id, raw_version.number);
            version.deploy_date = raw_version.deploy_date;
            version.deploy_time = raw_version.deploy_time;
            version.comments = raw_version.comments;
            if let Some(note) = raw_version.comment.filter(|c| !c.trim().is_empty()) {
                version.comments.general.push(note);
            }

            version.cdus = raw_version
                .cdus
                .into_iter()
                .map(|raw_item| {
                    let cdu_id = match raw_item.id {
                        Some(id) if seen_cdus.insert(id) => id,
                        _ => {
                            next_cdu_id += 1;
                            seen_cdus.insert(next_cdu_id);
                            next_cdu_id
                        }
                    };
                    normalize_cdu(raw_item, cdu_id)
                })
                .collect();
            version
        })
        .collect()
}

fn normalize_cdu(raw: RawCdu, id: u64) -> Cdu {
    let status = raw
        .status
        .as_deref()
        .map_or_else(Status::default, |text| {
            Status::from_str(text).unwrap_or_else(|_| {
                tracing::warn!(status = text, "unknown status in loaded data, defaulting");
                Status::default()
            })
        });

    let uuid = raw
        .uuid
        .filter(|u| !u.trim().is_empty())
        .map_or_else(|| CduUuid::derive(&raw.name), CduUuid::from_raw);

    let mut parties: Vec<Party> = raw.parties.into_iter().map(normalize_party).collect();
    if parties.is_empty() {
        if let Some(name) = raw.responsible.filter(|r| !r.trim().is_empty()) {
            parties.push(Party {
                name,
                role: Role::default(),
            });
        }
    }

    Cdu {
        id,
        uuid,
        name: raw.name,
        description: raw.description,
        status,
        parties,
        observations: raw.observations,
        history: raw.history,
    }
}

fn normalize_party(raw: RawParty) -> Party {
    let role = raw
        .role
        .as_deref()
        .and_then(|text| Role::from_str(text).ok())
        .unwrap_or_default();
    Party {
        name: raw.name,
        role,
    }
}
