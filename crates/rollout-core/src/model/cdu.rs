use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The four certification states a work item moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    InDevelopment,
    PendingCertification,
    CertifiedOk,
    InProduction,
}

impl Status {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InDevelopment => "in-development",
            Self::PendingCertification => "pending-certification",
            Self::CertifiedOk => "certified-ok",
            Self::InProduction => "in-production",
        }
    }

    /// All statuses in lifecycle order. Counting code iterates this so a
    /// new status only has to be added here.
    pub const ALL: [Self; 4] = [
        Self::InDevelopment,
        Self::PendingCertification,
        Self::CertifiedOk,
        Self::InProduction,
    ];
}

impl Default for Status {
    fn default() -> Self {
        Self::InDevelopment
    }
}

/// The role a responsible party plays for a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Dev,
    AnalysisFunctional,
    Ux,
    Analyst,
    Qa,
}

impl Role {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::AnalysisFunctional => "analysis-functional",
            Self::Ux => "ux",
            Self::Analyst => "analyst",
            Self::Qa => "qa",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Dev
    }
}

/// One responsible party on a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

/// What kind of change an audit-history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditKind {
    Created,
    FieldEdit,
    ListAdd,
    ListRemove,
    Imported,
}

impl AuditKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::FieldEdit => "field-edit",
            Self::ListAdd => "list-add",
            Self::ListRemove => "list-remove",
            Self::Imported => "imported",
        }
    }
}

/// One audit-history entry on a work item.
///
/// `before`/`after` carry the displayed form of the value; history is a
/// human-facing log, not a replayable edit stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Wall-clock timestamp in microseconds since the Unix epoch.
    pub ts_us: i64,
    pub kind: AuditKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// Stable cross-version identity token for a work item.
///
/// - Format: `cdu:<16 lowercase hex>`.
/// - Assigned once at creation or import and never changed afterwards;
///   the numeric store id is local and reassigned on import, this is not.
/// - Derived from the item name, so re-importing a sheet where the same
///   name recurs resolves every occurrence to one uuid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CduUuid(String);

impl CduUuid {
    /// Derive the uuid for an item name. Case and surrounding whitespace
    /// are ignored so "PORTA" and " porta " resolve to the same token.
    pub fn derive(name: &str) -> Self {
        let normalized = name.trim().to_lowercase();
        let hash = blake3::hash(normalized.as_bytes());
        let hex: String = hash.as_bytes()[..8]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        Self(format!("cdu:{hex}"))
    }

    /// Derive a uuid scoped to a store id, for copies that must NOT share
    /// identity with their source despite carrying the same name.
    pub fn derive_scoped(name: &str, scope: u64) -> Self {
        Self::derive(&format!("{}#{scope}", name.trim().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an already-formatted token, e.g. one read back from a sheet.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for CduUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A trackable unit of work belonging to a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cdu {
    /// Store-local id, reassigned on import/replace.
    pub id: u64,
    pub uuid: CduUuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub parties: Vec<Party>,
    #[serde(default)]
    pub observations: Vec<String>,
    #[serde(default)]
    pub history: Vec<AuditEntry>,
}

impl Cdu {
    /// Build a fresh item with the uuid derived from its name.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            uuid: CduUuid::derive(&name),
            name,
            description: String::new(),
            status: Status::default(),
            parties: Vec::new(),
            observations: Vec::new(),
            history: Vec::new(),
        }
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "in-development" | "development" => Ok(Self::InDevelopment),
            "pending-certification" | "pending" => Ok(Self::PendingCertification),
            "certified-ok" | "certified" => Ok(Self::CertifiedOk),
            "in-production" | "production" => Ok(Self::InProduction),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "dev" => Ok(Self::Dev),
            "analysis-functional" | "functional" => Ok(Self::AnalysisFunctional),
            "ux" => Ok(Self::Ux),
            "analyst" => Ok(Self::Analyst),
            "qa" => Ok(Self::Qa),
            _ => Err(ParseEnumError {
                expected: "role",
                got: s.to_string(),
            }),
        }
    }
}
