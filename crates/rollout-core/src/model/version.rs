use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::cdu::{Cdu, ParseEnumError};

/// The four categorized note lists kept on a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommentCategory {
    Improvements,
    Releases,
    HotFixes,
    General,
}

impl CommentCategory {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Improvements => "improvements",
            Self::Releases => "releases",
            Self::HotFixes => "hot-fixes",
            Self::General => "general",
        }
    }

    pub const ALL: [Self; 4] = [
        Self::Improvements,
        Self::Releases,
        Self::HotFixes,
        Self::General,
    ];
}

impl fmt::Display for CommentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "improvements" => Ok(Self::Improvements),
            "releases" => Ok(Self::Releases),
            "hot-fixes" | "hotfixes" => Ok(Self::HotFixes),
            "general" => Ok(Self::General),
            _ => Err(ParseEnumError {
                expected: "comment category",
                got: s.to_string(),
            }),
        }
    }
}

/// Free-text notes on a version, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionComments {
    pub improvements: Vec<String>,
    pub releases: Vec<String>,
    pub hot_fixes: Vec<String>,
    pub general: Vec<String>,
}

impl VersionComments {
    pub fn list(&self, category: CommentCategory) -> &Vec<String> {
        match category {
            CommentCategory::Improvements => &self.improvements,
            CommentCategory::Releases => &self.releases,
            CommentCategory::HotFixes => &self.hot_fixes,
            CommentCategory::General => &self.general,
        }
    }

    pub fn list_mut(&mut self, category: CommentCategory) -> &mut Vec<String> {
        match category {
            CommentCategory::Improvements => &mut self.improvements,
            CommentCategory::Releases => &mut self.releases,
            CommentCategory::HotFixes => &mut self.hot_fixes,
            CommentCategory::General => &mut self.general,
        }
    }

    pub fn is_empty(&self) -> bool {
        CommentCategory::ALL.iter().all(|c| self.list(*c).is_empty())
    }
}

/// A deployment batch: an ordered set of work items plus categorized notes.
///
/// `number` is a display string ("12.4.1", "2024-Q3-hotfix"); it is not
/// guaranteed to sort numerically without parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Store-local id, unique and stable for the object's lifetime.
    pub id: u64,
    pub number: String,
    #[serde(default)]
    pub deploy_date: String,
    #[serde(default)]
    pub deploy_time: String,
    #[serde(default)]
    pub comments: VersionComments,
    #[serde(default)]
    pub cdus: Vec<Cdu>,
}

impl Version {
    pub fn new(id: u64, number: impl Into<String>) -> Self {
        Self {
            id,
            number: number.into(),
            deploy_date: String::new(),
            deploy_time: String::new(),
            comments: VersionComments::default(),
            cdus: Vec::new(),
        }
    }

    pub fn cdu(&self, cdu_id: u64) -> Option<&Cdu> {
        self.cdus.iter().find(|c| c.id == cdu_id)
    }

    pub fn cdu_mut(&mut self, cdu_id: u64) -> Option<&mut Cdu> {
        self.cdus.iter_mut().find(|c| c.id == cdu_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{CommentCategory, Version, VersionComments};
    use std::str::FromStr;

    #[test]
    fn category_roundtrips() {
        for category in CommentCategory::ALL {
            let reparsed = CommentCategory::from_str(&category.to_string()).unwrap();
            assert_eq!(category, reparsed);
        }
        assert!(CommentCategory::from_str("misc").is_err());
    }

    #[test]
    fn comment_lists_are_addressable_by_category() {
        let mut comments = VersionComments::default();
        assert!(comments.is_empty());

        comments
            .list_mut(CommentCategory::HotFixes)
            .push("rollback of login patch".to_string());

        assert_eq!(comments.hot_fixes.len(), 1);
        assert_eq!(comments.list(CommentCategory::HotFixes).len(), 1);
        assert!(comments.list(CommentCategory::General).is_empty());
        assert!(!comments.is_empty());
    }

    #[test]
    fn version_starts_empty() {
        let version = Version::new(3, "12.4.1");
        assert_eq!(version.id, 3);
        assert_eq!(version.number, "12.4.1");
        assert!(version.cdus.is_empty());
        assert!(version.comments.is_empty());
        assert!(version.cdu(1).is_none());
    }
}
