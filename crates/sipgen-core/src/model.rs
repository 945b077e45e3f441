use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralType {
    Simple,
    CompoundParent,
    CompoundChild,
    GroupedWork,
}

impl StructuralType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructuralType::Simple => "simple",
            StructuralType::CompoundParent => "compound_parent",
            StructuralType::CompoundChild => "compound_child",
            StructuralType::GroupedWork => "grouped_work",
        }
    }

    /// Records whose files are spread over several child records.
    pub fn is_multi_file(&self) -> bool {
        matches!(
            self,
            StructuralType::CompoundParent | StructuralType::GroupedWork
        )
    }
}

impl fmt::Display for StructuralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for StructuralType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "simple" | "single" => Ok(StructuralType::Simple),
            "compound_parent" | "compound_object" | "cpd" => Ok(StructuralType::CompoundParent),
            "compound_child" | "child" => Ok(StructuralType::CompoundChild),
            "grouped_work" | "grouped" => Ok(StructuralType::GroupedWork),
            other => Err(format!("unknown structural type '{other}'")),
        }
    }
}

/// One legacy object as captured by the indexing stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedRecord {
    pub legacy_id: String,
    pub parent_id: Option<String>,
    pub created: DateTime<Utc>,
    pub structural_type: StructuralType,
}

impl IndexedRecord {
    pub fn new(
        legacy_id: impl Into<String>,
        parent_id: Option<String>,
        created: DateTime<Utc>,
        structural_type: StructuralType,
    ) -> Self {
        Self {
            legacy_id: legacy_id.into(),
            parent_id,
            created,
            structural_type,
        }
    }
}

/// Parses either an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
pub fn parse_created(value: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid created timestamp '{trimmed}'"))
}

/// Orders legacy ids numerically when both are numeric, lexically otherwise.
pub fn compare_legacy_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        _ => a.cmp(b),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatronAccess {
    #[serde(rename = "none")]
    NoAccess,
    #[serde(rename = "canDiscover")]
    CanDiscover,
    #[serde(rename = "canViewMetadata")]
    CanViewMetadata,
    #[serde(rename = "canViewAccessCopies")]
    CanViewAccessCopies,
    #[serde(rename = "canViewReducedQuality")]
    CanViewReducedQuality,
    #[serde(rename = "canViewOriginals")]
    CanViewOriginals,
}

impl PatronAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatronAccess::NoAccess => "none",
            PatronAccess::CanDiscover => "canDiscover",
            PatronAccess::CanViewMetadata => "canViewMetadata",
            PatronAccess::CanViewAccessCopies => "canViewAccessCopies",
            PatronAccess::CanViewReducedQuality => "canViewReducedQuality",
            PatronAccess::CanViewOriginals => "canViewOriginals",
        }
    }
}

impl fmt::Display for PatronAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PatronAccess {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "none" => Ok(PatronAccess::NoAccess),
            "canDiscover" => Ok(PatronAccess::CanDiscover),
            "canViewMetadata" => Ok(PatronAccess::CanViewMetadata),
            "canViewAccessCopies" => Ok(PatronAccess::CanViewAccessCopies),
            "canViewReducedQuality" => Ok(PatronAccess::CanViewReducedQuality),
            "canViewOriginals" => Ok(PatronAccess::CanViewOriginals),
            other => Err(format!("unknown patron access role '{other}'")),
        }
    }
}

/// Patron roles granted on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub everyone: PatronAccess,
    pub authenticated: PatronAccess,
}
