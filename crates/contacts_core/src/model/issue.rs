//! Issue records used by owner/status count summaries.

use serde::{Deserialize, Serialize};

/// Issue lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
    New,
    Assigned,
    Fixed,
    Closed,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Assigned => "Assigned",
            Self::Fixed => "Fixed",
            Self::Closed => "Closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "New" => Some(Self::New),
            "Assigned" => Some(Self::Assigned),
            "Fixed" => Some(Self::Fixed),
            "Closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Issue row as stored in the `issues` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub title: String,
    pub owner: String,
    pub status: IssueStatus,
    /// Estimated effort in days.
    pub effort: Option<i64>,
}
