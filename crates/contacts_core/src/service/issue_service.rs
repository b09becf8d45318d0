//! Owner/status count summaries over issues.

use crate::model::issue::IssueStatus;
use crate::repo::issue_repo::{IssueCountsQuery, IssueRepository};
use crate::service::contact_service::ServiceResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-owner issue counts keyed by status.
///
/// Serializes flat, e.g. `{"owner": "ana", "New": 2, "Fixed": 1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerStatusCounts {
    pub owner: String,
    #[serde(flatten)]
    pub counts: BTreeMap<IssueStatus, u64>,
}

impl OwnerStatusCounts {
    /// Count for `status`, zero when absent.
    pub fn count(&self, status: IssueStatus) -> u64 {
        self.counts.get(&status).copied().unwrap_or(0)
    }
}

pub struct IssueService<R: IssueRepository> {
    repo: R,
}

impl<R: IssueRepository> IssueService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// One row per owner with counts for every status seen, ordered by owner.
    pub fn counts(&self, query: &IssueCountsQuery) -> ServiceResult<Vec<OwnerStatusCounts>> {
        let mut by_owner: BTreeMap<String, BTreeMap<IssueStatus, u64>> = BTreeMap::new();
        for group in self.repo.count_by_owner_and_status(query)? {
            by_owner
                .entry(group.owner)
                .or_default()
                .insert(group.status, group.count);
        }

        Ok(by_owner
            .into_iter()
            .map(|(owner, counts)| OwnerStatusCounts { owner, counts })
            .collect())
    }
}
