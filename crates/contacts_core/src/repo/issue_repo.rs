//! Issue persistence and owner/status aggregation.

use crate::model::issue::{Issue, IssueStatus};
use crate::repo::contact_repo::{count_from_db, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

/// Filter for issue counts. Effort bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueCountsQuery {
    pub status: Option<IssueStatus>,
    pub effort_min: Option<i64>,
    pub effort_max: Option<i64>,
}

/// One `(owner, status)` group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerStatusCount {
    pub owner: String,
    pub status: IssueStatus,
    pub count: u64,
}

pub trait IssueRepository {
    fn create_issue(&self, issue: &Issue) -> RepoResult<()>;
    /// Groups matching issues by owner and status, ordered by both.
    fn count_by_owner_and_status(
        &self,
        query: &IssueCountsQuery,
    ) -> RepoResult<Vec<OwnerStatusCount>>;
}

pub struct SqliteIssueRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIssueRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl IssueRepository for SqliteIssueRepository<'_> {
    fn create_issue(&self, issue: &Issue) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO issues (id, title, owner, status, effort)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                issue.id,
                issue.title.as_str(),
                issue.owner.as_str(),
                issue.status.as_str(),
                issue.effort,
            ],
        )?;
        Ok(())
    }

    fn count_by_owner_and_status(
        &self,
        query: &IssueCountsQuery,
    ) -> RepoResult<Vec<OwnerStatusCount>> {
        let mut sql =
            String::from("SELECT owner, status, COUNT(*) AS count FROM issues WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(min) = query.effort_min {
            sql.push_str(" AND effort >= ?");
            bind_values.push(Value::Integer(min));
        }
        if let Some(max) = query.effort_max {
            sql.push_str(" AND effort <= ?");
            bind_values.push(Value::Integer(max));
        }
        sql.push_str(" GROUP BY owner, status ORDER BY owner ASC, status ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut groups = Vec::new();

        while let Some(row) = rows.next()? {
            let status_text: String = row.get("status")?;
            let status = IssueStatus::parse(&status_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid issue status `{status_text}` in issues.status"
                ))
            })?;
            groups.push(OwnerStatusCount {
                owner: row.get("owner")?,
                status,
                count: count_from_db(row.get("count")?, "issues group")?,
            });
        }

        Ok(groups)
    }
}
