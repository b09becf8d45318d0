//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide find/count/insert/update/delete over the active and deleted
//!   contact stores.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Both stores share one column layout; a row read from one can be
//!   inserted into the other unchanged.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing always orders by `name ASC, id ASC`.

use crate::db::DbError;
use crate::model::contact::{Contact, ContactChanges, ContactFrequency, ContactId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_COLUMNS: &str = "id,
    name,
    email,
    phone,
    linkedin,
    company,
    title,
    active_status,
    contact_frequency,
    priority,
    familiarity,
    last_contact_date,
    next_contact_date,
    notes,
    context_space,
    deleted_at";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact and issue persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Logical contact collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactStore {
    /// Live contacts (`contacts`).
    Active,
    /// Soft-deleted contacts (`deleted_contacts`).
    Deleted,
}

impl ContactStore {
    pub fn table(self) -> &'static str {
        match self {
            Self::Active => "contacts",
            Self::Deleted => "deleted_contacts",
        }
    }
}

/// Filter for listing active contacts. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    pub active_status: Option<bool>,
    pub contact_frequency: Option<ContactFrequency>,
    pub priority: Option<String>,
    pub familiarity: Option<String>,
    /// Free text matched against the full-text index; blank means no filter.
    pub search: Option<String>,
}

/// Storage collaborator for contact records.
pub trait ContactRepository {
    fn find_contact(&self, store: ContactStore, id: ContactId) -> RepoResult<Option<Contact>>;
    /// Active contacts matching `filter`, sorted by name.
    fn find_contacts(
        &self,
        filter: &ContactFilter,
        offset: u64,
        limit: u32,
    ) -> RepoResult<Vec<Contact>>;
    fn count_contacts(&self, filter: &ContactFilter) -> RepoResult<u64>;
    fn insert_contact(&self, store: ContactStore, contact: &Contact) -> RepoResult<()>;
    /// Sets only the fields present in `changes` on an active contact.
    ///
    /// Returns whether a row matched `id`.
    fn update_contact_fields(&self, id: ContactId, changes: &ContactChanges) -> RepoResult<bool>;
    /// Returns the number of deleted rows (0 or 1).
    fn delete_contact(&self, store: ContactStore, id: ContactId) -> RepoResult<usize>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn find_contact(&self, store: ContactStore, id: ContactId) -> RepoResult<Option<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM {} WHERE id = ?1;",
            store.table()
        ))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }

        Ok(None)
    }

    fn find_contacts(
        &self,
        filter: &ContactFilter,
        offset: u64,
        limit: u32,
    ) -> RepoResult<Vec<Contact>> {
        let (where_sql, mut bind_values) = build_filter(filter);
        let sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts{where_sql}
             ORDER BY name ASC, id ASC
             LIMIT ? OFFSET ?"
        );
        bind_values.push(Value::Integer(i64::from(limit)));
        bind_values.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut contacts = Vec::new();

        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        Ok(contacts)
    }

    fn count_contacts(&self, filter: &ContactFilter) -> RepoResult<u64> {
        let (where_sql, bind_values) = build_filter(filter);
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM contacts{where_sql}"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        count_from_db(count, "contact")
    }

    fn insert_contact(&self, store: ContactStore, contact: &Contact) -> RepoResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} ({CONTACT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16);",
                store.table()
            ),
            params![
                contact.id,
                contact.name.as_str(),
                contact.email.as_deref(),
                contact.phone.as_deref(),
                contact.linkedin.as_deref(),
                contact.company.as_deref(),
                contact.title.as_deref(),
                bool_to_int(contact.active_status),
                contact.contact_frequency.as_str(),
                contact.priority.as_deref(),
                contact.familiarity.as_deref(),
                contact.last_contact_date,
                contact.next_contact_date,
                contact.notes.as_deref(),
                contact.context_space.as_deref(),
                contact.deleted_at,
            ],
        )?;

        Ok(())
    }

    fn update_contact_fields(&self, id: ContactId, changes: &ContactChanges) -> RepoResult<bool> {
        let assignments = changed_columns(changes);
        if assignments.is_empty() {
            let exists: i64 = self.conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM contacts WHERE id = ?1);",
                [id],
                |row| row.get(0),
            )?;
            return Ok(exists == 1);
        }

        let set_sql = assignments
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut bind_values: Vec<Value> = assignments.into_iter().map(|(_, value)| value).collect();
        bind_values.push(Value::Integer(id));

        let changed = self.conn.execute(
            &format!("UPDATE contacts SET {set_sql} WHERE id = ?;"),
            params_from_iter(bind_values),
        )?;

        Ok(changed > 0)
    }

    fn delete_contact(&self, store: ContactStore, id: ContactId) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", store.table()),
            [id],
        )?;
        Ok(deleted)
    }
}

/// Converts a SQL `COUNT(*)` value, rejecting negatives as corrupt data.
pub(crate) fn count_from_db(count: i64, what: &str) -> RepoResult<u64> {
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative {what} count `{count}`")))
}

fn build_filter(filter: &ContactFilter) -> (String, Vec<Value>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(active_status) = filter.active_status {
        clauses.push("active_status = ?");
        bind_values.push(Value::Integer(bool_to_int(active_status)));
    }
    if let Some(frequency) = filter.contact_frequency {
        clauses.push("contact_frequency = ?");
        bind_values.push(Value::Text(frequency.as_str().to_string()));
    }
    if let Some(priority) = &filter.priority {
        clauses.push("priority = ?");
        bind_values.push(Value::Text(priority.clone()));
    }
    if let Some(familiarity) = &filter.familiarity {
        clauses.push("familiarity = ?");
        bind_values.push(Value::Text(familiarity.clone()));
    }
    if let Some(match_expr) = filter.search.as_deref().and_then(build_match_expression) {
        clauses.push("id IN (SELECT rowid FROM contacts_fts WHERE contacts_fts MATCH ?)");
        bind_values.push(Value::Text(match_expr));
    }

    if clauses.is_empty() {
        return (String::new(), bind_values);
    }
    (format!(" WHERE {}", clauses.join(" AND ")), bind_values)
}

/// Quotes every whitespace-separated term and ORs them together.
fn build_match_expression(text: &str) -> Option<String> {
    let terms = text
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return None;
    }
    Some(terms.join(" OR "))
}

fn changed_columns(changes: &ContactChanges) -> Vec<(&'static str, Value)> {
    let mut columns = Vec::new();

    if let Some(name) = &changes.name {
        columns.push(("name", Value::Text(name.clone())));
    }
    push_text(&mut columns, "email", &changes.email);
    push_text(&mut columns, "phone", &changes.phone);
    push_text(&mut columns, "linkedin", &changes.linkedin);
    push_text(&mut columns, "company", &changes.company);
    push_text(&mut columns, "title", &changes.title);
    if let Some(active_status) = changes.active_status {
        columns.push(("active_status", Value::Integer(bool_to_int(active_status))));
    }
    if let Some(frequency) = changes.contact_frequency {
        columns.push((
            "contact_frequency",
            Value::Text(frequency.as_str().to_string()),
        ));
    }
    push_text(&mut columns, "priority", &changes.priority);
    push_text(&mut columns, "familiarity", &changes.familiarity);
    push_timestamp(&mut columns, "last_contact_date", changes.last_contact_date);
    push_timestamp(&mut columns, "next_contact_date", changes.next_contact_date);
    push_text(&mut columns, "notes", &changes.notes);
    push_text(&mut columns, "context_space", &changes.context_space);

    columns
}

fn push_text(
    columns: &mut Vec<(&'static str, Value)>,
    column: &'static str,
    change: &Option<Option<String>>,
) {
    if let Some(value) = change {
        columns.push((column, value.clone().map_or(Value::Null, Value::Text)));
    }
}

fn push_timestamp(
    columns: &mut Vec<(&'static str, Value)>,
    column: &'static str,
    change: Option<Option<i64>>,
) {
    if let Some(value) = change {
        columns.push((column, value.map_or(Value::Null, Value::Integer)));
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let frequency_text: String = row.get("contact_frequency")?;
    let contact_frequency = ContactFrequency::parse(&frequency_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid contact frequency `{frequency_text}` in contacts.contact_frequency"
        ))
    })?;

    let active_status = match row.get::<_, i64>("active_status")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid active_status value `{other}` in contacts.active_status"
            )));
        }
    };

    Ok(Contact {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        linkedin: row.get("linkedin")?,
        company: row.get("company")?,
        title: row.get("title")?,
        active_status,
        contact_frequency,
        priority: row.get("priority")?,
        familiarity: row.get("familiarity")?,
        last_contact_date: row.get("last_contact_date")?,
        next_contact_date: row.get("next_contact_date")?,
        notes: row.get("notes")?,
        context_space: row.get("context_space")?,
        deleted_at: row.get("deleted_at")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{
        build_filter, build_match_expression, changed_columns, count_from_db, ContactFilter,
        RepoError,
    };
    use crate::model::contact::{ContactChanges, ContactFrequency};

    #[test]
    fn match_expression_quotes_and_ors_terms() {
        assert_eq!(
            build_match_expression("acme  \"lead\""),
            Some("\"acme\" OR \"\"\"lead\"\"\"".to_string())
        );
        assert_eq!(build_match_expression("   "), None);
    }

    #[test]
    fn negative_counts_are_reported_as_invalid_data() {
        assert_eq!(count_from_db(3, "contact").unwrap(), 3);
        match count_from_db(-1, "issues group") {
            Err(RepoError::InvalidData(message)) => {
                assert_eq!(message, "negative issues group count `-1`")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn empty_filter_has_no_where_clause() {
        let (sql, binds) = build_filter(&ContactFilter::default());
        assert!(sql.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn blank_search_does_not_filter() {
        let filter = ContactFilter {
            contact_frequency: Some(ContactFrequency::Weekly),
            search: Some("  ".to_string()),
            ..ContactFilter::default()
        };
        let (sql, binds) = build_filter(&filter);
        assert_eq!(sql, " WHERE contact_frequency = ?");
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn changed_columns_only_lists_present_fields() {
        let changes = ContactChanges {
            name: Some("Ada".to_string()),
            email: Some(None),
            next_contact_date: Some(Some(42)),
            ..ContactChanges::default()
        };
        let columns: Vec<&str> = changed_columns(&changes)
            .into_iter()
            .map(|(column, _)| column)
            .collect();
        assert_eq!(columns, vec!["name", "email", "next_contact_date"]);
    }
}
