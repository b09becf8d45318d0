//! Named counters used to assign public identifiers.

use crate::repo::contact_repo::{RepoError, RepoResult};
use rusqlite::Connection;

/// Counter name used for contact ids.
pub const CONTACTS_SEQUENCE: &str = "contacts";

/// Sequence generator collaborator.
pub trait SequenceGenerator {
    /// Returns the next unique value of counter `name`, starting at 1.
    fn next_sequence(&self, name: &str) -> RepoResult<i64>;
}

/// Counter rows in the `counters` table.
pub struct SqliteSequenceGenerator<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSequenceGenerator<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SequenceGenerator for SqliteSequenceGenerator<'_> {
    fn next_sequence(&self, name: &str) -> RepoResult<i64> {
        if name.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "sequence name must not be empty".to_string(),
            ));
        }

        let next = self.conn.query_row(
            "INSERT INTO counters (name, seq) VALUES (?1, 1)
             ON CONFLICT (name) DO UPDATE SET seq = seq + 1
             RETURNING seq;",
            [name],
            |row| row.get(0),
        )?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::{SequenceGenerator, SqliteSequenceGenerator, CONTACTS_SEQUENCE};
    use crate::db::open_db_in_memory;
    use crate::repo::contact_repo::RepoError;

    #[test]
    fn sequences_start_at_one_and_increment_independently() {
        let conn = open_db_in_memory().unwrap();
        let sequences = SqliteSequenceGenerator::new(&conn);

        assert_eq!(sequences.next_sequence(CONTACTS_SEQUENCE).unwrap(), 1);
        assert_eq!(sequences.next_sequence(CONTACTS_SEQUENCE).unwrap(), 2);
        assert_eq!(sequences.next_sequence("issues").unwrap(), 1);
        assert_eq!(sequences.next_sequence(CONTACTS_SEQUENCE).unwrap(), 3);
    }

    #[test]
    fn blank_sequence_name_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let sequences = SqliteSequenceGenerator::new(&conn);
        assert!(matches!(
            sequences.next_sequence(" "),
            Err(RepoError::InvalidData(_))
        ));
    }
}
