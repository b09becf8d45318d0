//! Contact use-case service.
//!
//! # Responsibility
//! - Provide the get/list/add/update/remove/restore handlers.
//! - Run validation and scheduling before anything is written.
//!
//! # Invariants
//! - Invalid input never reaches the repository.
//! - Updates persist only the caller's change set plus the scheduled
//!   `next_contact_date`/`active_status`.
//! - Remove/restore are two separate writes (insert, then delete). A failure
//!   between them leaves the row in both stores; nothing rolls it back.

use crate::model::contact::{
    Contact, ContactChanges, ContactFrequency, ContactId, ContactInput, ContactValidationError,
};
use crate::repo::contact_repo::{ContactFilter, ContactRepository, ContactStore, RepoError};
use crate::repo::sequence_repo::{SequenceGenerator, CONTACTS_SEQUENCE};
use crate::schedule::clock::{Clock, SystemClock};
use crate::schedule::next_date::set_next_contact_date;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed page size for contact listing.
pub const PAGE_SIZE: u32 = 10;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for contact and issue handlers.
#[derive(Debug)]
pub enum ServiceError {
    /// Business validation failed; nothing was written.
    InvalidInput(ContactValidationError),
    /// Handler requires a signed-in caller.
    Unauthenticated,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::Unauthenticated => write!(f, "You must be signed in"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Unauthenticated => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ContactValidationError> for ServiceError {
    fn from(value: ContactValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Filters plus 1-based page number for [`ContactService::list_contacts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactListQuery {
    pub filter: ContactFilter,
    /// Defaults to 1; values below 1 are treated as 1.
    pub page: Option<u32>,
}

/// One page of contacts sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    /// Total pages for the filter, `ceil(total / PAGE_SIZE)`.
    pub pages: u64,
}

/// Contact handlers over a storage collaborator, a sequence generator and
/// a time source.
pub struct ContactService<R, S, C = SystemClock> {
    repo: R,
    sequences: S,
    clock: C,
}

impl<R: ContactRepository, S: SequenceGenerator> ContactService<R, S, SystemClock> {
    pub fn new(repo: R, sequences: S) -> Self {
        Self::with_clock(repo, sequences, SystemClock)
    }
}

impl<R: ContactRepository, S: SequenceGenerator, C: Clock> ContactService<R, S, C> {
    pub fn with_clock(repo: R, sequences: S, clock: C) -> Self {
        Self {
            repo,
            sequences,
            clock,
        }
    }

    /// Gets one active contact; `None` when the id is unknown.
    pub fn get_contact(&self, id: ContactId) -> ServiceResult<Option<Contact>> {
        Ok(self.repo.find_contact(ContactStore::Active, id)?)
    }

    /// Lists active contacts matching the filter, [`PAGE_SIZE`] per page.
    pub fn list_contacts(&self, query: &ContactListQuery) -> ServiceResult<ContactPage> {
        let page = query.page.unwrap_or(1).max(1);
        let offset = u64::from(PAGE_SIZE) * u64::from(page - 1);

        let total = self.repo.count_contacts(&query.filter)?;
        let contacts = self.repo.find_contacts(&query.filter, offset, PAGE_SIZE)?;

        Ok(ContactPage {
            contacts,
            pages: total.div_ceil(u64::from(PAGE_SIZE)),
        })
    }

    /// Validates, assigns the next `contacts` sequence id and persists.
    ///
    /// Returns the record as read back from storage.
    pub fn add_contact(&self, input: ContactInput) -> ServiceResult<Contact> {
        // Validate under a placeholder id so a rejected input burns no id.
        let draft = input.into_contact(0);
        if let Err(err) = draft.validate() {
            info!(
                "event=contact_add module=service status=rejected violations={}",
                err.violations.len()
            );
            return Err(err.into());
        }

        let id = self.sequences.next_sequence(CONTACTS_SEQUENCE)?;
        let contact = Contact { id, ..draft };
        self.repo.insert_contact(ContactStore::Active, &contact)?;

        let saved = self
            .repo
            .find_contact(ContactStore::Active, id)?
            .ok_or_else(|| {
                RepoError::InvalidData(format!("contact {id} missing after insert"))
            })?;
        info!("event=contact_add module=service status=ok contact_id={id}");
        Ok(saved)
    }

    /// Applies `changes` to contact `id`.
    ///
    /// When a tracked field is present the merged record is rescheduled and
    /// re-validated first. Returns `None` when the id is unknown.
    pub fn update_contact(
        &self,
        id: ContactId,
        mut changes: ContactChanges,
    ) -> ServiceResult<Option<Contact>> {
        if changes.touches_tracked_fields() {
            let Some(mut contact) = self.repo.find_contact(ContactStore::Active, id)? else {
                info!("event=contact_update module=service status=not_found contact_id={id}");
                return Ok(None);
            };

            let turned_active = !contact.active_status && changes.active_status == Some(true);
            let manual_date_change = is_manual_date_change(&contact, &changes);
            contact.apply_changes(&changes);

            let outcome = set_next_contact_date(
                &contact,
                turned_active,
                manual_date_change,
                contact.active_status,
                &self.clock,
            );
            contact.next_contact_date = outcome.next_date;
            contact.active_status = outcome.active_status;
            changes.next_contact_date = Some(outcome.next_date);
            changes.active_status = Some(outcome.active_status);

            if let Err(err) = contact.validate() {
                info!(
                    "event=contact_update module=service status=rejected contact_id={} violations={}",
                    id,
                    err.violations.len()
                );
                return Err(err.into());
            }
        }

        if !self.repo.update_contact_fields(id, &changes)? {
            info!("event=contact_update module=service status=not_found contact_id={id}");
            return Ok(None);
        }

        info!("event=contact_update module=service status=ok contact_id={id}");
        Ok(self.repo.find_contact(ContactStore::Active, id)?)
    }

    /// Moves contact `id` into the deleted store, stamped with now.
    ///
    /// Returns `false` when the id is unknown or the delete step removed
    /// nothing. See the module docs for the partial-failure state.
    pub fn remove_contact(&self, id: ContactId) -> ServiceResult<bool> {
        let Some(mut contact) = self.repo.find_contact(ContactStore::Active, id)? else {
            return Ok(false);
        };
        contact.mark_deleted(self.clock.now_ms());

        let moved = self.move_contact(&contact, ContactStore::Active, ContactStore::Deleted)?;
        info!(
            "event=contact_remove module=service status={} contact_id={id}",
            status_label(moved)
        );
        Ok(moved)
    }

    /// Moves contact `id` back from the deleted store, clearing its stamp.
    pub fn restore_contact(&self, id: ContactId) -> ServiceResult<bool> {
        let Some(mut contact) = self.repo.find_contact(ContactStore::Deleted, id)? else {
            return Ok(false);
        };
        contact.clear_deleted();

        let moved = self.move_contact(&contact, ContactStore::Deleted, ContactStore::Active)?;
        info!(
            "event=contact_restore module=service status={} contact_id={id}",
            status_label(moved)
        );
        Ok(moved)
    }

    fn move_contact(
        &self,
        contact: &Contact,
        from: ContactStore,
        to: ContactStore,
    ) -> ServiceResult<bool> {
        self.repo.insert_contact(to, contact)?;
        let deleted = self.repo.delete_contact(from, contact.id)?;
        if deleted != 1 {
            warn!(
                "event=contact_move module=service status=partial contact_id={} from={} to={} deleted={}",
                contact.id,
                from.table(),
                to.table(),
                deleted
            );
        }
        Ok(deleted == 1)
    }
}

/// Whether the caller overrode the stored next contact date.
///
/// A present `next_contact_date` that differs from the stored one counts, and
/// so does a frequency that stays `Custom` across the update.
fn is_manual_date_change(current: &Contact, changes: &ContactChanges) -> bool {
    let date_overridden = matches!(
        changes.next_contact_date,
        Some(incoming) if incoming != current.next_contact_date
    );
    let custom_kept = current.contact_frequency == ContactFrequency::Custom
        && changes.contact_frequency == Some(ContactFrequency::Custom);
    date_overridden || custom_kept
}

fn status_label(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::{is_manual_date_change, ContactService};
    use crate::model::contact::{
        Contact, ContactChanges, ContactFrequency, ContactId, ContactInput,
    };
    use crate::repo::contact_repo::{ContactFilter, ContactRepository, ContactStore, RepoResult};
    use crate::repo::sequence_repo::SequenceGenerator;
    use crate::schedule::clock::FixedClock;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    /// In-memory stores whose delete step never removes anything, leaving
    /// a moved row in both stores.
    #[derive(Default)]
    struct StuckDeleteRepository {
        active: RefCell<BTreeMap<ContactId, Contact>>,
        deleted: RefCell<BTreeMap<ContactId, Contact>>,
    }

    impl StuckDeleteRepository {
        fn store(&self, store: ContactStore) -> &RefCell<BTreeMap<ContactId, Contact>> {
            match store {
                ContactStore::Active => &self.active,
                ContactStore::Deleted => &self.deleted,
            }
        }
    }

    impl ContactRepository for &StuckDeleteRepository {
        fn find_contact(&self, store: ContactStore, id: ContactId) -> RepoResult<Option<Contact>> {
            Ok(self.store(store).borrow().get(&id).cloned())
        }

        fn find_contacts(
            &self,
            _filter: &ContactFilter,
            _offset: u64,
            _limit: u32,
        ) -> RepoResult<Vec<Contact>> {
            Ok(self.active.borrow().values().cloned().collect())
        }

        fn count_contacts(&self, _filter: &ContactFilter) -> RepoResult<u64> {
            Ok(self.active.borrow().len() as u64)
        }

        fn insert_contact(&self, store: ContactStore, contact: &Contact) -> RepoResult<()> {
            self.store(store)
                .borrow_mut()
                .insert(contact.id, contact.clone());
            Ok(())
        }

        fn update_contact_fields(
            &self,
            _id: ContactId,
            _changes: &ContactChanges,
        ) -> RepoResult<bool> {
            Ok(false)
        }

        fn delete_contact(&self, _store: ContactStore, _id: ContactId) -> RepoResult<usize> {
            Ok(0)
        }
    }

    struct NoSequences;

    impl SequenceGenerator for NoSequences {
        fn next_sequence(&self, name: &str) -> RepoResult<i64> {
            panic!("sequence `{name}` should not be requested");
        }
    }

    fn stored(frequency: ContactFrequency, next: Option<i64>) -> Contact {
        let mut input = ContactInput::new("Alan Turing");
        input.phone = Some("555-0101".to_string());
        input.contact_frequency = Some(frequency);
        input.next_contact_date = next;
        input.into_contact(3)
    }

    #[test]
    fn unchanged_date_is_not_manual() {
        let current = stored(ContactFrequency::Weekly, Some(100));
        let changes = ContactChanges {
            next_contact_date: Some(Some(100)),
            contact_frequency: Some(ContactFrequency::Monthly),
            ..ContactChanges::default()
        };
        assert!(!is_manual_date_change(&current, &changes));
    }

    #[test]
    fn differing_date_is_manual() {
        let current = stored(ContactFrequency::Weekly, Some(100));
        let changes = ContactChanges {
            next_contact_date: Some(Some(200)),
            ..ContactChanges::default()
        };
        assert!(is_manual_date_change(&current, &changes));
    }

    #[test]
    fn absent_date_is_not_manual() {
        let current = stored(ContactFrequency::Weekly, Some(100));
        assert!(!is_manual_date_change(&current, &ContactChanges::default()));
    }

    #[test]
    fn custom_frequency_kept_is_manual() {
        let current = stored(ContactFrequency::Custom, Some(100));
        let changes = ContactChanges {
            contact_frequency: Some(ContactFrequency::Custom),
            ..ContactChanges::default()
        };
        assert!(is_manual_date_change(&current, &changes));
    }

    #[test]
    fn leaving_custom_is_not_manual() {
        let current = stored(ContactFrequency::Custom, Some(100));
        let changes = ContactChanges {
            contact_frequency: Some(ContactFrequency::Weekly),
            next_contact_date: Some(Some(100)),
            ..ContactChanges::default()
        };
        assert!(!is_manual_date_change(&current, &changes));
    }

    #[test]
    fn remove_and_restore_report_false_when_delete_step_removes_nothing() {
        let repo = StuckDeleteRepository::default();
        let contact = stored(ContactFrequency::Weekly, Some(100));
        repo.active.borrow_mut().insert(contact.id, contact.clone());
        let service = ContactService::with_clock(&repo, NoSequences, FixedClock(500));

        assert!(!service.remove_contact(contact.id).unwrap());
        let tombstone = repo.deleted.borrow().get(&contact.id).cloned().unwrap();
        assert_eq!(tombstone.deleted_at, Some(500));
        assert!(repo.active.borrow().contains_key(&contact.id));

        repo.active.borrow_mut().clear();
        assert!(!service.restore_contact(contact.id).unwrap());
        let restored = repo.active.borrow().get(&contact.id).cloned().unwrap();
        assert_eq!(restored, contact);
        assert!(repo.deleted.borrow().contains_key(&contact.id));
    }
}
