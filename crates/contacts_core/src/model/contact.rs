//! Contact domain model.
//!
//! # Responsibility
//! - Define the canonical contact record and its partial-update change set.
//! - Own business validation for contact input.
//!
//! # Invariants
//! - `id` is assigned once by the sequence generator and never reused.
//! - At least one of `email`/`phone`/`linkedin` is non-empty on valid records.
//! - `next_contact_date` is `None`, a manual override, or derived from
//!   `contact_frequency` by the scheduler.
//! - `deleted_at` is only set while the row lives in the deleted store.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Public identifier assigned by the `contacts` sequence.
pub type ContactId = i64;

const MIN_NAME_CHARS: usize = 3;
const LINKEDIN_DOMAIN_MARKER: &str = "linkedin.com/";
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*",
        r"@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$"
    ))
    .expect("valid email regex")
});

/// How often a contact should be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContactFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Biannual,
    Yearly,
    /// Date is maintained by hand.
    Custom,
    None,
}

impl ContactFrequency {
    /// Fixed calendar-day offset for scheduled frequencies.
    ///
    /// Returns `None` for `Custom` and `None`, which never produce a
    /// computed date.
    pub fn interval_days(self) -> Option<i64> {
        match self {
            Self::Weekly => Some(7),
            Self::Biweekly => Some(14),
            Self::Monthly => Some(30),
            Self::Quarterly => Some(91),
            Self::Biannual => Some(182),
            Self::Yearly => Some(365),
            Self::Custom | Self::None => None,
        }
    }

    /// Interval in epoch milliseconds.
    pub fn interval_ms(self) -> Option<i64> {
        self.interval_days().map(|days| days * DAY_MS)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Biweekly => "Biweekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Biannual => "Biannual",
            Self::Yearly => "Yearly",
            Self::Custom => "Custom",
            Self::None => "None",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Weekly" => Some(Self::Weekly),
            "Biweekly" => Some(Self::Biweekly),
            "Monthly" => Some(Self::Monthly),
            "Quarterly" => Some(Self::Quarterly),
            "Biannual" => Some(Self::Biannual),
            "Yearly" => Some(Self::Yearly),
            "Custom" => Some(Self::Custom),
            "None" => Some(Self::None),
            _ => None,
        }
    }
}

/// Canonical contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Serialized as `LinkedIn` to match the external schema.
    #[serde(rename = "LinkedIn")]
    pub linkedin: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub active_status: bool,
    pub contact_frequency: ContactFrequency,
    pub priority: Option<String>,
    pub familiarity: Option<String>,
    /// Unix epoch milliseconds.
    pub last_contact_date: Option<i64>,
    /// Unix epoch milliseconds.
    pub next_contact_date: Option<i64>,
    pub notes: Option<String>,
    pub context_space: Option<String>,
    /// Soft-delete stamp in epoch milliseconds, serialized as `deleted`.
    #[serde(rename = "deleted", default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

/// New-contact payload accepted by the add handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "LinkedIn")]
    pub linkedin: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub active_status: bool,
    pub contact_frequency: Option<ContactFrequency>,
    pub priority: Option<String>,
    pub familiarity: Option<String>,
    pub last_contact_date: Option<i64>,
    pub next_contact_date: Option<i64>,
    pub notes: Option<String>,
    pub context_space: Option<String>,
}

impl ContactInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builds the record persisted for this input under `id`.
    ///
    /// Missing frequency defaults to `ContactFrequency::None`.
    pub fn into_contact(self, id: ContactId) -> Contact {
        Contact {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            linkedin: self.linkedin,
            company: self.company,
            title: self.title,
            active_status: self.active_status,
            contact_frequency: self.contact_frequency.unwrap_or(ContactFrequency::None),
            priority: self.priority,
            familiarity: self.familiarity,
            last_contact_date: self.last_contact_date,
            next_contact_date: self.next_contact_date,
            notes: self.notes,
            context_space: self.context_space,
            deleted_at: None,
        }
    }
}

/// Partial update for one contact.
///
/// Outer `None` means "field not present in the change set". For nullable
/// fields the inner `None` clears the stored value, so `{"email": null}`
/// and a missing `email` decode differently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactChanges {
    pub name: Option<String>,
    #[serde(with = "serde_with::rust::double_option")]
    pub email: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub phone: Option<Option<String>>,
    #[serde(rename = "LinkedIn", with = "serde_with::rust::double_option")]
    pub linkedin: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub company: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub title: Option<Option<String>>,
    pub active_status: Option<bool>,
    pub contact_frequency: Option<ContactFrequency>,
    #[serde(with = "serde_with::rust::double_option")]
    pub priority: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub familiarity: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub last_contact_date: Option<Option<i64>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub next_contact_date: Option<Option<i64>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub notes: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub context_space: Option<Option<String>>,
}

impl ContactChanges {
    /// Whether the change set touches a field that re-triggers scheduling
    /// and validation.
    ///
    /// Date fields alone are written through without re-evaluation.
    pub fn touches_tracked_fields(&self) -> bool {
        self.contact_frequency.is_some()
            || self.email.is_some()
            || self.notes.is_some()
            || self.active_status.is_some()
            || self.name.is_some()
            || self.company.is_some()
            || self.title.is_some()
            || self.phone.is_some()
            || self.linkedin.is_some()
            || self.priority.is_some()
            || self.familiarity.is_some()
            || self.context_space.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One business-rule violation found by [`Contact::violations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactViolation {
    NameTooShort,
    MissingContactMethod,
    InvalidEmail,
    InvalidLinkedin,
}

impl Display for ContactViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameTooShort => write!(
                f,
                "Field \"name\" must be at least {MIN_NAME_CHARS} characters long."
            ),
            Self::MissingContactMethod => {
                write!(f, "At least one contact mean should be provided.")
            }
            Self::InvalidEmail => write!(f, "You have entered an invalid email address!"),
            Self::InvalidLinkedin => write!(f, "You have entered an invalid linkedin adress!"),
        }
    }
}

/// User-input error carrying every violation found on one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactValidationError {
    pub violations: Vec<ContactViolation>,
}

impl ContactValidationError {
    /// Human-readable messages in detection order.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid input(s): {}", self.messages().join(" "))
    }
}

impl Error for ContactValidationError {}

impl Contact {
    /// Collects all validation violations; an empty list means valid.
    pub fn violations(&self) -> Vec<ContactViolation> {
        let mut violations = Vec::new();

        if self.name.chars().count() < MIN_NAME_CHARS {
            violations.push(ContactViolation::NameTooShort);
        }

        let email = non_empty(self.email.as_deref());
        let phone = non_empty(self.phone.as_deref());
        let linkedin = non_empty(self.linkedin.as_deref());

        if email.is_none() && phone.is_none() && linkedin.is_none() {
            violations.push(ContactViolation::MissingContactMethod);
        }
        if let Some(email) = email {
            if !EMAIL_RE.is_match(email) {
                violations.push(ContactViolation::InvalidEmail);
            }
        }
        if let Some(linkedin) = linkedin {
            if !linkedin.contains(LINKEDIN_DOMAIN_MARKER) {
                violations.push(ContactViolation::InvalidLinkedin);
            }
        }

        violations
    }

    /// Validates business rules, reporting all violations at once.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        let violations = self.violations();
        if violations.is_empty() {
            return Ok(());
        }
        Err(ContactValidationError { violations })
    }

    /// Overlays every field present in `changes`.
    pub fn apply_changes(&mut self, changes: &ContactChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(email) = &changes.email {
            self.email = email.clone();
        }
        if let Some(phone) = &changes.phone {
            self.phone = phone.clone();
        }
        if let Some(linkedin) = &changes.linkedin {
            self.linkedin = linkedin.clone();
        }
        if let Some(company) = &changes.company {
            self.company = company.clone();
        }
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(active_status) = changes.active_status {
            self.active_status = active_status;
        }
        if let Some(frequency) = changes.contact_frequency {
            self.contact_frequency = frequency;
        }
        if let Some(priority) = &changes.priority {
            self.priority = priority.clone();
        }
        if let Some(familiarity) = &changes.familiarity {
            self.familiarity = familiarity.clone();
        }
        if let Some(last) = changes.last_contact_date {
            self.last_contact_date = last;
        }
        if let Some(next) = changes.next_contact_date {
            self.next_contact_date = next;
        }
        if let Some(notes) = &changes.notes {
            self.notes = notes.clone();
        }
        if let Some(context_space) = &changes.context_space {
            self.context_space = context_space.clone();
        }
    }

    /// Stamps this record as softly deleted.
    pub fn mark_deleted(&mut self, deleted_at: i64) {
        self.deleted_at = Some(deleted_at);
    }

    /// Clears the soft-delete stamp.
    pub fn clear_deleted(&mut self) {
        self.deleted_at = None;
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{ContactFrequency, ContactInput, ContactViolation};

    #[test]
    fn frequency_intervals_match_calendar_offsets() {
        assert_eq!(ContactFrequency::Weekly.interval_days(), Some(7));
        assert_eq!(ContactFrequency::Biweekly.interval_days(), Some(14));
        assert_eq!(ContactFrequency::Monthly.interval_days(), Some(30));
        assert_eq!(ContactFrequency::Quarterly.interval_days(), Some(91));
        assert_eq!(ContactFrequency::Biannual.interval_days(), Some(182));
        assert_eq!(ContactFrequency::Yearly.interval_days(), Some(365));
        assert_eq!(ContactFrequency::Custom.interval_days(), None);
        assert_eq!(ContactFrequency::None.interval_days(), None);
    }

    #[test]
    fn frequency_text_roundtrip_is_exact() {
        for frequency in [
            ContactFrequency::Weekly,
            ContactFrequency::Biannual,
            ContactFrequency::Custom,
            ContactFrequency::None,
        ] {
            assert_eq!(ContactFrequency::parse(frequency.as_str()), Some(frequency));
        }
        assert_eq!(ContactFrequency::parse("weekly"), None);
    }

    #[test]
    fn email_pattern_accepts_dotted_and_dashed_parts() {
        let mut input = ContactInput::new("Ada Lovelace");
        input.email = Some("ada.king-l@analytical.engine.org".to_string());
        assert!(input.into_contact(1).violations().is_empty());
    }

    #[test]
    fn email_pattern_rejects_long_tld_and_missing_at() {
        for email in ["ada@example.museum", "ada.example.com", "ada@.com"] {
            let mut input = ContactInput::new("Ada Lovelace");
            input.email = Some(email.to_string());
            assert_eq!(
                input.into_contact(1).violations(),
                vec![ContactViolation::InvalidEmail],
                "email `{email}` should be rejected"
            );
        }
    }

    #[test]
    fn name_length_counts_chars_not_bytes() {
        let mut input = ContactInput::new("Zoë");
        input.phone = Some("555-0100".to_string());
        assert!(input.into_contact(1).validate().is_ok());
    }
}
