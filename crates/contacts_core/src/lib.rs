//! Core domain logic for contact scheduling.
//! This crate is the single source of truth for contact business rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{
    Contact, ContactChanges, ContactFrequency, ContactId, ContactInput, ContactValidationError,
    ContactViolation,
};
pub use model::issue::{Issue, IssueStatus};
pub use repo::contact_repo::{
    ContactFilter, ContactRepository, ContactStore, RepoError, RepoResult,
    SqliteContactRepository,
};
pub use repo::issue_repo::{
    IssueCountsQuery, IssueRepository, OwnerStatusCount, SqliteIssueRepository,
};
pub use repo::sequence_repo::{SequenceGenerator, SqliteSequenceGenerator, CONTACTS_SEQUENCE};
pub use schedule::clock::{Clock, FixedClock, SystemClock};
pub use schedule::next_date::{set_next_contact_date, ScheduleOutcome};
pub use service::auth::{must_be_signed_in, UserContext};
pub use service::contact_service::{
    ContactListQuery, ContactPage, ContactService, ServiceError, ServiceResult, PAGE_SIZE,
};
pub use service::issue_service::{IssueService, OwnerStatusCounts};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
