//! Next-contact-date scheduling.
//!
//! # Responsibility
//! - Decide a contact's next contact date from activation, manual override
//!   and frequency.
//! - Isolate wall-clock reads behind the [`Clock`] trait.
//!
//! # Invariants
//! - The scheduler never reads system time directly.

pub mod clock;
pub mod next_date;
