//! Domain model for contact scheduling.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own validation rules that do not depend on storage.
//!
//! # Invariants
//! - Every contact is identified by a sequence-assigned `ContactId`.
//! - Deletion moves records into a separate store, stamped with `deleted_at`.

pub mod contact;
pub mod issue;
