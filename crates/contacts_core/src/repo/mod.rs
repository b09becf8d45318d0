//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage and sequence collaborators as traits.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories never apply business validation; services do.
//! - Missing rows are reported as `None`/`false`, not as errors.

pub mod contact_repo;
pub mod issue_repo;
pub mod sequence_repo;
