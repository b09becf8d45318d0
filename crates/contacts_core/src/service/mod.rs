//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, scheduling and repository calls into the
//!   contact handlers.
//! - Keep transport layers decoupled from storage details.

pub mod auth;
pub mod contact_service;
pub mod issue_service;
