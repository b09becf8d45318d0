//! Signed-in guard for handlers that mutate contacts.
//!
//! # Invariants
//! - Guarded handlers never run for anonymous callers.
//! - The guard is opt-in; unguarded handlers stay callable directly.

use crate::service::contact_service::{ServiceError, ServiceResult};
use log::info;

/// Caller identity resolved by the transport layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserContext {
    pub signed_in: bool,
    pub given_name: Option<String>,
    pub email: Option<String>,
}

impl UserContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(email: impl Into<String>) -> Self {
        Self {
            signed_in: true,
            given_name: None,
            email: Some(email.into()),
        }
    }
}

/// Runs `handler` only when `user` is signed in.
pub fn must_be_signed_in<T>(
    user: &UserContext,
    handler: impl FnOnce() -> ServiceResult<T>,
) -> ServiceResult<T> {
    if !user.signed_in {
        info!("event=auth_guard module=service status=denied");
        return Err(ServiceError::Unauthenticated);
    }
    handler()
}
