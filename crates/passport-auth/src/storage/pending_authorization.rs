//! Pending authorization storage trait.
//!
//! Between rendering the consent screen and receiving the user's decision,
//! the authorization request is parked in session storage. This module
//! defines that storage boundary.
//!
//! # Implementation Notes
//!
//! Implementations should:
//!
//! - Hold at most one pending request per session
//! - Make `clear` idempotent
//! - Implement `take` as a single atomic remove, so that two concurrent
//!   decisions on one session cannot both receive the request
//! - Never hand out a request again once it has been taken or cleared

use async_trait::async_trait;

use crate::AuthResult;
use crate::oauth::request::PendingAuthorization;

/// Storage trait for in-flight authorization requests.
///
/// The entry for a session is effectively single-writer: one browser session
/// drives one authorization flow at a time. Consumption through `take` is
/// the only concurrency guard.
#[async_trait]
pub trait PendingAuthorizationStore: Send + Sync {
    /// Parks a pending authorization for the session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn put(&self, session_id: &str, pending: PendingAuthorization) -> AuthResult<()>;

    /// Returns the pending authorization for the session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn get(&self, session_id: &str) -> AuthResult<Option<PendingAuthorization>>;

    /// Atomically removes and returns the pending authorization for the
    /// session.
    ///
    /// Of several concurrent calls for one session, at most one receives
    /// `Some`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn take(&self, session_id: &str) -> AuthResult<Option<PendingAuthorization>>;

    /// Removes the pending authorization for the session.
    ///
    /// Clearing a session without a pending request is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn clear(&self, session_id: &str) -> AuthResult<()>;
}
