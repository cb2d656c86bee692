//! Access token storage trait.
//!
//! This module defines the persistence boundary for access token records.
//! The store exclusively owns token state; callers never cache it.
//!
//! # Security Considerations
//!
//! - Revocation must be a single conditional update keyed by id
//! - `revoked` is sticky: no write, including `save`, may turn it back off
//! - Validity queries must filter on both `revoked` and `expires_at`
//! - Reads are not isolated against concurrent revocation; callers that need
//!   a fresh answer must re-check at the point of use

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::types::AccessToken;

/// Ordering applied when selecting a valid token for a user and client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidTokenOrder {
    /// Any qualifying token; the store returns whichever it finds first.
    Any,
    /// The qualifying token with the latest `expires_at`.
    LatestExpiry,
}

/// Storage trait for access token records.
///
/// # Implementations
///
/// Implementations are provided in separate crates:
/// - `passport-auth-memory` - in-memory storage backend
///
/// # Example Implementation
///
/// ```ignore
/// use passport_auth::storage::TokenStore;
/// use passport_auth::AuthResult;
///
/// struct SqlTokenStore { /* connection pool */ }
///
/// #[async_trait::async_trait]
/// impl TokenStore for SqlTokenStore {
///     async fn mark_revoked(&self, id: &str) -> AuthResult<u64> {
///         // UPDATE oauth_access_tokens SET revoked = true WHERE id = $1
///         # unimplemented!()
///     }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persists a new token record.
    ///
    /// # Errors
    ///
    /// Returns an error if a token with the same id exists or the storage
    /// operation fails.
    async fn create(&self, token: &AccessToken) -> AuthResult<()>;

    /// Finds a token by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<AccessToken>>;

    /// Finds a token by id, only if it is owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id_and_user(&self, id: &str, user_id: &str)
    -> AuthResult<Option<AccessToken>>;

    /// Lists every token owned by `user_id`, regardless of validity.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list_by_user(&self, user_id: &str) -> AuthResult<Vec<AccessToken>>;

    /// Finds a token for `user_id` and `client_id` that is not revoked and
    /// expires strictly after `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_valid(
        &self,
        user_id: &str,
        client_id: &str,
        now: OffsetDateTime,
        order: ValidTokenOrder,
    ) -> AuthResult<Option<AccessToken>>;

    /// Sets `revoked = true` on the token with the given id.
    ///
    /// # Returns
    ///
    /// Returns the number of records matched (0 or 1).
    ///
    /// # Idempotency
    ///
    /// Revoking an already-revoked or unknown token must succeed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn mark_revoked(&self, id: &str) -> AuthResult<u64>;

    /// Writes the full record back, creating it if it does not exist.
    ///
    /// If the stored record is already revoked, the written record stays
    /// revoked whatever `token.revoked` says. The check and the write must
    /// be one atomic update.
    ///
    /// # Returns
    ///
    /// Returns the record as persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn save(&self, token: &AccessToken) -> AuthResult<AccessToken>;
}
