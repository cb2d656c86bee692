//! Token lifecycle manager.
//!
//! # Validity
//!
//! A token is valid at `now` iff `!revoked && expires_at > now`. The
//! comparison is strict: a token expiring exactly at `now` is invalid.
//!
//! # Revocation
//!
//! Revocation is a one-way flag update. It is idempotent and never fails for
//! an unknown id. [`is_revoked`](TokenLifecycleManager::is_revoked) treats a
//! missing token as revoked.

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::storage::{TokenStore, ValidTokenOrder};
use crate::token::clock::{Clock, SystemClock};
use crate::types::{AccessToken, Client, NewAccessToken};

/// Applies domain rules to access tokens held by a [`TokenStore`].
pub struct TokenLifecycleManager {
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
}

impl TokenLifecycleManager {
    /// Creates a manager over `store` using the system clock.
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Creates and persists a new token.
    ///
    /// The token starts unrevoked. Its id is generated unless the attributes
    /// carry one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the attributes are incomplete, or a storage
    /// error if persisting fails.
    pub async fn create(&self, attributes: NewAccessToken) -> AuthResult<AccessToken> {
        attributes.validate()?;

        let now = self.clock.now();
        let token = AccessToken {
            id: attributes
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            user_id: attributes.user_id,
            client_id: attributes.client_id,
            name: attributes.name,
            scopes: attributes.scopes,
            revoked: false,
            created_at: now,
            updated_at: now,
            expires_at: attributes.expires_at,
        };

        self.store.create(&token).await?;

        tracing::debug!(
            token_id = %token.id,
            client_id = %token.client_id,
            expires_at = %token.expires_at,
            "Access token created"
        );

        Ok(token)
    }

    /// Finds a token by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn find(&self, id: &str) -> AuthResult<Option<AccessToken>> {
        self.store.find_by_id(id).await
    }

    /// Finds a token by id, only if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn find_for_user(&self, id: &str, user_id: &str) -> AuthResult<Option<AccessToken>> {
        self.store.find_by_id_and_user(id, user_id).await
    }

    /// Lists all tokens of a user, including revoked and expired ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn for_user(&self, user_id: &str) -> AuthResult<Vec<AccessToken>> {
        self.store.list_by_user(user_id).await
    }

    /// Returns any valid token for the user and client.
    ///
    /// When several qualify, which one is returned is unspecified. Use
    /// [`find_valid_token`](Self::find_valid_token) for the freshest one.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn get_valid_token(
        &self,
        user_id: &str,
        client: &Client,
    ) -> AuthResult<Option<AccessToken>> {
        self.valid_token(user_id, client, ValidTokenOrder::Any).await
    }

    /// Returns the valid token with the latest expiry for the user and client.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn find_valid_token(
        &self,
        user_id: &str,
        client: &Client,
    ) -> AuthResult<Option<AccessToken>> {
        self.valid_token(user_id, client, ValidTokenOrder::LatestExpiry)
            .await
    }

    async fn valid_token(
        &self,
        user_id: &str,
        client: &Client,
        order: ValidTokenOrder,
    ) -> AuthResult<Option<AccessToken>> {
        self.store
            .find_valid(user_id, &client.client_id, self.clock.now(), order)
            .await
    }

    /// Revokes a token.
    ///
    /// Revoking an already-revoked or unknown token is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn revoke(&self, id: &str) -> AuthResult<()> {
        let matched = self.store.mark_revoked(id).await?;

        if matched == 0 {
            tracing::debug!(token_id = %id, "Revoke matched no access token");
        } else {
            tracing::info!(token_id = %id, "Access token revoked");
        }

        Ok(())
    }

    /// Returns `true` if the token is revoked or does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails. A storage failure is
    /// never reported as "not revoked".
    pub async fn is_revoked(&self, id: &str) -> AuthResult<bool> {
        Ok(self
            .store
            .find_by_id(id)
            .await?
            .is_none_or(|token| token.revoked))
    }

    /// Writes a modified token back to storage.
    ///
    /// A token already revoked in storage stays revoked, even when `token`
    /// is a stale copy read before the revocation. `token` is refreshed
    /// with the persisted record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn save(&self, token: &mut AccessToken) -> AuthResult<()> {
        token.updated_at = self.clock.now();
        let saved = self.store.save(token).await?;
        *token = saved;
        Ok(())
    }

    /// Returns the current instant of the configured clock.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }
}
