//! Access token record.
//!
//! This module defines the persisted access token and the attributes
//! needed to create one. Signing or encoding the bearer value is handled
//! elsewhere; the record only tracks ownership, revocation and expiry.
//!
//! # Lifecycle
//!
//! - Created with `revoked = false`
//! - `revoked` only ever moves from `false` to `true`
//! - Expiry is derived from `expires_at`, the record is not touched
//! - Records are never deleted here; pruning is a maintenance concern

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::error::AuthError;

/// Access token stored by a [`TokenStore`](crate::storage::TokenStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// Unique token identifier.
    pub id: String,

    /// Resource owner the token was issued for.
    /// `None` for tokens issued to a client acting on its own behalf.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Client the token was issued to.
    pub client_id: String,

    /// Optional label, used for personal access tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Granted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Whether the token has been revoked.
    pub revoked: bool,

    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the record was last written.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,

    /// Instant after which the token is no longer valid.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AccessToken {
    /// Returns `true` if the token is usable at `now`.
    ///
    /// A token is valid when it is not revoked and `expires_at` is strictly
    /// after `now`. A token expiring exactly at `now` is already invalid.
    #[must_use]
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        !self.revoked && self.expires_at > now
    }

    /// Returns `true` if the token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    /// Returns `true` if the token belongs to the given user.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }
}

/// Attributes for creating a new access token.
///
/// There is no implicit expiry: callers always supply `expires_at`, typically
/// via [`TokenConfig::expires_at`](crate::config::TokenConfig::expires_at).
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccessToken {
    /// Explicit identifier. Generated when absent.
    #[serde(default)]
    pub id: Option<String>,

    /// Resource owner.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Issuing client.
    #[serde(default)]
    pub client_id: String,

    /// Optional label.
    #[serde(default)]
    pub name: Option<String>,

    /// Granted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Expiry instant.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl NewAccessToken {
    /// Creates attributes for a token owned by `user_id` and issued to `client_id`.
    #[must_use]
    pub fn new(
        user_id: Option<String>,
        client_id: impl Into<String>,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: None,
            user_id,
            client_id: client_id.into(),
            name: None,
            scopes: Vec::new(),
            expires_at,
        }
    }

    /// Uses an explicit token identifier instead of a generated one.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the granted scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the token label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Validates the creation attributes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if neither a user nor a client is given, or
    /// if an explicit id is empty.
    pub fn validate(&self) -> AuthResult<()> {
        let has_user = self.user_id.as_deref().is_some_and(|u| !u.is_empty());
        if !has_user && self.client_id.is_empty() {
            return Err(AuthError::invalid_request(
                "Access token requires a user_id or a client_id",
            ));
        }

        if self.id.as_deref().is_some_and(str::is_empty) {
            return Err(AuthError::invalid_request("Access token id cannot be empty"));
        }

        Ok(())
    }
}
