//! Pending authorization request types.
//!
//! When the authorization endpoint has validated an incoming request and the
//! consent screen is shown, the request is parked in session storage as a
//! [`PendingAuthorization`]. The user's decision later consumes it exactly
//! once.
//!
//! # Lifecycle
//!
//! ```text
//! Pending ──deny──► Consumed (error redirect)
//!    │
//!    └────approve──► Consumed (success redirect)
//! ```
//!
//! There are no other transitions. Deciding a consumed request fails with
//! `PreconditionFailed`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::{Client, GrantType};

/// Validated authorization request awaiting the resource owner's decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    /// Snapshot of the requesting client.
    pub client: Client,

    /// Grant type that produced the request.
    pub grant_type: GrantType,

    /// Redirect URI the client asked to return to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Client-supplied CSRF state, echoed back unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Requested scopes.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Authenticated resource owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Whether the resource owner approved the request.
    #[serde(default)]
    pub approved: bool,
}

impl AuthorizationRequest {
    /// Creates a request for `client` using `grant_type`.
    #[must_use]
    pub fn new(client: Client, grant_type: GrantType) -> Self {
        Self {
            client,
            grant_type,
            redirect_uri: None,
            state: None,
            scopes: Vec::new(),
            user_id: None,
            approved: false,
        }
    }

    /// Sets the requested redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Sets the state parameter.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Sets the requested scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the authenticated resource owner.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Returns the client identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client.client_id
    }

    /// Returns the requested redirect URI, treating an empty value as absent.
    #[must_use]
    pub fn requested_redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref().filter(|uri| !uri.is_empty())
    }
}

/// Authorization request parked in session storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAuthorization {
    /// The validated request.
    pub request: AuthorizationRequest,

    /// Token embedded in the consent form. When present, the decision must
    /// carry the same value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// When the request was parked.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl PendingAuthorization {
    /// Wraps a request for storage.
    #[must_use]
    pub fn new(request: AuthorizationRequest) -> Self {
        Self {
            request,
            auth_token: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Attaches the consent form token.
    #[must_use]
    pub fn with_auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = Some(auth_token.into());
        self
    }

    /// Checks a submitted consent form token.
    ///
    /// A decision that submits no token passes. A submitted token must match
    /// the stored one, and fails when nothing was stored.
    #[must_use]
    pub fn accepts_auth_token(&self, submitted: Option<&str>) -> bool {
        match (self.auth_token.as_deref(), submitted) {
            (_, None) => true,
            (Some(expected), Some(given)) => expected == given,
            (None, Some(_)) => false,
        }
    }
}
