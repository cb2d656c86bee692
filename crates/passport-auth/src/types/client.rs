//! OAuth 2.0 client as seen by the decision engine.
//!
//! The client registration itself lives elsewhere; the engine only reads the
//! registered redirect URIs from the snapshot carried by the pending request.

use serde::{Deserialize, Serialize};

// =============================================================================
// Redirect URIs
// =============================================================================

/// Registered redirect URIs: either a single URI or an ordered list.
///
/// Registration order is significant. When a requested redirect URI is not
/// registered, the decision engine falls back to the first entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RedirectUris {
    /// A single registered URI.
    One(String),
    /// Several registered URIs, in registration order.
    Many(Vec<String>),
}

impl RedirectUris {
    /// Returns the registered URIs as an ordered slice.
    ///
    /// A single URI is normalized into a one-element slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(uri) => std::slice::from_ref(uri),
            Self::Many(uris) => uris.as_slice(),
        }
    }

    /// Returns the first non-empty registered URI.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.as_slice()
            .iter()
            .map(String::as_str)
            .find(|uri| !uri.is_empty())
    }

    /// Checks whether `uri` exactly matches a registered URI.
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.as_slice().iter().any(|registered| registered == uri)
    }

    /// Returns `true` if no URI is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().iter().all(String::is_empty)
    }
}

impl From<String> for RedirectUris {
    fn from(uri: String) -> Self {
        Self::One(uri)
    }
}

impl From<&str> for RedirectUris {
    fn from(uri: &str) -> Self {
        Self::One(uri.to_string())
    }
}

impl From<Vec<String>> for RedirectUris {
    fn from(uris: Vec<String>) -> Self {
        Self::Many(uris)
    }
}

// =============================================================================
// Client
// =============================================================================

/// OAuth 2.0 client registration snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Human-readable display name shown on the consent screen.
    #[serde(default)]
    pub name: String,

    /// Pre-registered redirect URIs.
    pub redirect_uris: RedirectUris,

    /// Whether the client registration has been revoked.
    #[serde(default)]
    pub revoked: bool,
}

impl Client {
    /// Creates a client with the given identifier and redirect URIs.
    #[must_use]
    pub fn new(client_id: impl Into<String>, redirect_uris: impl Into<RedirectUris>) -> Self {
        Self {
            client_id: client_id.into(),
            name: String::new(),
            redirect_uris: redirect_uris.into(),
            revoked: false,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Validates the client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client id is empty or no redirect URI is
    /// registered.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.redirect_uris.is_empty() {
            return Err(ClientValidationError::NoRedirectUris);
        }

        Ok(())
    }

    /// Checks if the given redirect URI is registered for this client.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.contains(uri)
    }
}

/// Errors that can occur during client validation.
#[derive(Debug, thiserror::Error)]
pub enum ClientValidationError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// At least one redirect URI must be registered.
    #[error("At least one redirect URI must be registered")]
    NoRedirectUris,
}

// =============================================================================
// Tests
// =============================================================================
