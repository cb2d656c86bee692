//! Grant issuance on the approve path.
//!
//! Minting authorization codes and implicit access tokens involves signing
//! and persistence that live outside this crate. The decision engine only
//! needs the result, so issuance sits behind the [`GrantIssuer`] trait.

use async_trait::async_trait;
use serde::Serialize;

use crate::AuthResult;
use crate::oauth::request::AuthorizationRequest;

/// Credential produced for an approved authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssuedGrant {
    /// Authorization code to be exchanged at the token endpoint.
    Code {
        /// The encoded authorization code.
        code: String,
    },
    /// Access token delivered directly (implicit grant).
    AccessToken {
        /// The encoded bearer token.
        access_token: String,
        /// Token type, usually `Bearer`.
        token_type: String,
        /// Lifetime in seconds.
        expires_in: i64,
    },
}

/// Issues the credential for an approved request.
///
/// The request handed to the issuer has `approved = true` and carries the
/// resolved redirect URI.
#[async_trait]
pub trait GrantIssuer: Send + Sync {
    /// Issues a code or token for `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if issuance fails. The pending request has already
    /// been consumed at this point and is not restored.
    async fn issue(&self, request: &AuthorizationRequest) -> AuthResult<IssuedGrant>;
}
