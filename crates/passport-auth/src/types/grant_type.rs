//! OAuth 2.0 grant types handled by the authorization decision flow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Grant types that reach the consent screen.
///
/// Only the redirect-based flows are represented; token-endpoint grants never
/// produce a pending authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow. Responses travel in the query string.
    AuthorizationCode,
    /// Implicit flow. Responses travel in the URI fragment.
    Implicit,
}

impl GrantType {
    /// Returns the OAuth 2.0 grant type identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Implicit => "implicit",
        }
    }

    /// Returns `true` if responses for this grant are carried in the fragment.
    #[must_use]
    pub fn uses_fragment(&self) -> bool {
        matches!(self, Self::Implicit)
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorization_code" => Ok(Self::AuthorizationCode),
            "implicit" => Ok(Self::Implicit),
            other => Err(AuthError::unsupported_grant_type(other)),
        }
    }
}
