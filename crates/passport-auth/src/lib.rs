//! # passport-auth
//!
//! Core of an OAuth 2.0 authorization server.
//!
//! This crate provides:
//! - Authorization decisions (approve/deny) with safe redirect resolution
//! - Access token lifecycle: creation, lookup, validity and revocation
//! - Storage traits for pending requests and token records
//! - Thin axum handlers for the decision endpoints
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading and validation
//! - [`oauth`] - Authorization decision engine and redirect encoding
//! - [`token`] - Token lifecycle manager
//! - [`storage`] - Storage traits implemented by backends
//! - [`types`] - Clients, grant types and token records
//! - [`http`] - Axum handlers for the decision endpoints
//! - [`observability`] - Tracing setup

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod observability;
pub mod storage;
pub mod token;
pub mod types;

pub use crate::config::{AuthConfig, ConfigError, DecisionConfig, TokenConfig};
pub use error::{AuthError, ErrorCategory};
pub use http::{DecisionForm, DecisionState, approve_handler, decision_routes, deny_handler};
pub use oauth::{
    AuthorizationDecisionEngine, AuthorizationRequest, DecisionParams, GrantIssuer, IssuedGrant,
    PendingAuthorization, RedirectTarget,
};
pub use storage::{PendingAuthorizationStore, TokenStore, ValidTokenOrder};
pub use token::{Clock, FixedClock, SystemClock, TokenLifecycleManager};
pub use types::{AccessToken, Client, ClientValidationError, GrantType, NewAccessToken};

/// Type alias for authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use passport_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError, DecisionConfig, TokenConfig};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::http::{DecisionState, decision_routes};
    pub use crate::oauth::{
        AuthorizationDecisionEngine, AuthorizationRequest, DecisionParams, GrantIssuer,
        IssuedGrant, PendingAuthorization, RedirectTarget,
    };
    pub use crate::storage::{PendingAuthorizationStore, TokenStore, ValidTokenOrder};
    pub use crate::token::{Clock, SystemClock, TokenLifecycleManager};
    pub use crate::types::{AccessToken, Client, GrantType, NewAccessToken};
}
