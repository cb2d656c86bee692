//! Authorization decision endpoint handlers.
//!
//! # Flow
//!
//! ```text
//! POST /oauth/authorize (form data)
//!     ├─► pending request → Issue grant → 302 to client
//!     └─► no pending request → 400 JSON error
//!
//! DELETE /oauth/authorize (form data)
//!     ├─► pending request → 302 with error=access_denied
//!     └─► no pending request → 400 JSON error
//! ```

use std::sync::Arc;

use axum::Form;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde::Deserialize;
use url::form_urlencoded;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::{AuthorizationDecisionEngine, DecisionParams, GrantIssuer, RedirectTarget};

/// State for the decision handlers.
#[derive(Clone)]
pub struct DecisionState {
    /// Decision engine.
    pub engine: Arc<AuthorizationDecisionEngine>,
    /// Issuer used on approval.
    pub issuer: Arc<dyn GrantIssuer>,
}

impl DecisionState {
    /// Creates handler state.
    pub fn new(engine: Arc<AuthorizationDecisionEngine>, issuer: Arc<dyn GrantIssuer>) -> Self {
        Self { engine, issuer }
    }
}

/// Form submitted by the consent screen.
#[derive(Debug, Deserialize)]
pub struct DecisionForm {
    /// Session holding the pending request.
    pub session_id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl DecisionForm {
    /// Converts the form into engine parameters.
    ///
    /// `Form` has already percent-decoded the state, while the deny redirect
    /// inserts it verbatim, so it is encoded again here.
    fn params(&self) -> DecisionParams {
        DecisionParams {
            state: self
                .state
                .as_deref()
                .map(|state| form_urlencoded::byte_serialize(state.as_bytes()).collect()),
            auth_token: self.auth_token.clone(),
        }
    }
}

/// Handles the resource owner's approval.
pub async fn approve_handler(
    State(state): State<DecisionState>,
    Form(form): Form<DecisionForm>,
) -> Result<Response, AuthError> {
    let target = state
        .engine
        .approve(&form.session_id, &form.params(), state.issuer.as_ref())
        .await?;
    found(target)
}

/// Handles the resource owner's denial.
pub async fn deny_handler(
    State(state): State<DecisionState>,
    Form(form): Form<DecisionForm>,
) -> Result<Response, AuthError> {
    let target = state.engine.deny(&form.session_id, &form.params()).await?;
    found(target)
}

/// Renders a `302 Found` with an empty body.
fn found(target: RedirectTarget) -> AuthResult<Response> {
    let location = HeaderValue::from_str(target.location())
        .map_err(|_| AuthError::invalid_request("Redirect URI is not a valid header value"))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Builds the decision routes.
///
/// - `POST /oauth/authorize` approves
/// - `DELETE /oauth/authorize` denies
pub fn decision_routes(state: DecisionState) -> Router {
    Router::new()
        .route("/oauth/authorize", post(approve_handler).delete(deny_handler))
        .with_state(state)
}
