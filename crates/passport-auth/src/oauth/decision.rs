//! Authorization decision engine.
//!
//! This module turns a pending authorization request plus the resource
//! owner's decision into a single redirect back to the client.
//!
//! # Security Requirements
//!
//! - The redirect always targets a registered URI; an unregistered request
//!   URI silently falls back to the first registered one
//! - A pending request is consumed exactly once, by either path
//! - A session without a pending request fails with `PreconditionFailed` and
//!   never produces a redirect
//!
//! # Usage
//!
//! ```ignore
//! use passport_auth::oauth::{AuthorizationDecisionEngine, DecisionParams};
//!
//! let engine = AuthorizationDecisionEngine::new(pending_store, DecisionConfig::default());
//!
//! let params = DecisionParams::with_state("xyz123");
//! let redirect = engine.deny(&session_id, &params).await?;
//! ```

use std::sync::Arc;

use serde::Deserialize;

use crate::AuthResult;
use crate::config::DecisionConfig;
use crate::error::AuthError;
use crate::oauth::grant::GrantIssuer;
use crate::oauth::redirect::{
    RedirectTarget, access_denied_redirect, grant_redirect, resolve_redirect_uri,
};
use crate::oauth::request::PendingAuthorization;
use crate::storage::PendingAuthorizationStore;

/// Parameters of the incoming decision request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionParams {
    /// State carried by the current request. On deny this value, not the
    /// stored one, is echoed back.
    #[serde(default)]
    pub state: Option<String>,

    /// Consent form token.
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl DecisionParams {
    /// Creates parameters carrying only a state value.
    #[must_use]
    pub fn with_state(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            auth_token: None,
        }
    }

    /// Sets the consent form token.
    #[must_use]
    pub fn auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = Some(auth_token.into());
        self
    }
}

/// Decides pending authorization requests.
pub struct AuthorizationDecisionEngine {
    /// Session-scoped storage of pending requests.
    pending_store: Arc<dyn PendingAuthorizationStore>,

    /// Engine configuration.
    config: DecisionConfig,
}

impl AuthorizationDecisionEngine {
    /// Creates a new decision engine.
    #[must_use]
    pub fn new(pending_store: Arc<dyn PendingAuthorizationStore>, config: DecisionConfig) -> Self {
        Self {
            pending_store,
            config,
        }
    }

    /// Denies the pending request for `session_id`.
    ///
    /// The pending request is consumed whether or not a redirect can be
    /// built.
    ///
    /// # Returns
    ///
    /// A redirect to `{uri}{sep}error=access_denied&state={state}` where
    /// `state` is taken verbatim from `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No request is pending for the session (`PreconditionFailed`)
    /// - The consent form token does not match (`InvalidAuthToken`)
    /// - The client has no registered redirect URI (`InvalidClient`)
    /// - The storage operation fails (`Storage`)
    pub async fn deny(
        &self,
        session_id: &str,
        params: &DecisionParams,
    ) -> AuthResult<RedirectTarget> {
        let pending = self.consume(session_id, params).await?;
        let request = &pending.request;

        let uri = resolve_redirect_uri(request)?;

        tracing::info!(
            client_id = %request.client_id(),
            grant_type = %request.grant_type,
            "Authorization request denied"
        );

        Ok(access_denied_redirect(
            uri,
            request.grant_type,
            params.state.as_deref(),
        ))
    }

    /// Approves the pending request for `session_id`.
    ///
    /// The pending request is consumed before any check or issuance, so a
    /// failed approval cannot be retried with the same session.
    ///
    /// # Returns
    ///
    /// A redirect carrying the issued code (query) or access token
    /// (fragment), plus the state stored with the request.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No request is pending for the session (`PreconditionFailed`)
    /// - The consent form token does not match (`InvalidAuthToken`)
    /// - The request has no authenticated user (`InvalidRequest`)
    /// - The client has no registered redirect URI (`InvalidClient`)
    /// - Grant issuance or storage fails
    pub async fn approve(
        &self,
        session_id: &str,
        params: &DecisionParams,
        issuer: &dyn GrantIssuer,
    ) -> AuthResult<RedirectTarget> {
        let mut request = self.consume(session_id, params).await?.request;

        if request.user_id.is_none() {
            return Err(AuthError::invalid_request(
                "Authorization request has no authenticated user",
            ));
        }

        let uri = resolve_redirect_uri(&request)?.to_string();
        request.redirect_uri = Some(uri.clone());
        request.approved = true;

        let grant = issuer.issue(&request).await?;

        tracing::info!(
            client_id = %request.client_id(),
            grant_type = %request.grant_type,
            "Authorization request approved"
        );

        Ok(grant_redirect(
            &uri,
            request.grant_type,
            &grant,
            request.state.as_deref(),
        ))
    }

    /// Takes the pending request out of the session and checks the consent
    /// form token.
    ///
    /// The take is a single atomic remove: of two concurrent decisions on one
    /// session, the loser sees `PreconditionFailed`. A token mismatch still
    /// leaves the request consumed.
    async fn consume(
        &self,
        session_id: &str,
        params: &DecisionParams,
    ) -> AuthResult<PendingAuthorization> {
        let pending = self
            .pending_store
            .take(session_id)
            .await?
            .ok_or_else(AuthError::no_pending_request)?;

        let submitted = params.auth_token.as_deref();
        let missing = self.config.require_auth_token && submitted.is_none();
        if missing || !pending.accepts_auth_token(submitted) {
            tracing::warn!(
                client_id = %pending.request.client_id(),
                "Consent form token mismatch"
            );
            return Err(AuthError::InvalidAuthToken);
        }

        tracing::debug!(
            client_id = %pending.request.client_id(),
            grant_type = %pending.request.grant_type,
            "Resolved pending authorization request"
        );

        Ok(pending)
    }

    /// Gets the pending authorization storage reference.
    #[must_use]
    pub fn pending_store(&self) -> &Arc<dyn PendingAuthorizationStore> {
        &self.pending_store
    }

    /// Gets the engine configuration.
    #[must_use]
    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::grant::IssuedGrant;
    use crate::oauth::request::AuthorizationRequest;
    use crate::types::{Client, GrantType};
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// Mock pending authorization storage for testing.
    struct MockPendingStore {
        pending: RwLock<HashMap<String, PendingAuthorization>>,
    }

    impl MockPendingStore {
        fn new() -> Self {
            Self {
                pending: RwLock::new(HashMap::new()),
            }
        }

        fn insert(&self, session_id: &str, pending: PendingAuthorization) {
            self.pending
                .write()
                .unwrap()
                .insert(session_id.to_string(), pending);
        }

        fn contains(&self, session_id: &str) -> bool {
            self.pending.read().unwrap().contains_key(session_id)
        }
    }

    #[async_trait::async_trait]
    impl PendingAuthorizationStore for MockPendingStore {
        async fn put(&self, session_id: &str, pending: PendingAuthorization) -> AuthResult<()> {
            self.insert(session_id, pending);
            Ok(())
        }

        async fn get(&self, session_id: &str) -> AuthResult<Option<PendingAuthorization>> {
            Ok(self.pending.read().unwrap().get(session_id).cloned())
        }

        async fn take(&self, session_id: &str) -> AuthResult<Option<PendingAuthorization>> {
            Ok(self.pending.write().unwrap().remove(session_id))
        }

        async fn clear(&self, session_id: &str) -> AuthResult<()> {
            self.pending.write().unwrap().remove(session_id);
            Ok(())
        }
    }

    /// Store that holds every `take` at a barrier until two callers arrive.
    struct RendezvousPendingStore {
        inner: MockPendingStore,
        barrier: tokio::sync::Barrier,
    }

    #[async_trait::async_trait]
    impl PendingAuthorizationStore for RendezvousPendingStore {
        async fn put(&self, session_id: &str, pending: PendingAuthorization) -> AuthResult<()> {
            self.inner.put(session_id, pending).await
        }

        async fn get(&self, session_id: &str) -> AuthResult<Option<PendingAuthorization>> {
            self.inner.get(session_id).await
        }

        async fn take(&self, session_id: &str) -> AuthResult<Option<PendingAuthorization>> {
            self.barrier.wait().await;
            self.inner.take(session_id).await
        }

        async fn clear(&self, session_id: &str) -> AuthResult<()> {
            self.inner.clear(session_id).await
        }
    }

    /// Store whose reads always fail.
    struct FailingPendingStore;

    #[async_trait::async_trait]
    impl PendingAuthorizationStore for FailingPendingStore {
        async fn put(&self, _session_id: &str, _pending: PendingAuthorization) -> AuthResult<()> {
            Err(AuthError::storage("session backend unavailable"))
        }

        async fn get(&self, _session_id: &str) -> AuthResult<Option<PendingAuthorization>> {
            Err(AuthError::storage("session backend unavailable"))
        }

        async fn take(&self, _session_id: &str) -> AuthResult<Option<PendingAuthorization>> {
            Err(AuthError::storage("session backend unavailable"))
        }

        async fn clear(&self, _session_id: &str) -> AuthResult<()> {
            Err(AuthError::storage("session backend unavailable"))
        }
    }

    /// Issuer returning a fixed code or token depending on the grant type.
    struct MockIssuer;

    #[async_trait::async_trait]
    impl GrantIssuer for MockIssuer {
        async fn issue(&self, request: &AuthorizationRequest) -> AuthResult<IssuedGrant> {
            assert!(request.approved);
            Ok(match request.grant_type {
                GrantType::AuthorizationCode => IssuedGrant::Code {
                    code: "auth-code".to_string(),
                },
                GrantType::Implicit => IssuedGrant::AccessToken {
                    access_token: "access-token".to_string(),
                    token_type: "Bearer".to_string(),
                    expires_in: 3600,
                },
            })
        }
    }

    struct FailingIssuer;

    #[async_trait::async_trait]
    impl GrantIssuer for FailingIssuer {
        async fn issue(&self, _request: &AuthorizationRequest) -> AuthResult<IssuedGrant> {
            Err(AuthError::internal("signing key unavailable"))
        }
    }

    fn create_request(
        registered: Vec<&str>,
        grant_type: GrantType,
        requested: &str,
    ) -> AuthorizationRequest {
        let client = Client::new(
            "test-client",
            registered.into_iter().map(String::from).collect::<Vec<_>>(),
        );
        AuthorizationRequest::new(client, grant_type)
            .with_redirect_uri(requested)
            .with_state("stored-state")
            .with_user("user-1")
    }

    fn create_engine() -> (AuthorizationDecisionEngine, Arc<MockPendingStore>) {
        let store = Arc::new(MockPendingStore::new());
        let engine = AuthorizationDecisionEngine::new(store.clone(), DecisionConfig::default());
        (engine, store)
    }

    #[tokio::test]
    async fn test_deny_falls_back_to_first_registered_uri() {
        let (engine, store) = create_engine();
        store.insert(
            "session-1",
            PendingAuthorization::new(create_request(
                vec!["https://app.example/cb"],
                GrantType::AuthorizationCode,
                "https://evil.example/cb",
            )),
        );

        let target = engine
            .deny("session-1", &DecisionParams::with_state("xyz123"))
            .await
            .unwrap();

        assert_eq!(
            target.location(),
            "https://app.example/cb?error=access_denied&state=xyz123"
        );
        assert!(!store.contains("session-1"));
    }

    #[tokio::test]
    async fn test_deny_implicit_uses_fragment() {
        let (engine, store) = create_engine();
        store.insert(
            "session-1",
            PendingAuthorization::new(create_request(
                vec!["https://app.example/cb?foo=1"],
                GrantType::Implicit,
                "https://app.example/cb?foo=1",
            )),
        );

        let target = engine
            .deny("session-1", &DecisionParams::with_state("abc"))
            .await
            .unwrap();

        assert_eq!(
            target.location(),
            "https://app.example/cb?foo=1#error=access_denied&state=abc"
        );
    }

    #[tokio::test]
    async fn test_deny_echoes_current_state_not_stored_state() {
        let (engine, store) = create_engine();
        store.insert(
            "session-1",
            PendingAuthorization::new(create_request(
                vec!["https://app.example/cb"],
                GrantType::AuthorizationCode,
                "https://app.example/cb",
            )),
        );

        let target = engine
            .deny("session-1", &DecisionParams::with_state("fresh-state"))
            .await
            .unwrap();

        assert!(target.location().ends_with("&state=fresh-state"));
        assert!(!target.location().contains("stored-state"));
    }

    #[tokio::test]
    async fn test_deny_without_pending_request() {
        let (engine, _) = create_engine();

        let result = engine.deny("missing", &DecisionParams::default()).await;
        assert!(matches!(result, Err(AuthError::PreconditionFailed { .. })));
    }

    #[tokio::test]
    async fn test_decision_cannot_be_repeated() {
        let (engine, store) = create_engine();
        store.insert(
            "session-1",
            PendingAuthorization::new(create_request(
                vec!["https://app.example/cb"],
                GrantType::AuthorizationCode,
                "https://app.example/cb",
            )),
        );

        let params = DecisionParams::with_state("xyz");
        engine.deny("session-1", &params).await.unwrap();

        let again = engine.deny("session-1", &params).await;
        assert!(matches!(again, Err(AuthError::PreconditionFailed { .. })));

        let approve = engine.approve("session-1", &params, &MockIssuer).await;
        assert!(matches!(approve, Err(AuthError::PreconditionFailed { .. })));
    }

    #[tokio::test]
    async fn test_approve_issues_code_and_consumes() {
        let (engine, store) = create_engine();
        store.insert(
            "session-1",
            PendingAuthorization::new(create_request(
                vec!["https://app.example/cb"],
                GrantType::AuthorizationCode,
                "https://app.example/cb",
            )),
        );

        let target = engine
            .approve("session-1", &DecisionParams::default(), &MockIssuer)
            .await
            .unwrap();

        assert_eq!(
            target.location(),
            "https://app.example/cb?code=auth-code&state=stored-state"
        );
        assert!(!store.contains("session-1"));

        let again = engine
            .deny("session-1", &DecisionParams::default())
            .await;
        assert!(matches!(again, Err(AuthError::PreconditionFailed { .. })));
    }

    #[tokio::test]
    async fn test_approve_implicit_returns_token_in_fragment() {
        let (engine, store) = create_engine();
        store.insert(
            "session-1",
            PendingAuthorization::new(create_request(
                vec!["https://app.example/cb"],
                GrantType::Implicit,
                "https://other.example/cb",
            )),
        );

        let target = engine
            .approve("session-1", &DecisionParams::default(), &MockIssuer)
            .await
            .unwrap();

        assert_eq!(
            target.location(),
            "https://app.example/cb#access_token=access-token&token_type=Bearer&expires_in=3600&state=stored-state"
        );
    }

    #[tokio::test]
    async fn test_approve_consumes_even_when_issuance_fails() {
        let (engine, store) = create_engine();
        store.insert(
            "session-1",
            PendingAuthorization::new(create_request(
                vec!["https://app.example/cb"],
                GrantType::AuthorizationCode,
                "https://app.example/cb",
            )),
        );

        let result = engine
            .approve("session-1", &DecisionParams::default(), &FailingIssuer)
            .await;
        assert!(matches!(result, Err(AuthError::Internal { .. })));
        assert!(!store.contains("session-1"));
    }

    #[tokio::test]
    async fn test_approve_requires_authenticated_user() {
        let (engine, store) = create_engine();
        let mut request = create_request(
            vec!["https://app.example/cb"],
            GrantType::AuthorizationCode,
            "https://app.example/cb",
        );
        request.user_id = None;
        store.insert("session-1", PendingAuthorization::new(request));

        let result = engine
            .approve("session-1", &DecisionParams::default(), &MockIssuer)
            .await;
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));
        assert!(!store.contains("session-1"));
    }

    #[tokio::test]
    async fn test_auth_token_mismatch_consumes_request() {
        let (engine, store) = create_engine();
        store.insert(
            "session-1",
            PendingAuthorization::new(create_request(
                vec!["https://app.example/cb"],
                GrantType::AuthorizationCode,
                "https://app.example/cb",
            ))
            .with_auth_token("form-token"),
        );

        let forged = DecisionParams::with_state("xyz").auth_token("forged");
        let result = engine.deny("session-1", &forged).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthToken)));
        assert!(!store.contains("session-1"));

        let genuine = DecisionParams::with_state("xyz").auth_token("form-token");
        let retry = engine.deny("session-1", &genuine).await;
        assert!(matches!(retry, Err(AuthError::PreconditionFailed { .. })));
    }

    #[tokio::test]
    async fn test_matching_auth_token_is_accepted() {
        let (engine, store) = create_engine();
        store.insert(
            "session-1",
            PendingAuthorization::new(create_request(
                vec!["https://app.example/cb"],
                GrantType::AuthorizationCode,
                "https://app.example/cb",
            ))
            .with_auth_token("form-token"),
        );

        let genuine = DecisionParams::with_state("xyz").auth_token("form-token");
        assert!(engine.deny("session-1", &genuine).await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_decisions_issue_one_grant() {
        let store = Arc::new(RendezvousPendingStore {
            inner: MockPendingStore::new(),
            barrier: tokio::sync::Barrier::new(2),
        });
        store.inner.insert(
            "session-1",
            PendingAuthorization::new(create_request(
                vec!["https://app.example/cb"],
                GrantType::AuthorizationCode,
                "https://app.example/cb",
            )),
        );
        let engine = AuthorizationDecisionEngine::new(store.clone(), DecisionConfig::default());
        let params = DecisionParams::default();

        let (first, second) = tokio::join!(
            engine.approve("session-1", &params, &MockIssuer),
            engine.approve("session-1", &params, &MockIssuer),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes.iter().any(|r| matches!(
            r,
            Err(AuthError::PreconditionFailed { .. })
        )));
        assert!(!store.inner.contains("session-1"));
    }

    #[tokio::test]
    async fn test_concurrent_deny_and_approve_consume_once() {
        let store = Arc::new(RendezvousPendingStore {
            inner: MockPendingStore::new(),
            barrier: tokio::sync::Barrier::new(2),
        });
        store.inner.insert(
            "session-1",
            PendingAuthorization::new(create_request(
                vec!["https://app.example/cb"],
                GrantType::Implicit,
                "https://app.example/cb",
            )),
        );
        let engine = AuthorizationDecisionEngine::new(store.clone(), DecisionConfig::default());
        let params = DecisionParams::with_state("xyz");

        let (denied, approved) = tokio::join!(
            engine.deny("session-1", &params),
            engine.approve("session-1", &params, &MockIssuer),
        );

        assert!(denied.is_ok() != approved.is_ok());
    }

    #[tokio::test]
    async fn test_required_auth_token() {
        let store = Arc::new(MockPendingStore::new());
        let engine = AuthorizationDecisionEngine::new(
            store.clone(),
            DecisionConfig {
                require_auth_token: true,
            },
        );
        store.insert(
            "session-1",
            PendingAuthorization::new(create_request(
                vec!["https://app.example/cb"],
                GrantType::AuthorizationCode,
                "https://app.example/cb",
            ))
            .with_auth_token("form-token"),
        );

        let result = engine.deny("session-1", &DecisionParams::default()).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthToken)));
    }

    #[tokio::test]
    async fn test_storage_failure_is_propagated() {
        let engine = AuthorizationDecisionEngine::new(
            Arc::new(FailingPendingStore),
            DecisionConfig::default(),
        );

        let result = engine.deny("session-1", &DecisionParams::default()).await;
        assert!(matches!(result, Err(AuthError::Storage { .. })));
    }
}
