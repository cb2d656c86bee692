//! Session-keyed pending authorization storage.

use async_trait::async_trait;
use dashmap::DashMap;

use passport_auth::AuthResult;
use passport_auth::oauth::PendingAuthorization;
use passport_auth::storage::PendingAuthorizationStore;

/// Pending authorization requests keyed by session id.
#[derive(Debug, Default)]
pub struct InMemoryPendingAuthorizationStore {
    pending: DashMap<String, PendingAuthorization>,
}

impl InMemoryPendingAuthorizationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of pending requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no request is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[async_trait]
impl PendingAuthorizationStore for InMemoryPendingAuthorizationStore {
    async fn put(&self, session_id: &str, pending: PendingAuthorization) -> AuthResult<()> {
        self.pending.insert(session_id.to_string(), pending);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> AuthResult<Option<PendingAuthorization>> {
        Ok(self.pending.get(session_id).map(|entry| entry.value().clone()))
    }

    async fn take(&self, session_id: &str) -> AuthResult<Option<PendingAuthorization>> {
        Ok(self.pending.remove(session_id).map(|(_, pending)| pending))
    }

    async fn clear(&self, session_id: &str) -> AuthResult<()> {
        if self.pending.remove(session_id).is_none() {
            tracing::trace!(session_id = %session_id, "No pending authorization to clear");
        }
        Ok(())
    }
}
