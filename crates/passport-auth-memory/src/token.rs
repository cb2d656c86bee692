//! Access token storage.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use time::OffsetDateTime;

use passport_auth::AuthResult;
use passport_auth::error::AuthError;
use passport_auth::storage::{TokenStore, ValidTokenOrder};
use passport_auth::types::AccessToken;

/// Access token records keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: DashMap<String, AccessToken>,
}

impl InMemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if no token is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn create(&self, token: &AccessToken) -> AuthResult<()> {
        match self.tokens.entry(token.id.clone()) {
            Entry::Occupied(_) => Err(AuthError::storage(format!(
                "Access token '{}' already exists",
                token.id
            ))),
            Entry::Vacant(entry) => {
                entry.insert(token.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> AuthResult<Option<AccessToken>> {
        Ok(self.tokens.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_by_id_and_user(
        &self,
        id: &str,
        user_id: &str,
    ) -> AuthResult<Option<AccessToken>> {
        Ok(self
            .tokens
            .get(id)
            .filter(|entry| entry.is_owned_by(user_id))
            .map(|entry| entry.value().clone()))
    }

    async fn list_by_user(&self, user_id: &str) -> AuthResult<Vec<AccessToken>> {
        let mut tokens: Vec<AccessToken> = self
            .tokens
            .iter()
            .filter(|entry| entry.is_owned_by(user_id))
            .map(|entry| entry.value().clone())
            .collect();
        tokens.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(tokens)
    }

    async fn find_valid(
        &self,
        user_id: &str,
        client_id: &str,
        now: OffsetDateTime,
        order: ValidTokenOrder,
    ) -> AuthResult<Option<AccessToken>> {
        let mut candidates = self.tokens.iter().filter(|entry| {
            entry.is_owned_by(user_id) && entry.client_id == client_id && entry.is_valid_at(now)
        });

        let found = match order {
            ValidTokenOrder::Any => candidates.next().map(|entry| entry.value().clone()),
            ValidTokenOrder::LatestExpiry => candidates
                .max_by_key(|entry| entry.expires_at)
                .map(|entry| entry.value().clone()),
        };
        Ok(found)
    }

    async fn mark_revoked(&self, id: &str) -> AuthResult<u64> {
        match self.tokens.get_mut(id) {
            Some(mut entry) => {
                entry.revoked = true;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn save(&self, token: &AccessToken) -> AuthResult<AccessToken> {
        let mut saved = token.clone();
        match self.tokens.entry(token.id.clone()) {
            Entry::Occupied(mut entry) => {
                saved.revoked |= entry.get().revoked;
                entry.insert(saved.clone());
            }
            Entry::Vacant(entry) => {
                entry.insert(saved.clone());
            }
        }
        Ok(saved)
    }
}
