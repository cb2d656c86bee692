//! Authorization server configuration.
//!
//! Settings are read from an optional TOML file and overridden by
//! `PASSPORT__*` environment variables.
//!
//! # Example (TOML)
//!
//! ```toml
//! [decision]
//! require_auth_token = true
//!
//! [tokens]
//! access_token_lifetime = "1h"
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// Longest accepted access token lifetime (100 years).
pub const MAX_ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Authorization decision settings.
    pub decision: DecisionConfig,

    /// Access token settings.
    pub tokens: TokenConfig,
}

/// Authorization decision settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Reject decisions that do not submit the consent form token.
    /// When disabled, a missing token is accepted and a present one must
    /// still match.
    pub require_auth_token: bool,
}

/// Access token settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Lifetime used by callers to compute an explicit expiry.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::from_secs(365 * 24 * 3600), // 1 year
        }
    }
}

impl TokenConfig {
    /// Returns the expiry instant for a token issued at `now`.
    ///
    /// Saturates at the last representable date instead of overflowing.
    #[must_use]
    pub fn expires_at(&self, now: OffsetDateTime) -> OffsetDateTime {
        time::Duration::try_from(self.access_token_lifetime)
            .ok()
            .and_then(|lifetime| now.checked_add(lifetime))
            .unwrap_or_else(|| now.replace_date(Date::MAX))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// The configuration sources could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl AuthConfig {
    /// Loads configuration from `path` (if given and present) and the
    /// environment, then validates it.
    ///
    /// Environment overrides use the `PASSPORT` prefix and `__` as the
    /// section separator, e.g. `PASSPORT__TOKENS__ACCESS_TOKEN_LIFETIME=2h`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source is malformed and
    /// `ConfigError::InvalidValue` if validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path
            && path.exists()
        {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix("PASSPORT")
                .try_parsing(true)
                .separator("__"),
        );

        let merged: AuthConfig = builder.build()?.try_deserialize()?;
        merged.validate()?;

        tracing::debug!(
            require_auth_token = merged.decision.require_auth_token,
            access_token_lifetime = ?merged.tokens.access_token_lifetime,
            "Loaded authorization configuration"
        );

        Ok(merged)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the access token lifetime is
    /// zero or longer than [`MAX_ACCESS_TOKEN_LIFETIME`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.access_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "tokens.access_token_lifetime must be > 0".to_string(),
            ));
        }
        if self.tokens.access_token_lifetime > MAX_ACCESS_TOKEN_LIFETIME {
            return Err(ConfigError::InvalidValue(
                "tokens.access_token_lifetime must not exceed 100 years".to_string(),
            ));
        }
        Ok(())
    }
}
