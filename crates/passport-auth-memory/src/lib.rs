//! In-memory storage backend for passport-auth.
//!
//! This crate implements the storage traits from `passport-auth` on top of
//! `dashmap` for concurrent access. State lives for the lifetime of the
//! process, which suits tests and single-node development servers.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use passport_auth::TokenLifecycleManager;
//! use passport_auth_memory::InMemoryTokenStore;
//!
//! let manager = TokenLifecycleManager::new(Arc::new(InMemoryTokenStore::new()));
//! ```

pub mod pending;
pub mod token;

pub use pending::InMemoryPendingAuthorizationStore;
pub use token::InMemoryTokenStore;
