//! Storage traits for authorization decisions and access tokens.
//!
//! This module defines storage interfaces for:
//!
//! - Pending authorization requests, one per browser session
//! - Access token records
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `passport-auth-memory` - in-memory storage backend

pub mod pending_authorization;
pub mod token;

pub use pending_authorization::PendingAuthorizationStore;
pub use token::{TokenStore, ValidTokenOrder};
