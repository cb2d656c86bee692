//! Domain types shared by the decision engine and the token lifecycle.

pub mod access_token;
pub mod client;
pub mod grant_type;

pub use access_token::{AccessToken, NewAccessToken};
pub use client::{Client, ClientValidationError, RedirectUris};
pub use grant_type::GrantType;
