//! Access token lifecycle.
//!
//! [`TokenLifecycleManager`] wraps a [`TokenStore`](crate::storage::TokenStore)
//! with the rules for creation, validity and revocation.

mod clock;
mod lifecycle;

pub use clock::{Clock, FixedClock, SystemClock};
pub use lifecycle::TokenLifecycleManager;
