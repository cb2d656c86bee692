//! OAuth 2.0 authorization decisions.
//!
//! - [`request`] - pending authorization requests parked in the session
//! - [`redirect`] - redirect URI resolution and response encoding
//! - [`grant`] - grant issuance seam used on approval
//! - [`decision`] - the deny/approve engine

pub mod decision;
pub mod grant;
pub mod redirect;
pub mod request;

pub use decision::{AuthorizationDecisionEngine, DecisionParams};
pub use grant::{GrantIssuer, IssuedGrant};
pub use redirect::{
    ACCESS_DENIED, RedirectTarget, access_denied_redirect, grant_redirect, resolve_redirect_uri,
    separator_for,
};
pub use request::{AuthorizationRequest, PendingAuthorization};
