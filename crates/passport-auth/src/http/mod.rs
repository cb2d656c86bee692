//! HTTP handlers for the authorization decision endpoints.

pub mod decision;
pub mod error;

pub use decision::{
    DecisionForm, DecisionState, approve_handler, decision_routes, deny_handler,
};
pub use error::status_code;
