//! OAuth2 authorization-code flow
//!
//! - **[`controller`]**: the flow controller and token refresh policy
//! - **[`callback`]**: callback parameters and outcomes
//! - **[`errors`]**: the flow error taxonomy

pub mod callback;
pub mod controller;
pub mod errors;

pub use callback::{AuthorizationRequest, CallbackOutcome, CallbackParams};
pub use controller::OAuth2FlowController;
pub use errors::FlowError;
