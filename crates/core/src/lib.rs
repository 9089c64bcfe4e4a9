//! # Contact Importer Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The OAuth2 authorization-code flow controller
//! - Port/adapter interfaces (traits) for providers and session storage
//!
//! ## Architecture Principles
//! - Only depends on `contact-importer-common` and `contact-importer-domain`
//! - No HTTP or storage code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod contacts;
pub mod oauth;

// Infrastructure ports
pub mod session_ports;

// Re-export specific items to avoid ambiguity
pub use contacts::{AuthEndpoint, ProviderAdapter, ProviderError};
pub use oauth::{
    AuthorizationRequest, CallbackOutcome, CallbackParams, FlowError, OAuth2FlowController,
};
pub use session_ports::{SessionError, SessionStore};
