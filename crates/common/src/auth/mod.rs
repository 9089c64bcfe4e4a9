//! OAuth 2.0 building blocks shared by the flow controller and the provider
//! adapters.
//!
//! # Module Organization
//!
//! - **[`types`]**: token types (`Token`, `TokenResponse`, `OAuthError`)
//! - **[`state`]**: CSRF state generation and validation (requires the `auth`
//!   feature)
//!
//! # Security Features
//!
//! - **State Validation**: CSRF protection with cryptographic randomness
//! - **Constant-Time Comparison**: state checks don't short-circuit on the
//!   first differing byte
//! - **Redacted Debug**: `Token` never prints its secrets

#[cfg(feature = "auth")]
pub mod state;
pub mod types;

#[cfg(feature = "auth")]
pub use state::{generate_state, validate_state};
pub use types::{OAuthError, Token, TokenError, TokenResponse};
