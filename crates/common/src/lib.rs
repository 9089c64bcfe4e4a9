//! Common utilities shared across contact importer crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: token types and their wire formats
//! - `auth`: CSRF state generation and validation

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod auth;

// Re-export commonly used types
// ------------------------
#[cfg(feature = "foundation")]
pub use auth::{OAuthError, Token, TokenError, TokenResponse};
