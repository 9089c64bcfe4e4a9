//! # Contact Importer Domain
//!
//! Domain types shared by every other contact importer crate.
//!
//! This crate contains:
//! - The normalized contact record and provider identifiers
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Token lifecycle and session key constants
//!
//! ## Architecture
//! - No dependencies on other contact importer crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
