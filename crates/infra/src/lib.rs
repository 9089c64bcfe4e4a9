//! # Contact Importer Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Provider adapters for Google, Microsoft and Yahoo
//! - The HTTP client they share
//! - A TTL session store
//! - Configuration loading and logging setup
//!
//! ## Architecture
//! - Implements traits defined in `contact-importer-core`
//! - Depends on `contact-importer-common`, `contact-importer-domain` and
//!   `contact-importer-core`
//! - Contains all "impure" code (network, environment, files)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod session;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::*;
pub use integrations::contacts::{create_provider, ContactImporter};
pub use observability::init_logging;
pub use session::*;
