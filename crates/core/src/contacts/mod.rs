//! Contact provider integration ports

pub mod ports;

pub use ports::{AuthEndpoint, ProviderAdapter, ProviderError};
