//! Contact provider adapters
//!
//! Implementations of [`ProviderAdapter`] for Google, Microsoft and Yahoo.
//! They share the token endpoint plumbing in [`token_endpoint`] and differ in
//! endpoints, scopes and contact payloads.

pub mod google;
pub mod microsoft;
pub mod shared;
pub mod token_endpoint;
pub mod yahoo;

use std::sync::Arc;

use contact_importer_core::ProviderAdapter;
use contact_importer_domain::{ImporterConfig, ProviderKind, Result};

pub use google::GoogleContactsProvider;
pub use microsoft::MicrosoftContactsProvider;
pub use yahoo::YahooContactsProvider;

use crate::http::HttpClient;

/// Create a provider adapter from its configuration
pub fn create_provider(
    kind: ProviderKind,
    config: &ImporterConfig,
    http: HttpClient,
) -> Result<Arc<dyn ProviderAdapter>> {
    let provider_config = config.provider(kind)?;

    let adapter: Arc<dyn ProviderAdapter> = match kind {
        ProviderKind::Google => Arc::new(GoogleContactsProvider::new(provider_config, http)),
        ProviderKind::Microsoft => Arc::new(MicrosoftContactsProvider::new(provider_config, http)),
        ProviderKind::Yahoo => Arc::new(YahooContactsProvider::new(provider_config, http)),
    };
    Ok(adapter)
}
