//! Conversions from external infrastructure errors into domain errors.

use contact_importer_core::ProviderError;
use contact_importer_domain::{ImporterError, ProviderKind};
use reqwest::Error as HttpError;

/// Carries an [`ImporterError`] so foreign error conversions can live in this
/// crate.
#[derive(Debug)]
pub struct InfraError(pub ImporterError);

impl From<InfraError> for ImporterError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ImporterError> for InfraError {
    fn from(value: ImporterError) -> Self {
        Self(value)
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(classify_http_error(&value))
    }
}

/// Map a reqwest failure onto the domain error taxonomy.
fn classify_http_error(err: &HttpError) -> ImporterError {
    if err.is_timeout() {
        return ImporterError::Network("HTTP request timed out".into());
    }
    if err.is_connect() {
        return ImporterError::Network("HTTP connection failure".into());
    }
    if err.is_builder() {
        return ImporterError::InvalidInput(format!("invalid HTTP request: {err}"));
    }

    match err.status() {
        Some(status) => {
            let message =
                format!("HTTP {} {}", status.as_u16(), status.canonical_reason().unwrap_or("unknown"));
            match status.as_u16() {
                401 | 403 => ImporterError::Auth(message),
                404 => ImporterError::NotFound(message),
                400..=499 => ImporterError::InvalidInput(message),
                _ => ImporterError::Network(message),
            }
        }
        None => ImporterError::Network(err.to_string()),
    }
}

/// Wraps a transport-level failure for the provider adapter contract.
pub fn transport_error(provider: ProviderKind, err: ImporterError) -> ProviderError {
    match err {
        ImporterError::InvalidInput(message) | ImporterError::Config(message) => {
            ProviderError::Config { provider, message }
        }
        other => ProviderError::Transport { provider, message: other.to_string() },
    }
}
