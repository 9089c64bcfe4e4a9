//! Entry point wiring config, HTTP and session storage into a flow controller

use std::sync::Arc;
use std::time::{Duration, Instant};

use contact_importer_core::{
    CallbackOutcome, CallbackParams, FlowError, OAuth2FlowController, ProviderAdapter, SessionStore,
};
use contact_importer_domain::{GenericContact, ImporterConfig, ProviderKind, Result};
use tracing::{info, instrument};

use super::providers::create_provider;
use crate::http::HttpClient;

/// Contact import for one provider and one user session
pub struct ContactImporter {
    controller: OAuth2FlowController,
}

impl ContactImporter {
    /// Build an importer for `kind` from configuration.
    ///
    /// # Errors
    /// Returns `ImporterError::Config` if the provider is not configured or
    /// the HTTP client cannot be built.
    pub fn new(
        kind: ProviderKind,
        config: &ImporterConfig,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let http = HttpClient::from_config(&config.http)?;
        let adapter = create_provider(kind, config, http)?;
        let controller =
            OAuth2FlowController::new(adapter, session).with_strict_state(config.oauth.strict_state);
        Ok(Self { controller })
    }

    pub fn from_adapter(adapter: Arc<dyn ProviderAdapter>, session: Arc<dyn SessionStore>) -> Self {
        Self { controller: OAuth2FlowController::new(adapter, session) }
    }

    pub fn controller(&self) -> &OAuth2FlowController {
        &self.controller
    }

    pub fn provider(&self) -> ProviderKind {
        self.controller.provider()
    }

    /// Handle the provider redirect given its raw query string.
    #[instrument(skip_all, fields(provider = %self.provider()))]
    pub async fn process_callback_query(
        &self,
        query: &str,
    ) -> std::result::Result<CallbackOutcome, FlowError> {
        let params = CallbackParams::from_query(query);
        self.controller.process_callback(&params).await
    }

    #[instrument(skip_all, fields(provider = %self.provider()))]
    pub async fn contacts(&self) -> std::result::Result<Vec<GenericContact>, FlowError> {
        let started = Instant::now();
        let contacts = self.controller.contacts().await?;
        info!(
            count = contacts.len(),
            duration_ms = millis(started.elapsed()),
            "Contact import finished"
        );
        Ok(contacts)
    }

    /// Revoke the grant and forget the token.
    pub async fn disconnect(&self) -> std::result::Result<bool, FlowError> {
        self.controller.revoke().await
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_saturates_instead_of_truncating() {
        assert_eq!(millis(Duration::from_micros(2_500)), 2);
        assert_eq!(millis(Duration::from_secs(u64::MAX / 1_000)), (u64::MAX / 1_000) * 1_000);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
