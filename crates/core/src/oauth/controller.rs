//! OAuth2 authorization-code flow controller
//!
//! One controller per provider per user session. It owns the active token,
//! drives the callback state machine, and refreshes the access token lazily
//! inside [`OAuth2FlowController::get_access_token`].
//!
//! Callback handling, in order:
//!
//! ```text
//! pending token stashed? ──yes──► adopt it                    → Adopted
//!         │ no
//! token already held?    ──yes──► nothing to do               → Unchanged
//!         │ no
//! error param?           ──yes──► clear stored state          → FlowError::Authorize
//! code missing?          ──yes──► store fresh state           → FlowError::InvalidAuthCode
//! state missing/wrong?   ──yes──► clear stored state          → FlowError::InvalidState
//!         │
//! exchange code, stash token                                  → Redirect
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use contact_importer_common::auth::{generate_state, validate_state, Token};
use contact_importer_domain::constants::{
    session_key, OAUTH_STATE_KEY, PENDING_TOKEN_KEY, REFRESH_THRESHOLD_SECONDS,
};
use contact_importer_domain::{GenericContact, ProviderKind};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::callback::{AuthorizationRequest, CallbackOutcome, CallbackParams};
use super::errors::FlowError;
use crate::contacts::ProviderAdapter;
use crate::session_ports::SessionStore;

/// Authorization-code flow and token lifecycle for one provider
pub struct OAuth2FlowController {
    adapter: Arc<dyn ProviderAdapter>,
    session: Arc<dyn SessionStore>,
    token: RwLock<Option<Token>>,
    strict_state: bool,
    state_key: String,
    pending_key: String,
}

impl OAuth2FlowController {
    /// Create a controller for `adapter`, keeping flow state in `session`
    pub fn new(adapter: Arc<dyn ProviderAdapter>, session: Arc<dyn SessionStore>) -> Self {
        let provider = adapter.provider();
        Self {
            adapter,
            session,
            token: RwLock::new(None),
            strict_state: false,
            state_key: session_key(provider.as_str(), OAUTH_STATE_KEY),
            pending_key: session_key(provider.as_str(), PENDING_TOKEN_KEY),
        }
    }

    /// Reject callbacks that return a state when none was stored.
    ///
    /// Off by default: such callbacks are accepted (and logged) so that a
    /// session that expired mid-flow can still complete.
    #[must_use]
    pub fn with_strict_state(mut self, strict: bool) -> Self {
        self.strict_state = strict;
        self
    }

    pub fn provider(&self) -> ProviderKind {
        self.adapter.provider()
    }

    pub fn adapter(&self) -> &Arc<dyn ProviderAdapter> {
        &self.adapter
    }

    /// Build the provider authorization URL with a freshly minted state.
    ///
    /// Nothing is persisted; use [`Self::begin_authorization`] to also store
    /// the state for the callback check.
    pub fn authorization_url(&self) -> Result<AuthorizationRequest, FlowError> {
        let state = generate_state();
        let url = self.adapter.authorization_url(&state)?;
        Ok(AuthorizationRequest { url, state })
    }

    /// [`Self::authorization_url`], storing the state in the session.
    pub async fn begin_authorization(&self) -> Result<AuthorizationRequest, FlowError> {
        let request = self.authorization_url()?;
        self.session.insert(&self.state_key, request.state.clone()).await?;
        debug!(provider = %self.provider(), "Stored authorization state");
        Ok(request)
    }

    /// Process the provider's redirect back to the application.
    pub async fn process_callback(
        &self,
        params: &CallbackParams,
    ) -> Result<CallbackOutcome, FlowError> {
        let provider = self.provider();

        if let Some(record) = self.session.take(&self.pending_key).await? {
            let token = Token::from_record(&record).map_err(FlowError::corrupt_record)?;
            *self.token.write().await = Some(token);
            info!(provider = %provider, branch = "adopted", "Adopted pending token");
            return Ok(CallbackOutcome::Adopted);
        }

        if self.token.read().await.is_some() {
            debug!(provider = %provider, branch = "unchanged", "Token already held");
            return Ok(CallbackOutcome::Unchanged);
        }

        if let Some(error) = params.error() {
            warn!(provider = %provider, error, "Provider returned an authorization error");
            self.session.remove(&self.state_key).await?;
            return Err(FlowError::Authorize {
                error: error.to_string(),
                description: params.error_description().map(str::to_string),
            });
        }

        let Some(code) = params.code() else {
            let request = self.begin_authorization().await?;
            debug!(provider = %provider, "Callback without code, authorization restarted");
            return Err(FlowError::InvalidAuthCode { authorization_url: request.url });
        };

        // The stored state is single-use whatever happens next.
        let stored_state = self.session.take(&self.state_key).await?;
        self.check_state(stored_state.as_deref(), params.state())?;

        let token = self.adapter.exchange_code(code).await?;
        let record = token.to_record().map_err(FlowError::corrupt_record)?;
        self.session.insert(&self.pending_key, record).await?;
        *self.token.write().await = Some(token);

        let location = self.adapter.redirect_location()?;
        info!(provider = %provider, branch = "exchanged", "Authorization code exchanged");
        Ok(CallbackOutcome::Redirect { location })
    }

    fn check_state(&self, stored: Option<&str>, returned: Option<&str>) -> Result<(), FlowError> {
        let provider = self.provider();
        let Some(returned) = returned else {
            warn!(provider = %provider, "Callback state missing");
            return Err(FlowError::InvalidState);
        };

        match stored {
            Some(expected) if validate_state(expected, returned) => Ok(()),
            Some(_) => {
                warn!(provider = %provider, "Callback state mismatch");
                Err(FlowError::InvalidState)
            }
            None if self.strict_state => {
                warn!(provider = %provider, "Callback state with no stored state rejected");
                Err(FlowError::InvalidState)
            }
            None => {
                warn!(provider = %provider, "Callback state accepted with no stored state");
                Ok(())
            }
        }
    }

    /// Exchange the held refresh token for a new token.
    pub async fn refresh_token(&self) -> Result<(), FlowError> {
        let mut slot = self.token.write().await;
        self.refresh_locked(&mut slot).await
    }

    async fn refresh_locked(&self, slot: &mut Option<Token>) -> Result<(), FlowError> {
        let refresh_token = slot
            .as_ref()
            .and_then(Token::refresh_token)
            .map(str::to_string)
            .ok_or(FlowError::InvalidRefreshToken)?;

        let refreshed = self.adapter.exchange_refresh_token(&refresh_token).await?;
        // Providers may omit the refresh token on refresh; the old one stays valid.
        let token = if refreshed.has_refresh_token() {
            refreshed
        } else {
            Token::new(refreshed.access_token, Some(refresh_token), refreshed.expires_at)
        };

        info!(
            provider = %self.provider(),
            expires_at = %token.expires_at,
            "Access token refreshed"
        );
        *slot = Some(token);
        Ok(())
    }

    /// Current access token, refreshed first if it expires within the
    /// safety window.
    pub async fn get_access_token(&self) -> Result<String, FlowError> {
        let threshold = refresh_threshold();
        {
            let slot = self.token.read().await;
            match slot.as_ref() {
                None => return Err(FlowError::InvalidRefreshToken),
                Some(token) if !token.needs_refresh(threshold) => {
                    return Ok(token.access_token.clone());
                }
                Some(_) => {}
            }
        }

        let mut slot = self.token.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = slot.as_ref().filter(|t| !t.needs_refresh(threshold)) {
            return Ok(token.access_token.clone());
        }

        debug!(provider = %self.provider(), "Access token within refresh window");
        self.refresh_locked(&mut slot).await?;
        slot.as_ref().map(|t| t.access_token.clone()).ok_or(FlowError::InvalidRefreshToken)
    }

    /// Seed the controller with a previously persisted token.
    pub async fn set_token(
        &self,
        access_token: impl Into<String> + Send,
        refresh_token: Option<String>,
        expires_at: DateTime<Utc>,
    ) {
        self.set_token_record(Token::new(access_token, refresh_token, expires_at)).await;
    }

    pub async fn set_token_record(&self, token: Token) {
        *self.token.write().await = Some(token);
    }

    /// Snapshot of the active token, for the caller to persist.
    pub async fn token(&self) -> Option<Token> {
        self.token.read().await.clone()
    }

    pub async fn current_refresh_token(&self) -> Option<String> {
        self.token.read().await.as_ref().and_then(Token::refresh_token).map(str::to_string)
    }

    pub async fn expires(&self) -> Option<DateTime<Utc>> {
        self.token.read().await.as_ref().map(|t| t.expires_at)
    }

    /// Forget the active token.
    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    /// Fetch contacts with a fresh access token.
    pub async fn contacts(&self) -> Result<Vec<GenericContact>, FlowError> {
        let access_token = self.get_access_token().await?;
        let contacts = self.adapter.fetch_contacts(&access_token).await?;
        info!(provider = %self.provider(), count = contacts.len(), "Fetched contacts");
        Ok(contacts)
    }

    /// Revoke the grant at the provider and forget the token.
    ///
    /// The refresh token is revoked when held (revoking the whole grant),
    /// otherwise the access token. The local token and any pending stash are
    /// dropped whatever the provider answers.
    pub async fn revoke(&self) -> Result<bool, FlowError> {
        let token = self.token.write().await.take();
        self.session.remove(&self.pending_key).await?;

        let Some(token) = token else {
            return Ok(false);
        };
        let credential = token.refresh_token().unwrap_or(&token.access_token);
        let revoked = self.adapter.revoke_token(credential).await?;
        info!(provider = %self.provider(), revoked, "Token revocation finished");
        Ok(revoked)
    }
}

fn refresh_threshold() -> Duration {
    Duration::seconds(REFRESH_THRESHOLD_SECONDS)
}
