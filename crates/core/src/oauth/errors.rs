//! Flow controller error taxonomy

use thiserror::Error;

use crate::contacts::ProviderError;
use crate::session_ports::SessionError;

/// Errors surfaced by [`OAuth2FlowController`](super::OAuth2FlowController)
///
/// Each failure mode is its own variant so callers can route users
/// differently: a denied consent is not a forged callback.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The provider redirected back with `error` (user denied consent, ...)
    #[error("authorization failed: {}", describe(.error, .description.as_deref()))]
    Authorize { error: String, description: Option<String> },

    /// The callback carried no code. A fresh state has been stored and
    /// `authorization_url` is bound to it.
    #[error("callback did not include an authorization code")]
    InvalidAuthCode { authorization_url: String },

    /// Returned state missing or not matching the stored one
    #[error("callback state is missing or does not match")]
    InvalidState,

    /// No refresh token held; the user has to authorize again
    #[error("no refresh token available, re-authorization required")]
    InvalidRefreshToken,

    #[error("provider exchange failed: {0}")]
    ProviderExchange(#[from] ProviderError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

fn describe(error: &str, description: Option<&str>) -> String {
    match description {
        Some(desc) if !desc.is_empty() => format!("{error} ({desc})"),
        _ => error.to_string(),
    }
}

impl FlowError {
    /// Short stable label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Authorize { .. } => "authorize",
            Self::InvalidAuthCode { .. } => "invalid_auth_code",
            Self::InvalidState => "invalid_state",
            Self::InvalidRefreshToken => "invalid_refresh_token",
            Self::ProviderExchange(_) => "provider_exchange",
            Self::Session(_) => "session",
        }
    }

    /// Whether the only way forward is sending the user through the
    /// authorization redirect again.
    #[must_use]
    pub fn is_reauthorization_required(&self) -> bool {
        match self {
            Self::InvalidAuthCode { .. } | Self::InvalidRefreshToken => true,
            Self::ProviderExchange(err) => err.is_invalid_grant(),
            _ => false,
        }
    }

    pub(crate) fn corrupt_record(err: impl std::fmt::Display) -> Self {
        Self::Session(SessionError::new(format!("corrupt pending token: {err}")))
    }
}
