//! Provider adapter port
//!
//! Each identity provider (Google, Microsoft, Yahoo) implements
//! [`ProviderAdapter`]. The flow controller only ever talks to this trait, so
//! the authorization-code state machine is written once.

use std::fmt;

use async_trait::async_trait;
use contact_importer_common::auth::{OAuthError, Token};
use contact_importer_domain::{GenericContact, ProviderConfig, ProviderKind};
use thiserror::Error;
use url::Url;

/// Failure talking to a provider endpoint
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {message}")]
    Transport { provider: ProviderKind, message: String },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status { provider: ProviderKind, status: u16, body: String },

    #[error("{provider} rejected the request: {error}")]
    OAuth { provider: ProviderKind, error: OAuthError },

    #[error("{provider} response could not be parsed: {message}")]
    Parse { provider: ProviderKind, message: String },

    #[error("{provider} endpoint is misconfigured: {message}")]
    Config { provider: ProviderKind, message: String },
}

impl ProviderError {
    #[must_use]
    pub const fn provider(&self) -> ProviderKind {
        match self {
            Self::Transport { provider, .. }
            | Self::Status { provider, .. }
            | Self::OAuth { provider, .. }
            | Self::Parse { provider, .. }
            | Self::Config { provider, .. } => *provider,
        }
    }

    /// The provider no longer accepts the grant (revoked or expired refresh
    /// token, reused code).
    #[must_use]
    pub fn is_invalid_grant(&self) -> bool {
        matches!(self, Self::OAuth { error, .. } if error.error == "invalid_grant")
    }
}

/// Authorization and token endpoint configuration for one provider
///
/// Built once by [`ProviderAdapter::build_auth_endpoint`] and immutable for
/// the adapter's lifetime.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthEndpoint {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub revocation_endpoint: Option<String>,
    pub scopes: Vec<String>,
    /// Extra query parameters on the authorization URL (e.g. `access_type`).
    pub extra_authorize_params: Vec<(String, String)>,
    /// Repeat `scope` on token endpoint requests.
    pub scope_on_token_request: bool,
    /// Query parameter appended to the post-callback redirect.
    pub redirect_marker: Option<(String, String)>,
}

impl AuthEndpoint {
    /// Space-delimited scope list.
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    /// Authorization URL carrying `state`.
    pub fn authorization_url(&self, state: &str) -> Result<String, url::ParseError> {
        let mut url = Url::parse(&self.authorization_endpoint)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", &self.redirect_uri);
            if !self.scopes.is_empty() {
                query.append_pair("scope", &self.scope_string());
            }
            query.append_pair("state", state);
            for (key, value) in &self.extra_authorize_params {
                query.append_pair(key, value);
            }
        }
        Ok(url.into())
    }

    /// Where the user agent goes after a successful code exchange.
    pub fn redirect_location(&self) -> Result<String, url::ParseError> {
        match &self.redirect_marker {
            None => Ok(self.redirect_uri.clone()),
            Some((key, value)) => {
                let mut url = Url::parse(&self.redirect_uri)?;
                url.query_pairs_mut().append_pair(key, value);
                Ok(url.into())
            }
        }
    }
}

impl fmt::Debug for AuthEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthEndpoint")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("revocation_endpoint", &self.revocation_endpoint)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

/// Trait for identity provider operations
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Endpoint configuration for the given client registration
    fn build_auth_endpoint(config: &ProviderConfig) -> AuthEndpoint
    where
        Self: Sized;

    fn provider(&self) -> ProviderKind;

    fn auth_endpoint(&self) -> &AuthEndpoint;

    /// Provider authorization URL including scopes and `state`
    fn authorization_url(&self, state: &str) -> Result<String, ProviderError> {
        self.auth_endpoint().authorization_url(state).map_err(|e| ProviderError::Config {
            provider: self.provider(),
            message: format!("authorization endpoint: {e}"),
        })
    }

    /// Redirect URI (plus the provider's marker, if any)
    fn redirect_location(&self) -> Result<String, ProviderError> {
        self.auth_endpoint().redirect_location().map_err(|e| ProviderError::Config {
            provider: self.provider(),
            message: format!("redirect uri: {e}"),
        })
    }

    /// Exchange an authorization code for a token
    async fn exchange_code(&self, code: &str) -> Result<Token, ProviderError>;

    /// Mint a new token from a refresh token
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<Token, ProviderError>;

    /// Fetch the user's contacts, dropping entries without an email address
    async fn fetch_contacts(&self, access_token: &str)
        -> Result<Vec<GenericContact>, ProviderError>;

    /// Revoke a token. `true` only on an explicit success response.
    async fn revoke_token(&self, _token: &str) -> Result<bool, ProviderError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> AuthEndpoint {
        AuthEndpoint {
            client_id: "client id".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            authorization_endpoint: "https://auth.example.com/authorize".to_string(),
            token_endpoint: "https://auth.example.com/token".to_string(),
            revocation_endpoint: None,
            scopes: vec!["openid".to_string(), "Contacts.Read".to_string()],
            extra_authorize_params: vec![("access_type".to_string(), "offline".to_string())],
            scope_on_token_request: false,
            redirect_marker: None,
        }
    }

    #[test]
    fn authorization_url_carries_all_parameters() {
        let url = Url::parse(&endpoint().authorization_url("s1").unwrap()).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/authorize");
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("client_id".into(), "client id".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "https://app.example.com/callback".into())));
        assert!(pairs.contains(&("scope".into(), "openid Contacts.Read".into())));
        assert!(pairs.contains(&("state".into(), "s1".into())));
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
    }

    #[test]
    fn empty_scopes_are_omitted() {
        let endpoint = AuthEndpoint { scopes: Vec::new(), ..endpoint() };
        let url = endpoint.authorization_url("s1").unwrap();
        assert!(!url.contains("scope="));
    }

    #[test]
    fn redirect_marker_is_appended() {
        let plain = endpoint();
        assert_eq!(plain.redirect_location().unwrap(), "https://app.example.com/callback");

        let marked = AuthEndpoint {
            redirect_marker: Some(("from".to_string(), "Microsoft".to_string())),
            ..endpoint()
        };
        assert_eq!(
            marked.redirect_location().unwrap(),
            "https://app.example.com/callback?from=Microsoft"
        );
    }

    #[test]
    fn invalid_endpoint_is_reported() {
        let endpoint = AuthEndpoint { authorization_endpoint: "not a url".to_string(), ..endpoint() };
        assert!(endpoint.authorization_url("s1").is_err());
    }

    #[test]
    fn debug_hides_client_secret() {
        let rendered = format!("{:?}", endpoint());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("\"secret\""));
    }
}
