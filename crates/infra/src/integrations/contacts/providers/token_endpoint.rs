//! Token and revocation endpoint calls shared by every provider
//!
//! Both calls go out exactly once: a code is single-use at the provider, and
//! retrying a refresh is the caller's decision.

use chrono::Utc;
use contact_importer_common::auth::{OAuthError, Token, TokenResponse};
use contact_importer_core::{AuthEndpoint, ProviderError};
use contact_importer_domain::ProviderKind;
use reqwest::header::ACCEPT;
use reqwest::Method;
use tracing::{debug, warn};

use crate::errors::transport_error;
use crate::http::HttpClient;

/// Longest provider error body kept in a [`ProviderError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Grant presented to the token endpoint
#[derive(Debug, Clone, Copy)]
pub enum TokenGrant<'a> {
    AuthorizationCode(&'a str),
    RefreshToken(&'a str),
}

impl TokenGrant<'_> {
    const fn grant_type(self) -> &'static str {
        match self {
            Self::AuthorizationCode(_) => "authorization_code",
            Self::RefreshToken(_) => "refresh_token",
        }
    }
}

/// POST the grant to the token endpoint and normalize the response.
pub async fn request_token(
    http: &HttpClient,
    provider: ProviderKind,
    endpoint: &AuthEndpoint,
    grant: TokenGrant<'_>,
) -> Result<Token, ProviderError> {
    let scope = endpoint.scope_string();
    let mut form: Vec<(&str, &str)> = vec![
        ("grant_type", grant.grant_type()),
        ("client_id", endpoint.client_id.as_str()),
        ("client_secret", endpoint.client_secret.as_str()),
    ];
    match grant {
        TokenGrant::AuthorizationCode(code) => {
            form.push(("code", code));
            form.push(("redirect_uri", endpoint.redirect_uri.as_str()));
        }
        TokenGrant::RefreshToken(refresh_token) => form.push(("refresh_token", refresh_token)),
    }
    if endpoint.scope_on_token_request && !scope.is_empty() {
        form.push(("scope", scope.as_str()));
    }

    debug!(provider = %provider, grant_type = grant.grant_type(), "Requesting token");
    let request = http
        .request(Method::POST, endpoint.token_endpoint.as_str())
        .header(ACCEPT, "application/json")
        .form(&form);
    let response = http.send(request).await.map_err(|e| transport_error(provider, e))?;

    let status = response.status();
    let body = response.text().await.map_err(|e| ProviderError::Transport {
        provider,
        message: format!("failed to read token response: {e}"),
    })?;

    if !status.is_success() {
        return Err(error_from_body(provider, status.as_u16(), body));
    }

    let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| ProviderError::Parse {
        provider,
        message: format!("invalid token response: {e}"),
    })?;
    parsed.into_token(Utc::now()).map_err(|e| ProviderError::Parse { provider, message: e.to_string() })
}

/// Revoke `token` at the provider's revocation endpoint.
///
/// `Ok(false)` when the provider has no endpoint or answers with a non-2xx
/// status.
pub async fn revoke_token(
    http: &HttpClient,
    provider: ProviderKind,
    endpoint: &AuthEndpoint,
    token: &str,
) -> Result<bool, ProviderError> {
    let Some(url) = endpoint.revocation_endpoint.as_deref() else {
        debug!(provider = %provider, "Provider has no revocation endpoint");
        return Ok(false);
    };

    let request = http.request(Method::POST, url).form(&[("token", token)]);
    let response = http.send(request).await.map_err(|e| transport_error(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        warn!(provider = %provider, %status, "Token revocation rejected");
    }
    Ok(status.is_success())
}

/// RFC 6749 error body when the provider sent one, the raw status otherwise.
pub fn error_from_body(provider: ProviderKind, status: u16, body: String) -> ProviderError {
    match serde_json::from_str::<OAuthError>(&body) {
        Ok(error) => ProviderError::OAuth { provider, error },
        Err(_) => ProviderError::Status { provider, status, body: truncate(body) },
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oauth_error_bodies_are_parsed() {
        let err = error_from_body(
            ProviderKind::Google,
            400,
            r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#
                .to_string(),
        );
        assert!(err.is_invalid_grant());
    }

    #[test]
    fn other_bodies_keep_status() {
        let err = error_from_body(ProviderKind::Yahoo, 502, "<html>bad gateway</html>".to_string());
        assert!(matches!(err, ProviderError::Status { status: 502, .. }));
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundary() {
        let body = "é".repeat(MAX_ERROR_BODY);
        let truncated = truncate(body);
        assert!(truncated.len() <= MAX_ERROR_BODY);
        assert!(truncated.chars().all(|c| c == 'é'));
    }
}
