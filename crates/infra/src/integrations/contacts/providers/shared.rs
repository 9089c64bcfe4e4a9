//! Helpers shared by the provider adapters

use contact_importer_core::{AuthEndpoint, ProviderError};
use contact_importer_domain::{ProviderConfig, ProviderKind};
use reqwest::header::ACCEPT;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::errors::transport_error;
use crate::http::HttpClient;

/// Production endpoints and flow quirks of one provider
pub struct EndpointDefaults {
    pub authorization_endpoint: &'static str,
    pub token_endpoint: &'static str,
    pub revocation_endpoint: Option<&'static str>,
    pub scopes: &'static [&'static str],
    pub extra_authorize_params: &'static [(&'static str, &'static str)],
    pub scope_on_token_request: bool,
    pub redirect_marker: Option<(&'static str, &'static str)>,
}

impl EndpointDefaults {
    /// Merge the client registration (and any endpoint overrides) with the
    /// provider defaults.
    pub fn build(&self, config: &ProviderConfig) -> AuthEndpoint {
        let pick = |value: &Option<String>, default: &str| {
            value.clone().unwrap_or_else(|| default.to_string())
        };

        AuthEndpoint {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            authorization_endpoint: pick(&config.authorization_endpoint, self.authorization_endpoint),
            token_endpoint: pick(&config.token_endpoint, self.token_endpoint),
            revocation_endpoint: config
                .revocation_endpoint
                .clone()
                .or_else(|| self.revocation_endpoint.map(str::to_string)),
            scopes: config
                .scopes
                .clone()
                .unwrap_or_else(|| self.scopes.iter().map(|s| (*s).to_string()).collect()),
            extra_authorize_params: self
                .extra_authorize_params
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            scope_on_token_request: self.scope_on_token_request,
            redirect_marker: self.redirect_marker.map(|(k, v)| (k.to_string(), v.to_string())),
        }
    }
}

/// Send an authenticated GET and decode the JSON body.
pub async fn get_json<T: DeserializeOwned>(
    http: &HttpClient,
    provider: ProviderKind,
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = http
        .send(request.header(ACCEPT, "application/json"))
        .await
        .map_err(|e| transport_error(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(super::token_endpoint::error_from_body(provider, status.as_u16(), body));
    }

    response.json::<T>().await.map_err(|e| ProviderError::Parse {
        provider,
        message: format!("invalid contacts response: {e}"),
    })
}
