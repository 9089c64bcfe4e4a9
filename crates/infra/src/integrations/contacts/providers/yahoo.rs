//! Yahoo contacts provider (Social API)

use async_trait::async_trait;
use contact_importer_common::auth::Token;
use contact_importer_core::{AuthEndpoint, ProviderAdapter, ProviderError};
use contact_importer_domain::{ContactParts, GenericContact, ProviderConfig, ProviderKind};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::shared::{get_json, EndpointDefaults};
use super::token_endpoint::{request_token, revoke_token, TokenGrant};
use crate::http::HttpClient;

const YAHOO_CONTACTS_URL: &str = "https://social.yahooapis.com/v1/user/me/contacts;out=name,email";

const YAHOO_DEFAULTS: EndpointDefaults = EndpointDefaults {
    authorization_endpoint: "https://api.login.yahoo.com/oauth2/request_auth",
    token_endpoint: "https://api.login.yahoo.com/oauth2/get_token",
    revocation_endpoint: None,
    scopes: &[],
    extra_authorize_params: &[],
    scope_on_token_request: false,
    redirect_marker: None,
};

/// Yahoo contacts provider
pub struct YahooContactsProvider {
    http: HttpClient,
    endpoint: AuthEndpoint,
    contacts_url: String,
}

impl YahooContactsProvider {
    pub fn new(config: &ProviderConfig, http: HttpClient) -> Self {
        Self {
            http,
            endpoint: Self::build_auth_endpoint(config),
            contacts_url: config.contacts_url.clone().unwrap_or_else(|| YAHOO_CONTACTS_URL.to_string()),
        }
    }
}

#[async_trait]
impl ProviderAdapter for YahooContactsProvider {
    fn build_auth_endpoint(config: &ProviderConfig) -> AuthEndpoint {
        YAHOO_DEFAULTS.build(config)
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Yahoo
    }

    fn auth_endpoint(&self) -> &AuthEndpoint {
        &self.endpoint
    }

    async fn exchange_code(&self, code: &str) -> Result<Token, ProviderError> {
        request_token(&self.http, self.provider(), &self.endpoint, TokenGrant::AuthorizationCode(code))
            .await
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<Token, ProviderError> {
        request_token(
            &self.http,
            self.provider(),
            &self.endpoint,
            TokenGrant::RefreshToken(refresh_token),
        )
        .await
    }

    async fn fetch_contacts(&self, access_token: &str) -> Result<Vec<GenericContact>, ProviderError> {
        let request = self
            .http
            .request(Method::GET, self.contacts_url.as_str())
            .bearer_auth(access_token)
            .query(&[("format", "json")]);
        let response: YahooContactsResponse = get_json(&self.http, self.provider(), request).await?;

        let entries = response.contacts.map(|c| c.contact).unwrap_or_default();
        debug!(received = entries.len(), "Fetched Yahoo contacts");
        Ok(entries.iter().filter_map(YahooContact::to_contact).collect())
    }

    async fn revoke_token(&self, token: &str) -> Result<bool, ProviderError> {
        revoke_token(&self.http, self.provider(), &self.endpoint, token).await
    }
}

// Yahoo Social API response types (internal)

#[derive(Debug, Deserialize)]
struct YahooContactsResponse {
    contacts: Option<YahooContactList>,
}

#[derive(Debug, Deserialize)]
struct YahooContactList {
    #[serde(default)]
    contact: Vec<YahooContact>,
}

#[derive(Debug, Deserialize)]
struct YahooContact {
    #[serde(default)]
    fields: Vec<YahooField>,
}

/// Typed field; `value` is a string for emails and an object for names.
#[derive(Debug, Deserialize)]
struct YahooField {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Value,
}

impl YahooContact {
    fn field(&self, kind: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.kind == kind).map(|f| &f.value)
    }

    fn to_contact(&self) -> Option<GenericContact> {
        let name = self.field("name");
        let part = |key: &str| name.and_then(|n| n.get(key)).and_then(Value::as_str);

        GenericContact::from_parts(ContactParts {
            display_name: None,
            given_name: part("givenName"),
            middle_name: part("middleName"),
            family_name: part("familyName"),
            email: self.field("email").and_then(Value::as_str),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_typed_fields() {
        let response: YahooContactsResponse = serde_json::from_str(
            r#"{
                "contacts": {
                    "start": 0, "count": 3,
                    "contact": [
                        {"id": 1, "fields": [
                            {"type": "name", "value": {"givenName": "Grace", "middleName": "B", "familyName": "Hopper"}},
                            {"type": "email", "value": "grace@example.com"}
                        ]},
                        {"id": 2, "fields": [
                            {"type": "name", "value": {"givenName": "Lost"}}
                        ]},
                        {"id": 3, "fields": [
                            {"type": "email", "value": "only@example.com"}
                        ]}
                    ]
                }
            }"#,
        )
        .unwrap();

        let contacts: Vec<_> =
            response.contacts.unwrap().contact.iter().filter_map(YahooContact::to_contact).collect();

        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].full_name, "Grace B Hopper");
        assert_eq!(contacts[0].first_name.as_deref(), Some("Grace"));
        assert_eq!(contacts[1].full_name, "only@example.com");
    }

    #[test]
    fn empty_address_book() {
        let response: YahooContactsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.contacts.is_none());
    }
}
