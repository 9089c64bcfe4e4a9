//! Google contacts provider (People API)

use async_trait::async_trait;
use contact_importer_common::auth::Token;
use contact_importer_core::{AuthEndpoint, ProviderAdapter, ProviderError};
use contact_importer_domain::constants::{CONTACTS_PAGE_SIZE, MAX_CONTACT_PAGES};
use contact_importer_domain::{ContactParts, GenericContact, ProviderConfig, ProviderKind};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};

use super::shared::{get_json, EndpointDefaults};
use super::token_endpoint::{request_token, revoke_token, TokenGrant};
use crate::http::HttpClient;

const GOOGLE_CONTACTS_URL: &str = "https://people.googleapis.com/v1/people/me/connections";

const GOOGLE_DEFAULTS: EndpointDefaults = EndpointDefaults {
    authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth",
    token_endpoint: "https://oauth2.googleapis.com/token",
    revocation_endpoint: Some("https://oauth2.googleapis.com/revoke"),
    scopes: &["https://www.googleapis.com/auth/contacts.readonly"],
    extra_authorize_params: &[("access_type", "offline")],
    scope_on_token_request: false,
    redirect_marker: None,
};

/// Google contacts provider
pub struct GoogleContactsProvider {
    http: HttpClient,
    endpoint: AuthEndpoint,
    contacts_url: String,
}

impl GoogleContactsProvider {
    pub fn new(config: &ProviderConfig, http: HttpClient) -> Self {
        Self {
            http,
            endpoint: Self::build_auth_endpoint(config),
            contacts_url: config.contacts_url.clone().unwrap_or_else(|| GOOGLE_CONTACTS_URL.to_string()),
        }
    }
}

#[async_trait]
impl ProviderAdapter for GoogleContactsProvider {
    fn build_auth_endpoint(config: &ProviderConfig) -> AuthEndpoint {
        GOOGLE_DEFAULTS.build(config)
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Google
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
        let mut contacts = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..MAX_CONTACT_PAGES {
            let mut query = vec![
                ("personFields", "names,emailAddresses".to_string()),
                ("pageSize", CONTACTS_PAGE_SIZE.to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let request = self
                .http
                .request(Method::GET, self.contacts_url.as_str())
                .bearer_auth(access_token)
                .query(&query);
            let response: ConnectionsResponse = get_json(&self.http, self.provider(), request).await?;

            let received = response.connections.len();
            contacts.extend(response.connections.iter().filter_map(Person::to_contact));
            debug!(page, received, "Fetched Google contacts page");

            match response.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => return Ok(contacts),
            }
        }

        warn!(max_pages = MAX_CONTACT_PAGES, "Google contacts truncated at page limit");
        Ok(contacts)
    }

    async fn revoke_token(&self, token: &str) -> Result<bool, ProviderError> {
        revoke_token(&self.http, self.provider(), &self.endpoint, token).await
    }
}

// Google People API response types (internal)

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionsResponse {
    #[serde(default)]
    connections: Vec<Person>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Person {
    #[serde(default)]
    names: Vec<PersonName>,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonName {
    display_name: Option<String>,
    given_name: Option<String>,
    middle_name: Option<String>,
    family_name: Option<String>,
    #[serde(default)]
    metadata: FieldMetadata,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    value: Option<String>,
    #[serde(default)]
    metadata: FieldMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct FieldMetadata {
    #[serde(default)]
    primary: bool,
}

impl Person {
    fn to_contact(&self) -> Option<GenericContact> {
        let email = primary_or_first(&self.email_addresses, |e| e.metadata.primary)?;
        let name = primary_or_first(&self.names, |n| n.metadata.primary);

        GenericContact::from_parts(ContactParts {
            display_name: name.and_then(|n| n.display_name.as_deref()),
            given_name: name.and_then(|n| n.given_name.as_deref()),
            middle_name: name.and_then(|n| n.middle_name.as_deref()),
            family_name: name.and_then(|n| n.family_name.as_deref()),
            email: email.value.as_deref(),
        })
    }
}

fn primary_or_first<T>(items: &[T], is_primary: impl Fn(&T) -> bool) -> Option<&T> {
    items.iter().find(|item| is_primary(item)).or_else(|| items.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_people_and_drops_missing_email() {
        let response: ConnectionsResponse = serde_json::from_str(
            r#"{
                "connections": [
                    {"names": [{"displayName": "A B", "givenName": "A", "familyName": "B"}],
                     "emailAddresses": [{"value": "a@x.com"}]},
                    {"names": [{"displayName": "No Email"}]},
                    {"emailAddresses": [{"value": "other@x.com"},
                                        {"value": "main@x.com", "metadata": {"primary": true}}]}
                ],
                "totalPeople": 3
            }"#,
        )
        .unwrap();

        let contacts: Vec<_> = response.connections.iter().filter_map(Person::to_contact).collect();

        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].full_name, "A B");
        assert_eq!(contacts[0].first_name.as_deref(), Some("A"));
        assert_eq!(contacts[1].email, "main@x.com");
        assert_eq!(contacts[1].full_name, "main@x.com");
        assert!(response.next_page_token.is_none());
    }

    #[test]
    fn endpoint_requests_offline_access() {
        let endpoint = GoogleContactsProvider::build_auth_endpoint(&ProviderConfig::new(
            "id",
            "secret",
            "https://app.example.com/cb",
        ));

        let url = endpoint.authorization_url("s1").unwrap();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("contacts.readonly"));
    }
}
