//! Microsoft contacts provider (Graph API)

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

const GRAPH_CONTACTS_URL: &str = "https://graph.microsoft.com/v1.0/me/contacts";
const GRAPH_CONTACT_FIELDS: &str = "displayName,givenName,middleName,surname,emailAddresses";

const MICROSOFT_DEFAULTS: EndpointDefaults = EndpointDefaults {
    authorization_endpoint: "https://login.microsoftonline.com/common/oauth2/v2.0/authorize",
    token_endpoint: "https://login.microsoftonline.com/common/oauth2/v2.0/token",
    revocation_endpoint: None,
    scopes: &["openid", "profile", "offline_access", "User.Read", "Contacts.Read"],
    extra_authorize_params: &[],
    scope_on_token_request: true,
    redirect_marker: Some(("from", "Microsoft")),
};

/// Microsoft contacts provider
pub struct MicrosoftContactsProvider {
    http: HttpClient,
    endpoint: AuthEndpoint,
    contacts_url: String,
}

impl MicrosoftContactsProvider {
    pub fn new(config: &ProviderConfig, http: HttpClient) -> Self {
        Self {
            http,
            endpoint: Self::build_auth_endpoint(config),
            contacts_url: config.contacts_url.clone().unwrap_or_else(|| GRAPH_CONTACTS_URL.to_string()),
        }
    }
}

#[async_trait]
impl ProviderAdapter for MicrosoftContactsProvider {
    fn build_auth_endpoint(config: &ProviderConfig) -> AuthEndpoint {
        MICROSOFT_DEFAULTS.build(config)
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Microsoft
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
        let top = CONTACTS_PAGE_SIZE.to_string();
        let mut request = self.http.request(Method::GET, self.contacts_url.as_str()).query(&[
            ("$select", GRAPH_CONTACT_FIELDS),
            ("$orderby", "givenName ASC"),
            ("$top", top.as_str()),
        ]);

        for page in 0..MAX_CONTACT_PAGES {
            let response: GraphContactsResponse =
                get_json(&self.http, self.provider(), request.bearer_auth(access_token)).await?;

            let received = response.value.len();
            contacts.extend(response.value.iter().filter_map(GraphContact::to_contact));
            debug!(page, received, "Fetched Microsoft contacts page");

            // nextLink already carries every query parameter.
            match response.next_link {
                Some(next) => request = self.http.request(Method::GET, next.as_str()),
                None => return Ok(contacts),
            }
        }

        warn!(max_pages = MAX_CONTACT_PAGES, "Microsoft contacts truncated at page limit");
        Ok(contacts)
    }

    async fn revoke_token(&self, token: &str) -> Result<bool, ProviderError> {
        revoke_token(&self.http, self.provider(), &self.endpoint, token).await
    }
}

// Microsoft Graph API response types (internal)

#[derive(Debug, Deserialize)]
struct GraphContactsResponse {
    #[serde(default)]
    value: Vec<GraphContact>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphContact {
    display_name: Option<String>,
    given_name: Option<String>,
    middle_name: Option<String>,
    surname: Option<String>,
    #[serde(default)]
    email_addresses: Vec<GraphEmailAddress>,
}

#[derive(Debug, Deserialize)]
struct GraphEmailAddress {
    address: Option<String>,
}

impl GraphContact {
    fn to_contact(&self) -> Option<GenericContact> {
        let email = self
            .email_addresses
            .iter()
            .find_map(|e| e.address.as_deref().filter(|a| !a.trim().is_empty()));

        GenericContact::from_parts(ContactParts {
            display_name: self.display_name.as_deref(),
            given_name: self.given_name.as_deref(),
            middle_name: self.middle_name.as_deref(),
            family_name: self.surname.as_deref(),
            email,
        })
    }
}
