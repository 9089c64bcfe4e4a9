use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use contact_importer_common::auth::{OAuthError, Token};
use contact_importer_core::contacts::{AuthEndpoint, ProviderAdapter, ProviderError};
use contact_importer_domain::{GenericContact, ProviderConfig, ProviderKind};

pub const REDIRECT_URI: &str = "https://app.example.com/contacts/callback";

/// Scriptable `ProviderAdapter` that records every call.
#[derive(Clone)]
pub struct MockProviderAdapter {
    kind: ProviderKind,
    endpoint: AuthEndpoint,
    code_response: Arc<Mutex<Option<Token>>>,
    refresh_response: Arc<Mutex<Option<Token>>>,
    contacts: Arc<Mutex<Vec<GenericContact>>>,
    revoke_response: Arc<Mutex<bool>>,
    should_fail: Arc<Mutex<Option<String>>>,
    exchange_calls: Arc<AtomicUsize>,
    refresh_calls: Arc<AtomicUsize>,
    fetch_calls: Arc<AtomicUsize>,
    last_code: Arc<Mutex<Option<String>>>,
    last_refresh_token: Arc<Mutex<Option<String>>>,
    last_access_token: Arc<Mutex<Option<String>>>,
    revoked: Arc<Mutex<Vec<String>>>,
}

impl MockProviderAdapter {
    pub fn new(kind: ProviderKind) -> Self {
        let config = ProviderConfig::new("client-123", "secret-456", REDIRECT_URI);
        let mut endpoint = Self::build_auth_endpoint(&config);
        if kind == ProviderKind::Microsoft {
            endpoint.redirect_marker = Some(("from".to_string(), "Microsoft".to_string()));
        }

        Self {
            kind,
            endpoint,
            code_response: Arc::new(Mutex::new(Some(token("access-from-code", Some("refresh-1"), 3600)))),
            refresh_response: Arc::new(Mutex::new(Some(token("access-from-refresh", Some("refresh-2"), 3600)))),
            contacts: Arc::new(Mutex::new(Vec::new())),
            revoke_response: Arc::new(Mutex::new(true)),
            should_fail: Arc::new(Mutex::new(None)),
            exchange_calls: Arc::new(AtomicUsize::new(0)),
            refresh_calls: Arc::new(AtomicUsize::new(0)),
            fetch_calls: Arc::new(AtomicUsize::new(0)),
            last_code: Arc::new(Mutex::new(None)),
            last_refresh_token: Arc::new(Mutex::new(None)),
            last_access_token: Arc::new(Mutex::new(None)),
            revoked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn google() -> Self {
        Self::new(ProviderKind::Google)
    }

    pub fn set_code_response(&self, token: Token) {
        *self.code_response.lock().unwrap() = Some(token);
    }

    pub fn set_refresh_response(&self, token: Token) {
        *self.refresh_response.lock().unwrap() = Some(token);
    }

    pub fn set_contacts(&self, contacts: Vec<GenericContact>) {
        *self.contacts.lock().unwrap() = contacts;
    }

    pub fn set_revoke_response(&self, revoked: bool) {
        *self.revoke_response.lock().unwrap() = revoked;
    }

    /// Make exchanges fail with the given OAuth error code.
    pub fn set_should_fail(&self, error: Option<&str>) {
        *self.should_fail.lock().unwrap() = error.map(str::to_string);
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn last_code(&self) -> Option<String> {
        self.last_code.lock().unwrap().clone()
    }

    pub fn last_refresh_token(&self) -> Option<String> {
        self.last_refresh_token.lock().unwrap().clone()
    }

    pub fn last_access_token(&self) -> Option<String> {
        self.last_access_token.lock().unwrap().clone()
    }

    pub fn revoked(&self) -> Vec<String> {
        self.revoked.lock().unwrap().clone()
    }

    fn failure(&self) -> Option<ProviderError> {
        self.should_fail.lock().unwrap().clone().map(|error| ProviderError::OAuth {
            provider: self.kind,
            error: OAuthError { error, error_description: None, error_uri: None },
        })
    }
}

/// Token expiring `expires_in` seconds from now.
pub fn token(access: &str, refresh: Option<&str>, expires_in: i64) -> Token {
    Token::new(access, refresh.map(str::to_string), Utc::now() + Duration::seconds(expires_in))
}

#[async_trait]
impl ProviderAdapter for MockProviderAdapter {
    fn build_auth_endpoint(config: &ProviderConfig) -> AuthEndpoint {
        AuthEndpoint {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            authorization_endpoint: "https://auth.example.com/authorize".to_string(),
            token_endpoint: "https://auth.example.com/token".to_string(),
            revocation_endpoint: None,
            scopes: vec!["contacts.read".to_string()],
            extra_authorize_params: Vec::new(),
            scope_on_token_request: false,
            redirect_marker: None,
        }
    }

    fn provider(&self) -> ProviderKind {
        self.kind
    }

    fn auth_endpoint(&self) -> &AuthEndpoint {
        &self.endpoint
    }

    async fn exchange_code(&self, code: &str) -> Result<Token, ProviderError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_code.lock().unwrap() = Some(code.to_string());
        if let Some(err) = self.failure() {
            return Err(err);
        }
        self.code_response.lock().unwrap().clone().ok_or_else(|| ProviderError::Parse {
            provider: self.kind,
            message: "no scripted code response".to_string(),
        })
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<Token, ProviderError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_refresh_token.lock().unwrap() = Some(refresh_token.to_string());
        if let Some(err) = self.failure() {
            return Err(err);
        }
        self.refresh_response.lock().unwrap().clone().ok_or_else(|| ProviderError::Parse {
            provider: self.kind,
            message: "no scripted refresh response".to_string(),
        })
    }

    async fn fetch_contacts(&self, access_token: &str) -> Result<Vec<GenericContact>, ProviderError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_access_token.lock().unwrap() = Some(access_token.to_string());
        Ok(self.contacts.lock().unwrap().clone())
    }

    async fn revoke_token(&self, token: &str) -> Result<bool, ProviderError> {
        self.revoked.lock().unwrap().push(token.to_string());
        Ok(*self.revoke_response.lock().unwrap())
    }
}
