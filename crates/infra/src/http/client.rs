//! Shared HTTP client for provider calls
//!
//! Provider adapters build requests with [`HttpClient::request`] and execute
//! them with [`HttpClient::send`]. Every request is sent exactly once; a
//! failed contact fetch or token call surfaces to the caller, which decides
//! whether to try again.

use std::time::Duration;

use contact_importer_domain::constants::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use contact_importer_domain::{HttpConfig, ImporterError};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use tracing::debug;

use crate::errors::InfraError;

/// reqwest client configured with timeout and user agent
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client with default timeout and user agent.
    pub fn new() -> Result<Self, ImporterError> {
        Self::builder().build()
    }

    /// Build a client from the `http` config section.
    pub fn from_config(config: &HttpConfig) -> Result<Self, ImporterError> {
        let mut builder = Self::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.inner.request(method, url)
    }

    /// Execute the request once. 5xx answers are returned as responses.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ImporterError> {
        let request = builder.build().map_err(to_importer)?;
        let method = request.method().clone();
        let url = redacted(request.url());
        debug!(%method, %url, "sending HTTP request");

        match self.inner.execute(request).await {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(to_importer(err))
            }
        }
    }
}

fn to_importer(err: reqwest::Error) -> ImporterError {
    InfraError::from(err).into()
}

/// URL without its query string, which may carry tokens.
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

/// Builder for [`HttpClient`]
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS), user_agent: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, ImporterError> {
        let inner = Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()))
            .build()
            .map_err(to_importer)?;

        Ok(HttpClient { inner })
    }
}
