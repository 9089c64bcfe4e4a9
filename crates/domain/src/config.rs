//! Importer configuration structures
//!
//! Loaded by `contact_importer_infra::config::loader` from the environment or
//! from a JSON/TOML file.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SESSION_MAX_ENTRIES, DEFAULT_SESSION_TTL_SECS,
};
use crate::errors::{ImporterError, Result};
use crate::types::ProviderKind;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImporterConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub oauth: OAuthSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ImporterConfig {
    /// Returns the settings for `kind`, or a config error if it isn't set up.
    pub fn provider(&self, kind: ProviderKind) -> Result<&ProviderConfig> {
        self.providers.get(kind).ok_or_else(|| {
            ImporterError::Config(format!("Provider '{kind}' is not configured"))
        })
    }

    /// Providers that have credentials configured.
    #[must_use]
    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL.into_iter().filter(|kind| self.providers.get(*kind).is_some()).collect()
    }

    /// Checks that every configured provider has usable credentials.
    pub fn validate(&self) -> Result<()> {
        if self.configured_providers().is_empty() {
            return Err(ImporterError::Config("No providers configured".to_string()));
        }
        for kind in self.configured_providers() {
            self.provider(kind)?.validate(kind)?;
        }
        if self.http.timeout_secs == 0 {
            return Err(ImporterError::Config("http.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Per-provider credentials, keyed by provider name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<ProviderConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microsoft: Option<ProviderConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yahoo: Option<ProviderConfig>,
}

impl ProvidersConfig {
    #[must_use]
    pub const fn get(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        match kind {
            ProviderKind::Google => self.google.as_ref(),
            ProviderKind::Microsoft => self.microsoft.as_ref(),
            ProviderKind::Yahoo => self.yahoo.as_ref(),
        }
    }

    pub fn set(&mut self, kind: ProviderKind, config: ProviderConfig) {
        let slot = match kind {
            ProviderKind::Google => &mut self.google,
            ProviderKind::Microsoft => &mut self.microsoft,
            ProviderKind::Yahoo => &mut self.yahoo,
        };
        *slot = Some(config);
    }
}

/// OAuth client registration for one provider
///
/// The endpoint overrides exist for sandboxes and tests; left unset, the
/// adapter's production endpoints are used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            ..Self::default()
        }
    }

    fn validate(&self, kind: ProviderKind) -> Result<()> {
        let missing = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_uri),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        match missing {
            Some((field, _)) => {
                Err(ImporterError::Config(format!("providers.{kind}.{field} must not be empty")))
            }
            None => Ok(()),
        }
    }
}

/// Outbound HTTP settings. Requests are sent once, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS, user_agent: None }
    }
}

/// Session store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub ttl_secs: u64,
    pub max_entries: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl_secs: DEFAULT_SESSION_TTL_SECS, max_entries: DEFAULT_SESSION_MAX_ENTRIES }
    }
}

/// Authorization flow policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    /// Reject callbacks when no state was stored for the session.
    pub strict_state: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ImporterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ImporterError::Config(format!("Unknown log format: {other}"))),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Pretty }
    }
}
