//! OAuth token types
//!
//! [`Token`] is the credential the flow controller holds and parks in the
//! session store between the callback and the redirected request.
//! [`TokenResponse`] is the wire shape returned by provider token endpoints,
//! which disagree on how they spell the expiry.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors raised while building or decoding a [`Token`]
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token response did not include an access token")]
    MissingAccessToken,

    #[error("token expiry is out of range: {0}")]
    InvalidExpiry(i64),

    #[error("invalid token record: {0}")]
    Record(#[from] serde_json::Error),
}

/// Access credential with optional refresh capability and absolute expiry
///
/// Serializes to the session record shape
/// `{"access_token", "refresh_token", "expires_at"}` with `expires_at` in
/// unix seconds.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Creates a token. An empty refresh token is stored as `None`.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.filter(|rt| !rt.is_empty()),
            expires_at,
        }
    }

    /// Creates a token expiring `expires_in` seconds after `now`.
    pub fn expiring_in(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, TokenError> {
        Ok(Self::new(access_token, refresh_token, expiry_after(now, expires_in)?))
    }

    /// The refresh token, if one was issued.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|rt| !rt.is_empty())
    }

    /// Whether the token can be renewed without user interaction.
    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token().is_some()
    }

    /// True when `expires_at <= now + threshold`.
    #[must_use]
    pub fn needs_refresh_at(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.expires_at <= now + threshold
    }

    /// [`Self::needs_refresh_at`] against the current time.
    #[must_use]
    pub fn needs_refresh(&self, threshold: Duration) -> bool {
        self.needs_refresh_at(Utc::now(), threshold)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Seconds until expiry; negative once expired.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds()
    }

    /// Serializes to the session record shape.
    pub fn to_record(&self) -> Result<String, TokenError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a session record, rejecting records without an access token.
    pub fn from_record(record: &str) -> Result<Self, TokenError> {
        let token: Self = serde_json::from_str(record)?;
        if token.access_token.is_empty() {
            return Err(TokenError::MissingAccessToken);
        }
        Ok(Self::new(token.access_token, token.refresh_token, token.expires_at))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token endpoint response (RFC 6749 §5.1)
///
/// `expires_in` may arrive as a number or a numeric string. Some endpoints
/// send an absolute `expires_on`/`expires_at` instead; it takes precedence.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default, deserialize_with = "optional_seconds")]
    pub expires_in: Option<i64>,
    #[serde(default, alias = "expires_at", deserialize_with = "optional_seconds")]
    pub expires_on: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

impl TokenResponse {
    /// Converts into a [`Token`] relative to `now`.
    ///
    /// A response with no expiry at all expires at `now`, so the next access
    /// goes through a refresh.
    pub fn into_token(self, now: DateTime<Utc>) -> Result<Token, TokenError> {
        if self.access_token.is_empty() {
            return Err(TokenError::MissingAccessToken);
        }

        let expires_at = match (self.expires_on, self.expires_in) {
            (Some(absolute), _) => Utc
                .timestamp_opt(absolute, 0)
                .single()
                .ok_or(TokenError::InvalidExpiry(absolute))?,
            (None, Some(relative)) => expiry_after(now, relative)?,
            (None, None) => now,
        };

        Ok(Token::new(self.access_token, self.refresh_token, expires_at))
    }
}

/// `now` plus `seconds`, rejecting offsets chrono cannot represent.
fn expiry_after(now: DateTime<Utc>, seconds: i64) -> Result<DateTime<Utc>, TokenError> {
    Duration::try_seconds(seconds)
        .and_then(|offset| now.checked_add_signed(offset))
        .ok_or(TokenError::InvalidExpiry(seconds))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    Text(String),
}

fn optional_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(value)) => Ok(Some(value)),
        Some(NumberOrString::Text(text)) => text.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

/// OAuth error response body (RFC 6749 §5.2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthError {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_uri: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}
