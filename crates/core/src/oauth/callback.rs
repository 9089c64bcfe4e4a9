//! Callback request parameters and outcomes

use url::form_urlencoded;

/// Query parameters the provider sends back to the redirect URI
///
/// Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parses a raw query string, with or without the leading `?`.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(form_urlencoded::parse(query.as_bytes()))
    }

    /// Builds params from decoded key/value pairs. Unknown keys are ignored;
    /// the first occurrence of a key wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into()).filter(|v: &String| !v.is_empty());
            }
        }
        params
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        non_empty(self.code.as_deref())
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        non_empty(self.state.as_deref())
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        non_empty(self.error.as_deref())
    }

    #[must_use]
    pub fn error_description(&self) -> Option<&str> {
        non_empty(self.error_description.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Result of processing a callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The code was exchanged and the token stashed; send the user agent to
    /// `location` so the next request adopts it.
    Redirect { location: String },
    /// A stashed token from an earlier exchange was adopted.
    Adopted,
    /// A token was already held; nothing happened.
    Unchanged,
}

impl CallbackOutcome {
    #[must_use]
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            Self::Redirect { location } => Some(location),
            Self::Adopted | Self::Unchanged => None,
        }
    }
}

/// Authorization URL together with the state it was minted with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}
