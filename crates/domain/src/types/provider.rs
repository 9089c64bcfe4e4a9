//! Supported contact providers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ImporterError;

/// Identity provider hosting the address book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    Microsoft,
    Yahoo,
}

impl ProviderKind {
    /// All providers, in a stable order.
    pub const ALL: [Self; 3] = [Self::Google, Self::Microsoft, Self::Yahoo];

    /// Lowercase identifier used in config keys and session keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
            Self::Yahoo => "yahoo",
        }
    }

    /// Human readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Microsoft => "Microsoft",
            Self::Yahoo => "Yahoo",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ImporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" | "gmail" => Ok(Self::Google),
            "microsoft" | "outlook" | "live" => Ok(Self::Microsoft),
            "yahoo" => Ok(Self::Yahoo),
            other => Err(ImporterError::InvalidInput(format!("Unknown provider: {other}"))),
        }
    }
}
