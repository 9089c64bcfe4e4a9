//! Normalized contact record
//!
//! Every provider adapter maps its own representation into a
//! [`GenericContact`]. Entries without an email address never make it this
//! far: [`GenericContact::from_parts`] returns `None` for them.

use serde::{Deserialize, Serialize};

/// Provider-independent contact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericContact {
    pub full_name: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Raw name/email pieces pulled out of a provider payload
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactParts<'a> {
    pub display_name: Option<&'a str>,
    pub given_name: Option<&'a str>,
    pub middle_name: Option<&'a str>,
    pub family_name: Option<&'a str>,
    pub email: Option<&'a str>,
}

impl GenericContact {
    /// Creates a contact with only a full name and email.
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { full_name: full_name.into(), email: email.into(), first_name: None, last_name: None }
    }

    /// Normalizes provider fields into a contact.
    ///
    /// The full name is the display name when present, otherwise the
    /// non-empty given/middle/family names joined by a space, otherwise the
    /// email address. Returns `None` when the email is missing or blank.
    #[must_use]
    pub fn from_parts(parts: ContactParts<'_>) -> Option<Self> {
        let email = non_blank(parts.email)?;

        let full_name = non_blank(parts.display_name).map_or_else(
            || {
                let joined = [parts.given_name, parts.middle_name, parts.family_name]
                    .into_iter()
                    .filter_map(non_blank)
                    .collect::<Vec<_>>()
                    .join(" ");
                if joined.is_empty() {
                    email.to_string()
                } else {
                    joined
                }
            },
            str::to_string,
        );

        Some(Self {
            full_name,
            email: email.to_string(),
            first_name: non_blank(parts.given_name).map(str::to_string),
            last_name: non_blank(parts.family_name).map(str::to_string),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
