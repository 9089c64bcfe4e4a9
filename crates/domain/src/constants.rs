//! Importer constants
//!
//! Centralized location for the domain-level constants shared by the flow
//! controller and the provider adapters.

// Token lifecycle
/// Access tokens expiring within this window are refreshed before use.
pub const REFRESH_THRESHOLD_SECONDS: i64 = 300;

// Session keys (prefixed by provider, see `session_key`)
pub const SESSION_KEY_PREFIX: &str = "contact_importer";
pub const PENDING_TOKEN_KEY: &str = "pending_token";
pub const OAUTH_STATE_KEY: &str = "oauth2_state";

// Contact fetching
pub const CONTACTS_PAGE_SIZE: u32 = 200;
pub const MAX_CONTACT_PAGES: usize = 25;

// HTTP defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("contact-importer/", env!("CARGO_PKG_VERSION"));

// Session store defaults
pub const DEFAULT_SESSION_TTL_SECS: u64 = 900;
pub const DEFAULT_SESSION_MAX_ENTRIES: u64 = 10_000;

/// Builds the namespaced session key `contact_importer.{provider}.{slot}`.
#[must_use]
pub fn session_key(provider: &str, slot: &str) -> String {
    format!("{SESSION_KEY_PREFIX}.{provider}.{slot}")
}
