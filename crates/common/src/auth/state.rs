//! CSRF state tokens for the authorization-code flow

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Random bytes per state token (encodes to 43 characters).
pub const STATE_BYTES: usize = 32;

/// Generate a random state token for CSRF protection
///
/// Returns a URL-safe base64-encoded random string of 32 bytes.
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Validate that the state returned on callback matches the stored one
///
/// Compares in constant time with respect to the content. Empty values never
/// match.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    if expected.is_empty() || expected.len() != actual.len() {
        return false;
    }

    expected.bytes().zip(actual.bytes()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
