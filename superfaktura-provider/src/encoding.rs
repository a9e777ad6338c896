//! SuperFaktura's URL-safe base64 variant.
//!
//! Search terms travel inside CakePHP-style path parameters
//! (`/search:<value>/`), so the standard alphabet is remapped:
//! `+` → `-`, `/` → `_`, `=` → `,`.

use base64::{Engine, engine::general_purpose::STANDARD};

/// Encode bytes for use in a path parameter.
pub fn encode_url_safe(input: impl AsRef<[u8]>) -> String {
    STANDARD
        .encode(input)
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            '=' => ',',
            other => other,
        })
        .collect()
}

/// Reverse of [`encode_url_safe`].
pub fn decode_url_safe(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let standard: String = input
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            ',' => '=',
            other => other,
        })
        .collect();
    STANDARD.decode(standard)
}
