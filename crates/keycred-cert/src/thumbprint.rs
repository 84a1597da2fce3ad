//! Certificate identifiers via `ring::digest`.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY, SHA256};

/// Uppercase hex SHA-1 of the DER certificate, the Windows certificate thumbprint.
///
/// Identifies the certificate within one rotation; it is not meant to resist
/// collisions.
#[must_use]
pub fn thumbprint(der: &[u8]) -> String {
    hex::encode_upper(digest(&SHA1_FOR_LEGACY_USE_ONLY, der).as_ref())
}

/// base64url SHA-1 of the DER certificate, as published in a JWK `x5t`.
#[must_use]
pub fn x5t(der: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(digest(&SHA1_FOR_LEGACY_USE_ONLY, der).as_ref())
}

/// Convert a hex thumbprint to its `x5t` form. Returns `None` for invalid hex.
#[must_use]
pub fn x5t_from_thumbprint(thumbprint: &str) -> Option<String> {
    hex::decode(thumbprint).ok().map(|raw| URL_SAFE_NO_PAD.encode(raw))
}

/// `customKeyIdentifier` for a thumbprint: base64 of SHA-256 over its UTF-8 bytes.
#[must_use]
pub fn custom_key_identifier(thumbprint: &str) -> String {
    STANDARD.encode(digest(&SHA256, thumbprint.as_bytes()).as_ref())
}
