//! Secret encoding.

use crate::constants::SECRET_ENVVAR_PREFIX;
use base64::{engine::general_purpose, Engine as _};
use std::collections::BTreeMap;

/// Encode a flat secret map into the wire representation: each key becomes
/// `envvar:<UPPERCASE_KEY>`, each value is base64-encoded.
///
/// Pure function of its input. Keys are not validated; two keys that
/// collide after uppercasing overwrite silently (accepted edge case).
#[must_use]
pub fn encode_secrets(secrets: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    secrets
        .iter()
        .map(|(key, value)| {
            (
                format!("{SECRET_ENVVAR_PREFIX}{}", key.to_uppercase()),
                general_purpose::STANDARD.encode(value.as_bytes()),
            )
        })
        .collect()
}
