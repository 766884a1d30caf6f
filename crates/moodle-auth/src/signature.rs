//! Token redirect decoding and integrity verification
//!
//! The launch redirect's payload is `base64(signature:::wstoken:::...)`.
//! The signature must equal `lowercase_hex(MD5(wwwroot + passport))`, which
//! only the server that reported `wwwroot` and received our passport can
//! produce. A token whose signature does not match is discarded.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use md5::{Digest, Md5};

use crate::constants::{TOKEN_FIELD_DELIMITER, TOKEN_SCHEME_PREFIX};
use crate::error::{Error, Result};

/// Expected launch signature for a site and passport.
pub fn expected_signature(wwwroot: &str, passport: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(wwwroot.as_bytes());
    hasher.update(passport.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a received signature against the expected one.
pub fn verify_signature(received: &str, wwwroot: &str, passport: &str) -> Result<()> {
    if received == expected_signature(wwwroot, passport) {
        Ok(())
    } else {
        Err(Error::Signature)
    }
}

/// Split a launch `Location` header into `(signature, wstoken)`.
///
/// The header must use the app scheme, carry valid standard base64, and
/// decode to at least `signature:::wstoken`; any trailing fields (private
/// token and friends) are ignored.
pub fn decode_token_redirect(location: &str) -> Result<(String, String)> {
    let payload = location
        .strip_prefix(TOKEN_SCHEME_PREFIX)
        .ok_or_else(|| Error::Auth(format!("unexpected redirect target: {location}")))?;
    let decoded = STANDARD
        .decode(payload)
        .map_err(|e| Error::Auth(format!("malformed token payload: {e}")))?;
    let text = String::from_utf8(decoded)
        .map_err(|_| Error::Auth("token payload is not valid UTF-8".into()))?;

    let mut fields = text.split(TOKEN_FIELD_DELIMITER);
    match (fields.next(), fields.next()) {
        (Some(signature), Some(wstoken)) => Ok((signature.to_string(), wstoken.to_string())),
        _ => Err(Error::Auth("token payload has too few fields".into())),
    }
}
