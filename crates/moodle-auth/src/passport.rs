//! Single-use passport nonce
//!
//! The launch request carries a random passport, and the redirect response
//! must come back signed over `wwwroot + passport`. A passport never
//! outlives one acquisition attempt, so a captured redirect cannot be
//! replayed against a later attempt.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

/// Generate a fresh random passport.
///
/// 32 random bytes encoded as URL-safe base64 (no padding), 43 characters,
/// safe to place in a query string without escaping.
pub fn generate() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
