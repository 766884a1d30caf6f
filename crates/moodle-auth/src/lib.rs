//! Moodle web-service token acquisition
//!
//! Drives the mobile-app login protocol against a Moodle site:
//! 1. `config::fetch_public_config` discovers how the site wants users to
//!    log in (anonymous AJAX call).
//! 2. Direct sites take credentials at the token endpoint; federated sites
//!    are driven through a `moodle_idp` strategy on a shared session.
//! 3. The launch redirect is captured instead of followed and its payload
//!    decoded into signature and token.
//! 4. The signature is verified against `MD5(wwwroot + passport)` before
//!    the token is released to the caller; a mismatch discards the token.
//!
//! Most callers only need [`acquire_token`] (strict dispatch, built-in
//! strategies) or [`acquire_token_with`].

pub mod config;
pub mod constants;
pub mod error;
pub mod passport;
pub mod signature;
pub mod token;

pub use config::{LoginType, PublicConfig, fetch_public_config};
pub use constants::*;
pub use error::{Error, Result};
pub use signature::{decode_token_redirect, expected_signature, verify_signature};
pub use token::{acquire_token, acquire_token_with};
