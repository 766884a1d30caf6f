//! Token acquisition protocol constants
//!
//! Values fixed by the platform's mobile-app login protocol. None of these
//! are secrets; the secrets are the credentials the caller supplies and the
//! token the flow yields.

/// Web-service scope tokens are requested for by default (the mobile app's)
pub const DEFAULT_SERVICE: &str = "moodle_mobile_app";

/// AJAX method returning the public login configuration
pub const PUBLIC_CONFIG_METHOD: &str = "tool_mobile_get_public_config";

/// Path of the direct-login token endpoint, relative to the site root
pub const TOKEN_ENDPOINT: &str = "/login/token.php";

/// Scheme prefix of the redirect that carries the signed token.
/// Real mobile apps register this scheme with the OS; we read the
/// `Location` header instead of following it.
pub const TOKEN_SCHEME_PREFIX: &str = "moodlemobile://token=";

/// Separator between the fields of the decoded token payload
pub const TOKEN_FIELD_DELIMITER: &str = ":::";
