//! Account credentials for one login attempt

use common::Secret;

/// Username and password, held in memory only for the duration of one
/// acquisition call. The password is redacted in Debug output and zeroed
/// when dropped.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: String) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password),
        }
    }
}
