//! Error types for token acquisition

/// Errors from the token acquisition flow.
///
/// `Auth` and `Parse` end one login attempt and are the only kinds
/// best-effort dispatch recovers from; everything else always propagates.
/// `Signature` means the launch redirect failed its integrity check: never
/// retried, and the token it carried is discarded.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to fetch public login config: {0}")]
    ConfigFetch(String),

    #[error("unsupported login type {0}")]
    UnsupportedLoginType(i64),

    #[error("no registered strategy matches any advertised identity provider")]
    NoProvider,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("invalid signature on token redirect")]
    Signature,

    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl From<moodle_idp::Error> for Error {
    fn from(err: moodle_idp::Error) -> Self {
        match err {
            moodle_idp::Error::Http(message) => Error::Http(message),
            moodle_idp::Error::Parse(message) => Error::Parse(message),
            moodle_idp::Error::Auth(message) => Error::Auth(message),
            moodle_idp::Error::NoProvider => Error::NoProvider,
        }
    }
}

/// Result alias for acquisition operations.
pub type Result<T> = std::result::Result<T, Error>;
