//! Strategy-level error types
//!
//! The split matters for dispatch: [`Error::Auth`] and [`Error::Parse`] end
//! one login attempt and may be recovered by best-effort dispatch trying the
//! next provider; [`Error::Http`] and [`Error::NoProvider`] always propagate.

use thiserror::Error;

/// Error raised while matching or driving an identity provider
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure during the provider flow
    #[error("HTTP error: {0}")]
    Http(String),

    /// Provider page did not contain the structure we parse for
    #[error("Parse error: {0}")]
    Parse(String),

    /// Login was rejected or a required login artifact was missing
    #[error("Authentication error: {0}")]
    Auth(String),

    /// No registered strategy matches any advertised identity provider
    #[error("no registered strategy matches any advertised identity provider")]
    NoProvider,
}

/// Result alias using the identity provider Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failure_class() {
        assert_eq!(
            Error::Auth("csrf token not found".into()).to_string(),
            "Authentication error: csrf token not found"
        );
        assert_eq!(
            Error::Parse("login form not found".into()).to_string(),
            "Parse error: login form not found"
        );
        assert!(Error::NoProvider.to_string().contains("no registered strategy"));
    }
}
