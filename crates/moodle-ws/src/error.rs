//! Transport errors and the Moodle web-service fault envelope

use std::fmt;

use thiserror::Error;

/// Error raised by the web-service and AJAX clients
#[derive(Error, Debug)]
pub enum Error {
    /// Request failed at the transport level or with an unexpected status
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body was not the JSON shape the endpoint promises
    #[error("JSON decode error: {0}")]
    Json(String),

    /// The server answered with a web-service exception envelope
    #[error("{0}")]
    Fault(WsFault),
}

/// Result alias using the web-service Error
pub type Result<T> = std::result::Result<T, Error>;

/// Structured exception as reported by the REST and AJAX endpoints.
///
/// REST faults carry the exception class name; AJAX faults usually only
/// carry `errorcode` and `message`. `debuginfo` is present when the server
/// runs with developer debugging enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsFault {
    pub exception: String,
    pub errorcode: String,
    pub message: String,
    pub debuginfo: Option<String>,
}

impl fmt::Display for WsFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "web service fault {}: {}", self.errorcode, self.message)?;
        if let Some(debuginfo) = &self.debuginfo {
            write!(f, " ({debuginfo})")?;
        }
        Ok(())
    }
}
