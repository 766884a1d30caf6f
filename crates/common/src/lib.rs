//! Shared foundation for the Moodle token tooling

mod secret;
mod error;

pub use secret::Secret;
pub use error::{Error, Result};
