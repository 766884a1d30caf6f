//! Cookie-bearing HTTP client pair shared across one login attempt
//!
//! Federated login scatters cookies over several hosts (identity provider,
//! platform) and finishes with a redirect whose `Location` header must be
//! read rather than followed. Both clients here share one cookie jar, so
//! cookies set while following the provider flow are presented on the final
//! captured request.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::redirect::Policy;

use crate::error::{Error, Result};

/// One shared cookie jar behind two `reqwest` clients.
///
/// A session must not serve two concurrent login attempts: cookies from one
/// attempt would bleed into the other.
pub struct HttpSession {
    client: reqwest::Client,
    no_redirect: reqwest::Client,
}

impl HttpSession {
    /// Build a fresh session with an empty cookie jar.
    pub fn new() -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| Error::Http(format!("failed to build http client: {e}")))?;
        let no_redirect = reqwest::Client::builder()
            .cookie_provider(jar)
            .redirect(Policy::none())
            .build()
            .map_err(|e| Error::Http(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            no_redirect,
        })
    }

    /// Client that follows redirects (the default policy, up to 10 hops).
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Client that never follows redirects, for reading `Location` headers.
    pub fn no_redirect(&self) -> &reqwest::Client {
        &self.no_redirect
    }
}
