//! Identity provider strategy variants
//!
//! Each variant drives one provider's browser login flow over the shared
//! session: entry redirect, CSRF-protected credential form, and the
//! federation handshake back to the platform. Side effects are entirely on
//! the session's cookie jar; token recovery happens afterwards through the
//! platform's launch redirect.

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use moodle_ws::HttpSession;

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::form::{extract_csrf_token, extract_login_form, unescape};

/// Identity provider entry advertised in the site's public configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdpDescriptor {
    /// Display name, used for strategy matching
    pub name: String,
    #[serde(default)]
    pub iconurl: String,
    /// Entry point of the provider's login flow
    pub url: String,
}

/// Registered strategy variants.
///
/// Dispatch is an explicit match on the variant; new providers are added as
/// new variants and registered in [`crate::ProviderRegistry::with_defaults`].
#[derive(Debug, Clone)]
pub enum Strategy {
    RwthSingleSignOn(RwthSingleSignOn),
}

impl Strategy {
    /// Variant name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::RwthSingleSignOn(_) => "rwth-single-sign-on",
        }
    }

    /// Whether this variant can drive the given provider. Pure, no I/O.
    pub fn is_responsible(&self, idp: &IdpDescriptor) -> bool {
        match self {
            Strategy::RwthSingleSignOn(inner) => inner.is_responsible(idp),
        }
    }

    /// Drive the provider's login flow on the shared session.
    ///
    /// `Ok(None)` means the session cookies are now authenticated and the
    /// caller should continue with the launch redirect. `Ok(Some(token))` is
    /// reserved for variants that obtain a token without that handshake.
    pub async fn login(
        &self,
        session: &HttpSession,
        credentials: &Credentials,
        idp: &IdpDescriptor,
        platform: &Url,
    ) -> Result<Option<String>> {
        match self {
            Strategy::RwthSingleSignOn(inner) => {
                inner.login(session, credentials, idp, platform).await
            }
        }
    }
}

/// RWTH Aachen's Shibboleth-based single sign-on
#[derive(Debug, Clone, Copy, Default)]
pub struct RwthSingleSignOn;

/// Provider name as advertised by the site's public configuration
const PROVIDER_NAME: &str = "RWTH Single Sign On";
/// Field names of the Shibboleth credential form
const USERNAME_FIELD: &str = "j_username";
const PASSWORD_FIELD: &str = "j_password";
const PROCEED_FIELD: &str = "_eventId_proceed";

impl RwthSingleSignOn {
    pub fn is_responsible(&self, idp: &IdpDescriptor) -> bool {
        idp.name == PROVIDER_NAME
    }

    pub async fn login(
        &self,
        session: &HttpSession,
        credentials: &Credentials,
        idp: &IdpDescriptor,
        platform: &Url,
    ) -> Result<Option<String>> {
        // Follow the entry point to wherever the provider lands us.
        let response = session
            .client()
            .get(&idp.url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("identity provider unreachable: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Http(format!(
                "identity provider entry returned {}",
                response.status()
            )));
        }
        let login_url = response.url().clone();

        // Landing back on the platform means the session cookies are still
        // valid from an earlier login.
        if login_url.origin() == platform.origin() {
            info!(provider = %idp.name, "session already authenticated");
            return Ok(None);
        }

        let csrf_token = self.fetch_csrf_token(session, &login_url).await?;
        debug!(provider = %idp.name, "submitting credentials");

        let response = session
            .client()
            .post(login_url)
            .form(&[
                ("csrf_token", csrf_token.as_str()),
                (USERNAME_FIELD, credentials.username.as_str()),
                (PASSWORD_FIELD, credentials.password.expose().as_str()),
                (PROCEED_FIELD, ""),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(format!("credential submission failed: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Http(format!(
                "credential submission returned {}",
                response.status()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("failed to read login response: {e}")))?;

        // Accepted credentials answer with the auto-submit handshake form;
        // the login page coming back instead means they were rejected.
        let form = extract_login_form(&unescape(&body))
            .map_err(|_| Error::Auth("login form not found".into()))?;

        let response = session
            .client()
            .post(&form.submit_url)
            .form(&[
                ("RelayState", form.relay_state.as_str()),
                ("SAMLResponse", form.saml_response.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(format!("federation handshake failed: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Http(format!(
                "federation handshake returned {}",
                response.status()
            )));
        }

        info!(provider = %idp.name, "federated login complete");
        Ok(None)
    }

    /// Fetch the login page and pull the hidden CSRF token out of it.
    async fn fetch_csrf_token(&self, session: &HttpSession, login_url: &Url) -> Result<String> {
        let response = session
            .client()
            .get(login_url.clone())
            .send()
            .await
            .map_err(|e| Error::Http(format!("failed to fetch login page: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Http(format!(
                "login page returned {}",
                response.status()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("failed to read login page: {e}")))?;
        extract_csrf_token(&body)
    }
}
