//! Token acquisition orchestrator
//!
//! One call drives the whole exchange:
//! 1. fetch the public login configuration (anonymous AJAX)
//! 2. log in directly at the token endpoint, or through a matched identity
//!    provider strategy on the shared session
//! 3. trigger the launch redirect with a fresh passport and capture its
//!    `Location` header instead of following the app scheme
//! 4. verify the embedded signature before releasing the token
//!
//! Nothing is cached between calls; every attempt fetches its own
//! configuration and generates its own passport.

use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use moodle_idp::{Credentials, DispatchMode, ProviderRegistry};
use moodle_ws::HttpSession;

use crate::config::{LoginType, PublicConfig, fetch_public_config};
use crate::constants::TOKEN_ENDPOINT;
use crate::error::{Error, Result};
use crate::passport;
use crate::signature::{decode_token_redirect, verify_signature};

/// Acquire a web-service token with the built-in strategies and strict
/// dispatch.
pub async fn acquire_token(
    session: &HttpSession,
    wwwroot: &str,
    credentials: &Credentials,
    service: &str,
) -> Result<String> {
    acquire_token_with(
        session,
        wwwroot,
        credentials,
        service,
        &ProviderRegistry::with_defaults(),
        DispatchMode::Strict,
    )
    .await
}

/// Acquire a web-service token with an explicit registry and dispatch mode.
///
/// The session must not be shared with a concurrent acquisition attempt;
/// login cookies from one attempt would bleed into the other.
pub async fn acquire_token_with(
    session: &HttpSession,
    wwwroot: &str,
    credentials: &Credentials,
    service: &str,
    registry: &ProviderRegistry,
    mode: DispatchMode,
) -> Result<String> {
    let config = fetch_public_config(session, wwwroot).await?;

    match config.login_type()? {
        LoginType::ViaApp => {
            debug!("site takes credentials directly, skipping provider dispatch");
            direct_login(session, &config, credentials, service).await
        }
        LoginType::ViaBrowser | LoginType::ViaEmbeddedBrowser => {
            federated_login(session, &config, credentials, service, registry, mode).await
        }
    }
}

/// Direct branch: the token endpoint issues the token itself. There is no
/// redirect involved, so there is nothing to verify a signature on.
async fn direct_login(
    session: &HttpSession,
    config: &PublicConfig,
    credentials: &Credentials,
    service: &str,
) -> Result<String> {
    let endpoint = format!("{}{TOKEN_ENDPOINT}", config.wwwroot.trim_end_matches('/'));
    let response = session
        .client()
        .post(endpoint)
        .form(&[
            ("username", credentials.username.as_str()),
            ("password", credentials.password.expose().as_str()),
            ("service", service),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token endpoint request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Http(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| Error::Auth(format!("invalid token endpoint response: {e}")))?;
    match body.get("token").and_then(Value::as_str) {
        Some(token) => {
            info!(username = %credentials.username, "direct login complete");
            Ok(token.to_string())
        }
        None => {
            let detail = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("token endpoint returned no token");
            Err(Error::Auth(detail.to_string()))
        }
    }
}

/// Federated branch: provider login leaves authenticated cookies on the
/// session, then the launch redirect hands over the signed token.
async fn federated_login(
    session: &HttpSession,
    config: &PublicConfig,
    credentials: &Credentials,
    service: &str,
    registry: &ProviderRegistry,
    mode: DispatchMode,
) -> Result<String> {
    let platform = Url::parse(&config.wwwroot)
        .map_err(|e| Error::ConfigFetch(format!("invalid wwwroot in public config: {e}")))?;

    let bypass = match mode {
        DispatchMode::Strict => {
            let (strategy, idp) = registry.select(&config.identityproviders)?;
            strategy.login(session, credentials, idp, &platform).await?
        }
        DispatchMode::BestEffort => {
            registry
                .login_any(session, credentials, &config.identityproviders, &platform)
                .await?
        }
    };
    if let Some(token) = bypass {
        info!("strategy obtained a token without the launch handshake");
        return Ok(token);
    }

    request_signed_token(session, config, service).await
}

/// Trigger the launch redirect and verify the signed token it carries.
async fn request_signed_token(
    session: &HttpSession,
    config: &PublicConfig,
    service: &str,
) -> Result<String> {
    let passport = passport::generate();
    let response = session
        .no_redirect()
        .post(&config.launchurl)
        .query(&[("service", service), ("passport", passport.as_str())])
        .send()
        .await
        .map_err(|e| Error::Http(format!("launch request failed: {e}")))?;

    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::Auth("launch response carries no redirect".into()))?;

    let (received_signature, wstoken) = decode_token_redirect(location)?;
    // The signature input is the wwwroot exactly as the server reported it.
    verify_signature(&received_signature, &config.wwwroot, &passport)?;
    info!("token signature verified");
    Ok(wstoken)
}
