//! Public login configuration
//!
//! `tool_mobile_get_public_config` is callable without any token and
//! reports how the site wants users to log in, where the launch redirect
//! lives, and which identity providers are available. Wire field names are
//! kept as-is.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use moodle_idp::IdpDescriptor;
use moodle_ws::{AjaxClient, HttpSession};

use crate::constants::PUBLIC_CONFIG_METHOD;
use crate::error::{Error, Result};

/// How the server expects users to log in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginType {
    /// Credentials go straight to the token endpoint
    ViaApp,
    /// Browser-based federated flow
    ViaBrowser,
    /// Embedded-browser flow; driven the same way as `ViaBrowser`
    ViaEmbeddedBrowser,
}

impl LoginType {
    /// Map the wire value; `None` for types this client cannot drive.
    pub fn from_wire(raw: i64) -> Option<Self> {
        match raw {
            1 => Some(LoginType::ViaApp),
            2 => Some(LoginType::ViaBrowser),
            3 => Some(LoginType::ViaEmbeddedBrowser),
            _ => None,
        }
    }
}

/// Server-reported login settings, fetched anonymously and fresh per
/// acquisition attempt
#[derive(Debug, Clone, Deserialize)]
pub struct PublicConfig {
    pub typeoflogin: i64,
    /// URL that triggers the signed token redirect
    pub launchurl: String,
    /// Canonical site root; also the first half of the signature input
    pub wwwroot: String,
    #[serde(default)]
    pub identityproviders: Vec<IdpDescriptor>,
}

impl PublicConfig {
    /// Typed view of `typeoflogin`.
    pub fn login_type(&self) -> Result<LoginType> {
        LoginType::from_wire(self.typeoflogin)
            .ok_or(Error::UnsupportedLoginType(self.typeoflogin))
    }
}

/// Fetch the public login configuration for a site.
pub async fn fetch_public_config(session: &HttpSession, wwwroot: &str) -> Result<PublicConfig> {
    let ajax = AjaxClient::new(session, wwwroot);
    let data = ajax
        .call_one(PUBLIC_CONFIG_METHOD, json!({}))
        .await
        .map_err(|e| Error::ConfigFetch(e.to_string()))?;
    let config: PublicConfig = serde_json::from_value(data)
        .map_err(|e| Error::ConfigFetch(format!("invalid public config: {e}")))?;
    debug!(
        wwwroot = %config.wwwroot,
        typeoflogin = config.typeoflogin,
        providers = config.identityproviders.len(),
        "fetched public login config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;

    #[test]
    fn wire_values_map_to_login_types() {
        assert_eq!(LoginType::from_wire(1), Some(LoginType::ViaApp));
        assert_eq!(LoginType::from_wire(2), Some(LoginType::ViaBrowser));
        assert_eq!(LoginType::from_wire(3), Some(LoginType::ViaEmbeddedBrowser));
        assert_eq!(LoginType::from_wire(0), None);
        assert_eq!(LoginType::from_wire(4), None);
    }

    #[test]
    fn config_deserializes_with_optional_providers() {
        let config: PublicConfig = serde_json::from_value(serde_json::json!({
            "typeoflogin": 1,
            "launchurl": "https://m.example/admin/tool/mobile/launch.php",
            "wwwroot": "https://m.example",
            "sitename": "Demo Site",
        }))
        .unwrap();
        assert!(config.identityproviders.is_empty());
        assert_eq!(config.login_type().unwrap(), LoginType::ViaApp);
    }

    #[test]
    fn config_deserializes_provider_descriptors() {
        let config: PublicConfig = serde_json::from_value(serde_json::json!({
            "typeoflogin": 2,
            "launchurl": "https://m.example/launch",
            "wwwroot": "https://m.example",
            "identityproviders": [
                {"name": "RWTH Single Sign On", "iconurl": "https://m.example/icon.png",
                 "url": "https://sso.example/entry"},
            ],
        }))
        .unwrap();
        assert_eq!(config.identityproviders.len(), 1);
        assert_eq!(config.identityproviders[0].name, "RWTH Single Sign On");
    }

    #[test]
    fn unknown_login_type_is_unsupported() {
        let config: PublicConfig = serde_json::from_value(serde_json::json!({
            "typeoflogin": 7,
            "launchurl": "https://m.example/launch",
            "wwwroot": "https://m.example",
        }))
        .unwrap();
        assert!(matches!(
            config.login_type(),
            Err(Error::UnsupportedLoginType(7))
        ));
    }

    async fn start_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn fetch_decodes_the_ajax_envelope() {
        let app = Router::new().route(
            "/lib/ajax/service.php",
            post(|Json(payload): Json<Value>| async move {
                assert_eq!(
                    payload[0]["methodname"],
                    serde_json::json!("tool_mobile_get_public_config")
                );
                Json(serde_json::json!([{
                    "error": false,
                    "data": {
                        "typeoflogin": 2,
                        "launchurl": "https://m.example/launch",
                        "wwwroot": "https://m.example",
                        "identityproviders": [],
                    }
                }]))
            }),
        );
        let base = start_server(app).await;

        let session = HttpSession::new().unwrap();
        let config = fetch_public_config(&session, &base).await.unwrap();
        assert_eq!(config.wwwroot, "https://m.example");
        assert_eq!(config.login_type().unwrap(), LoginType::ViaBrowser);
    }

    #[tokio::test]
    async fn fetch_failure_is_a_config_fetch_error() {
        let app = Router::new().route(
            "/lib/ajax/service.php",
            post(|| async {
                Json(serde_json::json!([{
                    "error": true,
                    "exception": {"message": "Service unavailable", "errorcode": "unavailable"}
                }]))
            }),
        );
        let base = start_server(app).await;

        let session = HttpSession::new().unwrap();
        let err = fetch_public_config(&session, &base).await;
        match err {
            Err(Error::ConfigFetch(message)) => {
                assert!(message.contains("unavailable"), "got: {message}")
            }
            other => panic!("expected config fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_config_payload_is_a_config_fetch_error() {
        let app = Router::new().route(
            "/lib/ajax/service.php",
            post(|| async {
                Json(serde_json::json!([{"error": false, "data": {"typeoflogin": "nope"}}]))
            }),
        );
        let base = start_server(app).await;

        let session = HttpSession::new().unwrap();
        let err = fetch_public_config(&session, &base).await;
        assert!(matches!(err, Err(Error::ConfigFetch(_))));
    }
}
