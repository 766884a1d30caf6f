//! Authenticated REST web-service client
//!
//! Wraps `POST <wwwroot>/webservice/rest/server.php`. Every call carries the
//! acquired `wstoken`, the target `wsfunction` and `moodlewsrestformat=json`;
//! nested arguments are flattened into bracketed form keys. The endpoint
//! reports failures as a 200 response with an exception envelope, which is
//! surfaced as [`Error::Fault`].

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result, WsFault};
use crate::params::flatten;
use crate::session::HttpSession;

/// Path of the REST web-service endpoint, relative to the site root.
const REST_ENDPOINT: &str = "/webservice/rest/server.php";

/// Client for authenticated web-service calls against one site.
pub struct WsClient {
    client: reqwest::Client,
    wwwroot: String,
    wstoken: String,
}

impl WsClient {
    /// Bind a session to a site root and an acquired token.
    pub fn new(
        session: &HttpSession,
        wwwroot: impl Into<String>,
        wstoken: impl Into<String>,
    ) -> Self {
        Self {
            client: session.client().clone(),
            wwwroot: normalize_wwwroot(wwwroot.into()),
            wstoken: wstoken.into(),
        }
    }

    /// Site root this client talks to (no trailing slash).
    pub fn wwwroot(&self) -> &str {
        &self.wwwroot
    }

    /// Invoke a web-service function and return its decoded JSON result.
    ///
    /// `args` is a JSON object of the function's parameters; nesting is
    /// allowed and flattened on the wire.
    pub async fn call(&self, wsfunction: &str, args: &Value) -> Result<Value> {
        let mut form: Vec<(String, String)> = vec![
            ("wstoken".to_string(), self.wstoken.clone()),
            ("wsfunction".to_string(), wsfunction.to_string()),
            ("moodlewsrestformat".to_string(), "json".to_string()),
        ];
        form.extend(flatten(args));

        debug!(wsfunction, "calling web service function");
        let response = self
            .client
            .post(format!("{}{REST_ENDPOINT}", self.wwwroot))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Http(format!("web service request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Http(format!(
                "web service endpoint returned {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Json(format!("invalid web service response: {e}")))?;

        if let Some(fault) = fault_from_body(&body) {
            return Err(Error::Fault(fault));
        }
        Ok(body)
    }
}

pub(crate) fn normalize_wwwroot(wwwroot: String) -> String {
    wwwroot.trim_end_matches('/').to_string()
}

pub(crate) fn string_field(object: &serde_json::Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// The REST endpoint reports errors as a JSON object with an `exception`
/// class name alongside `errorcode` and `message`.
fn fault_from_body(body: &Value) -> Option<WsFault> {
    let object = body.as_object()?;
    if !object.contains_key("exception") {
        return None;
    }
    Some(WsFault {
        exception: string_field(object, "exception"),
        errorcode: string_field(object, "errorcode"),
        message: string_field(object, "message"),
        debuginfo: object
            .get("debuginfo")
            .and_then(Value::as_str)
            .map(String::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::Form;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    async fn start_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn wwwroot_trailing_slash_is_trimmed() {
        assert_eq!(
            normalize_wwwroot("https://moodle.example.org/".into()),
            "https://moodle.example.org"
        );
        assert_eq!(
            normalize_wwwroot("https://moodle.example.org".into()),
            "https://moodle.example.org"
        );
    }

    #[test]
    fn fault_detection_requires_exception_key() {
        assert!(fault_from_body(&json!({"sitename": "Demo"})).is_none());
        assert!(fault_from_body(&json!([1, 2])).is_none());

        let fault = fault_from_body(&json!({
            "exception": "moodle_exception",
            "errorcode": "invalidtoken",
            "message": "Invalid token - token not found",
        }))
        .unwrap();
        assert_eq!(fault.errorcode, "invalidtoken");
        assert_eq!(fault.exception, "moodle_exception");
        assert!(fault.debuginfo.is_none());
    }

    #[tokio::test]
    async fn call_sends_token_function_and_flattened_args() {
        let app = Router::new().route(
            "/webservice/rest/server.php",
            post(|Form(fields): Form<HashMap<String, String>>| async move {
                assert_eq!(fields.get("wstoken").map(String::as_str), Some("tok123"));
                assert_eq!(
                    fields.get("wsfunction").map(String::as_str),
                    Some("core_course_get_courses_by_field")
                );
                assert_eq!(
                    fields.get("moodlewsrestformat").map(String::as_str),
                    Some("json")
                );
                assert_eq!(fields.get("courseids[0]").map(String::as_str), Some("7"));
                Json(json!({"courses": []}))
            }),
        );
        let base = start_server(app).await;

        let session = HttpSession::new().unwrap();
        let ws = WsClient::new(&session, &base, "tok123");
        let result = ws
            .call("core_course_get_courses_by_field", &json!({"courseids": [7]}))
            .await
            .unwrap();
        assert_eq!(result, json!({"courses": []}));
    }

    #[tokio::test]
    async fn exception_envelope_becomes_fault_error() {
        let app = Router::new().route(
            "/webservice/rest/server.php",
            post(|| async {
                Json(json!({
                    "exception": "moodle_exception",
                    "errorcode": "invalidtoken",
                    "message": "Invalid token - token not found",
                    "debuginfo": "token was revoked",
                }))
            }),
        );
        let base = start_server(app).await;

        let session = HttpSession::new().unwrap();
        let ws = WsClient::new(&session, &base, "stale");
        let err = ws.call("core_webservice_get_site_info", &json!({})).await;
        match err {
            Err(Error::Fault(fault)) => {
                assert_eq!(fault.errorcode, "invalidtoken");
                assert_eq!(fault.debuginfo.as_deref(), Some("token was revoked"));
            }
            other => panic!("expected fault error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_success_status_is_an_http_error() {
        let app = Router::new().route(
            "/webservice/rest/server.php",
            post(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = start_server(app).await;

        let session = HttpSession::new().unwrap();
        let ws = WsClient::new(&session, &base, "tok");
        let err = ws.call("core_webservice_get_site_info", &json!({})).await;
        match err {
            Err(Error::Http(message)) => {
                assert!(message.contains("503"), "got: {message}");
            }
            other => panic!("expected http error, got {other:?}"),
        }
    }
}
