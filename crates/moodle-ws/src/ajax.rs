//! Anonymous AJAX batch protocol
//!
//! Wraps `POST <wwwroot>/lib/ajax/service.php`: the request body is a JSON
//! array of `{index, methodname, args}` objects and the response mirrors it
//! as `{error, data}` envelopes in the same order. Public methods such as
//! `tool_mobile_get_public_config` work without any token, which is what the
//! login flow relies on.

use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result, WsFault};
use crate::rest::{normalize_wwwroot, string_field};
use crate::session::HttpSession;

/// Path of the AJAX batch endpoint, relative to the site root.
const AJAX_ENDPOINT: &str = "/lib/ajax/service.php";

/// One method invocation inside an AJAX batch.
#[derive(Debug, Clone)]
pub struct AjaxRequest {
    pub methodname: String,
    pub args: Value,
}

impl AjaxRequest {
    pub fn new(methodname: impl Into<String>, args: Value) -> Self {
        Self {
            methodname: methodname.into(),
            args,
        }
    }
}

/// Client for the AJAX batch endpoint of one site.
pub struct AjaxClient {
    client: reqwest::Client,
    wwwroot: String,
}

impl AjaxClient {
    /// Bind a session to a site root.
    pub fn new(session: &HttpSession, wwwroot: impl Into<String>) -> Self {
        Self {
            client: session.client().clone(),
            wwwroot: normalize_wwwroot(wwwroot.into()),
        }
    }

    /// Invoke a batch of methods and return their `data` payloads in order.
    pub async fn call(&self, requests: &[AjaxRequest]) -> Result<Vec<Value>> {
        let payload: Vec<Value> = requests
            .iter()
            .enumerate()
            .map(|(index, request)| {
                json!({
                    "index": index,
                    "methodname": request.methodname,
                    "args": request.args,
                })
            })
            .collect();

        debug!(batch_size = requests.len(), "sending ajax batch");
        let response = self
            .client
            .post(format!("{}{AJAX_ENDPOINT}", self.wwwroot))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Http(format!("ajax request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Http(format!(
                "ajax endpoint returned {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Json(format!("invalid ajax response: {e}")))?;

        // A request the server rejects outright (bad payload, blocked
        // origin) comes back as a single error object instead of an array.
        if let Some(object) = body.as_object() {
            return Err(Error::Fault(whole_call_fault(object)));
        }

        let items = body
            .as_array()
            .ok_or_else(|| Error::Json("ajax response is neither array nor object".into()))?;
        items.iter().map(unwrap_item).collect()
    }

    /// Invoke a single method and return its `data` payload.
    pub async fn call_one(&self, methodname: &str, args: Value) -> Result<Value> {
        let results = self.call(&[AjaxRequest::new(methodname, args)]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| Error::Json("empty ajax response".into()))
    }
}

/// Unwrap one `{error, data}` envelope.
fn unwrap_item(item: &Value) -> Result<Value> {
    let failed = match item.get("error") {
        None | Some(Value::Bool(false)) | Some(Value::Null) => false,
        _ => true,
    };
    if failed {
        return Err(Error::Fault(item_fault(item)));
    }
    Ok(item.get("data").cloned().unwrap_or(Value::Null))
}

fn item_fault(item: &Value) -> WsFault {
    match item.get("exception").and_then(Value::as_object) {
        Some(exception) => WsFault {
            exception: string_field(exception, "exception"),
            errorcode: string_field(exception, "errorcode"),
            message: string_field(exception, "message"),
            debuginfo: exception
                .get("debuginfo")
                .and_then(Value::as_str)
                .map(String::from),
        },
        None => WsFault {
            exception: String::new(),
            errorcode: String::new(),
            message: item
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("ajax call failed")
                .to_string(),
            debuginfo: None,
        },
    }
}

fn whole_call_fault(object: &serde_json::Map<String, Value>) -> WsFault {
    let message = object
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| object.get("message").and_then(Value::as_str))
        .unwrap_or("malformed ajax response")
        .to_string();
    WsFault {
        exception: string_field(object, "exception"),
        errorcode: string_field(object, "errorcode"),
        message,
        debuginfo: None,
    }
}
