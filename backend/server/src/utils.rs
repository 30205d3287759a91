use std::io::ErrorKind;

use axum::http::{HeaderMap, header::CONTENT_TYPE};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::warn;

use crate::error::ServerError;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const CSP_REPORT_CONTENT_TYPE: &str = "application/csp-report";

/// Binds `host:start_port`, walking up one port at a time while the address is taken.
pub async fn bind_available_port(host: &str, start_port: u16) -> Result<TcpListener, ServerError> {
    let mut port = start_port;

    loop {
        let address = format!("{host}:{port}");

        match TcpListener::bind(&address).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == ErrorKind::AddrInUse && port < u16::MAX => {
                warn!("Port {port} in use, trying {}", port + 1);
                port += 1;
            }
            Err(source) => return Err(ServerError::Bind { address, source }),
        }
    }
}

/// Parses the body as JSON when the request declares one of `accepted` media types.
/// Anything else (wrong type, empty, malformed) comes back as `Value::Null`.
pub fn json_body(headers: &HeaderMap, body: &[u8], accepted: &[&str]) -> Value {
    if !has_content_type(headers, accepted) {
        return Value::Null;
    }

    serde_json::from_slice(body).unwrap_or(Value::Null)
}

fn has_content_type(headers: &HeaderMap, accepted: &[&str]) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let media_type = content_type.split(';').next().unwrap_or_default().trim();

    accepted
        .iter()
        .any(|accepted| media_type.eq_ignore_ascii_case(accepted))
}

/// Text form of a loosely typed field. `null` and missing are both unset.
pub fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
