//! # CSP Reporting
//!
//! Browsers POST a violation report whenever a page breaks the active
//! Content-Security-Policy. Reports land here, get stamped with an id, a
//! timestamp and the sender's user agent and address, and are kept in memory.
//!
//! ## Report Shape
//!
//! ```json
//! {
//!   "csp-report": {
//!     "document-uri": "http://localhost:3000/",
//!     "violated-directive": "script-src-elem",
//!     "blocked-uri": "https://evil.example/x.js"
//!   }
//! }
//! ```
//!
//! Whatever sits under `csp-report` is copied into the stored record as is.
//! A body without it is still stored, with only the added metadata.
//!
//! ## Dashboard
//!
//! `/csp-dashboard` dumps every stored record as pretty JSON inside `<pre>`
//! blocks. The JSON is not escaped, so a crafted report field can inject
//! markup into the dashboard.
use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::to_bytes,
    extract::{ConnectInfo, Request, State},
    http::{
        StatusCode,
        header::{CACHE_CONTROL, EXPIRES, PRAGMA, USER_AGENT},
    },
    response::{Html, IntoResponse},
};
use chrono::{SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    state::AppState,
    utils::{CSP_REPORT_CONTENT_TYPE, JSON_CONTENT_TYPE, json_body},
};

pub const REPORT_KEY: &str = "csp-report";
pub const REPORT_BODY_LIMIT: usize = 100 * 1024;

const ID_KEY: &str = "id";
const TIMESTAMP_KEY: &str = "timestamp";
const USER_AGENT_KEY: &str = "userAgent";
const IP_KEY: &str = "ip";

const DASHBOARD_STYLE: &str = "
    body { font-family: monospace; padding: 20px; background: #fafafa; }
    pre { background: #f0f0f0; padding: 12px; border: 1px solid #ccc; border-radius: 5px; overflow-x: auto; }
    h1 { font-size: 24px; }
  ";

#[derive(Clone, Debug)]
pub struct CspViolation {
    /// Epoch millis plus a random fraction. Not unique, not an ordering key.
    pub id: f64,
    pub timestamp: String,
    pub report: Map<String, Value>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

impl CspViolation {
    pub fn new(body: &Value, user_agent: Option<String>, ip: Option<String>) -> Self {
        let now = Utc::now();

        Self {
            id: now.timestamp_millis() as f64 + rand::random::<f64>(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            report: body
                .get(REPORT_KEY)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            user_agent,
            ip,
        }
    }

    /// Flat record: `id`, `timestamp`, the reported fields in their original
    /// order, then `userAgent` and `ip`. Reported fields may overwrite `id`
    /// and `timestamp` but never the request metadata.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert(ID_KEY.to_string(), Value::from(self.id));
        record.insert(
            TIMESTAMP_KEY.to_string(),
            Value::String(self.timestamp.clone()),
        );

        for (key, value) in &self.report {
            let value = match key.as_str() {
                USER_AGENT_KEY => self.user_agent.clone().map(Value::String),
                IP_KEY => self.ip.clone().map(Value::String),
                _ => Some(value.clone()),
            };

            if let Some(value) = value {
                record.insert(key.clone(), value);
            }
        }

        if let Some(user_agent) = &self.user_agent {
            record.insert(USER_AGENT_KEY.to_string(), Value::String(user_agent.clone()));
        }

        if let Some(ip) = &self.ip {
            record.insert(IP_KEY.to_string(), Value::String(ip.clone()));
        }

        record
    }

    pub fn to_pretty_json(&self) -> String {
        format!("{:#}", Value::Object(self.to_json()))
    }
}

impl Serialize for CspViolation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

pub async fn ingest_report(State(state): State<Arc<AppState>>, request: Request) -> StatusCode {
    let (parts, body) = request.into_parts();

    let ip = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip().to_string());

    let user_agent = parts
        .headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = to_bytes(body, REPORT_BODY_LIMIT).await.unwrap_or_default();
    let body = json_body(
        &parts.headers,
        &body,
        &[JSON_CONTENT_TYPE, CSP_REPORT_CONTENT_TYPE],
    );

    let violation = CspViolation::new(&body, user_agent, ip);
    info!(
        "CSP violation report received:\n{}",
        violation.to_pretty_json()
    );

    state.reports.push(violation);

    StatusCode::NO_CONTENT
}

pub async fn csp_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let html = render_dashboard(&state.reports.snapshot());

    (
        [
            (CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (PRAGMA, "no-cache"),
            (EXPIRES, "0"),
        ],
        Html(html),
    )
}

pub fn render_dashboard(reports: &[CspViolation]) -> String {
    let placeholder = if reports.is_empty() {
        "<p>No reports received yet.</p>"
    } else {
        ""
    };

    let blocks: String = reports
        .iter()
        .map(|report| format!("\n    <pre>{}</pre>\n  ", report.to_pretty_json()))
        .collect();

    format!(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta http-equiv="Cache-Control" content="no-cache, no-store, must-revalidate">
  <meta http-equiv="Pragma" content="no-cache">
  <meta http-equiv="Expires" content="0">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>CSP Reports - Raw JSON</title>
  <style>{style}</style>
</head>
<body>
  <h1>CSP Violation Reports ({count})</h1>
  <p>Below are the raw JSON reports received via CSP reporting:</p>

  {placeholder}

  {blocks}
</body>
</html>
  "#,
        count = reports.len(),
        style = DASHBOARD_STYLE,
    )
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use serde_json::{Value, json};

    use super::*;

    fn keys(violation: &CspViolation) -> Vec<String> {
        violation.to_json().keys().cloned().collect()
    }

    #[test]
    fn test_merges_report_fields_in_order() {
        let body = json!({
            "csp-report": {
                "document-uri": "https://x/",
                "violated-directive": "script-src-elem",
                "blocked-uri": "inline"
            }
        });

        let violation = CspViolation::new(
            &body,
            Some("Mozilla/5.0".to_string()),
            Some("127.0.0.1".to_string()),
        );

        assert_eq!(
            keys(&violation),
            vec![
                "id",
                "timestamp",
                "document-uri",
                "violated-directive",
                "blocked-uri",
                "userAgent",
                "ip"
            ]
        );

        let record = violation.to_json();
        assert_eq!(record["document-uri"], "https://x/");
        assert_eq!(record["userAgent"], "Mozilla/5.0");
        assert_eq!(record["ip"], "127.0.0.1");
    }

    #[test]
    fn test_missing_report_keeps_metadata_only() {
        let violation = CspViolation::new(&json!({"other": 1}), None, Some("::1".to_string()));

        assert_eq!(keys(&violation), vec!["id", "timestamp", "ip"]);

        let violation = CspViolation::new(&Value::Null, None, None);
        assert_eq!(keys(&violation), vec!["id", "timestamp"]);
    }

    #[test]
    fn test_non_object_report_ignored() {
        let violation = CspViolation::new(&json!({"csp-report": "oops"}), None, None);

        assert!(violation.report.is_empty());
    }

    #[test]
    fn test_report_overrides_id_but_not_metadata() {
        let body = json!({
            "csp-report": {
                "id": "forged",
                "userAgent": "forged",
                "ip": "forged",
                "blocked-uri": "eval"
            }
        });

        let violation = CspViolation::new(&body, Some("real-agent".to_string()), None);
        let record = violation.to_json();

        assert_eq!(record["id"], "forged");
        assert_eq!(record["userAgent"], "real-agent");
        assert!(!record.contains_key("ip"));
        assert_eq!(
            keys(&violation),
            vec!["id", "timestamp", "userAgent", "blocked-uri"]
        );
    }

    #[test]
    fn test_id_and_timestamp() {
        let before = Utc::now().timestamp_millis() as f64;
        let violation = CspViolation::new(&Value::Null, None, None);
        let after = Utc::now().timestamp_millis() as f64 + 1.0;

        assert!(violation.id >= before && violation.id < after);
        assert!(violation.timestamp.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&violation.timestamp).is_ok());
    }

    #[test]
    fn test_empty_dashboard() {
        let html = render_dashboard(&[]);

        assert!(html.contains("<h1>CSP Violation Reports (0)</h1>"));
        assert!(html.contains("<p>No reports received yet.</p>"));
        assert!(!html.contains("<pre>"));
    }

    #[test]
    fn test_dashboard_embeds_raw_json() {
        let reports = vec![
            CspViolation::new(&json!({"csp-report": {"document-uri": "https://x/"}}), None, None),
            CspViolation::new(
                &json!({"csp-report": {"blocked-uri": "</pre><script>alert(1)</script>"}}),
                None,
                None,
            ),
        ];

        let html = render_dashboard(&reports);

        assert!(html.contains("<h1>CSP Violation Reports (2)</h1>"));
        assert!(!html.contains("No reports received yet."));
        assert_eq!(html.matches("<pre>").count(), 2);
        assert!(html.contains(r#""document-uri": "https://x/""#));
        assert!(html.contains("</pre><script>alert(1)</script>"));
    }
}
