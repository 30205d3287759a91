//! # VIP Guest List
//!
//! Guest registrations for the nightlife demo page.
//!
//! ## Injection
//!
//! Nothing here is escaped or validated, on purpose. The page renders the list
//! with `innerHTML` (stored injection) and the link-style registration echoes
//! the input straight into markup (reflected injection). Registration also
//! works from a plain `<img src="/api/order?...">`, so any page can register
//! a guest on behalf of a visitor.
use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, Uri},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::{
    state::AppState,
    utils::{JSON_CONTENT_TYPE, field_text, json_body},
};

pub const CLEARED_MESSAGE: &str = "All VIP guests have been cleared from the list!";

/// Printed in messages and fragments in place of a missing field.
pub const UNSET_TEXT: &str = "undefined";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GuestEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl GuestEntry {
    pub fn from_json(body: &Value) -> Self {
        Self {
            order: field_text(body.get("order")),
            name: field_text(body.get("name")),
        }
    }

    /// Repeated keys are kept and joined with `,` (`name=a&name=b` is `a,b`).
    pub fn from_query(uri: &Uri) -> Self {
        let pairs: Vec<(String, String)> = Query::try_from_uri(uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();

        let joined = |key: &str| {
            let values: Vec<&str> = pairs
                .iter()
                .filter(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .collect();

            (!values.is_empty()).then(|| values.join(","))
        };

        Self {
            order: joined("order"),
            name: joined("name"),
        }
    }

    fn name_text(&self) -> &str {
        self.name.as_deref().unwrap_or(UNSET_TEXT)
    }

    fn order_text(&self) -> &str {
        self.order.as_deref().unwrap_or(UNSET_TEXT)
    }

    pub fn added_message(&self) -> String {
        format!(
            "{} has been added to the VIP list for {}!",
            self.name_text(),
            self.order_text()
        )
    }

    pub fn registered_fragment(&self) -> String {
        format!(
            "<p>{} has been registered for {}!</p>",
            self.name_text(),
            self.order_text()
        )
    }
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

pub async fn list_guests(State(state): State<Arc<AppState>>) -> Json<Vec<GuestEntry>> {
    Json(state.guests.snapshot())
}

/// POST reads a JSON body and answers JSON. Every other method reads the query
/// string and answers with an HTML fragment.
pub async fn register_guest(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let guest = if method == Method::POST {
        GuestEntry::from_json(&json_body(&headers, &body, &[JSON_CONTENT_TYPE]))
    } else {
        GuestEntry::from_query(&uri)
    };

    info!(
        "New {method} guest registration: {} reserved for {}",
        guest.name_text(),
        guest.order_text()
    );

    state.guests.push(guest.clone());

    if method == Method::POST {
        Json(Message {
            message: guest.added_message(),
        })
        .into_response()
    } else {
        Html(guest.registered_fragment()).into_response()
    }
}

pub async fn clear_guests(State(state): State<Arc<AppState>>) -> Json<Message> {
    state.guests.clear();
    info!("All VIP guests cleared!");

    Json(Message {
        message: CLEARED_MESSAGE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::Uri;
    use serde_json::json;

    use super::GuestEntry;

    #[test]
    fn test_from_json_keeps_raw_markup() {
        let guest = GuestEntry::from_json(&json!({
            "name": "<script>x</script>",
            "order": "Champagne"
        }));

        assert_eq!(guest.name.as_deref(), Some("<script>x</script>"));
        assert_eq!(
            guest.added_message(),
            "<script>x</script> has been added to the VIP list for Champagne!"
        );
    }

    #[test]
    fn test_from_json_missing_fields() {
        let guest = GuestEntry::from_json(&json!({"name": "Ada"}));
        assert_eq!(guest.order, None);

        let guest = GuestEntry::from_json(&serde_json::Value::Null);
        assert_eq!(guest, GuestEntry::default());
        assert_eq!(
            guest.added_message(),
            "undefined has been added to the VIP list for undefined!"
        );
    }

    #[test]
    fn test_from_query_decodes_params() {
        let uri: Uri = "/api/order?name=%3Cimg%20src%3Dx%3E&order=Table%201"
            .parse()
            .unwrap();
        let guest = GuestEntry::from_query(&uri);

        assert_eq!(guest.name.as_deref(), Some("<img src=x>"));
        assert_eq!(
            guest.registered_fragment(),
            "<p><img src=x> has been registered for Table 1!</p>"
        );
    }

    #[test]
    fn test_from_query_without_params() {
        let uri: Uri = "/api/order".parse().unwrap();
        let guest = GuestEntry::from_query(&uri);

        assert_eq!(guest, GuestEntry::default());
        assert_eq!(
            guest.registered_fragment(),
            "<p>undefined has been registered for undefined!</p>"
        );
    }

    #[test]
    fn test_from_query_repeated_keys_joined() {
        let uri: Uri = "/api/order?name=Ada&name=Bob&order=Champagne"
            .parse()
            .unwrap();
        let guest = GuestEntry::from_query(&uri);

        assert_eq!(guest.name.as_deref(), Some("Ada,Bob"));
        assert_eq!(guest.order.as_deref(), Some("Champagne"));
        assert_eq!(
            guest.registered_fragment(),
            "<p>Ada,Bob has been registered for Champagne!</p>"
        );
    }

    #[test]
    fn test_unset_fields_not_serialized() {
        let guest = GuestEntry {
            order: None,
            name: Some("Ada".to_string()),
        };

        assert_eq!(serde_json::to_value(&guest).unwrap(), json!({"name": "Ada"}));
    }
}
