use std::sync::Arc;

use axum::{
    Router,
    http::{
        HeaderName, HeaderValue, Method,
        header::{CONTENT_SECURITY_POLICY, CONTENT_TYPE},
    },
    routing::{any, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
};

use crate::{
    csp::{csp_dashboard, ingest_report},
    guests::{clear_guests, list_guests, register_guest},
    state::AppState,
};

pub const EXAMPLE_HEADER: &str = "x-example";
pub const EXAMPLE_HEADER_VALUE: &str = "this is a new custom header";

pub const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'self'; \
    script-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
    style-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
    connect-src 'self'; \
    img-src 'self' data:;";

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/orders", get(list_guests))
        .route("/api/order", any(register_guest))
        .route("/api/clear-orders", get(clear_guests))
        .route("/csp-report", post(ingest_report))
        .route("/csp-dashboard", get(csp_dashboard))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(EXAMPLE_HEADER),
            HeaderValue::from_static(EXAMPLE_HEADER_VALUE),
        ))
        .with_state(state)
}
