//! Documentation of the Las Vegas nightlife demo service.
//!
//! A deliberately vulnerable web app used to teach two browser security topics:
//! Content-Security-Policy reporting and unsanitized output (stored and
//! reflected script injection). **Do not deploy it anywhere real.**
//!
//!
//!
//! # Endpoints
//!
//! | Method | Path | Behavior |
//! |---|---|---|
//! | GET | `/api/orders` | Guest list as JSON |
//! | POST | `/api/order` | Register from JSON body, JSON message back |
//! | any other | `/api/order` | Register from query string, HTML fragment back |
//! | GET | `/api/clear-orders` | Empty the guest list |
//! | POST | `/csp-report` | Store a browser CSP violation report, `204` |
//! | GET | `/csp-dashboard` | Every stored report as raw JSON in HTML |
//! | GET | `/*` | Static files from `STATIC_DIR` |
//!
//! Every response carries an `X-Example` marker header and the demo's
//! Content-Security-Policy. CORS is open to any origin.
//!
//!
//!
//! # Notes
//!
//! ## State
//! Both lists live in memory behind a mutex each. A restart wipes them, which
//! is fine for a classroom demo.
//!
//! ## Port
//! `RUST_PORT` is only the preferred port. If it is taken the server walks up
//! until it finds a free one, so several copies can run side by side during a
//! workshop.
//!
//!
//!
//! # Setup
//!
//! Run from `backend/` so the default `STATIC_DIR` of `public` resolves.
//! ```sh
//! RUST_LOG=info cargo run --bin nightlife
//! ```
//!
//! Poke a running server.
//! ```sh
//! cargo run --bin nightlife-tester -- register --name "<b>Ada</b>" --order Champagne
//! cargo run --bin nightlife-tester -- report --document-uri http://localhost:3000/
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::net::SocketAddr;

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod csp;
pub mod error;
pub mod guests;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use config::Config;
use error::ServerError;
use routes::router;
use state::AppState;
use utils::bind_available_port;

pub async fn start_server() -> Result<(), ServerError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    let listener = bind_available_port(&config.host, config.port).await?;
    let port = listener.local_addr()?.port();

    let state = AppState::new(config);
    let app = router(state);

    info!("🎰 Las Vegas Nightlife App running at http://localhost:{port}");
    info!("📊 CSP Dashboard: http://localhost:{port}/csp-dashboard");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
