use std::process::exit;

use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(e) = nightlife::start_server().await {
        error!("Failed to start server: {e}");
        exit(1);
    }
}
