use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid {key} value: {reason}")]
    Config { key: String, reason: String },

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] io::Error),
}
