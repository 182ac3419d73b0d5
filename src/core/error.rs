//! Error types for the photo tree

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Startup could not complete; the message is shown to the user with a retry action.
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}
