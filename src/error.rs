//! Error types shared across the crate

use thiserror::Error;

/// Errors that can occur while fetching, caching, saving or sharing cats
#[derive(Debug, Error)]
pub enum CatswpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image source answered {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Share failed: {0}")]
    Share(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, CatswpError>;
