//! Shared error types for the tether crates.
#[cfg(not(target_arch = "wasm32"))]
pub use color_eyre::Report;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[cfg(not(target_arch = "wasm32"))]
    #[error("Failed to install color_eyre")]
    ColorEyre(#[from] color_eyre::Report),
    #[error("Failed to install tracing-subscriber")]
    TracingSubscriber(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("No service worker container is available")]
    Unavailable,
    #[error("No active service worker to probe")]
    NoActiveWorker,
    #[error("Failed to serialize probe message: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("JavaScript error: {0}")]
    Js(String),
}
