//! The shared library for Tether, a connectivity indicator for Rust web frontends.
//!
//! This library holds everything that does not touch the DOM: the connection state store,
//! the indicator state machine and its timer slots, the well-known store locator,
//! the service worker probe protocol, a connection-tracking HTTP client, error handling, logging, and macros.

pub mod api;
pub mod bridge;
pub mod errors;
pub mod host;
pub mod indicator;
pub mod locator;
pub mod log;
pub mod macros;
pub mod state;
pub mod timer;

pub use serde;
pub use serde_json;
pub use tracing;

pub use indicator::{ConnectionIndicator, IndicatorConfig, IndicatorFlags, LoadingBarState};
pub use state::{ConnectionState, ConnectionStateStore};
