//! Reusable UI components for the Tether frontend.

pub mod connection_indicator;

pub use connection_indicator::*;
