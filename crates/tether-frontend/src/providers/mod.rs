//! Context providers for shared application state and services.

pub mod api;
pub mod connection;

pub use connection::*;
