//! Page components of the demo application.

pub mod home;

pub use home::*;
