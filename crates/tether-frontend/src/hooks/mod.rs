pub mod use_connection_state;

pub use use_connection_state::*;
