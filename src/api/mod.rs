//! Host-facing entry points: global configuration and extension registration

pub mod config;
pub mod extension;

pub use config::*;
pub use extension::*;
