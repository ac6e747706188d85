//! Error types shared by every subsystem.

pub mod types;

pub use types::{ConfigError, ControllerError, HandoffError, WebError};
