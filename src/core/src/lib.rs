pub mod auth_gate;
pub use auth_gate::{AuthGate, CredentialVerifier, StaticSecret};

pub mod configuration;
pub use configuration::{Configuration, SecretSource};

pub mod controller;
pub use controller::Controller;

pub mod error_handling;
pub use error_handling::HandoffError;

pub mod screenshot_channel;
pub use screenshot_channel::{ScreenshotArtifact, ScreenshotChannel, ScreenshotUpload};

pub mod web_interface;
pub use web_interface::WebServer;

pub mod work_queue;
pub use work_queue::{AckHandshake, HandshakeState, QueueStatus, WorkItem};
