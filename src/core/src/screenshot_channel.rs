//! Out-of-band screenshot exchange, independent of the work queue.
//!
//! The operator raises a capture request; the worker polls for it (the poll
//! consumes the request), captures, and uploads the image. Uploaded artifacts
//! are kept in a bounded ring buffer for the gallery.

pub mod channel;
pub mod types;

pub use channel::{ScreenshotChannel, DEFAULT_CAPACITY};
pub use types::{CaptureRequest, ScreenshotArtifact, ScreenshotUpload};
