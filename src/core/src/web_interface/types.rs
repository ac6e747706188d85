use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth_gate::AuthGate;
use crate::screenshot_channel::ScreenshotChannel;
use crate::work_queue::AckHandshake;

/// Shared handles injected into every route.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthGate,
    pub queue: Arc<AckHandshake>,
    pub screenshots: Arc<ScreenshotChannel>,
    pub gallery_size: usize,
    pub max_upload_bytes: u64,
}

/// Form body carrying only the credential.
#[derive(Debug, Default, Deserialize)]
pub struct KeyForm {
    pub key: Option<String>,
}

/// Query string carrying only the credential.
#[derive(Debug, Default, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitForm {
    pub key: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    pub key: Option<String>,
    pub limit: Option<usize>,
}

/// JSON body of a screenshot upload.
#[derive(Debug, Default, Deserialize)]
pub struct UploadBody {
    pub key: Option<String>,
    pub image: Option<String>,
    pub timestamp: Option<String>,
}

/// API error payload
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

/// Generic confirmation payload
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: String,
    pub position: usize,
}

#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    pub message: String,
    pub consumed: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub capture_requested: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub id: String,
    pub size: usize,
    pub captured_at: String,
}
