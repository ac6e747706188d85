use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error_handling::types::HandoffError;

const DEFAULT_MIME_TYPE: &str = "image/png";

static DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(image/[A-Za-z0-9.+-]+);base64,").expect("data URL pattern is valid")
});

/// One-shot capture request latch.
///
/// Reading it through [`CaptureRequest::take`] resets it, so two requests
/// raised between polls are seen once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptureRequest {
    #[default]
    Idle,
    Requested,
}

impl CaptureRequest {
    pub fn raise(&mut self) {
        *self = CaptureRequest::Requested;
    }

    /// Returns whether a request was pending and leaves the latch idle.
    pub fn take(&mut self) -> bool {
        std::mem::take(self) == CaptureRequest::Requested
    }
}

/// Raw upload as sent by the worker.
///
/// `image` is either bare base64 or a `data:image/...;base64,` URL.
/// `timestamp` is RFC 3339; when absent the upload time is used.
#[derive(Debug, Clone, Deserialize)]
pub struct ScreenshotUpload {
    pub image: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A stored screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenshotArtifact {
    pub id: Uuid,
    pub mime_type: String,
    /// Canonical (standard alphabet, padded) base64 of the image bytes.
    pub data: String,
    pub captured_at: DateTime<Utc>,
    /// Decoded size in bytes.
    pub size: usize,
}

impl ScreenshotArtifact {
    /// Decodes and normalises an upload.
    ///
    /// Blank images are a validation error; undecodable base64 or a bad
    /// timestamp are processing errors.
    pub fn from_upload(upload: ScreenshotUpload) -> Result<Self, HandoffError> {
        let raw = upload.image.trim();
        if raw.is_empty() {
            return Err(HandoffError::ValidationError("image payload".to_string()));
        }

        let (mime_type, encoded) = match DATA_URL.captures(raw) {
            Some(caps) => {
                let prefix_len = caps.get(0).map_or(0, |m| m.end());
                let mime = caps
                    .get(1)
                    .map_or(DEFAULT_MIME_TYPE, |m| m.as_str())
                    .to_ascii_lowercase();
                (mime, &raw[prefix_len..])
            }
            None => (DEFAULT_MIME_TYPE.to_string(), raw),
        };

        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| HandoffError::ProcessingError(format!("invalid base64 image: {}", e)))?;
        if bytes.is_empty() {
            return Err(HandoffError::ValidationError("image payload".to_string()));
        }

        let captured_at = match upload.timestamp.as_deref().map(str::trim) {
            None | Some("") => Utc::now(),
            Some(ts) => DateTime::parse_from_rfc3339(ts)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    HandoffError::ProcessingError(format!("invalid timestamp '{}': {}", ts, e))
                })?,
        };

        Ok(Self {
            id: Uuid::new_v4(),
            mime_type,
            data: STANDARD.encode(&bytes),
            captured_at,
            size: bytes.len(),
        })
    }

    /// `data:` URL suitable for an `<img src>` attribute.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(image: &str, timestamp: Option<&str>) -> ScreenshotUpload {
        ScreenshotUpload {
            image: image.to_string(),
            timestamp: timestamp.map(str::to_string),
        }
    }

    #[test]
    fn test_capture_request_take_resets() {
        let mut latch = CaptureRequest::default();
        assert!(!latch.take());
        latch.raise();
        latch.raise();
        assert!(latch.take());
        assert!(!latch.take());
        assert_eq!(latch, CaptureRequest::Idle);
    }

    #[test]
    fn test_bare_base64_defaults_to_png() {
        let artifact = ScreenshotArtifact::from_upload(upload("aGVsbG8=", None)).unwrap();
        assert_eq!(artifact.mime_type, "image/png");
        assert_eq!(artifact.size, 5);
        assert_eq!(artifact.data, "aGVsbG8=");
    }

    #[test]
    fn test_data_url_prefix_is_parsed() {
        let artifact = ScreenshotArtifact::from_upload(upload(
            "data:image/JPEG;base64,aGVs\nbG8=",
            Some("2025-03-01T10:00:00Z"),
        ))
        .unwrap();
        assert_eq!(artifact.mime_type, "image/jpeg");
        assert_eq!(artifact.size, 5);
        assert_eq!(artifact.captured_at.to_rfc3339(), "2025-03-01T10:00:00+00:00");
        assert_eq!(artifact.data_url(), "data:image/jpeg;base64,aGVsbG8=");
    }

    #[test]
    fn test_invalid_base64_is_processing_error() {
        let result = ScreenshotArtifact::from_upload(upload("not base64!!", None));
        assert!(matches!(result, Err(HandoffError::ProcessingError(_))));
    }

    #[test]
    fn test_invalid_timestamp_is_processing_error() {
        let result = ScreenshotArtifact::from_upload(upload("aGVsbG8=", Some("yesterday")));
        assert!(matches!(result, Err(HandoffError::ProcessingError(_))));
    }

    #[test]
    fn test_blank_image_is_validation_error() {
        let result = ScreenshotArtifact::from_upload(upload("  ", None));
        assert!(matches!(result, Err(HandoffError::ValidationError(_))));
        let result = ScreenshotArtifact::from_upload(upload("data:image/png;base64,", None));
        assert!(matches!(result, Err(HandoffError::ValidationError(_))));
    }
}
