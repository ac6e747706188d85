use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use super::types::{CaptureRequest, ScreenshotArtifact, ScreenshotUpload};
use crate::error_handling::types::HandoffError;

/// Artifacts retained when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug)]
struct ChannelState {
    request: CaptureRequest,
    artifacts: VecDeque<ScreenshotArtifact>,
}

/// Capture request latch plus the stored artifacts, under one mutex.
#[derive(Debug)]
pub struct ScreenshotChannel {
    state: Mutex<ChannelState>,
    capacity: usize,
}

impl Default for ScreenshotChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ScreenshotChannel {
    /// Creates a channel keeping at most `capacity` artifacts (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(ChannelState {
                request: CaptureRequest::Idle,
                artifacts: VecDeque::with_capacity(capacity),
            }),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raises the capture request. Raising it twice is the same as once.
    pub fn request_capture(&self) {
        self.lock().request.raise();
        info!("Screenshot capture requested");
    }

    /// Returns whether a capture was requested and resets the request.
    pub fn poll_and_clear_capture_request(&self) -> bool {
        let requested = self.lock().request.take();
        if requested {
            info!("Screenshot capture request delivered to worker");
        } else {
            debug!("Screenshot poll: nothing requested");
        }
        requested
    }

    /// Decodes and stores an upload, evicting the oldest artifact when full.
    ///
    /// Decoding happens before the lock is taken.
    pub fn upload(&self, upload: ScreenshotUpload) -> Result<ScreenshotArtifact, HandoffError> {
        let artifact = ScreenshotArtifact::from_upload(upload)?;
        self.store(artifact.clone());
        Ok(artifact)
    }

    /// Appends an already decoded artifact.
    pub fn store(&self, artifact: ScreenshotArtifact) {
        let mut state = self.lock();
        while state.artifacts.len() >= self.capacity {
            if let Some(evicted) = state.artifacts.pop_front() {
                debug!("Evicted screenshot {} (capacity {})", evicted.id, self.capacity);
            }
        }
        info!(
            "Stored screenshot {} ({} bytes, {})",
            artifact.id, artifact.size, artifact.mime_type
        );
        state.artifacts.push_back(artifact);
    }

    /// Removes every stored artifact and returns how many there were.
    pub fn clear_all(&self) -> usize {
        let mut state = self.lock();
        let removed = state.artifacts.len();
        state.artifacts.clear();
        info!("Cleared {} screenshot(s)", removed);
        removed
    }

    /// The last `n` artifacts, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ScreenshotArtifact> {
        let state = self.lock();
        let skip = state.artifacts.len().saturating_sub(n);
        state.artifacts.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().artifacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn upload(image: &str) -> ScreenshotUpload {
        ScreenshotUpload {
            image: image.to_string(),
            timestamp: None,
        }
    }

    #[test]
    fn test_capture_requests_coalesce() {
        let channel = ScreenshotChannel::default();
        channel.request_capture();
        channel.request_capture();
        assert!(channel.poll_and_clear_capture_request());
        assert!(!channel.poll_and_clear_capture_request());
    }

    #[test]
    fn test_poll_without_request_is_false() {
        let channel = ScreenshotChannel::default();
        assert!(!channel.poll_and_clear_capture_request());
    }

    #[test]
    fn test_recent_returns_tail_in_insertion_order() {
        let channel = ScreenshotChannel::default();
        let a1 = channel.upload(upload("YQ==")).unwrap();
        let a2 = channel.upload(upload("Yg==")).unwrap();

        assert_eq!(channel.recent(1), vec![a2.clone()]);
        assert_eq!(channel.recent(5), vec![a1, a2]);
        assert!(channel.recent(0).is_empty());
        assert_eq!(channel.len(), 2);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let channel = ScreenshotChannel::new(2);
        let _a1 = channel.upload(upload("YQ==")).unwrap();
        let a2 = channel.upload(upload("Yg==")).unwrap();
        let a3 = channel.upload(upload("Yw==")).unwrap();

        assert_eq!(channel.recent(10), vec![a2, a3]);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let channel = ScreenshotChannel::new(0);
        assert_eq!(channel.capacity(), 1);
        channel.upload(upload("YQ==")).unwrap();
        channel.upload(upload("Yg==")).unwrap();
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn test_failed_upload_stores_nothing() {
        let channel = ScreenshotChannel::default();
        assert!(channel.upload(upload("***")).is_err());
        assert!(channel.is_empty());
    }

    #[test]
    fn test_clear_all_leaves_request_alone() {
        let channel = ScreenshotChannel::default();
        channel.upload(upload("YQ==")).unwrap();
        channel.request_capture();

        assert_eq!(channel.clear_all(), 1);
        assert!(channel.is_empty());
        assert!(channel.poll_and_clear_capture_request());
    }

    #[test]
    fn test_concurrent_polls_deliver_request_once() {
        let channel = Arc::new(ScreenshotChannel::default());
        channel.request_capture();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let channel = Arc::clone(&channel);
                thread::spawn(move || channel.poll_and_clear_capture_request())
            })
            .collect();

        let delivered = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|seen| *seen)
            .count();
        assert_eq!(delivered, 1);
    }
}
