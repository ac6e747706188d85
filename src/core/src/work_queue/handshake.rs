use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use super::queue::{QueueState, QueueStatus, WorkItem};
use crate::error_handling::types::HandoffError;

/// Admission state of the handoff queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Unlocked,
    Locked,
}

/// Enforces the submit → lock → (ack | interrupt) → unlock protocol.
///
/// The sequence and the lock flag are guarded by one mutex, so
/// "check flag, append, set flag" and "pop tail, clear flag" are each a
/// single critical section. Nothing here blocks beyond acquiring it.
///
/// `peek_latest` is idempotent; `acknowledge` and `interrupt` consume the
/// tail item. A consumer reads with the former, then confirms with the
/// latter.
#[derive(Debug, Default)]
pub struct AckHandshake {
    state: Mutex<QueueState>,
}

impl AckHandshake {
    pub fn new() -> Self {
        Self::default()
    }

    // Every transition leaves QueueState consistent before it can panic,
    // so a poisoned lock still guards valid data.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accepts `content` if the queue is unlocked and locks it.
    ///
    /// Content is trimmed; blank content is a validation error. Returns the
    /// 1-based queue position of the new item.
    pub fn submit(&self, content: &str) -> Result<usize, HandoffError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(HandoffError::ValidationError("content".to_string()));
        }

        let mut state = self.lock();
        if state.is_locked() {
            warn!("Submission refused: waiting for acknowledgement");
            return Err(HandoffError::StateConflict);
        }
        let position = state.push(WorkItem::new(content));
        state.set_locked(true);
        info!("Content stored at queue position {}, submissions locked", position);
        Ok(position)
    }

    /// Returns the most recently submitted item without consuming it.
    pub fn peek_latest(&self) -> Result<WorkItem, HandoffError> {
        let state = self.lock();
        match state.latest() {
            Some(item) => {
                debug!("Serving latest content ({} bytes)", item.content.len());
                Ok(item.clone())
            }
            None => Err(HandoffError::NotFound),
        }
    }

    /// Confirms the latest item was processed: removes it and unlocks.
    ///
    /// On an empty queue the removal is a no-op and the queue still unlocks.
    pub fn acknowledge(&self) -> Option<WorkItem> {
        let removed = self.release();
        info!(
            "Acknowledgement received ({}), new submissions allowed",
            describe_removal(&removed)
        );
        removed
    }

    /// Abandons the latest item: same transition as [`acknowledge`].
    ///
    /// [`acknowledge`]: AckHandshake::acknowledge
    pub fn interrupt(&self) -> Option<WorkItem> {
        let removed = self.release();
        warn!(
            "Interrupt received ({}), new submissions allowed",
            describe_removal(&removed)
        );
        removed
    }

    fn release(&self) -> Option<WorkItem> {
        let mut state = self.lock();
        let removed = state.pop_latest();
        state.set_locked(false);
        removed
    }

    /// Clears the lock flag only; pending items stay where they are.
    pub fn force_unlock(&self) {
        let mut state = self.lock();
        state.set_locked(false);
        info!("Queue force-unlocked with {} item(s) pending", state.len());
    }

    /// Drops every item and unlocks. Returns how many items were discarded.
    pub fn clear_queue(&self) -> usize {
        let mut state = self.lock();
        let removed = state.clear();
        state.set_locked(false);
        info!("Queue cleared, {} item(s) discarded", removed);
        removed
    }

    pub fn status(&self) -> QueueStatus {
        self.lock().status()
    }

    pub fn handshake_state(&self) -> HandshakeState {
        if self.lock().is_locked() {
            HandshakeState::Locked
        } else {
            HandshakeState::Unlocked
        }
    }
}

fn describe_removal(removed: &Option<WorkItem>) -> &'static str {
    if removed.is_some() {
        "item consumed"
    } else {
        "queue already empty"
    }
}
