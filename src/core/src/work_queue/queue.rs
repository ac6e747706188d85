use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of characters of the latest item shown in a status preview.
pub const PREVIEW_CHARS: usize = 100;

/// One submitted unit of work. Identity is its position in the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    pub content: String,
    pub submitted_at: DateTime<Utc>,
}

impl WorkItem {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            submitted_at: Utc::now(),
        }
    }

    /// First [`PREVIEW_CHARS`] characters, with `...` appended when cut.
    pub fn preview(&self) -> String {
        let mut chars = self.content.char_indices();
        match chars.nth(PREVIEW_CHARS) {
            Some((cut, _)) => format!("{}...", &self.content[..cut]),
            None => self.content.clone(),
        }
    }
}

/// Snapshot returned by the status operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub locked: bool,
    pub queue_size: usize,
    pub latest_preview: String,
}

/// The ordered sequence of pending items plus the admission lock.
///
/// This is plain data: callers are expected to hold whatever lock guards it
/// for the whole read-modify-write. The latest item is always the tail.
#[derive(Debug, Default)]
pub struct QueueState {
    items: Vec<WorkItem>,
    locked: bool,
}

impl QueueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends to the tail and returns the 1-based position.
    pub fn push(&mut self, item: WorkItem) -> usize {
        self.items.push(item);
        self.items.len()
    }

    pub fn latest(&self) -> Option<&WorkItem> {
        self.items.last()
    }

    /// Removes the most recently appended item. Empty is not an error.
    pub fn pop_latest(&mut self) -> Option<WorkItem> {
        self.items.pop()
    }

    /// Empties the sequence and returns how many items were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }

    pub fn status(&self) -> QueueStatus {
        QueueStatus {
            locked: self.locked,
            queue_size: self.items.len(),
            latest_preview: self
                .latest()
                .map(WorkItem::preview)
                .unwrap_or_else(|| "none".to_string()),
        }
    }
}
