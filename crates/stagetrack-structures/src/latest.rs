use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};

/// Single-slot "latest value" channel between pipeline stages.
///
/// A publish overwrites whatever the consumer has not yet read; reads never
/// block and may observe a value that was already seen. This deliberately
/// favors freshness over completeness: a slow consumer skips intermediate
/// values instead of working through a backlog.
///
/// Handles are cheap clones sharing one slot, so a producer and a consumer
/// each hold their own copy.
///
/// # Example
/// ```
/// use stagetrack_structures::LatestValueCell;
///
/// let cell = LatestValueCell::new();
/// let consumer = cell.clone();
///
/// cell.publish(1);
/// cell.publish(2); // overwrites the unread 1
/// assert_eq!(consumer.take_latest(), Some(2));
/// assert_eq!(consumer.take_latest(), None);
/// ```
pub struct LatestValueCell<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> LatestValueCell<T> {
    /// Creates a new empty cell.
    pub fn new() -> LatestValueCell<T> {
        LatestValueCell {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Publishes a value, replacing any unread previous value.
    pub fn publish(&self, value: T) {
        // A poisoned slot still holds usable data; recover it
        let mut guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(value);
    }

    /// Removes and returns the latest published value, if any.
    pub fn take_latest(&self) -> Option<T> {
        let mut guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.take()
    }

    /// Returns true if a published value is waiting.
    pub fn has_value(&self) -> bool {
        let guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.is_some()
    }
}

impl<T: Clone> LatestValueCell<T> {
    /// Returns a copy of the latest published value without consuming it.
    ///
    /// Display observers use this so the pipeline consumer still sees the
    /// value.
    pub fn read_latest(&self) -> Option<T> {
        let guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }
}

// Manual Clone: handles share the slot and must not require T: Clone.
impl<T> Clone for LatestValueCell<T> {
    fn clone(&self) -> Self {
        LatestValueCell {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for LatestValueCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for LatestValueCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatestValueCell")
            .field("has_value", &self.has_value())
            .finish()
    }
}
