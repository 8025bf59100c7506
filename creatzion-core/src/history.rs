//! Bounded log of recent user messages, fed back into every prompt.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

pub const DEFAULT_CAPACITY: usize = 10;

/// FIFO of the last `capacity` messages. Shared across threads; pushes from
/// concurrent turns interleave in whatever order they take the lock.
#[derive(Debug)]
pub struct ConversationHistory {
    capacity: usize,
    messages: Mutex<VecDeque<String>>,
}

impl ConversationHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            messages: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, message: impl Into<String>) {
        let mut q = self.lock();
        q.push_back(message.into());
        while q.len() > self.capacity {
            q.pop_front();
        }
    }

    /// Oldest first
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    // A poisoned lock still holds a valid queue of strings.
    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let h = ConversationHistory::new(3);
        for i in 1..=5 {
            h.push(format!("m{i}"));
        }
        assert_eq!(h.snapshot(), vec!["m3", "m4", "m5"]);
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn test_reset() {
        let h = ConversationHistory::default();
        h.push("hi");
        assert!(!h.is_empty());
        h.reset();
        assert!(h.is_empty());
        assert_eq!(h.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let h = ConversationHistory::new(0);
        h.push("a");
        h.push("b");
        assert_eq!(h.snapshot(), vec!["b"]);
    }

    #[test]
    fn test_concurrent_pushes_stay_bounded() {
        let h = std::sync::Arc::new(ConversationHistory::new(10));
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let h = h.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        h.push(format!("{n}-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(h.len(), 10);
    }
}
