use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, Notify};

use crate::protocol::Priority;

struct Queued {
    text: String,
    priority: Priority,
}

/// Bounded outbound queue sitting between group publishers and one socket
/// send task. Publishers never block on a slow receiver; a full queue sheds
/// load instead.
pub struct Outbox {
    queue: Mutex<VecDeque<Queued>>,
    notify: Notify,
    capacity: usize,
    closed: AtomicBool,
}

impl Outbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
            capacity,
            closed: AtomicBool::new(false),
        }
    }

    /// Enqueues a frame. When the queue is full the oldest lossy frame is
    /// evicted first; a lossy newcomer that finds no victim is dropped
    /// itself; a critical newcomer evicts the oldest entry. Returns false
    /// when the frame was dropped or the outbox is closed.
    pub async fn push(&self, text: String, priority: Priority) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        {
            let mut queue = self.queue.lock().await;
            if queue.len() >= self.capacity {
                if let Some(pos) = queue.iter().position(|q| q.priority == Priority::Lossy) {
                    queue.remove(pos);
                } else if priority == Priority::Lossy {
                    return false;
                } else {
                    queue.pop_front();
                }
            }
            queue.push_back(Queued { text, priority });
        }
        self.notify.notify_one();
        true
    }

    /// Next frame to write, or None once the outbox is closed and drained.
    pub async fn recv(&self) -> Option<String> {
        loop {
            let notified = self.notify.notified();
            if let Some(q) = self.queue.lock().await.pop_front() {
                return Some(q.text);
            }
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            notified.await;
        }
    }

    /// Stops accepting frames and wakes the drain task; queued frames are
    /// still delivered.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn full_queue_evicts_oldest_lossy_first() {
        let outbox = Outbox::new(2);
        assert!(outbox.push("m1".into(), Priority::Critical).await);
        assert!(outbox.push("t1".into(), Priority::Lossy).await);
        assert!(outbox.push("m2".into(), Priority::Critical).await);
        assert_eq!(outbox.recv().await.as_deref(), Some("m1"));
        assert_eq!(outbox.recv().await.as_deref(), Some("m2"));
    }

    #[tokio::test]
    async fn lossy_newcomer_is_dropped_when_no_victim() {
        let outbox = Outbox::new(2);
        assert!(outbox.push("m1".into(), Priority::Critical).await);
        assert!(outbox.push("m2".into(), Priority::Critical).await);
        assert!(!outbox.push("t1".into(), Priority::Lossy).await);
        assert_eq!(outbox.recv().await.as_deref(), Some("m1"));
        assert_eq!(outbox.recv().await.as_deref(), Some("m2"));
    }

    #[tokio::test]
    async fn critical_overflow_evicts_oldest_entry() {
        let outbox = Outbox::new(2);
        assert!(outbox.push("m1".into(), Priority::Critical).await);
        assert!(outbox.push("m2".into(), Priority::Critical).await);
        assert!(outbox.push("m3".into(), Priority::Critical).await);
        assert_eq!(outbox.recv().await.as_deref(), Some("m2"));
        assert_eq!(outbox.recv().await.as_deref(), Some("m3"));
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let outbox = Outbox::new(2);
        assert!(outbox.push("m1".into(), Priority::Critical).await);
        outbox.close();
        assert!(!outbox.push("m2".into(), Priority::Critical).await);
        assert_eq!(outbox.recv().await.as_deref(), Some("m1"));
        assert!(outbox.recv().await.is_none());
    }
}
