//! In-flight request counter
//!
//! Drives an external "network busy" indicator. The count lives in a
//! `tokio::sync::watch` channel so updates are serialized and subscribers
//! are notified of every change.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct ActivityIndicator {
    sender: Arc<watch::Sender<usize>>,
}

impl Default for ActivityIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityIndicator {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Mark one network attempt as started. The count drops again when the
    /// returned guard is dropped, so it cannot leak on early return.
    pub fn begin(&self) -> InFlightGuard {
        self.sender.send_modify(|count| *count += 1);
        InFlightGuard {
            sender: Arc::clone(&self.sender),
        }
    }

    pub fn in_flight(&self) -> usize {
        *self.sender.borrow()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.sender.subscribe()
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    sender: Arc<watch::Sender<usize>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.sender
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}
