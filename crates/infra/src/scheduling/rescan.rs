//! Channel-backed rescan requests
//!
//! Snooze timers run on their own tasks; when one elapses it pushes the
//! user onto this channel and the scheduler's monitor task scans them.

use medminder_core::RescanTrigger;
use medminder_domain::UserId;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ChannelRescanTrigger {
    sender: UnboundedSender<UserId>,
}

impl ChannelRescanTrigger {
    /// Create a trigger and the receiver the scheduler drains.
    pub fn channel() -> (Self, UnboundedReceiver<UserId>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl RescanTrigger for ChannelRescanTrigger {
    fn request_rescan(&self, user_id: &UserId) {
        if self.sender.send(user_id.clone()).is_err() {
            debug!(user = %user_id, "Rescan requested after scheduler shut down");
        }
    }
}
