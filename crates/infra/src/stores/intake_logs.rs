//! In-memory [`IntakeLogStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use medminder_core::{IntakeLogListener, IntakeLogStore, Subscription};
use medminder_domain::{IntakeLogEntry, IntakeLogId, Result, UserId};
use parking_lot::RwLock;
use uuid::Uuid;

use super::listeners::Listeners;

#[derive(Default)]
pub struct InMemoryIntakeLogStore {
    entries: RwLock<HashMap<IntakeLogId, IntakeLogEntry>>,
    listeners: Listeners<IntakeLogEntry>,
}

impl InMemoryIntakeLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self, user_id: &UserId) -> usize {
        self.listeners.count(user_id)
    }

    /// Entries of a user, oldest first.
    fn snapshot(&self, user_id: &UserId) -> Vec<IntakeLogEntry> {
        let mut entries: Vec<IntakeLogEntry> = self
            .entries
            .read()
            .values()
            .filter(|entry| &entry.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        entries
    }

    fn publish(&self, user_id: &UserId) {
        let snapshot = self.snapshot(user_id);
        self.listeners.notify(user_id, &snapshot);
    }
}

#[async_trait]
impl IntakeLogStore for InMemoryIntakeLogStore {
    async fn append(&self, user_id: &UserId, mut entry: IntakeLogEntry) -> Result<IntakeLogId> {
        let id = IntakeLogId::new(Uuid::now_v7().to_string());
        entry.id = id.clone();
        entry.user_id = user_id.clone();
        self.entries.write().insert(id.clone(), entry);
        self.publish(user_id);
        Ok(id)
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<IntakeLogEntry>> {
        Ok(self.snapshot(user_id))
    }

    fn subscribe(&self, user_id: &UserId, listener: IntakeLogListener) -> Result<Subscription> {
        let initial = self.snapshot(user_id);
        let subscription = self.listeners.add(user_id, listener.clone());
        listener(initial);
        Ok(subscription)
    }

    async fn delete(&self, entry_id: &IntakeLogId) -> Result<()> {
        let removed = self.entries.write().remove(entry_id);
        if let Some(entry) = removed {
            self.publish(&entry.user_id);
        }
        Ok(())
    }
}
