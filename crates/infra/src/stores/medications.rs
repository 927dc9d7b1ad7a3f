//! In-memory [`MedicationStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use medminder_core::{MedicationStore, MedicationsListener, Subscription};
use medminder_domain::{
    MedMinderError, Medication, MedicationId, MedicationPatch, Result, UserId,
};
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::listeners::Listeners;

#[derive(Default)]
pub struct InMemoryMedicationStore {
    records: RwLock<HashMap<MedicationId, Medication>>,
    listeners: Listeners<Medication>,
}

impl InMemoryMedicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live subscriber count for a user.
    pub fn subscriber_count(&self, user_id: &UserId) -> usize {
        self.listeners.count(user_id)
    }

    fn snapshot(&self, user_id: &UserId) -> Vec<Medication> {
        let mut medications: Vec<Medication> = self
            .records
            .read()
            .values()
            .filter(|medication| &medication.user_id == user_id)
            .cloned()
            .collect();
        medications.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        medications
    }

    fn publish(&self, user_id: &UserId) {
        let snapshot = self.snapshot(user_id);
        self.listeners.notify(user_id, &snapshot);
    }
}

#[async_trait]
impl MedicationStore for InMemoryMedicationStore {
    async fn list(&self, user_id: &UserId) -> Result<Vec<Medication>> {
        Ok(self.snapshot(user_id))
    }

    fn subscribe(&self, user_id: &UserId, listener: MedicationsListener) -> Result<Subscription> {
        let initial = self.snapshot(user_id);
        let subscription = self.listeners.add(user_id, listener.clone());
        listener(initial);
        Ok(subscription)
    }

    async fn create(&self, user_id: &UserId, mut medication: Medication) -> Result<MedicationId> {
        let id = MedicationId::new(Uuid::now_v7().to_string());
        medication.id = id.clone();
        medication.user_id = user_id.clone();
        self.records.write().insert(id.clone(), medication);
        debug!(medication = %id, "Medication stored");
        self.publish(user_id);
        Ok(id)
    }

    async fn update(&self, id: &MedicationId, patch: &MedicationPatch) -> Result<()> {
        let user_id = {
            let mut records = self.records.write();
            let medication = records
                .get_mut(id)
                .ok_or_else(|| MedMinderError::NotFound(format!("medication {id}")))?;
            patch.apply(medication);
            medication.user_id.clone()
        };
        self.publish(&user_id);
        Ok(())
    }

    async fn delete(&self, id: &MedicationId) -> Result<()> {
        let removed = self.records.write().remove(id);
        if let Some(medication) = removed {
            self.publish(&medication.user_id);
        }
        Ok(())
    }
}
