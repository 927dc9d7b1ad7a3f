//! Medication service - records, inventory and reminder notifications

use std::collections::HashMap;
use std::sync::Arc;

use medminder_domain::{
    Medication, MedicationDraft, MedicationId, MedicationPatch, MedMinderError, Result, UserId,
};
use num_rational::Rational64;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::ports::MedicationStore;
use crate::clock_ports::Clock;
use crate::notification_ports::{NotificationHandle, NotificationScheduler};

/// Medication management service
pub struct MedicationService {
    store: Arc<dyn MedicationStore>,
    notifications: Arc<dyn NotificationScheduler>,
    clock: Arc<dyn Clock>,
    handles: Mutex<HashMap<MedicationId, Vec<NotificationHandle>>>,
}

impl MedicationService {
    pub fn new(
        store: Arc<dyn MedicationStore>,
        notifications: Arc<dyn NotificationScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, notifications, clock, handles: Mutex::new(HashMap::new()) }
    }

    pub fn store(&self) -> &Arc<dyn MedicationStore> {
        &self.store
    }

    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Medication>> {
        self.store.list(user_id).await
    }

    /// Validate and persist a new medication, then schedule its reminders.
    #[instrument(skip_all, fields(user = %user_id, name = %draft.name))]
    pub async fn add(&self, user_id: &UserId, mut draft: MedicationDraft) -> Result<Medication> {
        draft.validate(self.clock.today())?;
        let mut medication = draft.into_medication(
            MedicationId::generate(),
            user_id.clone(),
            self.clock.now(),
            self.clock.timestamp(),
        );
        medication.id = self.store.create(user_id, medication.clone()).await?;
        self.schedule_notifications(&medication).await;
        info!(medication = %medication.id, times = medication.times.len(), "Medication added");
        Ok(medication)
    }

    /// Apply a partial update. Reminders are rescheduled when the patch
    /// touches times, day pattern or schedule type.
    #[instrument(skip_all, fields(user = %user_id, medication = %id))]
    pub async fn update(
        &self,
        user_id: &UserId,
        id: &MedicationId,
        mut patch: MedicationPatch,
    ) -> Result<Medication> {
        patch.validate()?;
        let mut medication = self.require(user_id, id).await?;
        self.store.update(id, &patch).await?;
        patch.apply(&mut medication);
        if patch.changes_schedule() {
            self.cancel_notifications(id).await;
            self.schedule_notifications(&medication).await;
        }
        Ok(medication)
    }

    #[instrument(skip_all, fields(user = %user_id, medication = %id))]
    pub async fn delete(&self, user_id: &UserId, id: &MedicationId) -> Result<()> {
        self.require(user_id, id).await?;
        self.store.delete(id).await?;
        self.cancel_notifications(id).await;
        info!("Medication deleted");
        Ok(())
    }

    /// Reset inventory to a full container.
    #[instrument(skip_all, fields(user = %user_id, medication = %id))]
    pub async fn refill(&self, user_id: &UserId, id: &MedicationId) -> Result<Medication> {
        let mut medication = self.require(user_id, id).await?;
        let full = Rational64::from_integer(i64::from(medication.servings_per_container));
        let patch = MedicationPatch::servings(full);
        self.store.update(id, &patch).await?;
        patch.apply(&mut medication);
        info!(servings = %medication.current_servings, "Medication refilled");
        Ok(medication)
    }

    /// Medications at or below their refill threshold.
    pub async fn low_inventory(&self, user_id: &UserId) -> Result<Vec<Medication>> {
        let medications = self.store.list(user_id).await?;
        Ok(medications.into_iter().filter(Medication::needs_refill).collect())
    }

    /// Schedule reminders for all of a user's medications, replacing any this
    /// service scheduled before. Used at startup.
    pub async fn sync_notifications(&self, user_id: &UserId) -> Result<usize> {
        let medications = self.store.list(user_id).await?;
        for medication in &medications {
            self.cancel_notifications(&medication.id).await;
            self.schedule_notifications(medication).await;
        }
        Ok(self.handles.lock().await.values().map(Vec::len).sum())
    }

    async fn require(&self, user_id: &UserId, id: &MedicationId) -> Result<Medication> {
        self.store
            .get(user_id, id)
            .await?
            .ok_or_else(|| MedMinderError::NotFound(format!("medication {id}")))
    }

    /// The medication record is already persisted; a failed reminder is
    /// logged rather than failing the whole operation.
    async fn schedule_notifications(&self, medication: &Medication) {
        let mut scheduled = Vec::with_capacity(medication.times.len());
        for &time in &medication.times {
            match self.notifications.schedule_repeating_reminder(&medication.id, time).await {
                Ok(handle) => scheduled.push(handle),
                Err(err) => {
                    warn!(medication = %medication.id, %time, error = %err, "Failed to schedule reminder");
                }
            }
        }
        if !scheduled.is_empty() {
            self.handles.lock().await.insert(medication.id.clone(), scheduled);
        }
    }

    async fn cancel_notifications(&self, id: &MedicationId) {
        let handles = self.handles.lock().await.remove(id).unwrap_or_default();
        for handle in handles {
            if let Err(err) = self.notifications.cancel(&handle).await {
                warn!(medication = %id, %handle, error = %err, "Failed to cancel reminder");
            }
        }
    }
}
