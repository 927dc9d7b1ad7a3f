//! Port interfaces for medication records and name lookup

use std::sync::Arc;

use async_trait::async_trait;
use medminder_domain::{Medication, MedicationId, MedicationPatch, Result, UserId};

use super::lookup::MedicationSuggestion;
use crate::subscription::Subscription;

/// Listener invoked with the user's full medication list on every change.
pub type MedicationsListener = Arc<dyn Fn(Vec<Medication>) + Send + Sync>;

/// Trait for persisting medications
#[async_trait]
pub trait MedicationStore: Send + Sync {
    /// All medications of a user.
    async fn list(&self, user_id: &UserId) -> Result<Vec<Medication>>;

    /// Single medication lookup scoped to its owner.
    async fn get(&self, user_id: &UserId, id: &MedicationId) -> Result<Option<Medication>> {
        Ok(self.list(user_id).await?.into_iter().find(|medication| &medication.id == id))
    }

    /// Register a listener for live updates of a user's medications.
    fn subscribe(&self, user_id: &UserId, listener: MedicationsListener) -> Result<Subscription>;

    /// Persist a new medication and return the identifier the store assigned.
    async fn create(&self, user_id: &UserId, medication: Medication) -> Result<MedicationId>;

    /// Apply a partial update.
    ///
    /// # Errors
    /// `MedMinderError::NotFound` when no medication has this id.
    async fn update(&self, id: &MedicationId, patch: &MedicationPatch) -> Result<()>;

    async fn delete(&self, id: &MedicationId) -> Result<()>;
}

/// Trait for searching medication names in an external catalogue
#[async_trait]
pub trait MedicationLookup: Send + Sync {
    /// Raw matches for `query`. Ranking and deduplication happen in core.
    async fn search(&self, query: &str) -> Result<Vec<MedicationSuggestion>>;
}
