//! Mock port implementations for testing
//!
//! Provides in-memory mocks for all core ports, enabling deterministic
//! tests without a backend. Stores can be told to fail their next write.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use medminder_core::intake::ports::IntakeLogListener;
use medminder_core::medication::ports::MedicationsListener;
use medminder_core::{
    IntakeLogStore, LocalCache, MedicationLookup, MedicationStore, MedicationSuggestion,
    NotificationHandle, NotificationScheduler, RescanTrigger, Subscription,
};
use medminder_domain::{
    ClockTime, IntakeLogEntry, IntakeLogId, MedMinderError, Medication, MedicationId,
    MedicationPatch, Result as DomainResult, UserId,
};
use parking_lot::Mutex;

/// In-memory `MedicationStore`.
#[derive(Default)]
pub struct MockMedicationStore {
    medications: Mutex<Vec<Medication>>,
    fail_updates: AtomicBool,
}

impl MockMedicationStore {
    pub fn with(medications: Vec<Medication>) -> Self {
        Self { medications: Mutex::new(medications), ..Self::default() }
    }

    pub fn insert(&self, medication: Medication) {
        self.medications.lock().push(medication);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn list_all(&self) -> Vec<Medication> {
        self.medications.lock().clone()
    }

    pub fn snapshot(&self, id: &str) -> Option<Medication> {
        self.medications.lock().iter().find(|m| m.id.as_str() == id).cloned()
    }
}

#[async_trait]
impl MedicationStore for MockMedicationStore {
    async fn list(&self, user_id: &UserId) -> DomainResult<Vec<Medication>> {
        Ok(self.medications.lock().iter().filter(|m| &m.user_id == user_id).cloned().collect())
    }

    fn subscribe(
        &self,
        _user_id: &UserId,
        _listener: MedicationsListener,
    ) -> DomainResult<Subscription> {
        Ok(Subscription::detached())
    }

    async fn create(&self, _user_id: &UserId, medication: Medication) -> DomainResult<MedicationId> {
        let id = medication.id.clone();
        self.medications.lock().push(medication);
        Ok(id)
    }

    async fn update(&self, id: &MedicationId, patch: &MedicationPatch) -> DomainResult<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(MedMinderError::Store("update rejected".into()));
        }
        let mut medications = self.medications.lock();
        let medication = medications
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| MedMinderError::NotFound(id.to_string()))?;
        patch.apply(medication);
        Ok(())
    }

    async fn delete(&self, id: &MedicationId) -> DomainResult<()> {
        self.medications.lock().retain(|m| &m.id != id);
        Ok(())
    }
}

/// In-memory `IntakeLogStore` that issues sequential ids.
#[derive(Default)]
pub struct MockIntakeLogStore {
    entries: Mutex<Vec<IntakeLogEntry>>,
    next_id: AtomicU64,
    fail_appends: AtomicBool,
    fail_lists: AtomicBool,
}

impl MockIntakeLogStore {
    pub fn entries(&self) -> Vec<IntakeLogEntry> {
        self.entries.lock().clone()
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Overwrite a stored entry with the same id.
    pub fn replace(&self, entry: IntakeLogEntry) {
        let mut entries = self.entries.lock();
        if let Some(slot) = entries.iter_mut().find(|e| e.id == entry.id) {
            *slot = entry;
        }
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl IntakeLogStore for MockIntakeLogStore {
    async fn append(&self, _user_id: &UserId, mut entry: IntakeLogEntry) -> DomainResult<IntakeLogId> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(MedMinderError::Store("append rejected".into()));
        }
        let id = IntakeLogId::new(format!("log-{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        entry.id = id.clone();
        self.entries.lock().push(entry);
        Ok(id)
    }

    async fn list(&self, user_id: &UserId) -> DomainResult<Vec<IntakeLogEntry>> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(MedMinderError::Store("log store unreachable".into()));
        }
        Ok(self.entries.lock().iter().filter(|e| &e.user_id == user_id).cloned().collect())
    }

    fn subscribe(
        &self,
        _user_id: &UserId,
        _listener: IntakeLogListener,
    ) -> DomainResult<Subscription> {
        Ok(Subscription::detached())
    }

    async fn delete(&self, entry_id: &IntakeLogId) -> DomainResult<()> {
        self.entries.lock().retain(|e| &e.id != entry_id);
        Ok(())
    }
}

/// `LocalCache` over a hash map.
#[derive(Default)]
pub struct MockCache {
    values: Mutex<HashMap<String, String>>,
}

impl MockCache {
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    pub fn clear(&self) {
        self.values.lock().clear();
    }
}

#[async_trait]
impl LocalCache for MockCache {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> DomainResult<()> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Records rescan requests.
#[derive(Default)]
pub struct RecordingRescan {
    requests: Mutex<Vec<UserId>>,
}

impl RecordingRescan {
    pub fn requests(&self) -> Vec<UserId> {
        self.requests.lock().clone()
    }
}

impl RescanTrigger for RecordingRescan {
    fn request_rescan(&self, user_id: &UserId) {
        self.requests.lock().push(user_id.clone());
    }
}

/// Records scheduled and cancelled notifications.
#[derive(Default)]
pub struct RecordingNotifier {
    scheduled: Mutex<Vec<(MedicationId, ClockTime, NotificationHandle)>>,
    cancelled: Mutex<Vec<NotificationHandle>>,
    next_id: AtomicU64,
}

impl RecordingNotifier {
    pub fn scheduled(&self) -> Vec<(MedicationId, ClockTime, NotificationHandle)> {
        self.scheduled.lock().clone()
    }

    pub fn cancelled(&self) -> Vec<NotificationHandle> {
        self.cancelled.lock().clone()
    }
}

#[async_trait]
impl NotificationScheduler for RecordingNotifier {
    async fn schedule_repeating_reminder(
        &self,
        medication_id: &MedicationId,
        time: ClockTime,
    ) -> DomainResult<NotificationHandle> {
        let handle = NotificationHandle(format!("n-{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        self.scheduled.lock().push((medication_id.clone(), time, handle.clone()));
        Ok(handle)
    }

    async fn cancel(&self, handle: &NotificationHandle) -> DomainResult<()> {
        self.cancelled.lock().push(handle.clone());
        Ok(())
    }
}

/// Fixed-result `MedicationLookup`.
pub struct StaticLookup(pub Vec<&'static str>);

#[async_trait]
impl MedicationLookup for StaticLookup {
    async fn search(&self, _query: &str) -> DomainResult<Vec<MedicationSuggestion>> {
        Ok(self.0.iter().map(|name| MedicationSuggestion::named(*name)).collect())
    }
}
