//! Cancellable per-dose timers
//!
//! Every snooze and grace-expiry timer is registered here under its dose
//! instance. Resolving a dose cancels all of its pending timers, so a
//! timer can never fire for a dose that is no longer scheduled.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use medminder_domain::{DoseInstance, UserId};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// What a pending timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Re-scan for due reminders after a snooze interval.
    Snooze,
    /// Mark the dose missed once its grace period elapses.
    GraceExpiry,
}

/// Handle returned to callers for an armed timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

type TimerKey = (UserId, DoseInstance, TimerKind);

#[derive(Debug)]
struct TimerSlot {
    generation: u64,
    token: CancellationToken,
}

/// A freshly armed timer: its cancellation token and the generation used to
/// release its slot once it has fired.
#[derive(Debug)]
pub struct ArmedTimer {
    pub generation: u64,
    pub token: CancellationToken,
}

impl ArmedTimer {
    pub fn handle(&self) -> TimerHandle {
        TimerHandle { token: self.token.clone() }
    }
}

/// Registry of pending timers keyed by user, dose instance and kind.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    slots: Mutex<HashMap<TimerKey, TimerSlot>>,
    next_generation: AtomicU64,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer slot.
    ///
    /// With `replace`, a pending timer of the same kind is cancelled and
    /// superseded. Without it, `None` is returned while one is pending.
    pub fn arm(
        &self,
        user_id: &UserId,
        dose: &DoseInstance,
        kind: TimerKind,
        replace: bool,
    ) -> Option<ArmedTimer> {
        let key = (user_id.clone(), dose.clone(), kind);
        let mut slots = self.slots.lock();
        if let Some(existing) = slots.get(&key) {
            if !replace && !existing.token.is_cancelled() {
                return None;
            }
            existing.token.cancel();
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        slots.insert(key, TimerSlot { generation, token: token.clone() });
        trace!(dose = %dose, ?kind, generation, "Armed timer");
        Some(ArmedTimer { generation, token })
    }

    /// Drop the slot of a timer that has fired, unless it was superseded.
    pub fn release(&self, user_id: &UserId, dose: &DoseInstance, kind: TimerKind, generation: u64) {
        let key = (user_id.clone(), dose.clone(), kind);
        let mut slots = self.slots.lock();
        if slots.get(&key).is_some_and(|slot| slot.generation == generation) {
            slots.remove(&key);
        }
    }

    /// Cancel every pending timer of a dose. Returns how many were cancelled.
    pub fn cancel_dose(&self, user_id: &UserId, dose: &DoseInstance) -> usize {
        let mut slots = self.slots.lock();
        let mut cancelled = 0;
        for kind in [TimerKind::Snooze, TimerKind::GraceExpiry] {
            if let Some(slot) = slots.remove(&(user_id.clone(), dose.clone(), kind)) {
                slot.token.cancel();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            trace!(dose = %dose, cancelled, "Cancelled dose timers");
        }
        cancelled
    }

    /// Cancel everything, e.g. on shutdown.
    pub fn cancel_all(&self) {
        for (_, slot) in self.slots.lock().drain() {
            slot.token.cancel();
        }
    }

    pub fn is_armed(&self, user_id: &UserId, dose: &DoseInstance, kind: TimerKind) -> bool {
        self.slots
            .lock()
            .get(&(user_id.clone(), dose.clone(), kind))
            .is_some_and(|slot| !slot.token.is_cancelled())
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
