use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use medminder_core::Subscription;
use medminder_domain::UserId;
use parking_lot::Mutex;

type Listener<T> = Arc<dyn Fn(Vec<T>) + Send + Sync>;
type ListenerMap<T> = HashMap<UserId, Vec<(u64, Listener<T>)>>;

/// Per-user listener lists. Cloning shares the same registry.
pub(crate) struct Listeners<T> {
    next_id: Arc<AtomicU64>,
    by_user: Arc<Mutex<ListenerMap<T>>>,
}

impl<T> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Self { next_id: Arc::clone(&self.next_id), by_user: Arc::clone(&self.by_user) }
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self { next_id: Arc::new(AtomicU64::new(0)), by_user: Arc::default() }
    }
}

impl<T: Clone + Send + 'static> Listeners<T> {
    pub(crate) fn add(&self, user_id: &UserId, listener: Listener<T>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.by_user.lock().entry(user_id.clone()).or_default().push((id, listener));

        let by_user = Arc::clone(&self.by_user);
        let user_id = user_id.clone();
        Subscription::new(move || {
            let mut by_user = by_user.lock();
            if let Some(listeners) = by_user.get_mut(&user_id) {
                listeners.retain(|(listener_id, _)| *listener_id != id);
                if listeners.is_empty() {
                    by_user.remove(&user_id);
                }
            }
        })
    }

    /// Deliver `snapshot` to the user's listeners outside the registry lock,
    /// so a listener may subscribe or unsubscribe re-entrantly.
    pub(crate) fn notify(&self, user_id: &UserId, snapshot: &[T]) {
        let listeners: Vec<Listener<T>> = self
            .by_user
            .lock()
            .get(user_id)
            .map(|listeners| listeners.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();
        for listener in listeners {
            listener(snapshot.to_vec());
        }
    }

    pub(crate) fn count(&self, user_id: &UserId) -> usize {
        self.by_user.lock().get(user_id).map_or(0, Vec::len)
    }
}
