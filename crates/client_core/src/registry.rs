//! Subscription tables for the two inbound addressing namespaces.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError, Weak,
    },
};

use serde_json::Value;
use tracing::debug;

/// Inbound handler. Receives the `data` field of a matching message.
pub type Handler = Arc<dyn Fn(&Value) -> anyhow::Result<()> + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `type` namespace: one handler per key, last registration wins.
#[derive(Default)]
pub(crate) struct CallbackTable {
    handlers: Mutex<HashMap<String, Handler>>,
}

impl CallbackTable {
    pub(crate) fn insert(&self, key: &str, handler: Handler) -> bool {
        lock(&self.handlers)
            .insert(key.to_string(), handler)
            .is_some()
    }

    pub(crate) fn remove(&self, key: &str) -> bool {
        lock(&self.handlers).remove(key).is_some()
    }

    /// Removes the callback only while it is still `handler`.
    pub(crate) fn remove_if(&self, key: &str, handler: &Handler) -> bool {
        let mut handlers = lock(&self.handlers);
        let owned = handlers
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, handler));
        if owned {
            handlers.remove(key);
        }
        owned
    }

    pub(crate) fn get(&self, key: &str) -> Option<Handler> {
        lock(&self.handlers).get(key).cloned()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        lock(&self.handlers).contains_key(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ListenerId(u64);

/// `action` namespace: an ordered handler list per key.
#[derive(Default)]
pub(crate) struct ListenerTable {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<String, Vec<(ListenerId, Handler)>>>,
}

impl ListenerTable {
    pub(crate) fn add(&self, action: &str, handler: Handler) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners)
            .entry(action.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    /// Removes one listener. The key goes away with its last listener.
    pub(crate) fn remove(&self, action: &str, id: ListenerId) -> bool {
        let mut listeners = lock(&self.listeners);
        let Some(entries) = listeners.get_mut(action) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            listeners.remove(action);
        }
        removed
    }

    pub(crate) fn clear(&self, action: &str) -> usize {
        lock(&self.listeners)
            .remove(action)
            .map_or(0, |entries| entries.len())
    }

    /// Snapshot in registration order, taken so handlers run unlocked.
    pub(crate) fn snapshot(&self, action: &str) -> Vec<Handler> {
        lock(&self.listeners)
            .get(action)
            .map(|entries| entries.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, action: &str) -> usize {
        lock(&self.listeners).get(action).map_or(0, Vec::len)
    }

    pub(crate) fn has_key(&self, action: &str) -> bool {
        lock(&self.listeners).contains_key(action)
    }
}

/// Disposer for one `subscribe` registration.
///
/// Dropping the guard disposes it; so does [`ListenerGuard::dispose`].
/// Disposal is idempotent and tolerates the action having been cleared or
/// the bridge having been dropped already.
#[must_use = "dropping the guard unsubscribes the listener"]
pub struct ListenerGuard {
    table: Weak<ListenerTable>,
    action: String,
    id: ListenerId,
    disposed: bool,
}

impl ListenerGuard {
    pub(crate) fn new(table: &Arc<ListenerTable>, action: &str, id: ListenerId) -> Self {
        Self {
            table: Arc::downgrade(table),
            action: action.to_string(),
            id,
            disposed: false,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(table) = self.table.upgrade() {
            let removed = table.remove(&self.action, self.id);
            debug!(action = %self.action, removed, "listener disposed");
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("action", &self.action)
            .field("id", &self.id.0)
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Handler {
        Arc::new(|_| Ok(()))
    }

    #[test]
    fn conditional_remove_skips_replaced_callback() {
        let table = CallbackTable::default();
        let first = noop();
        table.insert("notify", Arc::clone(&first));
        table.insert("notify", noop());

        assert!(!table.remove_if("notify", &first));
        assert!(table.contains("notify"));

        let current = table.get("notify").expect("registered");
        assert!(table.remove_if("notify", &current));
        assert!(!table.contains("notify"));
    }

    #[test]
    fn removing_one_listener_keeps_the_others() {
        let table = ListenerTable::default();
        let first = table.add("teamUpdated", noop());
        let _second = table.add("teamUpdated", noop());

        assert!(table.remove("teamUpdated", first));
        assert!(table.has_key("teamUpdated"));
        assert_eq!(table.count("teamUpdated"), 1);
    }

    #[test]
    fn removing_last_listener_drops_the_key() {
        let table = ListenerTable::default();
        let only = table.add("teamRemoved", noop());

        assert!(table.remove("teamRemoved", only));
        assert!(!table.has_key("teamRemoved"));
        assert!(!table.remove("teamRemoved", only));
    }

    #[test]
    fn guard_tolerates_cleared_action_and_dropped_table() {
        let table = Arc::new(ListenerTable::default());
        let id = table.add("memberAdded", noop());
        let guard = ListenerGuard::new(&table, "memberAdded", id);
        assert_eq!(table.clear("memberAdded"), 1);
        guard.dispose();

        let id = table.add("memberAdded", noop());
        let orphan = ListenerGuard::new(&table, "memberAdded", id);
        drop(table);
        orphan.dispose();
    }

    #[test]
    fn callback_insert_reports_replacement() {
        let table = CallbackTable::default();
        assert!(!table.insert("openTournament", noop()));
        assert!(table.insert("openTournament", noop()));
        assert!(table.remove("openTournament"));
        assert!(!table.remove("openTournament"));
        assert!(!table.contains("openTournament"));
    }
}
