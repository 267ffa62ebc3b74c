//! Transient toasts that expire on their own.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::cell::{ReactiveCell, Readable, WatchCell};

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(5000);

// Process-wide so ids stay unique across every queue in the session.
static NEXT_NOTIFICATION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    /// Zero means the notification stays until dismissed.
    pub duration: Duration,
}

#[derive(Clone)]
pub struct NotificationQueue {
    items: WatchCell<Vec<Notification>>,
    default_duration: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::with_default_duration(DEFAULT_NOTIFICATION_DURATION)
    }

    pub fn with_default_duration(default_duration: Duration) -> Self {
        Self {
            items: WatchCell::new(Vec::new()),
            default_duration,
        }
    }

    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    pub fn notifications(&self) -> Readable<Vec<Notification>> {
        self.items.readable()
    }

    /// Appends a notification and, for a non-zero `duration`, schedules its
    /// removal on the current tokio runtime. Without a runtime the
    /// notification is kept until dismissed.
    pub fn show(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        duration: Duration,
    ) -> NotificationId {
        let runtime = if duration.is_zero() {
            None
        } else {
            Handle::try_current().ok()
        };
        let duration = if runtime.is_some() {
            duration
        } else {
            if !duration.is_zero() {
                warn!(?duration, "no tokio runtime to expire notification; keeping it");
            }
            Duration::ZERO
        };

        let id = NotificationId(NEXT_NOTIFICATION_ID.fetch_add(1, Ordering::Relaxed));
        let notification = Notification {
            id,
            kind,
            message: message.into(),
            duration,
        };
        self.items.update(|items| {
            let mut next = items.clone();
            next.push(notification);
            next
        });

        if let Some(runtime) = runtime {
            let queue = self.clone();
            runtime.spawn(async move {
                tokio::time::sleep(duration).await;
                queue.remove(id);
            });
        }
        debug!(id = id.0, ?kind, "notification shown");
        id
    }

    pub fn show_default(&self, kind: NotificationKind, message: impl Into<String>) -> NotificationId {
        self.show(kind, message, self.default_duration)
    }

    /// Id-filtered, so repeated or late removals are no-ops.
    pub fn remove(&self, id: NotificationId) {
        self.items.update_if(|items| {
            items.iter().any(|n| n.id == id).then(|| {
                items
                    .iter()
                    .filter(|n| n.id != id)
                    .cloned()
                    .collect()
            })
        });
    }

    /// Empties the queue. Pending expiry timers still fire and find nothing.
    pub fn clear(&self) {
        self.items.write(Vec::new());
    }
}
