//! Reactive UI state: domain stores, notifications, and the wiring that
//! feeds host events into them.

use std::time::Duration;

pub mod app;
pub mod cell;
pub mod collection;
pub mod format;
pub mod host_sync;
pub mod notifications;
pub mod team;
pub mod tournament;

pub use app::{AppStore, SessionSnapshot, MAIN_VIEW};
pub use cell::{ReactiveCell, Readable, WatchCell};
pub use collection::StoreStatus;
pub use host_sync::HostSync;
pub use notifications::{Notification, NotificationId, NotificationKind, NotificationQueue};
pub use team::TeamStore;
pub use tournament::TournamentStore;

/// Every store of one UI session. Build it once at startup and hand clones
/// to whoever needs them; clones share state.
#[derive(Clone, Default)]
pub struct UiStores {
    pub tournaments: TournamentStore,
    pub teams: TeamStore,
    pub app: AppStore,
    pub notifications: NotificationQueue,
}

impl UiStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notification_duration(duration: Duration) -> Self {
        Self {
            notifications: NotificationQueue::with_default_duration(duration),
            ..Self::default()
        }
    }

    /// Resets the domain stores and session; notifications are left alone.
    pub fn clear(&self) {
        self.tournaments.clear();
        self.teams.clear();
        self.app.close_tournament();
    }
}
