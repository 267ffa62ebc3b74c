use serde_json::Value;

use crate::cell::{ReactiveCell, Readable, WatchCell};

pub const MAIN_VIEW: &str = "main";

/// The four fields `open_tournament` and `close_tournament` drive together.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub admin: bool,
    pub data: Option<Value>,
    pub visible: bool,
    pub view: String,
}

impl SessionSnapshot {
    pub fn closed() -> Self {
        Self {
            admin: false,
            data: None,
            visible: false,
            view: MAIN_VIEW.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppStore {
    current_view: WatchCell<String>,
    visible: WatchCell<bool>,
    player_data: WatchCell<Option<Value>>,
    admin: WatchCell<bool>,
    loading: WatchCell<bool>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStore {
    pub fn new() -> Self {
        Self {
            current_view: WatchCell::new(MAIN_VIEW.to_string()),
            visible: WatchCell::new(false),
            player_data: WatchCell::new(None),
            admin: WatchCell::new(false),
            loading: WatchCell::new(false),
        }
    }

    pub fn current_view(&self) -> Readable<String> {
        self.current_view.readable()
    }

    pub fn visible(&self) -> Readable<bool> {
        self.visible.readable()
    }

    pub fn player_data(&self) -> Readable<Option<Value>> {
        self.player_data.readable()
    }

    pub fn admin(&self) -> Readable<bool> {
        self.admin.readable()
    }

    pub fn loading(&self) -> Readable<bool> {
        self.loading.readable()
    }

    pub fn set_view(&self, view: impl Into<String>) {
        self.current_view.write(view.into());
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.write(visible);
    }

    pub fn set_player_data(&self, data: Option<Value>) {
        self.player_data.write(data);
    }

    pub fn set_admin(&self, admin: bool) {
        self.admin.write(admin);
    }

    pub fn set_loading(&self, loading: bool) {
        self.loading.write(loading);
    }

    /// Writes admin, data, visibility, then view, in that order.
    pub fn open_tournament(&self, admin: bool, data: Option<Value>) {
        self.admin.write(admin);
        self.player_data.write(data);
        self.visible.write(true);
        self.current_view.write(MAIN_VIEW.to_string());
    }

    pub fn close_tournament(&self) {
        self.visible.write(false);
        self.current_view.write(MAIN_VIEW.to_string());
        self.player_data.write(None);
        self.admin.write(false);
    }

    pub fn session(&self) -> SessionSnapshot {
        SessionSnapshot {
            admin: self.admin.read(),
            data: self.player_data.read(),
            visible: self.visible.read(),
            view: self.current_view.read(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn open_then_close_restores_closed_defaults() {
        let store = AppStore::new();

        store.open_tournament(true, Some(json!({ "id": 7 })));
        let opened = store.session();
        assert!(opened.admin);
        assert!(opened.visible);
        assert_eq!(opened.data, Some(json!({ "id": 7 })));

        store.set_view("bracket");
        let _ = store.current_view().get();
        store.close_tournament();

        assert_eq!(store.session(), SessionSnapshot::closed());
    }

    #[test]
    fn open_resets_view_to_main() {
        let store = AppStore::new();
        store.set_view("teams");

        store.open_tournament(false, None);

        assert_eq!(store.current_view().get(), MAIN_VIEW);
        assert!(!store.admin().get());
    }

    #[tokio::test]
    async fn view_subscribers_see_open_last() {
        let store = AppStore::new();
        let mut view = store.current_view().subscribe();
        let visible = store.visible();
        view.borrow_and_update();

        store.open_tournament(true, None);

        view.changed().await.expect("store alive");
        // Visibility is written before the view, so it is already set here.
        assert!(visible.get());
    }

    #[test]
    fn loading_flag_is_independent() {
        let store = AppStore::new();
        store.set_loading(true);
        store.close_tournament();
        assert!(store.loading().get());
    }
}
