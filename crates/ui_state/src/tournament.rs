use std::sync::Arc;

use shared::domain::{Tournament, TournamentId, TournamentPatch};
use tracing::debug;

use crate::{
    cell::{ReactiveCell, Readable, WatchCell},
    collection::{
        drop_active, into_collection, patch_active, remove_by_id, update_by_id, Collection,
        StoreStatus,
    },
};

#[derive(Clone)]
pub struct TournamentStore {
    tournaments: WatchCell<Collection<Tournament>>,
    active: WatchCell<Option<Arc<Tournament>>>,
    status: WatchCell<StoreStatus>,
}

impl Default for TournamentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TournamentStore {
    pub fn new() -> Self {
        Self {
            tournaments: WatchCell::new(Vec::new()),
            active: WatchCell::new(None),
            status: WatchCell::new(StoreStatus::Loading),
        }
    }

    pub fn tournaments(&self) -> Readable<Collection<Tournament>> {
        self.tournaments.readable()
    }

    pub fn active_tournament(&self) -> Readable<Option<Arc<Tournament>>> {
        self.active.readable()
    }

    pub fn status(&self) -> Readable<StoreStatus> {
        self.status.readable()
    }

    /// Full snapshot from the host; marks the store ready.
    pub fn set_tournaments(&self, tournaments: Vec<Tournament>) {
        debug!(count = tournaments.len(), "tournament snapshot received");
        self.tournaments.write(into_collection(tournaments));
        self.status.write(StoreStatus::Ready);
    }

    pub fn set_active_tournament(&self, tournament: Option<Tournament>) {
        self.active.write(tournament.map(Arc::new));
    }

    pub fn set_status(&self, status: StoreStatus) {
        self.status.write(status);
    }

    pub fn add_tournament(&self, tournament: Tournament) {
        let tournament = Arc::new(tournament);
        self.tournaments.update(|list| {
            let mut next = list.clone();
            next.push(tournament);
            next
        });
    }

    pub fn update_tournament(&self, id: TournamentId, patch: &TournamentPatch) {
        self.tournaments.update_if(|list| update_by_id(list, id, patch));
        self.active.update_if(|active| patch_active(active, id, patch));
    }

    pub fn remove_tournament(&self, id: TournamentId) {
        self.tournaments.update_if(|list| remove_by_id(list, id));
        self.active.update_if(|active| drop_active(active, id));
    }

    pub fn clear(&self) {
        self.tournaments.write(Vec::new());
        self.active.write(None);
        self.status.write(StoreStatus::Loading);
    }
}
