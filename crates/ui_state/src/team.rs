//! Player teams, the team being viewed, and its roster.
//!
//! Member mutations compute one new member list and install that same
//! list everywhere the team is visible: its entry in `player_teams`, the
//! active team, and `team_members` while the active team matches.

use std::sync::Arc;

use shared::domain::{Member, MemberId, Members, Team, TeamId, TeamPatch};
use tracing::debug;

use crate::{
    cell::{ReactiveCell, Readable, WatchCell},
    collection::{
        drop_active, into_collection, patch_active, remove_by_id, update_by_id, Collection,
        StoreStatus,
    },
};

#[derive(Clone)]
pub struct TeamStore {
    player_teams: WatchCell<Collection<Team>>,
    active: WatchCell<Option<Arc<Team>>>,
    team_members: WatchCell<Members>,
    status: WatchCell<StoreStatus>,
    search_results: WatchCell<Collection<Team>>,
}

impl Default for TeamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamStore {
    pub fn new() -> Self {
        Self {
            player_teams: WatchCell::new(Vec::new()),
            active: WatchCell::new(None),
            team_members: WatchCell::new(Members::default()),
            status: WatchCell::new(StoreStatus::Loading),
            search_results: WatchCell::new(Vec::new()),
        }
    }

    pub fn player_teams(&self) -> Readable<Collection<Team>> {
        self.player_teams.readable()
    }

    pub fn active_team(&self) -> Readable<Option<Arc<Team>>> {
        self.active.readable()
    }

    pub fn team_members(&self) -> Readable<Members> {
        self.team_members.readable()
    }

    pub fn status(&self) -> Readable<StoreStatus> {
        self.status.readable()
    }

    pub fn search_results(&self) -> Readable<Collection<Team>> {
        self.search_results.readable()
    }

    pub fn set_player_teams(&self, teams: Vec<Team>) {
        debug!(count = teams.len(), "team snapshot received");
        self.player_teams.write(into_collection(teams));
        self.status.write(StoreStatus::Ready);
    }

    /// Also mirrors the team's roster into `team_members`. Clearing the
    /// active team leaves the last roster in place.
    pub fn set_active_team(&self, team: Option<Team>) {
        let team = team.map(Arc::new);
        if let Some(team) = &team {
            self.team_members.write(Arc::clone(&team.members));
        }
        self.active.write(team);
    }

    pub fn set_status(&self, status: StoreStatus) {
        self.status.write(status);
    }

    pub fn add_team(&self, team: Team) {
        let team = Arc::new(team);
        self.player_teams.update(|list| {
            let mut next = list.clone();
            next.push(team);
            next
        });
    }

    pub fn update_team(&self, id: TeamId, patch: &TeamPatch) {
        self.player_teams.update_if(|list| update_by_id(list, id, patch));
        self.active.update_if(|active| patch_active(active, id, patch));
    }

    pub fn remove_team(&self, id: TeamId) {
        self.player_teams.update_if(|list| remove_by_id(list, id));
        self.active.update_if(|active| drop_active(active, id));
    }

    pub fn add_member(&self, team_id: TeamId, member: Member) {
        self.replace_members(team_id, |members| {
            let mut next = members.to_vec();
            next.push(member);
            next
        });
    }

    pub fn remove_member(&self, team_id: TeamId, member_id: MemberId) {
        self.replace_members(team_id, |members| {
            members
                .iter()
                .filter(|m| m.id != member_id)
                .cloned()
                .collect()
        });
    }

    pub fn set_search_results(&self, results: Vec<Team>) {
        self.search_results.write(into_collection(results));
    }

    pub fn clear(&self) {
        self.player_teams.write(Vec::new());
        self.active.write(None);
        self.team_members.write(Members::default());
        self.status.write(StoreStatus::Loading);
        self.search_results.write(Vec::new());
    }

    /// The roster is computed from the collection entry when the team is
    /// listed, otherwise from the active team.
    fn replace_members(&self, team_id: TeamId, edit: impl FnOnce(&[Member]) -> Vec<Member>) {
        let listed = self
            .player_teams
            .read()
            .iter()
            .find(|team| team.id == team_id)
            .map(|team| Arc::clone(&team.members));
        let active = self
            .active
            .read()
            .filter(|team| team.id == team_id)
            .map(|team| Arc::clone(&team.members));
        let is_listed = listed.is_some();
        let Some(current) = listed.or(active) else {
            debug!(team_id = team_id.0, "member change for unknown team ignored");
            return;
        };

        let members: Members = Arc::new(edit(&current));

        if is_listed {
            self.player_teams.update(|list| {
                list.iter()
                    .map(|team| {
                        if team.id == team_id {
                            Arc::new(team.with_members(Arc::clone(&members)))
                        } else {
                            Arc::clone(team)
                        }
                    })
                    .collect()
            });
        }

        let active_matched = self.active.update_if(|active| match active {
            Some(team) if team.id == team_id => {
                Some(Some(Arc::new(team.with_members(Arc::clone(&members)))))
            }
            _ => None,
        });
        if active_matched {
            self.team_members.write(members);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn team(id: i64, members: serde_json::Value) -> Team {
        serde_json::from_value(json!({ "id": id, "name": format!("team-{id}"), "members": members }))
            .expect("team")
    }

    fn member(id: i64, role: &str) -> Member {
        serde_json::from_value(json!({ "id": id, "name": format!("m{id}"), "role": role }))
            .expect("member")
    }

    fn member_ids(members: &[Member]) -> Vec<i64> {
        members.iter().map(|m| m.id.0).collect()
    }

    #[test]
    fn update_team_keeps_other_references() {
        let store = TeamStore::new();
        store.set_player_teams(vec![team(1, json!([])), team(2, json!([]))]);
        let before = store.player_teams().get();

        store.update_team(
            TeamId(2),
            &TeamPatch {
                wins: Some(Some(4)),
                ..TeamPatch::default()
            },
        );

        let after = store.player_teams().get();
        assert!(Arc::ptr_eq(&before[0], &after[0]));
        assert_eq!(after[1].wins, 4);
        assert_eq!(after[1].name, "team-2");
    }

    #[test]
    fn remove_member_writes_the_same_list_to_both_views() {
        let store = TeamStore::new();
        let roster = json!([
            { "id": 10, "name": "ava", "role": "captain" },
            { "id": 11, "name": "bo", "role": "driver" }
        ]);
        store.set_player_teams(vec![team(1, roster.clone()), team(2, json!([]))]);
        store.set_active_team(Some(team(1, roster)));

        store.remove_member(TeamId(1), MemberId(11));

        let listed = Arc::clone(&store.player_teams().get()[0].members);
        let active = Arc::clone(&store.active_team().get().expect("active").members);
        assert_eq!(member_ids(&listed), vec![10]);
        assert!(Arc::ptr_eq(&listed, &active));
        assert!(Arc::ptr_eq(&listed, &store.team_members().get()));
    }

    #[test]
    fn add_member_appends_and_replaces_list() {
        let store = TeamStore::new();
        store.set_player_teams(vec![team(1, json!([{ "id": 10, "role": "captain" }]))]);
        let before = Arc::clone(&store.player_teams().get()[0].members);

        store.add_member(TeamId(1), member(12, "navigator"));

        let after = Arc::clone(&store.player_teams().get()[0].members);
        assert_eq!(member_ids(&after), vec![10, 12]);
        assert_eq!(member_ids(&before), vec![10]);
        assert!(!Arc::ptr_eq(&before, &after));
        // Active team is a different team, so the roster view stays empty.
        assert!(store.team_members().get().is_empty());
    }

    #[test]
    fn member_change_for_active_only_team_updates_active() {
        let store = TeamStore::new();
        store.set_active_team(Some(team(3, json!([]))));

        store.add_member(TeamId(3), member(30, "mechanic1"));

        let active = store.active_team().get().expect("active");
        assert_eq!(member_ids(&active.members), vec![30]);
        assert!(Arc::ptr_eq(&active.members, &store.team_members().get()));
    }

    #[test]
    fn member_change_for_unknown_team_is_ignored() {
        let store = TeamStore::new();
        store.set_player_teams(vec![team(1, json!([]))]);
        let before = store.player_teams().get();

        store.add_member(TeamId(9), member(1, "driver"));

        assert!(Arc::ptr_eq(&before[0], &store.player_teams().get()[0]));
    }

    #[tokio::test]
    async fn unmatched_ids_do_not_wake_subscribers() {
        let store = TeamStore::new();
        store.set_player_teams(vec![team(1, json!([]))]);
        store.set_active_team(Some(team(1, json!([]))));
        let mut teams = store.player_teams().subscribe();
        let mut active = store.active_team().subscribe();
        teams.borrow_and_update();
        active.borrow_and_update();

        store.update_team(
            TeamId(7),
            &TeamPatch {
                wins: Some(Some(1)),
                ..TeamPatch::default()
            },
        );
        store.remove_team(TeamId(7));

        assert!(!teams.has_changed().expect("store alive"));
        assert!(!active.has_changed().expect("store alive"));
    }

    #[test]
    fn removing_active_team_nulls_pointer() {
        let store = TeamStore::new();
        store.set_player_teams(vec![team(1, json!([]))]);
        store.set_active_team(Some(team(1, json!([]))));

        store.remove_team(TeamId(1));

        assert!(store.active_team().get().is_none());
        assert!(store.player_teams().get().is_empty());
    }

    #[test]
    fn clear_resets_everything() {
        let store = TeamStore::new();
        store.set_player_teams(vec![team(1, json!([{ "id": 1 }]))]);
        store.set_active_team(Some(team(1, json!([{ "id": 1 }]))));
        store.set_search_results(vec![team(4, json!([]))]);

        store.clear();

        assert!(store.player_teams().get().is_empty());
        assert!(store.active_team().get().is_none());
        assert!(store.team_members().get().is_empty());
        assert!(store.search_results().get().is_empty());
        assert_eq!(store.status().get(), StoreStatus::Loading);
    }
}
