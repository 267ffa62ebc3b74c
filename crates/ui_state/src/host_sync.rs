//! Routes host-pushed events into the stores.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use client_core::{EventBridge, Handler, ListenerGuard};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use shared::{
    domain::{Member, MemberId, Team, TeamId, TeamPatch, Tournament, TournamentId, TournamentPatch},
    protocol::host_events,
};
use tracing::debug;

use crate::{notifications::NotificationKind, UiStores};

fn decode<T: DeserializeOwned>(key: &str, data: &Value) -> anyhow::Result<T> {
    serde_json::from_value(data.clone()).with_context(|| format!("malformed `{key}` payload"))
}

/// `null` is treated as an empty list.
fn decode_list<T: DeserializeOwned>(key: &str, data: &Value) -> anyhow::Result<Vec<T>> {
    Ok(decode::<Option<Vec<T>>>(key, data)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenTournament {
    #[serde(default)]
    is_admin: bool,
}

#[derive(Debug, Deserialize)]
struct EntityUpdate<I, P> {
    id: I,
    updates: P,
}

#[derive(Debug, Deserialize)]
struct EntityRef<I> {
    id: I,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberAdded {
    team_id: TeamId,
    member: Member,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberRemoved {
    team_id: TeamId,
    member_id: MemberId,
}

#[derive(Debug, Deserialize)]
struct Notify {
    #[serde(rename = "type")]
    kind: NotificationKind,
    message: String,
    /// Milliseconds; zero or negative keeps the notification.
    #[serde(default)]
    duration: Option<i64>,
}

/// Live wiring between a bridge and the stores. Dropping it removes the
/// callbacks it registered, leaving any that replaced them since, and
/// disposes its listeners.
pub struct HostSync {
    bridge: EventBridge,
    callbacks: Vec<(&'static str, Handler)>,
    listeners: Vec<ListenerGuard>,
}

impl HostSync {
    pub fn bind(bridge: &EventBridge, stores: &UiStores) -> Self {
        let callbacks = build_callbacks(stores);
        for (key, handler) in &callbacks {
            bridge.on_shared(key, Arc::clone(handler));
        }
        let listeners = subscribe_listeners(bridge, stores);
        debug!(
            callbacks = callbacks.len(),
            listeners = listeners.len(),
            "host events bound to stores"
        );
        Self {
            bridge: bridge.clone(),
            callbacks,
            listeners,
        }
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Drop for HostSync {
    fn drop(&mut self) {
        for (key, handler) in &self.callbacks {
            self.bridge.off_if(key, handler);
        }
        self.listeners.clear();
    }
}

fn callback<F>(handler: F) -> Handler
where
    F: Fn(&Value) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(handler)
}

fn build_callbacks(stores: &UiStores) -> Vec<(&'static str, Handler)> {
    let mut callbacks = Vec::new();

    let app = stores.app.clone();
    callbacks.push((host_events::OPEN_TOURNAMENT, callback(move |data| {
        let open: Option<OpenTournament> = decode(host_events::OPEN_TOURNAMENT, data)?;
        let is_admin = open.is_some_and(|open| open.is_admin);
        let payload = (!data.is_null()).then(|| data.clone());
        app.open_tournament(is_admin, payload);
        Ok(())
    })));

    let app = stores.app.clone();
    callbacks.push((host_events::CLOSE_TOURNAMENT, callback(move |_| {
        app.close_tournament();
        Ok(())
    })));

    let tournaments = stores.tournaments.clone();
    callbacks.push((host_events::SET_TOURNAMENTS, callback(move |data| {
        tournaments.set_tournaments(decode_list(host_events::SET_TOURNAMENTS, data)?);
        Ok(())
    })));

    let tournaments = stores.tournaments.clone();
    callbacks.push((host_events::SET_ACTIVE_TOURNAMENT, callback(move |data| {
        let active: Option<Tournament> = decode(host_events::SET_ACTIVE_TOURNAMENT, data)?;
        tournaments.set_active_tournament(active);
        Ok(())
    })));

    let teams = stores.teams.clone();
    callbacks.push((host_events::SET_PLAYER_TEAMS, callback(move |data| {
        teams.set_player_teams(decode_list(host_events::SET_PLAYER_TEAMS, data)?);
        Ok(())
    })));

    let teams = stores.teams.clone();
    callbacks.push((host_events::SET_ACTIVE_TEAM, callback(move |data| {
        let active: Option<Team> = decode(host_events::SET_ACTIVE_TEAM, data)?;
        teams.set_active_team(active);
        Ok(())
    })));

    let teams = stores.teams.clone();
    callbacks.push((host_events::SET_SEARCH_RESULTS, callback(move |data| {
        teams.set_search_results(decode_list(host_events::SET_SEARCH_RESULTS, data)?);
        Ok(())
    })));

    let notifications = stores.notifications.clone();
    callbacks.push((host_events::NOTIFY, callback(move |data| {
        let notify: Notify = decode(host_events::NOTIFY, data)?;
        let duration = match notify.duration {
            None => notifications.default_duration(),
            Some(ms) => Duration::from_millis(u64::try_from(ms).unwrap_or(0)),
        };
        notifications.show(notify.kind, notify.message, duration);
        Ok(())
    })));

    callbacks
}

fn subscribe_listeners(bridge: &EventBridge, stores: &UiStores) -> Vec<ListenerGuard> {
    let mut guards = Vec::new();

    let tournaments = stores.tournaments.clone();
    guards.push(bridge.subscribe(host_events::TOURNAMENT_ADDED, move |data| {
        tournaments.add_tournament(decode(host_events::TOURNAMENT_ADDED, data)?);
        Ok(())
    }));

    let tournaments = stores.tournaments.clone();
    guards.push(bridge.subscribe(host_events::TOURNAMENT_UPDATED, move |data| {
        let update: EntityUpdate<TournamentId, TournamentPatch> =
            decode(host_events::TOURNAMENT_UPDATED, data)?;
        tournaments.update_tournament(update.id, &update.updates);
        Ok(())
    }));

    let tournaments = stores.tournaments.clone();
    guards.push(bridge.subscribe(host_events::TOURNAMENT_REMOVED, move |data| {
        let target: EntityRef<TournamentId> = decode(host_events::TOURNAMENT_REMOVED, data)?;
        tournaments.remove_tournament(target.id);
        Ok(())
    }));

    let teams = stores.teams.clone();
    guards.push(bridge.subscribe(host_events::TEAM_ADDED, move |data| {
        teams.add_team(decode(host_events::TEAM_ADDED, data)?);
        Ok(())
    }));

    let teams = stores.teams.clone();
    guards.push(bridge.subscribe(host_events::TEAM_UPDATED, move |data| {
        let update: EntityUpdate<TeamId, TeamPatch> = decode(host_events::TEAM_UPDATED, data)?;
        teams.update_team(update.id, &update.updates);
        Ok(())
    }));

    let teams = stores.teams.clone();
    guards.push(bridge.subscribe(host_events::TEAM_REMOVED, move |data| {
        let target: EntityRef<TeamId> = decode(host_events::TEAM_REMOVED, data)?;
        teams.remove_team(target.id);
        Ok(())
    }));

    let teams = stores.teams.clone();
    guards.push(bridge.subscribe(host_events::MEMBER_ADDED, move |data| {
        let added: MemberAdded = decode(host_events::MEMBER_ADDED, data)?;
        teams.add_member(added.team_id, added.member);
        Ok(())
    }));

    let teams = stores.teams.clone();
    guards.push(bridge.subscribe(host_events::MEMBER_REMOVED, move |data| {
        let removed: MemberRemoved = decode(host_events::MEMBER_REMOVED, data)?;
        teams.remove_member(removed.team_id, removed.member_id);
        Ok(())
    }));

    guards
}
