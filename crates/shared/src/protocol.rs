use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sound set used when a cue does not name one.
pub const DEFAULT_SOUND_SET: &str = "HUD_FRONTEND_DEFAULT_SOUNDSET";

/// Request names the UI posts to the host.
pub mod requests {
    pub const CLOSE_TOURNAMENT: &str = "closeTournament";
    pub const PLAY_SOUND: &str = "playSound";
}

/// Sound cue names.
pub mod sounds {
    pub const BACK: &str = "BACK";
    pub const SELECT: &str = "SELECT";
    pub const ERROR: &str = "ERROR";
}

/// Inbound keys the host pushes. The first group is addressed by `type`
/// (single handler), the second by `action` (many listeners).
pub mod host_events {
    pub const OPEN_TOURNAMENT: &str = "openTournament";
    pub const CLOSE_TOURNAMENT: &str = "closeTournament";
    pub const SET_TOURNAMENTS: &str = "setTournaments";
    pub const SET_ACTIVE_TOURNAMENT: &str = "setActiveTournament";
    pub const SET_PLAYER_TEAMS: &str = "setPlayerTeams";
    pub const SET_ACTIVE_TEAM: &str = "setActiveTeam";
    pub const SET_SEARCH_RESULTS: &str = "setSearchResults";
    pub const NOTIFY: &str = "notify";

    pub const TOURNAMENT_ADDED: &str = "tournamentAdded";
    pub const TOURNAMENT_UPDATED: &str = "tournamentUpdated";
    pub const TOURNAMENT_REMOVED: &str = "tournamentRemoved";
    pub const TEAM_ADDED: &str = "teamAdded";
    pub const TEAM_UPDATED: &str = "teamUpdated";
    pub const TEAM_REMOVED: &str = "teamRemoved";
    pub const MEMBER_ADDED: &str = "memberAdded";
    pub const MEMBER_REMOVED: &str = "memberRemoved";
}

/// A host-pushed message. Either addressing key may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl InboundMessage {
    pub fn typed(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: Some(kind.into()),
            action: None,
            data,
        }
    }

    pub fn action(action: impl Into<String>, data: Value) -> Self {
        Self {
            kind: None,
            action: Some(action.into()),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundCue {
    pub sound: String,
    pub sound_set: String,
}

impl SoundCue {
    pub fn new(sound: impl Into<String>, sound_set: Option<&str>) -> Self {
        Self {
            sound: sound.into(),
            sound_set: sound_set.unwrap_or(DEFAULT_SOUND_SET).to_string(),
        }
    }
}
