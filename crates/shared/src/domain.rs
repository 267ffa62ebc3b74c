use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(TournamentId);
id_newtype!(TeamId);
id_newtype!(MemberId);

/// Extra host-provided fields this UI does not model explicitly.
pub type ExtraFields = Map<String, Value>;

/// A record addressed by a stable id that accepts shallow-merge patches.
pub trait Entity: Clone {
    type Id: Copy + Eq + std::fmt::Debug;
    type Patch;

    fn id(&self) -> Self::Id;

    /// Returns a copy with every field present in `patch` overwritten.
    fn merged(&self, patch: &Self::Patch) -> Self;
}

/// A patch slot: `None` when the key is absent, `Some(None)` for an
/// explicit `null`, `Some(Some(v))` for a value.
pub type PatchField<T> = Option<Option<T>>;

/// `null` decodes like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn tournament_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_tournament_status))
}

fn team_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_team_status))
}

/// Only called when the key is present, so `null` lands as `Some(None)`.
fn patch_field<'de, D, T>(deserializer: D) -> Result<PatchField<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Applies a patch slot to a field whose `null` means "back to default".
fn apply<T: Clone>(target: &mut T, slot: &PatchField<T>, reset: impl FnOnce() -> T) {
    match slot {
        None => {}
        Some(None) => *target = reset(),
        Some(Some(value)) => *target = value.clone(),
    }
}

/// Applies a patch slot to an optional field; `null` clears it.
fn apply_optional<T: Clone>(target: &mut Option<T>, slot: &PatchField<T>) {
    if let Some(value) = slot {
        *target = value.clone();
    }
}

fn merge_extra(target: &mut ExtraFields, patch: &ExtraFields) {
    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default = "default_tournament_status", deserialize_with = "tournament_status")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prize_pool: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entry_fee: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_teams: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

fn default_tournament_status() -> String {
    "registration".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPatch {
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub name: PatchField<String>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub status: PatchField<String>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub prize_pool: PatchField<f64>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub entry_fee: PatchField<f64>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub max_teams: PatchField<u32>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub start_date: PatchField<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Entity for Tournament {
    type Id = TournamentId;
    type Patch = TournamentPatch;

    fn id(&self) -> TournamentId {
        self.id
    }

    fn merged(&self, patch: &TournamentPatch) -> Self {
        let mut next = self.clone();
        apply(&mut next.name, &patch.name, String::new);
        apply(&mut next.status, &patch.status, default_tournament_status);
        apply(&mut next.prize_pool, &patch.prize_pool, f64::default);
        apply(&mut next.entry_fee, &patch.entry_fee, f64::default);
        apply(&mut next.max_teams, &patch.max_teams, u32::default);
        apply_optional(&mut next.start_date, &patch.start_date);
        merge_extra(&mut next.extra, &patch.extra);
        next
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Shared member list; every mutation swaps in a new list.
pub type Members = Arc<Vec<Member>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default = "default_team_status", deserialize_with = "team_status")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wins: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub losses: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Members,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

fn default_team_status() -> String {
    "registered".to_string()
}

impl Team {
    /// Copy of this team holding `members` as its member list.
    pub fn with_members(&self, members: Members) -> Self {
        Self {
            members,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPatch {
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub name: PatchField<String>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub tag: PatchField<String>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub status: PatchField<String>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub wins: PatchField<u32>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub losses: PatchField<u32>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub members: PatchField<Vec<Member>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Entity for Team {
    type Id = TeamId;
    type Patch = TeamPatch;

    fn id(&self) -> TeamId {
        self.id
    }

    fn merged(&self, patch: &TeamPatch) -> Self {
        let mut next = self.clone();
        apply(&mut next.name, &patch.name, String::new);
        apply_optional(&mut next.tag, &patch.tag);
        apply(&mut next.status, &patch.status, default_team_status);
        apply(&mut next.wins, &patch.wins, u32::default);
        apply(&mut next.losses, &patch.losses, u32::default);
        match &patch.members {
            None => {}
            Some(None) => next.members = Members::default(),
            Some(Some(members)) => next.members = Arc::new(members.clone()),
        }
        merge_extra(&mut next.extra, &patch.extra);
        next
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tournament_patch_keeps_absent_fields() {
        let tournament: Tournament = serde_json::from_value(json!({
            "id": 4,
            "name": "Desert Cup",
            "status": "registration",
            "prizePool": 25000,
            "region": "south"
        }))
        .expect("tournament");
        let patch: TournamentPatch =
            serde_json::from_value(json!({ "status": "active", "round": 2 })).expect("patch");

        let merged = tournament.merged(&patch);

        assert_eq!(merged.name, "Desert Cup");
        assert_eq!(merged.status, "active");
        assert_eq!(merged.prize_pool, 25000.0);
        assert_eq!(merged.extra.get("region"), Some(&json!("south")));
        assert_eq!(merged.extra.get("round"), Some(&json!(2)));
    }

    #[test]
    fn team_patch_replaces_member_list() {
        let team: Team = serde_json::from_value(json!({
            "id": 9,
            "name": "Nitro",
            "members": [{ "id": 1, "name": "ava", "role": "captain" }]
        }))
        .expect("team");
        let before = Arc::clone(&team.members);

        let merged = team.merged(&TeamPatch {
            members: Some(Some(Vec::new())),
            ..TeamPatch::default()
        });

        assert!(merged.members.is_empty());
        assert_eq!(before.len(), 1);
        assert!(!Arc::ptr_eq(&before, &merged.members));
    }

    #[test]
    fn null_patch_fields_clear_or_reset() {
        let tournament: Tournament = serde_json::from_value(json!({
            "id": 1,
            "name": "Night Run",
            "maxTeams": 16,
            "startDate": "2024-01-01"
        }))
        .expect("tournament");
        let patch: TournamentPatch =
            serde_json::from_value(json!({ "startDate": null, "maxTeams": null })).expect("patch");
        assert_eq!(patch.start_date, Some(None));
        assert_eq!(patch.name, None);

        let merged = tournament.merged(&patch);

        assert_eq!(merged.start_date, None);
        assert_eq!(merged.max_teams, 0);
        assert_eq!(merged.name, "Night Run");
    }

    #[test]
    fn null_team_tag_is_cleared() {
        let team: Team =
            serde_json::from_value(json!({ "id": 2, "name": "Apex", "tag": "APX" })).expect("team");
        let patch: TeamPatch = serde_json::from_value(json!({ "tag": null })).expect("patch");

        assert_eq!(team.merged(&patch).tag, None);
    }

    #[test]
    fn null_entity_fields_decode_as_defaults() {
        let tournaments: Vec<Tournament> = serde_json::from_value(json!([
            { "id": 1, "maxTeams": null, "status": null, "prizePool": null },
            { "id": 2 }
        ]))
        .expect("tournaments");
        assert_eq!(tournaments[0].max_teams, 0);
        assert_eq!(tournaments[0].status, "registration");
        assert_eq!(tournaments[0].prize_pool, 0.0);

        let team: Team = serde_json::from_value(json!({
            "id": 3,
            "name": null,
            "wins": null,
            "status": null,
            "members": null
        }))
        .expect("team");
        assert_eq!(team.name, "");
        assert_eq!(team.wins, 0);
        assert_eq!(team.status, "registered");
        assert!(team.members.is_empty());

        let member: Member =
            serde_json::from_value(json!({ "id": 4, "role": null })).expect("member");
        assert_eq!(member.role, "");
    }
}
