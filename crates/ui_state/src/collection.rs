use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::domain::Entity;

/// Whether a store has received its first snapshot from the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    #[default]
    Loading,
    Ready,
}

pub type Collection<E> = Vec<Arc<E>>;

/// Shallow-merges `patch` into every element with `id`. Other elements
/// keep their `Arc`. `None` when no element matches.
pub fn update_by_id<E: Entity>(
    items: &[Arc<E>],
    id: E::Id,
    patch: &E::Patch,
) -> Option<Collection<E>> {
    if !items.iter().any(|item| item.id() == id) {
        return None;
    }
    Some(
        items
            .iter()
            .map(|item| {
                if item.id() == id {
                    Arc::new(item.merged(patch))
                } else {
                    Arc::clone(item)
                }
            })
            .collect(),
    )
}

/// `None` when no element matches.
pub fn remove_by_id<E: Entity>(items: &[Arc<E>], id: E::Id) -> Option<Collection<E>> {
    if !items.iter().any(|item| item.id() == id) {
        return None;
    }
    Some(
        items
            .iter()
            .filter(|item| item.id() != id)
            .cloned()
            .collect(),
    )
}

/// The patched active entity when its id matches, otherwise `None`.
pub fn patch_active<E: Entity>(
    active: &Option<Arc<E>>,
    id: E::Id,
    patch: &E::Patch,
) -> Option<Option<Arc<E>>> {
    match active {
        Some(current) if current.id() == id => Some(Some(Arc::new(current.merged(patch)))),
        _ => None,
    }
}

/// `Some(None)` clears the active entity when its id matches.
pub fn drop_active<E: Entity>(active: &Option<Arc<E>>, id: E::Id) -> Option<Option<Arc<E>>> {
    match active {
        Some(current) if current.id() == id => Some(None),
        _ => None,
    }
}

pub fn into_collection<E>(items: Vec<E>) -> Collection<E> {
    items.into_iter().map(Arc::new).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use shared::domain::{Tournament, TournamentId, TournamentPatch};

    use super::*;

    fn tournaments() -> Collection<Tournament> {
        into_collection(
            serde_json::from_value::<Vec<Tournament>>(json!([
                { "id": 1, "name": "Spring Open" },
                { "id": 2, "name": "Night Sprint" },
                { "id": 3, "name": "Harbor Rally" }
            ]))
            .expect("tournaments"),
        )
    }

    #[test]
    fn update_keeps_unrelated_references() {
        let items = tournaments();
        let patch = TournamentPatch {
            status: Some(Some("active".into())),
            ..TournamentPatch::default()
        };

        let next = update_by_id(&items, TournamentId(2), &patch).expect("match");

        assert!(Arc::ptr_eq(&items[0], &next[0]));
        assert!(!Arc::ptr_eq(&items[1], &next[1]));
        assert!(Arc::ptr_eq(&items[2], &next[2]));
        assert_eq!(next[1].status, "active");
        assert_eq!(next[1].name, "Night Sprint");
    }

    #[test]
    fn update_without_match_changes_nothing() {
        let items = tournaments();
        assert!(update_by_id(&items, TournamentId(99), &TournamentPatch::default()).is_none());
        assert!(remove_by_id(&items, TournamentId(99)).is_none());
    }

    #[test]
    fn remove_filters_matching_id() {
        let items = tournaments();
        let next = remove_by_id(&items, TournamentId(1)).expect("match");
        let ids: Vec<_> = next.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TournamentId(2), TournamentId(3)]);
    }

    #[test]
    fn active_pointer_follows_id() {
        let items = tournaments();
        let active = Some(Arc::clone(&items[0]));
        let patch = TournamentPatch {
            name: Some(Some("Spring Open II".into())),
            ..TournamentPatch::default()
        };

        let patched = patch_active(&active, TournamentId(1), &patch).expect("match");
        assert_eq!(patched.as_ref().map(|t| t.name.as_str()), Some("Spring Open II"));

        assert!(patch_active(&active, TournamentId(2), &patch).is_none());

        assert_eq!(drop_active(&active, TournamentId(1)), Some(None));
        assert!(drop_active(&active, TournamentId(3)).is_none());
    }
}
