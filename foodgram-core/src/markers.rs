//! Favorite, shopping cart and subscription markers.
//!
//! The three relations share one code path: adding a marker is a strict
//! create (a duplicate is a conflict) and removing one requires it to exist.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::store::{EntityStore, InsertOutcome};
use crate::types::UserId;

/// What a marker points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Recipe,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerRelation {
    Favorite,
    ShoppingCart,
    Subscription,
}

impl MarkerRelation {
    pub fn target_kind(self) -> TargetKind {
        match self {
            MarkerRelation::Favorite | MarkerRelation::ShoppingCart => TargetKind::Recipe,
            MarkerRelation::Subscription => TargetKind::User,
        }
    }

    fn already_exists_message(self) -> &'static str {
        match self {
            MarkerRelation::Favorite => "Recipe is already in favorites",
            MarkerRelation::ShoppingCart => "Recipe is already in the shopping cart",
            MarkerRelation::Subscription => "Already subscribed to this user",
        }
    }

    fn missing_message(self) -> &'static str {
        match self {
            MarkerRelation::Favorite => "Recipe is not in favorites",
            MarkerRelation::ShoppingCart => "Recipe is not in the shopping cart",
            MarkerRelation::Subscription => "Not subscribed to this user",
        }
    }

    fn missing_target_message(self) -> &'static str {
        match self.target_kind() {
            TargetKind::Recipe => "Recipe not found",
            TargetKind::User => "User not found",
        }
    }
}

fn check_preconditions<S: EntityStore + ?Sized>(
    store: &mut S,
    relation: MarkerRelation,
    actor: UserId,
    target: i32,
) -> Result<(), DomainError> {
    if relation == MarkerRelation::Subscription && actor == target {
        return Err(DomainError::validation("Cannot subscribe to yourself"));
    }

    if !store.target_exists(relation.target_kind(), target)? {
        return Err(DomainError::not_found(relation.missing_target_message()));
    }

    Ok(())
}

/// Create the `relation` marker from `actor` to `target`.
pub fn add_marker<S: EntityStore + ?Sized>(
    store: &mut S,
    relation: MarkerRelation,
    actor: UserId,
    target: i32,
) -> Result<(), DomainError> {
    check_preconditions(store, relation, actor, target)?;

    match store.insert_marker(relation, actor, target)? {
        InsertOutcome::Inserted => {
            tracing::info!(relation = ?relation, actor, target, "marker added");
            Ok(())
        }
        InsertOutcome::AlreadyExists => {
            Err(DomainError::conflict(relation.already_exists_message()))
        }
        InsertOutcome::TargetMissing => {
            Err(DomainError::not_found(relation.missing_target_message()))
        }
    }
}

/// Delete the `relation` marker from `actor` to `target`.
pub fn remove_marker<S: EntityStore + ?Sized>(
    store: &mut S,
    relation: MarkerRelation,
    actor: UserId,
    target: i32,
) -> Result<(), DomainError> {
    check_preconditions(store, relation, actor, target)?;

    if store.delete_marker(relation, actor, target)? {
        tracing::info!(relation = ?relation, actor, target, "marker removed");
        Ok(())
    } else {
        Err(DomainError::not_found(relation.missing_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add_user(1);
        store.add_user(2);
        store.add_recipe(10, 2, &["dinner"]);
        store
    }

    #[test]
    fn test_favorite_twice_conflicts() {
        let mut store = store();
        add_marker(&mut store, MarkerRelation::Favorite, 1, 10).unwrap();
        let err = add_marker(&mut store, MarkerRelation::Favorite, 1, 10).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.marker_count(MarkerRelation::Favorite), 1);
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let mut store = store();
        let err = remove_marker(&mut store, MarkerRelation::ShoppingCart, 1, 10).unwrap_err();
        assert_eq!(err, DomainError::not_found("Recipe is not in the shopping cart"));
        assert_eq!(store.marker_count(MarkerRelation::ShoppingCart), 0);
    }

    #[test]
    fn test_add_then_remove() {
        let mut store = store();
        add_marker(&mut store, MarkerRelation::ShoppingCart, 1, 10).unwrap();
        remove_marker(&mut store, MarkerRelation::ShoppingCart, 1, 10).unwrap();
        assert_eq!(store.marker_count(MarkerRelation::ShoppingCart), 0);
    }

    #[test]
    fn test_self_subscription_rejected_before_lookup() {
        let mut store = store();
        // User 99 does not exist; validation must still win over not-found.
        let err = add_marker(&mut store, MarkerRelation::Subscription, 99, 99).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(store.marker_count(MarkerRelation::Subscription), 0);
    }

    #[test]
    fn test_missing_target() {
        let mut store = store();
        let err = add_marker(&mut store, MarkerRelation::Favorite, 1, 404).unwrap_err();
        assert_eq!(err, DomainError::not_found("Recipe not found"));
        let err = add_marker(&mut store, MarkerRelation::Subscription, 1, 404).unwrap_err();
        assert_eq!(err, DomainError::not_found("User not found"));
    }

    #[test]
    fn test_target_deleted_during_add() {
        let mut store = store();
        store.delete_before_next_insert(TargetKind::Recipe, 10);
        let err = add_marker(&mut store, MarkerRelation::ShoppingCart, 1, 10).unwrap_err();
        assert_eq!(err, DomainError::not_found("Recipe not found"));

        store.delete_before_next_insert(TargetKind::User, 2);
        let err = add_marker(&mut store, MarkerRelation::Subscription, 1, 2).unwrap_err();
        assert_eq!(err, DomainError::not_found("User not found"));
        assert_eq!(store.marker_count(MarkerRelation::Subscription), 0);
    }

    #[test]
    fn test_relations_are_independent() {
        let mut store = store();
        add_marker(&mut store, MarkerRelation::Favorite, 1, 10).unwrap();
        add_marker(&mut store, MarkerRelation::ShoppingCart, 1, 10).unwrap();
        add_marker(&mut store, MarkerRelation::Subscription, 1, 2).unwrap();
        assert_eq!(store.marker_count(MarkerRelation::Favorite), 1);
        assert_eq!(store.marker_count(MarkerRelation::ShoppingCart), 1);
        assert_eq!(store.marker_count(MarkerRelation::Subscription), 1);
    }

    #[test]
    fn test_subscription_is_directed() {
        let mut store = store();
        add_marker(&mut store, MarkerRelation::Subscription, 1, 2).unwrap();
        add_marker(&mut store, MarkerRelation::Subscription, 2, 1).unwrap();
        remove_marker(&mut store, MarkerRelation::Subscription, 1, 2).unwrap();
        assert_eq!(store.marker_count(MarkerRelation::Subscription), 1);
        let err = remove_marker(&mut store, MarkerRelation::Subscription, 1, 2).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
