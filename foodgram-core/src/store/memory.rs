use std::collections::HashSet;

use bigdecimal::BigDecimal;

use super::{EntityStore, InsertOutcome};
use crate::error::StoreError;
use crate::filter::{FilterScope, Page, RecipePage};
use crate::markers::{MarkerRelation, TargetKind};
use crate::shopping_list::IngredientLine;
use crate::types::{RecipeId, UserId};

#[derive(Debug, Clone)]
struct StoredRecipe {
    id: RecipeId,
    author_id: UserId,
    name: String,
    tag_slugs: Vec<String>,
    lines: Vec<IngredientLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker {
    relation: MarkerRelation,
    actor: UserId,
    target: i32,
}

/// In-memory [`EntityStore`] for tests.
///
/// Markers are kept in insertion order, which is what cart ordering relies
/// on. Uniqueness per (relation, actor, target) is enforced on insert the same
/// way a database constraint would, and so is the existence of the target.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    users: HashSet<UserId>,
    recipes: Vec<StoredRecipe>,
    markers: Vec<Marker>,
    fail_with: Option<String>,
    delete_before_insert: Option<(TargetKind, i32)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, id: UserId) {
        self.users.insert(id);
    }

    /// Register a recipe named `Recipe <id>`.
    ///
    /// Re-adding an id replaces its author and tags and keeps its name and lines.
    pub fn add_recipe(&mut self, id: RecipeId, author_id: UserId, tag_slugs: &[&str]) {
        self.users.insert(author_id);
        let tag_slugs: Vec<String> = tag_slugs.iter().map(|s| s.to_string()).collect();

        match self.recipes.iter_mut().find(|r| r.id == id) {
            Some(recipe) => {
                recipe.author_id = author_id;
                recipe.tag_slugs = tag_slugs;
            }
            None => self.recipes.push(StoredRecipe {
                id,
                author_id,
                name: format!("Recipe {id}"),
                tag_slugs,
                lines: Vec::new(),
            }),
        }
    }

    pub fn rename_recipe(&mut self, id: RecipeId, name: &str) {
        if let Some(recipe) = self.recipes.iter_mut().find(|r| r.id == id) {
            recipe.name = name.to_string();
        }
    }

    /// Delete a recipe and every marker pointing at it.
    pub fn remove_recipe(&mut self, id: RecipeId) {
        self.recipes.retain(|r| r.id != id);
        self.markers
            .retain(|m| !(m.relation.target_kind() == TargetKind::Recipe && m.target == id));
    }

    /// Delete a user, their recipes and every marker involving them.
    pub fn remove_user(&mut self, id: UserId) {
        self.users.remove(&id);
        self.recipes.retain(|r| r.author_id != id);
        self.markers.retain(|m| {
            m.actor != id && !(m.relation.target_kind() == TargetKind::User && m.target == id)
        });
    }

    /// Delete the given target right before the next marker insert, after
    /// any existence check has already passed.
    pub fn delete_before_next_insert(&mut self, kind: TargetKind, id: i32) {
        self.delete_before_insert = Some((kind, id));
    }

    /// Append an ingredient row to a recipe registered with [`add_recipe`](Self::add_recipe).
    pub fn add_ingredient(&mut self, recipe_id: RecipeId, name: &str, unit: &str, amount: BigDecimal) {
        if let Some(recipe) = self.recipes.iter_mut().find(|r| r.id == recipe_id) {
            recipe.lines.push(IngredientLine::new(name, unit, amount));
        }
    }

    /// Make every subsequent store call fail with `message`.
    pub fn fail_with(&mut self, message: &str) {
        self.fail_with = Some(message.to_string());
    }

    pub fn marker_count(&self, relation: MarkerRelation) -> usize {
        self.markers.iter().filter(|m| m.relation == relation).count()
    }

    fn has_marker(&self, relation: MarkerRelation, actor: UserId, target: i32) -> bool {
        self.markers.contains(&Marker {
            relation,
            actor,
            target,
        })
    }

    fn check(&self) -> Result<(), StoreError> {
        match &self.fail_with {
            Some(message) => Err(StoreError::new(message.clone())),
            None => Ok(()),
        }
    }
}

impl EntityStore for MemoryStore {
    fn find_recipes(&mut self, scope: &FilterScope, page: Page) -> Result<RecipePage, StoreError> {
        self.check()?;

        let mut ids: Vec<RecipeId> = self
            .recipes
            .iter()
            .filter(|recipe| {
                let favorited = scope
                    .favorited_by
                    .is_some_and(|user| self.has_marker(MarkerRelation::Favorite, user, recipe.id));
                let in_cart = scope
                    .in_cart_of
                    .is_some_and(|user| self.has_marker(MarkerRelation::ShoppingCart, user, recipe.id));
                scope.matches(recipe.author_id, &recipe.name, favorited, in_cart, &recipe.tag_slugs)
            })
            .map(|recipe| recipe.id)
            .collect();

        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids.dedup();

        let total = ids.len() as i64;
        let ids = ids
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect();

        Ok(RecipePage { ids, total })
    }

    fn cart_lines(&mut self, user_id: UserId) -> Result<Vec<IngredientLine>, StoreError> {
        self.check()?;

        let lines = self
            .markers
            .iter()
            .filter(|m| m.relation == MarkerRelation::ShoppingCart && m.actor == user_id)
            .filter_map(|m| self.recipes.iter().find(|r| r.id == m.target))
            .flat_map(|recipe| recipe.lines.iter().cloned())
            .collect();

        Ok(lines)
    }

    fn target_exists(&mut self, kind: TargetKind, id: i32) -> Result<bool, StoreError> {
        self.check()?;

        Ok(match kind {
            TargetKind::Recipe => self.recipes.iter().any(|r| r.id == id),
            TargetKind::User => self.users.contains(&id),
        })
    }

    fn insert_marker(
        &mut self,
        relation: MarkerRelation,
        actor: UserId,
        target: i32,
    ) -> Result<InsertOutcome, StoreError> {
        self.check()?;

        match self.delete_before_insert.take() {
            Some((TargetKind::Recipe, id)) => self.remove_recipe(id),
            Some((TargetKind::User, id)) => self.remove_user(id),
            None => {}
        }
        let target_present = match relation.target_kind() {
            TargetKind::Recipe => self.recipes.iter().any(|r| r.id == target),
            TargetKind::User => self.users.contains(&target),
        };
        if !target_present {
            return Ok(InsertOutcome::TargetMissing);
        }
        if self.has_marker(relation, actor, target) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        self.markers.push(Marker {
            relation,
            actor,
            target,
        });
        Ok(InsertOutcome::Inserted)
    }

    fn delete_marker(
        &mut self,
        relation: MarkerRelation,
        actor: UserId,
        target: i32,
    ) -> Result<bool, StoreError> {
        self.check()?;

        let marker = Marker {
            relation,
            actor,
            target,
        };
        match self.markers.iter().position(|m| *m == marker) {
            Some(position) => {
                self.markers.remove(position);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging() {
        let mut store = MemoryStore::new();
        for id in 1..=5 {
            store.add_recipe(id, 1, &[]);
        }

        let page = store
            .find_recipes(&FilterScope::default(), Page { limit: 2, offset: 1 })
            .unwrap();
        assert_eq!(page.ids, vec![4, 3]);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_insert_for_missing_target() {
        let mut store = MemoryStore::new();
        store.add_recipe(10, 2, &[]);

        assert_eq!(
            store.insert_marker(MarkerRelation::Favorite, 1, 99).unwrap(),
            InsertOutcome::TargetMissing
        );

        store.delete_before_next_insert(TargetKind::Recipe, 10);
        assert!(store.target_exists(TargetKind::Recipe, 10).unwrap());
        assert_eq!(
            store.insert_marker(MarkerRelation::Favorite, 1, 10).unwrap(),
            InsertOutcome::TargetMissing
        );
        assert_eq!(store.marker_count(MarkerRelation::Favorite), 0);
    }

    #[test]
    fn test_remove_recipe_drops_markers() {
        let mut store = MemoryStore::new();
        store.add_recipe(10, 2, &[]);
        store.insert_marker(MarkerRelation::ShoppingCart, 1, 10).unwrap();

        store.remove_recipe(10);
        assert_eq!(store.marker_count(MarkerRelation::ShoppingCart), 0);
        assert!(store.cart_lines(1).unwrap().is_empty());
    }

    #[test]
    fn test_failure_injection() {
        let mut store = MemoryStore::new();
        store.fail_with("database is down");
        let err = store.cart_lines(1).unwrap_err();
        assert_eq!(err, StoreError::new("database is down"));
    }
}
