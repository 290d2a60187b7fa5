//! Storage seam for the core operations.
//!
//! The server implements [`EntityStore`] on top of Postgres; [`MemoryStore`]
//! holds everything in vectors and backs the tests.

mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::filter::{FilterScope, Page, RecipePage};
use crate::markers::{MarkerRelation, TargetKind};
use crate::shopping_list::IngredientLine;
use crate::types::UserId;

/// Result of inserting a marker row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The unique constraint on (actor, target) rejected the row.
    AlreadyExists,
    /// The target row vanished between the existence check and the insert.
    TargetMissing,
}

pub trait EntityStore {
    /// Distinct recipe ids matching `scope`, newest first, sliced to `page`.
    fn find_recipes(&mut self, scope: &FilterScope, page: Page) -> Result<RecipePage, StoreError>;

    /// Ingredient rows of every recipe in `user_id`'s cart, in cart order.
    fn cart_lines(&mut self, user_id: UserId) -> Result<Vec<IngredientLine>, StoreError>;

    fn target_exists(&mut self, kind: TargetKind, id: i32) -> Result<bool, StoreError>;

    /// Insert a marker row in one atomic step.
    ///
    /// Implementations must not check-then-insert; duplicate detection comes
    /// from the storage uniqueness constraint.
    fn insert_marker(
        &mut self,
        relation: MarkerRelation,
        actor: UserId,
        target: i32,
    ) -> Result<InsertOutcome, StoreError>;

    /// Delete a marker row. Returns whether a row was removed.
    fn delete_marker(
        &mut self,
        relation: MarkerRelation,
        actor: UserId,
        target: i32,
    ) -> Result<bool, StoreError>;
}
