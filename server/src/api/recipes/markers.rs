//! Shared bodies for the favorite and shopping cart toggles.

use super::details::{load_minified, RecipeMinified};
use crate::db::DbConn;
use crate::error::ApiError;
use crate::store::PgStore;
use foodgram_core::{add_marker, remove_marker, MarkerRelation};

pub(super) fn add(
    conn: &mut DbConn,
    relation: MarkerRelation,
    user_id: i32,
    recipe_id: i32,
) -> Result<RecipeMinified, ApiError> {
    add_marker(&mut PgStore::new(conn), relation, user_id, recipe_id)?;

    load_minified(conn, recipe_id)?.ok_or_else(|| ApiError::not_found("Recipe not found"))
}

pub(super) fn remove(
    conn: &mut DbConn,
    relation: MarkerRelation,
    user_id: i32,
    recipe_id: i32,
) -> Result<(), ApiError> {
    remove_marker(&mut PgStore::new(conn), relation, user_id, recipe_id)?;
    Ok(())
}
