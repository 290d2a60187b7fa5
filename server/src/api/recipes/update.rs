use super::details::{load_recipe_response, RecipeResponse};
use super::payload::{replace_ingredients, replace_tags, UpdateRecipeRequest};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::models::RecipeChanges;
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

/// Load the recipe's author, failing with 404 if it doesn't exist and 403 if
/// `user_id` didn't write it.
pub(super) fn ensure_author(
    conn: &mut PgConnection,
    recipe_id: i32,
    user_id: i32,
) -> Result<(), ApiError> {
    let author_id: i32 = recipes::table
        .find(recipe_id)
        .select(recipes::author_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    if author_id != user_id {
        return Err(ApiError::forbidden("Only the author can change this recipe"));
    }
    Ok(())
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe, tag or ingredient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateRecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let mut conn = get_conn!(pool);

    conn.transaction::<(), ApiError, _>(|conn| {
        ensure_author(conn, id, user.id)?;

        let changes = RecipeChanges {
            name: request.name.as_deref().map(str::trim),
            text: request.text.as_deref(),
            image: request.image.as_deref(),
            cooking_time: request.cooking_time,
        };
        if !changes.is_empty() {
            diesel::update(recipes::table.find(id))
                .set(&changes)
                .execute(conn)?;
        }

        if let Some(tags) = &request.tags {
            replace_tags(conn, id, tags)?;
        }
        if let Some(ingredients) = &request.ingredients {
            replace_ingredients(conn, id, ingredients)?;
        }

        Ok(())
    })?;

    tracing::info!(recipe_id = id, author_id = user.id, "recipe updated");

    let recipe = load_recipe_response(&mut conn, Some(user.id), id)?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    Ok(Json(recipe))
}
