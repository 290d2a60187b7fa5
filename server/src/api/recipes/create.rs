use super::details::{load_recipe_response, RecipeResponse};
use super::payload::{replace_ingredients, replace_tags, CreateRecipeRequest};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::models::NewRecipe;
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body(content = CreateRecipeRequest, example = json!({
        "tags": [1],
        "ingredients": [{"id": 1, "amount": 200}],
        "name": "Pancakes",
        "image": "pancakes.png",
        "text": "Mix and fry.",
        "cooking_time": 20
    })),
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Unknown tag or ingredient", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreateRecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let mut conn = get_conn!(pool);

    // Recipe row and its associations land together or not at all
    let recipe_id = conn.transaction::<i32, ApiError, _>(|conn| {
        let new_recipe = NewRecipe {
            author_id: user.id,
            name: request.name.trim(),
            text: &request.text,
            image: &request.image,
            cooking_time: request.cooking_time,
        };

        let recipe_id: i32 = diesel::insert_into(recipes::table)
            .values(&new_recipe)
            .returning(recipes::id)
            .get_result(conn)?;

        replace_tags(conn, recipe_id, &request.tags)?;
        replace_ingredients(conn, recipe_id, &request.ingredients)?;

        Ok(recipe_id)
    })?;

    tracing::info!(recipe_id, author_id = user.id, "recipe created");

    let recipe = load_recipe_response(&mut conn, Some(user.id), recipe_id)?
        .ok_or_else(|| ApiError::internal("Created recipe vanished"))?;

    Ok((StatusCode::CREATED, Json(recipe)))
}
