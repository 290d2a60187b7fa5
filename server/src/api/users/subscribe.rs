use super::details::{user_responses, with_recipes, UserWithRecipes};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use crate::store::PgStore;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use foodgram_core::{add_marker, remove_marker, DomainError, MarkerRelation};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipesLimitParams {
    /// Maximum number of recipes embedded per user (default: all)
    pub recipes_limit: Option<i64>,
}

impl RecipesLimitParams {
    pub fn limit(&self) -> Result<Option<usize>, DomainError> {
        match self.recipes_limit {
            None => Ok(None),
            Some(limit) => usize::try_from(limit)
                .map(Some)
                .map_err(|_| DomainError::validation("recipes_limit must not be negative")),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User to follow"),
        RecipesLimitParams
    ),
    responses(
        (status = 201, description = "Subscribed", body = UserWithRecipes),
        (status = 400, description = "Cannot subscribe to yourself", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Already subscribed", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn subscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Query(params): Query<RecipesLimitParams>,
) -> Result<impl IntoResponse, ApiError> {
    let recipes_limit = params.limit()?;
    let mut conn = get_conn!(pool);

    add_marker(
        &mut PgStore::new(&mut conn),
        MarkerRelation::Subscription,
        user.id,
        id,
    )?;

    let target: User = users::table
        .find(id)
        .select(User::as_select())
        .first(&mut conn)?;

    let responses = user_responses(&mut conn, Some(user.id), std::slice::from_ref(&target))?;
    let body = with_recipes(&mut conn, responses, recipes_limit)?
        .pop()
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User to unfollow")
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Cannot unsubscribe from yourself", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found or not subscribed", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    remove_marker(
        &mut PgStore::new(&mut conn),
        MarkerRelation::Subscription,
        user.id,
        id,
    )?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipes_limit() {
        assert_eq!(RecipesLimitParams::default().limit(), Ok(None));
        let params = RecipesLimitParams {
            recipes_limit: Some(3),
        };
        assert_eq!(params.limit(), Ok(Some(3)));
        let params = RecipesLimitParams {
            recipes_limit: Some(-1),
        };
        assert!(params.limit().is_err());
    }
}
