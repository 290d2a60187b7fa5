use super::details::{user_responses, with_recipes, UserWithRecipes};
use super::subscribe::RecipesLimitParams;
use crate::api::{ErrorResponse, PageParams, PaginationMetadata};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::models::User;
use crate::raw_sql::count_over;
use crate::schema::{subscriptions, users};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionsResponse {
    pub users: Vec<UserWithRecipes>,
    pub pagination: PaginationMetadata,
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "users",
    params(PageParams, RecipesLimitParams),
    responses(
        (status = 200, description = "Users the caller follows", body = SubscriptionsResponse),
        (status = 400, description = "Invalid recipes_limit", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_subscriptions(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(page_params): Query<PageParams>,
    Query(limit_params): Query<RecipesLimitParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_params.page();
    let recipes_limit = limit_params.limit()?;
    let mut conn = get_conn!(pool);

    let followed = subscriptions::table
        .filter(subscriptions::subscriber_id.eq(user.id))
        .select(subscriptions::target_id);

    let rows: Vec<(User, i64)> = users::table
        .filter(users::id.eq_any(followed))
        .select((User::as_select(), count_over()))
        .order(users::id.asc())
        .limit(page.limit)
        .offset(page.offset)
        .load(&mut conn)?;

    let total = match rows.first() {
        Some((_, total)) => *total,
        None => subscriptions::table
            .filter(subscriptions::subscriber_id.eq(user.id))
            .count()
            .get_result(&mut conn)?,
    };

    let followed_users: Vec<User> = rows.into_iter().map(|(u, _)| u).collect();
    let responses = user_responses(&mut conn, Some(user.id), &followed_users)?;
    let users = with_recipes(&mut conn, responses, recipes_limit)?;

    Ok(Json(SubscriptionsResponse {
        users,
        pagination: PaginationMetadata::new(total, page),
    }))
}
