use super::details::{user_responses, UserResponse};
use crate::api::{PageParams, PaginationMetadata};
use crate::auth::MaybeAuthUser;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::models::User;
use crate::raw_sql::count_over;
use crate::schema::users;
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
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
    pub pagination: PaginationMetadata,
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(PageParams),
    responses(
        (status = 200, description = "Page of users", body = ListUsersResponse)
    )
)]
pub async fn list_users(
    viewer: MaybeAuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page();
    let mut conn = get_conn!(pool);

    let rows: Vec<(User, i64)> = users::table
        .select((User::as_select(), count_over()))
        .order(users::id.asc())
        .limit(page.limit)
        .offset(page.offset)
        .load(&mut conn)?;

    let total = match rows.first() {
        Some((_, total)) => *total,
        None => users::table.count().get_result(&mut conn)?,
    };
    let page_users: Vec<User> = rows.into_iter().map(|(u, _)| u).collect();
    let users = user_responses(&mut conn, viewer.user_id(), &page_users)?;

    Ok(Json(ListUsersResponse {
        users,
        pagination: PaginationMetadata::new(total, page),
    }))
}
