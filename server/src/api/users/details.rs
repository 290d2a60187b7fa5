//! User response shapes and the lookups that fill them in.

use crate::api::recipes::details::RecipeMinified;
use crate::models::{Recipe, User};
use crate::schema::{recipes, subscriptions};
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the requesting user follows this user. Always false for anonymous requests.
    pub is_subscribed: bool,
}

impl UserResponse {
    pub fn new(user: &User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// A followed user together with a preview of their recipes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithRecipes {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeMinified>,
    /// Total number of recipes by this user, regardless of `recipes_limit`
    pub recipes_count: i64,
}

/// Which of `ids` the viewer is subscribed to.
pub fn subscribed_ids(
    conn: &mut PgConnection,
    viewer: Option<i32>,
    ids: &[i32],
) -> QueryResult<HashSet<i32>> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };
    if ids.is_empty() {
        return Ok(HashSet::new());
    }

    let rows: Vec<i32> = subscriptions::table
        .filter(subscriptions::subscriber_id.eq(viewer))
        .filter(subscriptions::target_id.eq_any(ids))
        .select(subscriptions::target_id)
        .load(conn)?;

    Ok(rows.into_iter().collect())
}

pub fn user_responses(
    conn: &mut PgConnection,
    viewer: Option<i32>,
    users: &[User],
) -> QueryResult<Vec<UserResponse>> {
    let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
    let subscribed = subscribed_ids(conn, viewer, &ids)?;

    Ok(users
        .iter()
        .map(|u| UserResponse::new(u, subscribed.contains(&u.id)))
        .collect())
}

/// Attach recipe previews to each user, newest first, at most `recipes_limit`
/// per user when given.
pub fn with_recipes(
    conn: &mut PgConnection,
    users: Vec<UserResponse>,
    recipes_limit: Option<usize>,
) -> QueryResult<Vec<UserWithRecipes>> {
    let ids: Vec<i32> = users.iter().map(|u| u.id).collect();

    let counts: HashMap<i32, i64> = recipes::table
        .filter(recipes::author_id.eq_any(&ids))
        .group_by(recipes::author_id)
        .select((recipes::author_id, count_star()))
        .load::<(i32, i64)>(conn)?
        .into_iter()
        .collect();

    let rows: Vec<Recipe> = recipes::table
        .filter(recipes::author_id.eq_any(&ids))
        .order(recipes::id.desc())
        .select(Recipe::as_select())
        .load(conn)?;

    let mut by_author: HashMap<i32, Vec<RecipeMinified>> = HashMap::new();
    for recipe in rows {
        let previews = by_author.entry(recipe.author_id).or_default();
        if recipes_limit.is_none_or(|limit| previews.len() < limit) {
            previews.push(RecipeMinified::from(recipe));
        }
    }

    Ok(users
        .into_iter()
        .map(|user| UserWithRecipes {
            recipes: by_author.remove(&user.id).unwrap_or_default(),
            recipes_count: counts.get(&user.id).copied().unwrap_or(0),
            user,
        })
        .collect())
}
