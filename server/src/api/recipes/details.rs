//! Recipe response shapes and the batched lookups behind them.
//!
//! Every loader takes the ids to render and returns responses in that same
//! order, so list handlers can keep the order the filter produced.

use crate::api::tags::TagResponse;
use crate::api::users::details::{user_responses, UserResponse};
use crate::models::{Recipe, Tag, User};
use crate::schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_cart_entries, tags,
    users,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

/// Short recipe card used in marker responses and subscription previews.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeMinified {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<Recipe> for RecipeMinified {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeIngredientResponse {
    /// Ingredient ID
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    #[schema(value_type = String, example = "200.00")]
    pub amount: BigDecimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    /// Minutes
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
}

type IngredientRow = (i32, i32, String, String, BigDecimal);

fn marked_by(
    conn: &mut PgConnection,
    viewer: Option<i32>,
    ids: &[i32],
    cart: bool,
) -> QueryResult<HashSet<i32>> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };

    let rows: Vec<i32> = if cart {
        shopping_cart_entries::table
            .filter(shopping_cart_entries::user_id.eq(viewer))
            .filter(shopping_cart_entries::recipe_id.eq_any(ids))
            .select(shopping_cart_entries::recipe_id)
            .load(conn)?
    } else {
        favorites::table
            .filter(favorites::user_id.eq(viewer))
            .filter(favorites::recipe_id.eq_any(ids))
            .select(favorites::recipe_id)
            .load(conn)?
    };

    Ok(rows.into_iter().collect())
}

/// Render full recipe responses for `ids` as seen by `viewer`.
///
/// Ids with no recipe behind them are skipped.
pub fn load_recipe_responses(
    conn: &mut PgConnection,
    viewer: Option<i32>,
    ids: &[i32],
) -> QueryResult<Vec<RecipeResponse>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut rows: HashMap<i32, Recipe> = recipes::table
        .filter(recipes::id.eq_any(ids))
        .select(Recipe::as_select())
        .load::<Recipe>(conn)?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();

    let mut tags_by_recipe: HashMap<i32, Vec<TagResponse>> = HashMap::new();
    let tag_rows: Vec<(i32, Tag)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(ids))
        .order(tags::id.asc())
        .select((recipe_tags::recipe_id, Tag::as_select()))
        .load(conn)?;
    for (recipe_id, tag) in tag_rows {
        tags_by_recipe.entry(recipe_id).or_default().push(tag.into());
    }

    let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredientResponse>> = HashMap::new();
    let ingredient_rows: Vec<IngredientRow> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(ids))
        .order(recipe_ingredients::id.asc())
        .select((
            recipe_ingredients::recipe_id,
            ingredients::id,
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(conn)?;
    for (recipe_id, id, name, measurement_unit, amount) in ingredient_rows {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(RecipeIngredientResponse {
                id,
                name,
                measurement_unit,
                amount,
            });
    }

    let author_ids: Vec<i32> = rows.values().map(|r| r.author_id).collect();
    let authors: Vec<User> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(User::as_select())
        .load(conn)?;
    let authors: HashMap<i32, UserResponse> = user_responses(conn, viewer, &authors)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let favorited = marked_by(conn, viewer, ids, false)?;
    let in_cart = marked_by(conn, viewer, ids, true)?;

    let mut responses = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(recipe) = rows.remove(id) else {
            continue;
        };
        let Some(author) = authors.get(&recipe.author_id).cloned() else {
            continue;
        };

        responses.push(RecipeResponse {
            id: recipe.id,
            tags: tags_by_recipe.remove(id).unwrap_or_default(),
            author,
            ingredients: ingredients_by_recipe.remove(id).unwrap_or_default(),
            is_favorited: favorited.contains(id),
            is_in_shopping_cart: in_cart.contains(id),
            name: recipe.name,
            image: recipe.image,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
            created_at: recipe.created_at,
        });
    }

    Ok(responses)
}

/// Full response for a single recipe, or `None` if it doesn't exist.
pub fn load_recipe_response(
    conn: &mut PgConnection,
    viewer: Option<i32>,
    id: i32,
) -> QueryResult<Option<RecipeResponse>> {
    Ok(load_recipe_responses(conn, viewer, &[id])?.pop())
}

pub fn load_minified(conn: &mut PgConnection, id: i32) -> QueryResult<Option<RecipeMinified>> {
    Ok(recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first::<Recipe>(conn)
        .optional()?
        .map(RecipeMinified::from))
}
