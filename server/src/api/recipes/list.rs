use super::details::{load_recipe_responses, RecipeResponse};
use crate::api::{PageParams, PaginationMetadata};
use crate::auth::MaybeAuthUser;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::store::PgStore;
use axum::{
    extract::{RawQuery, State},
    response::IntoResponse,
    Json,
};
use foodgram_core::{find_recipes, RecipeFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing recipes.
///
/// Documented here for OpenAPI; the handler parses the raw query string so
/// `tags` can repeat.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[allow(dead_code)]
pub struct ListRecipesParams {
    /// Only recipes by this user
    pub author: Option<i32>,
    /// `1` for recipes the caller favorited; ignored for anonymous callers
    pub is_favorited: Option<String>,
    /// `1` for recipes in the caller's shopping cart; ignored for anonymous callers
    pub is_in_shopping_cart: Option<String>,
    /// Tag slug, repeatable; matches recipes carrying any of them
    pub tags: Option<Vec<String>>,
    /// Case-insensitive substring of the recipe name
    pub search: Option<String>,
    /// Page size (default 6, max 100)
    pub limit: Option<i64>,
    /// Rows to skip (default 0)
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeResponse>,
    pub pagination: PaginationMetadata,
}

/// Split a raw query string into decoded key/value pairs.
pub(crate) fn query_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.unwrap_or("").as_bytes())
        .into_owned()
        .collect()
}

fn page_params(pairs: &[(String, String)]) -> PageParams {
    let get = |key: &str| {
        pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.trim().parse::<i64>().ok())
    };
    PageParams {
        limit: get("limit"),
        offset: get("offset"),
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Page of matching recipes, newest first", body = ListRecipesResponse)
    )
)]
pub async fn list_recipes(
    viewer: MaybeAuthUser,
    State(pool): State<Arc<DbPool>>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, ApiError> {
    let pairs = query_pairs(raw.as_deref());
    let filter = RecipeFilter::from_query_pairs(pairs.iter().map(|(k, v)| (k, v)));
    let page = page_params(&pairs).page();

    let mut conn = get_conn!(pool);

    let found = find_recipes(&mut PgStore::new(&mut conn), &viewer.viewer(), &filter, page)?;
    let recipes = load_recipe_responses(&mut conn, viewer.user_id(), &found.ids)?;

    Ok(Json(ListRecipesResponse {
        recipes,
        pagination: PaginationMetadata::new(found.total, page),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_keep_repeats() {
        let pairs = query_pairs(Some("tags=breakfast&tags=vegan&author=3"));
        assert_eq!(
            pairs,
            vec![
                ("tags".to_string(), "breakfast".to_string()),
                ("tags".to_string(), "vegan".to_string()),
                ("author".to_string(), "3".to_string()),
            ]
        );
        let filter = RecipeFilter::from_query_pairs(pairs.iter().map(|(k, v)| (k, v)));
        assert_eq!(filter.tags, vec!["breakfast", "vegan"]);
        assert_eq!(filter.author, Some(3));
    }

    #[test]
    fn test_search_from_query_string() {
        let pairs = query_pairs(Some("search=pan+cakes&tags=breakfast"));
        let filter = RecipeFilter::from_query_pairs(pairs.iter().map(|(k, v)| (k, v)));
        assert_eq!(filter.search.as_deref(), Some("pan cakes"));
        assert_eq!(filter.tags, vec!["breakfast"]);
    }

    #[test]
    fn test_query_pairs_decode() {
        let pairs = query_pairs(Some("tags=main%20course"));
        assert_eq!(pairs[0].1, "main course");
    }

    #[test]
    fn test_missing_query() {
        assert!(query_pairs(None).is_empty());
    }

    #[test]
    fn test_page_params() {
        let pairs = query_pairs(Some("limit=10&offset=20&limit=3"));
        let params = page_params(&pairs);
        assert_eq!(params.limit, Some(3));
        assert_eq!(params.offset, Some(20));

        let params = page_params(&query_pairs(Some("limit=lots")));
        assert_eq!(params.limit, None);
    }
}
