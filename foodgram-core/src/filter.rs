//! Recipe list filtering.
//!
//! A request's query string is parsed into a [`RecipeFilter`], resolved against
//! the requesting [`Viewer`] into a [`FilterScope`], and handed to the store.
//! Predicate kinds combine with AND; the slugs inside `tags` combine with OR.
//! `search` is a case-insensitive substring match on the recipe name.

use crate::error::DomainError;
use crate::store::EntityStore;
use crate::types::{RecipeId, UserId, Viewer};

pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Predicates recognized on the recipe list endpoint.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<UserId>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub tags: Vec<String>,
    pub search: Option<String>,
}

/// A [`RecipeFilter`] bound to a concrete user.
///
/// `favorited_by` and `in_cart_of` are only ever set for an authenticated
/// viewer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterScope {
    pub author: Option<UserId>,
    pub favorited_by: Option<UserId>,
    pub in_cart_of: Option<UserId>,
    pub tag_slugs: Vec<String>,
    pub name_contains: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Page {
    /// Clamp raw limit/offset parameters into a usable page.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

/// Distinct matching recipe ids, newest first, plus the unpaged total.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipePage {
    pub ids: Vec<RecipeId>,
    pub total: i64,
}

fn flag(value: &str) -> bool {
    value == "1"
}

impl RecipeFilter {
    /// Build a filter from raw `key=value` query pairs.
    ///
    /// `tags` may repeat. Unknown keys and unparseable author ids are ignored.
    pub fn from_query_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = RecipeFilter::default();

        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "author" => {
                    if let Ok(id) = value.parse::<UserId>() {
                        filter.author = Some(id);
                    }
                }
                "is_favorited" => filter.is_favorited = flag(value),
                "is_in_shopping_cart" => filter.is_in_shopping_cart = flag(value),
                "tags" => {
                    if !value.is_empty() && !filter.tags.iter().any(|t| t == value) {
                        filter.tags.push(value.to_string());
                    }
                }
                "search" => {
                    filter.search = Some(value.to_string()).filter(|term| !term.is_empty());
                }
                _ => {}
            }
        }

        filter
    }

    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && !self.is_favorited
            && !self.is_in_shopping_cart
            && self.tags.is_empty()
            && self.search.is_none()
    }

    /// Resolve the filter for `viewer`.
    ///
    /// Favorite and cart predicates mean nothing without an identity, so an
    /// anonymous viewer gets them dropped instead of an error.
    pub fn scope(&self, viewer: &Viewer) -> FilterScope {
        let user_id = viewer.user_id();

        FilterScope {
            author: self.author,
            favorited_by: user_id.filter(|_| self.is_favorited),
            in_cart_of: user_id.filter(|_| self.is_in_shopping_cart),
            tag_slugs: self.tags.clone(),
            name_contains: self.search.clone(),
        }
    }
}

impl FilterScope {
    /// Whether a recipe with these attributes passes every predicate.
    ///
    /// Used by in-memory stores; SQL stores express the same predicates as
    /// joins.
    pub fn matches(
        &self,
        author_id: UserId,
        name: &str,
        favorited: bool,
        in_cart: bool,
        tag_slugs: &[String],
    ) -> bool {
        if self.author.is_some_and(|author| author != author_id) {
            return false;
        }
        if self.favorited_by.is_some() && !favorited {
            return false;
        }
        if self.in_cart_of.is_some() && !in_cart {
            return false;
        }
        if !self.tag_slugs.is_empty() && !tag_slugs.iter().any(|slug| self.tag_slugs.contains(slug)) {
            return false;
        }
        if let Some(term) = &self.name_contains {
            if !name.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Narrow the recipe collection for `viewer` according to `filter`.
pub fn find_recipes<S: EntityStore + ?Sized>(
    store: &mut S,
    viewer: &Viewer,
    filter: &RecipeFilter,
    page: Page,
) -> Result<RecipePage, DomainError> {
    let scope = filter.scope(viewer);

    tracing::debug!(
        author = ?scope.author,
        favorited_by = ?scope.favorited_by,
        in_cart_of = ?scope.in_cart_of,
        tags = ?scope.tag_slugs,
        search = ?scope.name_contains,
        limit = page.limit,
        offset = page.offset,
        "filtering recipes"
    );

    Ok(store.find_recipes(&scope, page)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> RecipeFilter {
        RecipeFilter::from_query_pairs(raw.iter().copied())
    }

    #[test]
    fn test_parse_empty() {
        let filter = pairs(&[]);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_parse_author() {
        assert_eq!(pairs(&[("author", "7")]).author, Some(7));
        assert_eq!(pairs(&[("author", "seven")]).author, None);
    }

    #[test]
    fn test_flags_only_accept_one() {
        assert!(pairs(&[("is_favorited", "1")]).is_favorited);
        assert!(!pairs(&[("is_favorited", "true")]).is_favorited);
        assert!(!pairs(&[("is_favorited", "0")]).is_favorited);
        assert!(pairs(&[("is_in_shopping_cart", "1")]).is_in_shopping_cart);
        assert!(!pairs(&[("is_in_shopping_cart", "")]).is_in_shopping_cart);
    }

    #[test]
    fn test_repeated_tags() {
        let filter = pairs(&[("tags", "breakfast"), ("tags", "vegan"), ("tags", "breakfast")]);
        assert_eq!(filter.tags, vec!["breakfast", "vegan"]);
    }

    #[test]
    fn test_empty_tag_values_are_absent() {
        let filter = pairs(&[("tags", ""), ("tags", "  ")]);
        assert!(filter.tags.is_empty());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let filter = pairs(&[("ordering", "-id"), ("page", "2")]);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_parse_search() {
        let filter = pairs(&[("search", "  pan ")]);
        assert_eq!(filter.search.as_deref(), Some("pan"));
        assert!(!filter.is_empty());
        assert_eq!(filter.scope(&Viewer::Anonymous).name_contains.as_deref(), Some("pan"));

        assert_eq!(pairs(&[("search", "   ")]).search, None);
        assert!(pairs(&[("search", "")]).is_empty());
    }

    #[test]
    fn test_matches_name_case_insensitive_substring() {
        let scope = FilterScope {
            name_contains: Some("PAN".to_string()),
            ..Default::default()
        };
        assert!(scope.matches(1, "Pancakes", false, false, &[]));
        assert!(scope.matches(1, "Dutch pan bread", false, false, &[]));
        assert!(!scope.matches(1, "Omelette", false, false, &[]));
    }

    #[test]
    fn test_matches_search_and_tags() {
        let scope = FilterScope {
            tag_slugs: vec!["breakfast".to_string()],
            name_contains: Some("cake".to_string()),
            ..Default::default()
        };
        let breakfast = ["breakfast".to_string()];
        assert!(scope.matches(1, "Pancakes", false, false, &breakfast));
        assert!(!scope.matches(1, "Pancakes", false, false, &[]));
        assert!(!scope.matches(1, "Porridge", false, false, &breakfast));
    }

    #[test]
    fn test_anonymous_scope_drops_user_predicates() {
        let filter = pairs(&[("is_favorited", "1"), ("is_in_shopping_cart", "1"), ("author", "3")]);
        let scope = filter.scope(&Viewer::Anonymous);
        assert_eq!(scope.favorited_by, None);
        assert_eq!(scope.in_cart_of, None);
        assert_eq!(scope.author, Some(3));
    }

    #[test]
    fn test_user_scope_keeps_user_predicates() {
        let filter = pairs(&[("is_favorited", "1")]);
        let scope = filter.scope(&Viewer::User(42));
        assert_eq!(scope.favorited_by, Some(42));
        assert_eq!(scope.in_cart_of, None);
    }

    #[test]
    fn test_matches_tags_with_or_semantics() {
        let scope = FilterScope {
            tag_slugs: vec!["vegan".to_string(), "dinner".to_string()],
            ..Default::default()
        };
        assert!(scope.matches(1, "Soup", false, false, &["breakfast".to_string(), "vegan".to_string()]));
        assert!(scope.matches(1, "Soup", false, false, &["dinner".to_string()]));
        assert!(!scope.matches(1, "Soup", false, false, &["lunch".to_string()]));
        assert!(!scope.matches(1, "Soup", false, false, &[]));
    }

    #[test]
    fn test_matches_and_across_kinds() {
        let scope = FilterScope {
            author: Some(1),
            favorited_by: Some(2),
            ..Default::default()
        };
        assert!(scope.matches(1, "Soup", true, false, &[]));
        assert!(!scope.matches(1, "Soup", false, false, &[]));
        assert!(!scope.matches(3, "Soup", true, false, &[]));
    }

    #[test]
    fn test_page_clamping() {
        assert_eq!(Page::new(None, None), Page::default());
        assert_eq!(Page::new(Some(0), Some(-5)), Page { limit: 1, offset: 0 });
        assert_eq!(Page::new(Some(10_000), Some(12)).limit, MAX_PAGE_SIZE);
    }
}
