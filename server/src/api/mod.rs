pub mod auth;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{IntoParams, OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// `limit`/`offset` query parameters shared by list endpoints
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page size (default 6, max 100)
    pub limit: Option<i64>,
    /// Rows to skip (default 0)
    pub offset: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> foodgram_core::Page {
        foodgram_core::Page::new(self.limit, self.offset)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMetadata {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PaginationMetadata {
    pub fn new(total: i64, page: foodgram_core::Page) -> Self {
        Self {
            total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Base spec with shared components and security
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Foodgram", description = "Recipes, favorites, shopping carts and subscriptions"),
        components(schemas(ErrorResponse, PaginationMetadata))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    // Add security scheme
    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    // Merge in each module's spec
    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        auth::ApiDoc::openapi(),
        users::ApiDoc::openapi(),
        tags::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        // Merge paths
        spec.paths.paths.extend(module_spec.paths.paths);

        // Merge components (schemas)
        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_has_every_module() {
        let spec = openapi();
        for path in [
            "/api/auth/token/login",
            "/api/users",
            "/api/users/{id}/subscribe",
            "/api/tags",
            "/api/ingredients",
            "/api/recipes",
            "/api/recipes/{id}/favorite",
            "/api/recipes/download_shopping_cart",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_page_params_clamp() {
        let params = PageParams {
            limit: Some(1000),
            offset: Some(-1),
        };
        let page = params.page();
        assert_eq!(page.limit, foodgram_core::filter::MAX_PAGE_SIZE);
        assert_eq!(page.offset, 0);
    }
}
