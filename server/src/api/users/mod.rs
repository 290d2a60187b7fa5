pub mod details;
pub mod get;
pub mod list;
pub mod signup;
pub mod subscribe;
pub mod subscriptions;
pub mod update;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/users endpoints (mounted at /api/users)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_users).post(signup::signup))
        .route("/me", get(get::me).patch(update::update_me))
        .route("/subscriptions", get(subscriptions::list_subscriptions))
        .route("/{id}", get(get::get_user))
        .route(
            "/{id}/subscribe",
            post(subscribe::subscribe).delete(subscribe::unsubscribe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        signup::signup,
        list::list_users,
        get::get_user,
        get::me,
        update::update_me,
        subscribe::subscribe,
        subscribe::unsubscribe,
        subscriptions::list_subscriptions,
    ),
    components(schemas(
        details::UserResponse,
        details::UserWithRecipes,
        signup::SignupRequest,
        list::ListUsersResponse,
        update::UpdateMeRequest,
        subscriptions::SubscriptionsResponse,
    ))
)]
pub struct ApiDoc;
