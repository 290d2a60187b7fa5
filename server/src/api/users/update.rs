use super::details::UserResponse;
use super::signup::{validate_password, validate_person_name};
use crate::api::ErrorResponse;
use crate::auth::{hash_password, AuthUser};
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use axum::{extract::State, response::IntoResponse, Json};
use diesel::prelude::*;
use foodgram_core::DomainError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

impl UpdateMeRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(first_name) = &self.first_name {
            validate_person_name("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            validate_person_name("last_name", last_name)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = users)]
struct UserChanges<'a> {
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    password_hash: Option<&'a str>,
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    tag = "users",
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_me(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<UpdateMeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let password_hash = match &req.password {
        Some(password) => Some(hash_password(password).map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            ApiError::internal("Failed to hash password")
        })?),
        None => None,
    };

    let changes = UserChanges {
        first_name: req.first_name.as_deref().map(str::trim),
        last_name: req.last_name.as_deref().map(str::trim),
        password_hash: password_hash.as_deref(),
    };

    if changes.first_name.is_none() && changes.last_name.is_none() && changes.password_hash.is_none() {
        return Ok(Json(UserResponse::new(&user, false)));
    }

    let mut conn = get_conn!(pool);

    let updated: User = diesel::update(users::table.find(user.id))
        .set(&changes)
        .returning(User::as_returning())
        .get_result(&mut conn)?;

    tracing::info!(user_id = user.id, "profile updated");

    Ok(Json(UserResponse::new(&updated, false)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_is_valid() {
        assert!(UpdateMeRequest::default().validate().is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let req = UpdateMeRequest {
            first_name: Some("".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_short_password_rejected() {
        let req = UpdateMeRequest {
            password: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(matches!(req.validate(), Err(DomainError::Validation(_))));
    }
}
