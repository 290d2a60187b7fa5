use super::details::UserResponse;
use crate::api::ErrorResponse;
use crate::auth::hash_password;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::models::{NewUser, User};
use crate::schema::users;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use foodgram_core::DomainError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_NAME_LEN: usize = 150;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

pub(crate) fn validate_email(email: &str) -> Result<(), DomainError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(DomainError::validation("Enter a valid email address"));
    }
    Ok(())
}

/// Letters, digits and `@ . + - _`; "me" is reserved for the current-user route.
pub(crate) fn validate_username(username: &str) -> Result<(), DomainError> {
    if username.is_empty() || username.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "username must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    if username == "me" {
        return Err(DomainError::validation("username \"me\" is reserved"));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(DomainError::validation(
            "username may only contain letters, digits and @/./+/-/_",
        ));
    }
    Ok(())
}

pub(crate) fn validate_person_name(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() || value.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "{field} must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < 8 {
        return Err(DomainError::validation(
            "password must be at least 8 characters",
        ));
    }
    Ok(())
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_email(&self.email)?;
        validate_username(&self.username)?;
        validate_person_name("first_name", &self.first_name)?;
        validate_person_name("last_name", &self.last_name)?;
        validate_password(&self.password)
    }
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body(content = SignupRequest, example = json!({
        "email": "cook@example.com",
        "username": "cook",
        "first_name": "Julia",
        "last_name": "Child",
        "password": "password"
    })),
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let mut conn = get_conn!(pool);

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to hash password")
    })?;

    let email = req.email.trim().to_lowercase();
    let new_user = NewUser {
        email: &email,
        username: &req.username,
        first_name: req.first_name.trim(),
        last_name: req.last_name.trim(),
        password_hash: &password_hash,
    };

    let user: User = match diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(&mut conn)
    {
        Ok(u) => u,
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(ApiError::conflict(
                "A user with that email or username already exists",
            ))
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = user.id, username = %user.username, "user signed up");

    Ok((StatusCode::CREATED, Json(UserResponse::new(&user, false))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SignupRequest {
        SignupRequest {
            email: "cook@example.com".to_string(),
            username: "cook".to_string(),
            first_name: "Julia".to_string(),
            last_name: "Child".to_string(),
            password: "longenough".to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_bad_email() {
        for email in ["", "cook", "cook@", "@example.com", "cook@example", "co ok@example.com"] {
            let req = SignupRequest {
                email: email.to_string(),
                ..request()
            };
            assert!(req.validate().is_err(), "accepted {email:?}");
        }
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("chef.julia+1@home").is_ok());
        assert!(validate_username("me").is_err());
        assert!(validate_username("no spaces").is_err());
        assert!(validate_username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn test_names_required() {
        let req = SignupRequest {
            last_name: "   ".to_string(),
            ..request()
        };
        assert_eq!(
            req.validate(),
            Err(DomainError::validation("last_name must be 1 to 150 characters"))
        );
    }

    #[test]
    fn test_short_password() {
        let req = SignupRequest {
            password: "short".to_string(),
            ..request()
        };
        assert!(matches!(req.validate(), Err(DomainError::Validation(_))));
    }
}
