use thiserror::Error;

/// Failure reported by an [`EntityStore`](crate::store::EntityStore) backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("storage error: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors surfaced by the core operations.
///
/// The variants map one-to-one onto the response classes the HTTP layer
/// distinguishes: bad input, duplicate markers, missing rows, and acting on
/// something the user does not own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        DomainError::Forbidden(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts_to_storage() {
        let err: DomainError = StoreError::new("connection reset").into();
        assert_eq!(err, DomainError::Storage(StoreError::new("connection reset")));
        assert_eq!(err.to_string(), "storage error: connection reset");
    }

    #[test]
    fn test_messages_are_passed_through() {
        assert_eq!(
            DomainError::conflict("Recipe is already in favorites").to_string(),
            "Recipe is already in favorites"
        );
    }
}
