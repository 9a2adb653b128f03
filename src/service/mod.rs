pub mod access_levels;
pub mod accounts;
pub mod config;
pub mod password;

use crate::repo::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    /// Deliberately the same for unknown email, missing credential and wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("failed to hash password: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Persistence(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => ServiceError::NotFound(format!("{entity} not found")),
            other => ServiceError::Persistence(other),
        }
    }
}

/// Trims `value` and enforces a 1..=max character length.
pub(crate) fn required(field: &str, value: &str, max: usize) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(ServiceError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}
