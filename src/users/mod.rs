use argon2::Argon2;
use axum::{http::StatusCode, response::IntoResponse};
use password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::{common::forms::FormErrors, store::StoreError, ErrorResponse};

pub mod models;
pub mod routes;

#[derive(thiserror::Error, Debug)]
pub enum UsersError {
    #[error("user not found")]
    UserNotFound,

    #[error("username taken")]
    UsernameTaken,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Argon2(#[from] password_hash::Error),

    #[error("validation error: {0}")]
    Validator(#[from] garde::Errors),
}

impl IntoResponse for UsersError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("{:#?}", self);

        match self {
            UsersError::UserNotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: self.to_string(),
                    ..Default::default()
                },
            )
                .into_response(),
            UsersError::UsernameTaken | UsersError::Store(StoreError::Conflict(_)) => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: String::from("username taken"),
                    ..Default::default()
                },
            )
                .into_response(),
            UsersError::Validator(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: String::from("invalid input"),
                    details: Some(FormErrors::from(errors).details()),
                },
            )
                .into_response(),
            UsersError::Store(_) | UsersError::Argon2(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: String::from("internal server error"),
                    ..Default::default()
                },
            )
                .into_response(),
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// `false` for a wrong password; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
