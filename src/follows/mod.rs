use axum::{http::StatusCode, response::IntoResponse};

use crate::{store::StoreError, ErrorResponse};

pub mod models;
pub mod routes;

#[derive(thiserror::Error, Debug)]
pub enum FollowsError {
    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for FollowsError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("{:#?}", self);

        match self {
            FollowsError::UserNotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: self.to_string(),
                    ..Default::default()
                },
            )
                .into_response(),
            FollowsError::Store(_) => (
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
