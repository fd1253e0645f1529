use axum::{http::StatusCode, response::IntoResponse};

use crate::{store::StoreError, ErrorResponse};

pub mod models;
pub mod routes;

#[derive(thiserror::Error, Debug)]
pub enum GroupsError {
    #[error("group not found")]
    GroupNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for GroupsError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("{:#?}", self);

        match self {
            GroupsError::GroupNotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: self.to_string(),
                    ..Default::default()
                },
            )
                .into_response(),
            GroupsError::Store(_) => (
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
