pub mod models;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    RequestPartsExt,
};
use chrono::{Duration, Utc};
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::{store::StoreError, AppState, ErrorResponse};

pub const SESSION_COOKIE_NAME: &str = "session_id";

pub struct UserSession {
    pub session_id: Option<Uuid>,
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("something went wrong")]
    Store(#[from] StoreError),

    #[error("invalid session")]
    InvalidSession,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("{:#?}", self);

        match self {
            SessionError::InvalidSession => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: self.to_string(),
                    ..Default::default()
                },
            )
                .into_response(),
            SessionError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR).into_response(),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserSession {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies =
            parts
                .extract::<Cookies>()
                .await
                .map_err(|(_error_status, error_message)| {
                    tracing::error!(
                        "session-extractor: failed to get private cookie jar: {error_message}"
                    );
                    SessionError::InvalidSession
                })?;

        if let Some(session_id) = cookies.private(&state.cookie_key).get(SESSION_COOKIE_NAME) {
            Ok(Self {
                session_id: Some(Uuid::parse_str(session_id.value()).map_err(|e| {
                    tracing::error!("session-extractor: invalid session_id: {e}");
                    SessionError::InvalidSession
                })?),
            })
        } else {
            Ok(Self { session_id: None })
        }
    }
}

pub fn session_cookie(session_id: Uuid) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME, session_id.to_string())
        .path("/")
        .http_only(true)
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME, "").path("/").finish()
}

pub async fn refresh_session<B>(
    session: UserSession,
    State(state): State<AppState>,
    request: Request<B>,
    next: Next<B>,
) -> Result<Response, SessionError> {
    if let Some(session_id) = session.session_id {
        tracing::debug!("refreshing session {session_id}");

        let now = Utc::now();
        let expires_at = now + Duration::hours(state.config.session_ttl_hours);
        state
            .store
            .refresh_session(session_id, now, expires_at)
            .await?;
    }

    Ok(next.run(request).await)
}
