use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect},
    RequestPartsExt,
};
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use uuid::Uuid;

use crate::{
    posts::models::PostCard,
    sessions::{SessionError, UserSession},
    store::StoreError,
    users::models::UserBrief,
    AppState,
};

/// Characters kept as-is in the `next` parameter of the login redirect.
const NEXT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Requires a live session; anonymous callers are sent to the login page.
pub struct AuthExtractor {
    pub current_user: UserBrief,
    pub session_id: Uuid,
}

impl AuthExtractor {
    /// Only the author of a post may edit it.
    pub fn owns(&self, post: &PostCard) -> bool {
        self.current_user.id == post.author.id
    }
}

/// The caller if they are logged in; never rejects an anonymous request.
pub struct CurrentUser(pub Option<UserBrief>);

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("login required")]
    LoginRequired { login_url: String, next: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AuthError::LoginRequired { login_url, next } => {
                tracing::debug!("login required for {next}");
                Redirect::to(&login_redirect(&login_url, &next)).into_response()
            }
            AuthError::Store(_) => {
                tracing::error!("{:#?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR).into_response()
            }
        }
    }
}

/// `{login_url}?next={next}` with `next` percent-encoded except for `/`.
pub fn login_redirect(login_url: &str, next: &str) -> String {
    format!(
        "{login_url}?next={}",
        utf8_percent_encode(next, NEXT_ENCODE_SET)
    )
}

fn requested_path(parts: &Parts) -> String {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&parts.uri);

    uri.path_and_query()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| String::from("/"))
}

/// Resolves the session cookie to its user, dropping the session if it is
/// no longer valid.
async fn session_user(
    parts: &mut Parts,
    state: &AppState,
) -> Result<Option<(UserBrief, Uuid)>, AuthError> {
    let session_id = match parts.extract_with_state::<UserSession, _>(state).await {
        Ok(UserSession {
            session_id: Some(session_id),
        }) => session_id,
        Ok(UserSession { session_id: None }) | Err(SessionError::InvalidSession) => {
            return Ok(None)
        }
        Err(SessionError::Store(e)) => return Err(e.into()),
    };

    let Some(user) = state.store.session_user(session_id, Utc::now()).await? else {
        tracing::debug!("auth-extractor: session {session_id} expired or unknown");
        state.store.delete_session(session_id).await?;
        return Ok(None);
    };

    Ok(Some((user, session_id)))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthExtractor {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some((current_user, session_id)) = session_user(parts, state).await? else {
            return Err(AuthError::LoginRequired {
                login_url: state.config.login_url.clone(),
                next: requested_path(parts),
            });
        };

        Ok(AuthExtractor {
            current_user,
            session_id,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(
            session_user(parts, state).await?.map(|(user, _)| user),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_redirect_keeps_slashes() {
        assert_eq!(
            login_redirect("/auth/login/", "/create/"),
            "/auth/login/?next=/create/"
        );
    }

    #[test]
    fn login_redirect_encodes_query() {
        assert_eq!(
            login_redirect("/auth/login/", "/follow/?page=2"),
            "/auth/login/?next=/follow/%3Fpage%3D2"
        );
    }

    #[test]
    fn login_required_is_a_see_other() {
        let response = AuthError::LoginRequired {
            login_url: String::from("/auth/login/"),
            next: String::from("/posts/1/edit/"),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()["location"],
            "/auth/login/?next=/posts/1/edit/"
        );
    }
}
