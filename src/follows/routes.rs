use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
    Router,
};

use crate::{
    auth::AuthExtractor,
    paginator::PageParams,
    posts::paginate_posts,
    store::PostFilter,
    views::{profile_url, View},
    AppState,
};

use super::{models::FollowContext, FollowsError};

pub fn follows_router() -> Router<AppState> {
    Router::new()
        .route("/follow/", get(follow_index))
        .route("/profile/:username/follow/", post(profile_follow))
        .route("/profile/:username/unfollow/", post(profile_unfollow))
}

/// Feed of followed authors
#[utoipa::path(
    get,
    path = "/follow/",
    params(PageParams),
    responses(
        (status = 200, description = "One page of posts by the authors the caller follows"),
        (status = StatusCode::SEE_OTHER, description = "Caller is not logged in"),
    ),
    security(("session" = [])),
    tag = "Follows"
)]
pub async fn follow_index(
    auth: AuthExtractor,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<View<FollowContext>, FollowsError> {
    let page_obj = paginate_posts(
        state.store.as_ref(),
        PostFilter::FollowedBy(auth.current_user.id),
        state.config.page_size,
        params.page.as_deref(),
    )
    .await?;

    Ok(View::new("posts/follow.html", FollowContext { page_obj }))
}

/// Follow an author
#[utoipa::path(
    post,
    path = "/profile/{username}/follow/",
    params(("username" = String, Path, description = "Author to follow")),
    responses(
        (status = StatusCode::SEE_OTHER, description = "Redirects to the author's profile"),
        (status = StatusCode::NOT_FOUND, description = "User not found", body = ErrorResponse),
    ),
    security(("session" = [])),
    tag = "Follows"
)]
pub async fn profile_follow(
    auth: AuthExtractor,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Redirect, FollowsError> {
    let author = state
        .store
        .find_user(&username)
        .await?
        .ok_or(FollowsError::UserNotFound)?;

    if author.id != auth.current_user.id {
        state
            .store
            .insert_follow(auth.current_user.id, author.id)
            .await?;
        tracing::debug!("{} follows {}", auth.current_user.username, author.username);
    }

    Ok(Redirect::to(&profile_url(&author.username)))
}

/// Unfollow an author
#[utoipa::path(
    post,
    path = "/profile/{username}/unfollow/",
    params(("username" = String, Path, description = "Author to unfollow")),
    responses(
        (status = StatusCode::SEE_OTHER, description = "Redirects to the author's profile"),
        (status = StatusCode::NOT_FOUND, description = "User not found", body = ErrorResponse),
    ),
    security(("session" = [])),
    tag = "Follows"
)]
pub async fn profile_unfollow(
    auth: AuthExtractor,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Redirect, FollowsError> {
    let author = state
        .store
        .find_user(&username)
        .await?
        .ok_or(FollowsError::UserNotFound)?;

    let removed = state
        .store
        .delete_follows(auth.current_user.id, author.id)
        .await?;
    tracing::debug!(
        "{} unfollowed {} ({removed} edges)",
        auth.current_user.username,
        author.username
    );

    Ok(Redirect::to(&profile_url(&author.username)))
}
