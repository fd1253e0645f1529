use axum::{
    extract::State,
    response::Redirect,
    routing::post,
    Form, Router,
};
use chrono::Utc;
use garde::Validate;

use crate::{auth::AuthExtractor, posts::PostId, views::post_detail_url, AppState};

use super::{
    models::{CommentForm, NewComment},
    CommentsError,
};

pub fn comments_router() -> Router<AppState> {
    Router::new().route("/posts/:post_id/comment/", post(add_comment))
}

/// Comment on a post
///
/// Blank comments are dropped without an error; the caller always lands back
/// on the post.
#[utoipa::path(
    post,
    path = "/posts/{post_id}/comment/",
    params(("post_id" = i64, Path, description = "Post id")),
    request_body(content = CommentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = StatusCode::SEE_OTHER, description = "Redirects to the post"),
        (status = StatusCode::NOT_FOUND, description = "Post not found", body = ErrorResponse),
    ),
    security(("session" = [])),
    tag = "Posts"
)]
pub async fn add_comment(
    PostId(post_id): PostId,
    auth: AuthExtractor,
    State(state): State<AppState>,
    Form(form): Form<CommentForm>,
) -> Result<Redirect, CommentsError> {
    let post = state
        .store
        .get_post(post_id)
        .await?
        .ok_or(CommentsError::PostNotFound)?;

    let form = CommentForm {
        text: form.text.trim().to_owned(),
    };

    if let Err(e) = form.validate(&()) {
        tracing::debug!("comment on post {} dropped: {e}", post.id);
        return Ok(Redirect::to(&post_detail_url(post.id)));
    }

    state
        .store
        .insert_comment(NewComment {
            text: form.text,
            created_at: Utc::now(),
            post_id: post.id,
            author_id: auth.current_user.id,
        })
        .await?;

    Ok(Redirect::to(&post_detail_url(post.id)))
}
