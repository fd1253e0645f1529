use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    RequestPartsExt,
};

use crate::{
    paginator::{Page, Paginator},
    store::{PostFilter, Store, StoreError, StoreResult},
    ErrorResponse,
};

use self::models::{NewPostBuilderError, PostCard};

pub mod comments;
pub mod forms;
pub mod models;
pub mod routes;

#[derive(thiserror::Error, Debug)]
pub enum PostsError {
    #[error("post not found")]
    PostNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("incomplete post: {0}")]
    Builder(#[from] NewPostBuilderError),
}

impl IntoResponse for PostsError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("{:#?}", self);

        match self {
            PostsError::PostNotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: self.to_string(),
                    ..Default::default()
                },
            )
                .into_response(),
            PostsError::Store(_) | PostsError::Builder(_) => (
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

/// The `:post_id` path segment. Anything but a plain decimal number that fits
/// an id is an unknown post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostId(pub i64);

impl PostId {
    fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        raw.parse().ok().map(PostId)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PostId {
    type Rejection = PostsError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = parts.extract::<Path<String>>().await.map_err(|e| {
            tracing::debug!("post-id-extractor: {e}");
            PostsError::PostNotFound
        })?;

        PostId::parse(&raw).ok_or(PostsError::PostNotFound)
    }
}

/// One page of the posts matching `filter`, newest first.
pub async fn paginate_posts(
    store: &dyn Store,
    filter: PostFilter,
    per_page: i64,
    raw_page: Option<&str>,
) -> StoreResult<Page<PostCard>> {
    let paginator = Paginator::new(store.count_posts(filter).await?, per_page);
    let number = paginator.page_number(raw_page);

    let posts = store
        .list_posts(filter, Some(paginator.window(number)))
        .await?;

    Ok(paginator.page(number, posts))
}
