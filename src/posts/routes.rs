use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};

use crate::{
    auth::AuthExtractor,
    common::forms::FormErrors,
    paginator::PageParams,
    store::PostFilter,
    views::{post_detail_url, profile_url, View},
    AppState,
};

use super::{
    comments::routes::comments_router,
    forms::PostForm,
    models::{IndexContext, PostCard, PostDetailContext, PostFormContext},
    paginate_posts, PostId, PostsError,
};

const INDEX_TEMPLATE: &str = "posts/index.html";
const DETAIL_TEMPLATE: &str = "posts/post_detail.html";
const FORM_TEMPLATE: &str = "posts/create_post.html";

pub fn posts_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/create/", get(create_post_form).post(create_post))
        .route("/posts/:post_id/", get(post_detail))
        .route("/posts/:post_id/edit/", get(edit_post_form).post(edit_post))
        .merge(comments_router())
}

async fn post_form_view(
    state: &AppState,
    form: PostForm,
    errors: FormErrors,
    post: Option<PostCard>,
) -> Result<View<PostFormContext>, PostsError> {
    let groups = state.store.list_groups().await?;

    Ok(View::new(
        FORM_TEMPLATE,
        PostFormContext {
            form,
            errors,
            groups,
            is_edit: post.is_some(),
            post,
        },
    ))
}

/// Home page
#[utoipa::path(
    get,
    path = "/",
    params(PageParams),
    responses(
        (status = 200, description = "Latest posts, one page of them plus the full list"),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Something went wrong", body = ErrorResponse),
    ),
    tag = "Posts"
)]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<View<IndexContext>, PostsError> {
    let page_obj = paginate_posts(
        state.store.as_ref(),
        PostFilter::All,
        state.config.page_size,
        params.page.as_deref(),
    )
    .await?;

    let posts_list = state.store.list_posts(PostFilter::All, None).await?;

    Ok(View::new(
        INDEX_TEMPLATE,
        IndexContext {
            page_obj,
            posts_list,
        },
    ))
}

/// Single post with its comments
#[utoipa::path(
    get,
    path = "/posts/{post_id}/",
    params(("post_id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post, author and comments"),
        (status = StatusCode::NOT_FOUND, description = "Post not found", body = ErrorResponse),
    ),
    tag = "Posts"
)]
pub async fn post_detail(
    PostId(post_id): PostId,
    State(state): State<AppState>,
) -> Result<View<PostDetailContext>, PostsError> {
    let post = state
        .store
        .get_post(post_id)
        .await?
        .ok_or(PostsError::PostNotFound)?;

    let author_posts = state
        .store
        .count_posts(PostFilter::Author(post.author.id))
        .await?;

    let comments = state.store.list_comments(post.id).await?;

    Ok(View::new(
        DETAIL_TEMPLATE,
        PostDetailContext {
            post_title: post.title(state.config.title_length),
            author: post.author.clone(),
            author_posts,
            pub_date: post.created_at,
            comments,
            post,
        },
    ))
}

/// Empty post form
#[utoipa::path(
    get,
    path = "/create/",
    responses(
        (status = 200, description = "Blank form with the selectable groups"),
        (status = StatusCode::SEE_OTHER, description = "Caller is not logged in"),
    ),
    security(("session" = [])),
    tag = "Posts"
)]
pub async fn create_post_form(
    _auth: AuthExtractor,
    State(state): State<AppState>,
) -> Result<View<PostFormContext>, PostsError> {
    post_form_view(&state, PostForm::default(), FormErrors::default(), None).await
}

/// Create Post
#[utoipa::path(
    post,
    path = "/create/",
    request_body(content = PostForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = StatusCode::SEE_OTHER, description = "Created, redirects to the author's profile"),
        (status = 200, description = "Invalid submission, form shown again with field errors"),
    ),
    security(("session" = [])),
    tag = "Posts"
)]
pub async fn create_post(
    auth: AuthExtractor,
    State(state): State<AppState>,
    Form(form): Form<PostForm>,
) -> Result<Response, PostsError> {
    let cleaned = match form.bind(state.store.as_ref()).await? {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            return Ok(post_form_view(&state, form, errors, None)
                .await?
                .into_response())
        }
    };

    let post = cleaned
        .into_draft()
        .author_id(auth.current_user.id)
        .build()?;

    let post = state.store.insert_post(post).await?;
    tracing::debug!("post {} created by {}", post.id, auth.current_user.username);

    Ok(Redirect::to(&profile_url(&auth.current_user.username)).into_response())
}

/// Post form filled with the current values
#[utoipa::path(
    get,
    path = "/posts/{post_id}/edit/",
    params(("post_id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Form filled with the post"),
        (status = StatusCode::SEE_OTHER, description = "Caller is not the author, or not logged in"),
        (status = StatusCode::NOT_FOUND, description = "Post not found", body = ErrorResponse),
    ),
    security(("session" = [])),
    tag = "Posts"
)]
pub async fn edit_post_form(
    PostId(post_id): PostId,
    auth: AuthExtractor,
    State(state): State<AppState>,
) -> Result<Response, PostsError> {
    let post = state
        .store
        .get_post(post_id)
        .await?
        .ok_or(PostsError::PostNotFound)?;

    if !auth.owns(&post) {
        return Ok(Redirect::to(&post_detail_url(post.id)).into_response());
    }

    let form = PostForm::initial(&post.text, post.group.as_ref().map(|group| group.id));

    Ok(post_form_view(&state, form, FormErrors::default(), Some(post))
        .await?
        .into_response())
}

/// Edit Post
#[utoipa::path(
    post,
    path = "/posts/{post_id}/edit/",
    params(("post_id" = i64, Path, description = "Post id")),
    request_body(content = PostForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = StatusCode::SEE_OTHER, description = "Saved (or caller is not the author), redirects to the post"),
        (status = 200, description = "Invalid submission, form shown again with field errors"),
        (status = StatusCode::NOT_FOUND, description = "Post not found", body = ErrorResponse),
    ),
    security(("session" = [])),
    tag = "Posts"
)]
pub async fn edit_post(
    PostId(post_id): PostId,
    auth: AuthExtractor,
    State(state): State<AppState>,
    Form(form): Form<PostForm>,
) -> Result<Response, PostsError> {
    let post = state
        .store
        .get_post(post_id)
        .await?
        .ok_or(PostsError::PostNotFound)?;

    if !auth.owns(&post) {
        tracing::debug!(
            "{} tried to edit post {} of {}",
            auth.current_user.username,
            post.id,
            post.author.username
        );
        return Ok(Redirect::to(&post_detail_url(post.id)).into_response());
    }

    let cleaned = match form.bind(state.store.as_ref()).await? {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            return Ok(post_form_view(&state, form, errors, Some(post))
                .await?
                .into_response())
        }
    };

    state
        .store
        .update_post(post.id, cleaned.into_changes())
        .await?;

    Ok(Redirect::to(&post_detail_url(post.id)).into_response())
}
