use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::{Duration, Utc};
use garde::Validate;
use serde::Deserialize;
use tower_cookies::Cookies;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    paginator::PageParams,
    posts::paginate_posts,
    sessions::{models::CreateSession, removal_cookie, session_cookie, UserSession},
    store::{PostFilter, StoreError},
    views::View,
    AppState,
};

use super::{
    hash_password,
    models::{LoginContext, LoginForm, NewUser, ProfileContext, SignupForm},
    verify_password, UsersError,
};

const LOGIN_TEMPLATE: &str = "users/login.html";
const BAD_CREDENTIALS: &str = "Please enter a correct username and password.";

pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/profile/:username/", get(profile))
        .route("/auth/signup/", post(signup))
        .route("/auth/login/", get(login_form).post(login))
        .route("/auth/logout/", post(logout))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginParams {
    /// Where to go after logging in
    #[serde(default)]
    pub next: Option<String>,
}

/// Only local absolute paths that fit in a `Location` header are followed
/// after login.
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(next)
            if next.starts_with('/')
                && !next.starts_with("//")
                && !next.contains('\\')
                && !next.chars().any(char::is_control)
                && HeaderValue::try_from(next).is_ok() =>
        {
            next.to_owned()
        }
        _ => String::from("/"),
    }
}

/// Author profile
#[utoipa::path(
    get,
    path = "/profile/{username}/",
    params(
        ("username" = String, Path, description = "Author username"),
        PageParams
    ),
    responses(
        (status = 200, description = "The author, their post count and one page of their posts"),
        (status = StatusCode::NOT_FOUND, description = "User not found", body = ErrorResponse),
    ),
    tag = "Users"
)]
pub async fn profile(
    CurrentUser(current_user): CurrentUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<View<ProfileContext>, UsersError> {
    let author = state
        .store
        .find_user(&username)
        .await?
        .ok_or(UsersError::UserNotFound)?;

    let page_obj = paginate_posts(
        state.store.as_ref(),
        PostFilter::Author(author.id),
        state.config.page_size,
        params.page.as_deref(),
    )
    .await?;

    let following = match current_user {
        Some(user) => state.store.is_following(user.id, author.id).await?,
        None => false,
    };

    Ok(View::new(
        "posts/profile.html",
        ProfileContext {
            author: author.brief(),
            count: page_obj.count,
            following,
            page_obj,
        },
    ))
}

/// Sign up
#[utoipa::path(
    post,
    path = "/auth/signup/",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = StatusCode::SEE_OTHER, description = "Registered, redirects to the home page"),
        (status = StatusCode::BAD_REQUEST, description = "Invalid username or password", body = ErrorResponse),
        (status = StatusCode::CONFLICT, description = "Username taken", body = ErrorResponse),
    ),
    tag = "Users"
)]
pub async fn signup(
    State(state): State<AppState>,
    Form(payload): Form<SignupForm>,
) -> Result<Redirect, UsersError> {
    payload.validate(&())?;

    let user = NewUser {
        id: Uuid::now_v7(),
        username: payload.username,
        first_name: payload.first_name,
        last_name: payload.last_name,
        password: hash_password(&payload.password)?,
        created_at: Utc::now(),
    };

    let user = state.store.insert_user(user).await.map_err(|e| match e {
        StoreError::Conflict(_) => UsersError::UsernameTaken,
        e => UsersError::Store(e),
    })?;
    tracing::info!("new user {}", user.username);

    Ok(Redirect::to("/"))
}

/// Login page
#[utoipa::path(
    get,
    path = "/auth/login/",
    params(LoginParams),
    responses((status = 200, description = "Login form carrying the `next` destination")),
    tag = "Users"
)]
pub async fn login_form(Query(params): Query<LoginParams>) -> View<LoginContext> {
    View::new(
        LOGIN_TEMPLATE,
        LoginContext {
            next: safe_next(params.next.as_deref()),
            error: None,
        },
    )
}

/// Log in
#[utoipa::path(
    post,
    path = "/auth/login/",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = StatusCode::SEE_OTHER, description = "Logged in, session cookie set, redirects to `next`"),
        (status = StatusCode::UNAUTHORIZED, description = "Wrong username or password, login form shown again"),
    ),
    tag = "Users"
)]
pub async fn login(
    cookies: Cookies,
    State(state): State<AppState>,
    Form(payload): Form<LoginForm>,
) -> Result<Response, UsersError> {
    let next = safe_next(payload.next.as_deref());

    let user = match state.store.find_user(&payload.username).await? {
        Some(user) if verify_password(&payload.password, &user.password)? => user,
        _ => {
            tracing::debug!("failed login for {}", payload.username);
            return Ok(View::new(
                LOGIN_TEMPLATE,
                LoginContext {
                    next,
                    error: Some(String::from(BAD_CREDENTIALS)),
                },
            )
            .with_status(StatusCode::UNAUTHORIZED)
            .into_response());
        }
    };

    let session = CreateSession::new(user.id, Duration::hours(state.config.session_ttl_hours));
    let session_id = session.id;

    state.store.insert_session(session).await?;

    cookies
        .private(&state.cookie_key)
        .add(session_cookie(session_id));

    Ok(Redirect::to(&next).into_response())
}

/// Log out
#[utoipa::path(
    post,
    path = "/auth/logout/",
    responses((status = StatusCode::SEE_OTHER, description = "Session dropped, redirects to the home page")),
    tag = "Users"
)]
pub async fn logout(
    cookies: Cookies,
    session: UserSession,
    State(state): State<AppState>,
) -> Result<Redirect, UsersError> {
    if let Some(session_id) = session.session_id {
        state.store.delete_session(session_id).await?;
    }

    cookies.private(&state.cookie_key).remove(removal_cookie());

    Ok(Redirect::to("/"))
}
