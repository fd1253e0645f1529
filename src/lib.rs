use std::sync::Arc;

use axum::{
    extract::FromRef, middleware, response::IntoResponse, routing::get, Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::trace::TraceLayer;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

pub mod auth;
pub mod common;
pub mod config;
pub mod follows;
pub mod groups;
pub mod migrations;
pub mod paginator;
pub mod posts;
pub mod schema;
pub mod sessions;
pub mod store;
pub mod users;
pub mod views;

use config::{Config, ConfigError};
use store::DynStore;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: DynStore,
    pub config: Arc<Config>,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(store: DynStore, config: Config) -> Result<Self, ConfigError> {
        let cookie_key = config.cookie_key()?;

        Ok(Self {
            store,
            config: Arc::new(config),
            cookie_key,
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        posts::routes::index,
        posts::routes::post_detail,
        posts::routes::create_post_form,
        posts::routes::create_post,
        posts::routes::edit_post_form,
        posts::routes::edit_post,
        posts::comments::routes::add_comment,
        groups::routes::group_posts,
        users::routes::profile,
        users::routes::signup,
        users::routes::login_form,
        users::routes::login,
        users::routes::logout,
        follows::routes::follow_index,
        follows::routes::profile_follow,
        follows::routes::profile_unfollow,
    ),
    components(
        schemas(posts::models::PostCard),
        schemas(posts::forms::PostForm),
        schemas(posts::comments::models::CommentForm),
        schemas(posts::comments::models::CommentView),
        schemas(groups::models::Group),
        schemas(users::models::UserBrief),
        schemas(users::models::SignupForm),
        schemas(users::models::LoginForm),
        schemas(ErrorResponse),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Posts"),
        (name = "Groups"),
        (name = "Users"),
        (name = "Follows"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    sessions::SESSION_COOKIE_NAME,
                ))),
            )
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// The whole site: every feature router behind the session and cookie layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(posts::routes::posts_router())
        .merge(groups::routes::groups_router())
        .merge(users::routes::users_router())
        .merge(follows::routes::follows_router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            sessions::refresh_session,
        ))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
