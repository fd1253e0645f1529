#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;
use tower_cookies::{
    cookie::{Cookie, CookieJar},
    Key,
};
use uuid::Uuid;
use yatube::{
    app,
    config::Config,
    groups::models::{Group, NewGroup},
    posts::models::{NewPost, Post},
    sessions::{models::CreateSession, SESSION_COOKIE_NAME},
    store::{DynStore, MemoryStore, PostFilter, Store},
    users::{hash_password, models::NewUser, models::UserBrief},
    AppState,
};

pub const PASSWORD: &str = "very-secret-password";

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
    key: Key,
}

impl TestApp {
    pub fn new() -> Self {
        let config = Config {
            cookie_secret: Some("k".repeat(64)),
            ..Config::default()
        };
        let key = config.cookie_key().unwrap();

        let store = Arc::new(MemoryStore::new());
        let dyn_store: DynStore = store.clone();
        let state = AppState::new(dyn_store, config).unwrap();

        Self {
            store,
            router: app(state),
            key,
        }
    }

    pub async fn user(&self, username: &str) -> UserBrief {
        self.store
            .insert_user(NewUser {
                id: Uuid::now_v7(),
                username: username.to_owned(),
                first_name: None,
                last_name: None,
                password: hash_password(PASSWORD).unwrap(),
                created_at: Utc::now(),
            })
            .await
            .unwrap()
            .brief()
    }

    /// A `Cookie` header value holding a fresh session of `user`.
    pub async fn login(&self, user: &UserBrief) -> String {
        self.session(user, Duration::hours(1)).await
    }

    pub async fn session(&self, user: &UserBrief, ttl: Duration) -> String {
        let session = CreateSession::new(user.id, ttl);
        let session_id = session.id;

        self.store.insert_session(session).await.unwrap();

        let mut jar = CookieJar::new();
        jar.private_mut(&self.key)
            .add(Cookie::new(SESSION_COOKIE_NAME, session_id.to_string()));
        let cookie = jar.get(SESSION_COOKIE_NAME).unwrap();

        format!("{}={}", cookie.name(), cookie.value())
    }

    pub async fn group(&self, slug: &str) -> Group {
        self.store
            .insert_group(NewGroup {
                title: format!("Group {slug}"),
                slug: slug.to_owned(),
                description: format!("About {slug}"),
            })
            .await
            .unwrap()
    }

    /// Stores `count` posts, the first one being the newest.
    pub async fn posts(
        &self,
        author: &UserBrief,
        group: Option<&Group>,
        count: usize,
    ) -> Vec<Post> {
        let now = Utc::now();
        let mut posts = Vec::with_capacity(count);

        for i in 0..count {
            let post = NewPost::builder()
                .text(format!("Post number {i} by {}", author.username))
                .author_id(author.id)
                .group_id(group.map(|group| group.id))
                .created_at(now - Duration::minutes(i as i64))
                .build()
                .unwrap();

            posts.push(self.store.insert_post(post).await.unwrap());
        }

        posts
    }

    pub async fn post(&self, author: &UserBrief, text: &str, group: Option<&Group>) -> Post {
        let post = NewPost::builder()
            .text(text.to_owned())
            .author_id(author.id)
            .group_id(group.map(|group| group.id))
            .build()
            .unwrap();

        self.store.insert_post(post).await.unwrap()
    }

    pub async fn post_count(&self) -> i64 {
        self.store.count_posts(PostFilter::All).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<axum::body::BoxBody> {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }

        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(
        &self,
        uri: &str,
        body: &str,
        cookie: Option<&str>,
    ) -> Response<axum::body::BoxBody> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }

        self.router
            .clone()
            .oneshot(request.body(Body::from(body.to_owned())).unwrap())
            .await
            .unwrap()
    }
}

pub async fn json(response: Response<axum::body::BoxBody>) -> Value {
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn location(response: &Response<axum::body::BoxBody>) -> &str {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub fn object_list(view: &Value) -> &Vec<Value> {
    view["context"]["page_obj"]["object_list"].as_array().unwrap()
}
