//! The data store behind every handler.
//!
//! [`PgStore`] is the production backend (diesel-async over a deadpool pool);
//! [`MemoryStore`] keeps the same semantics in process and backs the test suite
//! and database-less runs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    groups::models::{Group, NewGroup},
    paginator::Window,
    posts::{
        comments::models::{CommentView, NewComment},
        models::{NewPost, Post, PostCard, PostChanges},
    },
    sessions::models::CreateSession,
    users::models::{NewUser, User, UserBrief},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type DynStore = Arc<dyn Store>;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),

    #[error(transparent)]
    PoolError(#[from] diesel_async::pooled_connection::deadpool::PoolError),

    #[error(transparent)]
    PoolBuild(#[from] diesel_async::pooled_connection::deadpool::BuildError),

    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("migration failed: {0}")]
    Migration(String),
}

/// Which posts a listing covers. Every listing is ordered newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(Uuid),
    /// Posts by every author the user follows.
    FollowedBy(Uuid),
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user(&self, username: &str) -> StoreResult<Option<User>>;

    async fn insert_group(&self, group: NewGroup) -> StoreResult<Group>;

    /// All groups, by title.
    async fn list_groups(&self) -> StoreResult<Vec<Group>>;

    async fn find_group(&self, slug: &str) -> StoreResult<Option<Group>>;

    async fn get_group(&self, id: i64) -> StoreResult<Option<Group>>;

    async fn count_posts(&self, filter: PostFilter) -> StoreResult<i64>;

    /// Posts matching `filter`; the whole set when `window` is `None`.
    async fn list_posts(
        &self,
        filter: PostFilter,
        window: Option<Window>,
    ) -> StoreResult<Vec<PostCard>>;

    async fn get_post(&self, id: i64) -> StoreResult<Option<PostCard>>;

    async fn insert_post(&self, post: NewPost) -> StoreResult<Post>;

    async fn update_post(&self, id: i64, changes: PostChanges) -> StoreResult<()>;

    /// Comments of a post, oldest first.
    async fn list_comments(&self, post_id: i64) -> StoreResult<Vec<CommentView>>;

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<()>;

    async fn insert_follow(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<()>;

    /// Removes every `user_id -> author_id` edge, returns how many were removed.
    async fn delete_follows(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<usize>;

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<bool>;

    async fn insert_session(&self, session: CreateSession) -> StoreResult<()>;

    /// Owner of the session if it has not expired at `now`.
    async fn session_user(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<UserBrief>>;

    /// Moves the expiry of a session that is still live at `now`.
    async fn refresh_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    async fn delete_session(&self, session_id: Uuid) -> StoreResult<()>;
}
