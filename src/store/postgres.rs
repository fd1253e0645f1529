use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{
    result::{DatabaseErrorKind, Error::DatabaseError},
    ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper,
};
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
    AsyncPgConnection, RunQueryDsl,
};
use uuid::Uuid;

use crate::{
    follows::models::NewFollow,
    groups::models::{Group, NewGroup},
    paginator::Window,
    posts::{
        comments::models::{Comment, CommentView, NewComment},
        models::{NewPost, Post, PostCard, PostChanges},
    },
    schema::{comments, follows, groups, posts, sessions, users},
    sessions::models::CreateSession,
    users::models::{NewUser, User, UserBrief},
};

use super::{PostFilter, Store, StoreError, StoreResult};

/// Narrows a boxed `posts` query to the rows a [`PostFilter`] covers.
macro_rules! filter_posts {
    ($query:expr, $filter:expr) => {
        match $filter {
            PostFilter::All => $query,
            PostFilter::Group(group_id) => $query.filter(posts::group_id.eq(group_id)),
            PostFilter::Author(author_id) => $query.filter(posts::author_id.eq(author_id)),
            PostFilter::FollowedBy(user_id) => $query.filter(
                posts::author_id.eq_any(
                    follows::table
                        .filter(follows::user_id.eq(user_id))
                        .select(follows::author_id),
                ),
            ),
        }
    };
}

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<AsyncPgConnection>,
}

impl PgStore {
    pub fn new(database_url: &str, max_connections: usize) -> StoreResult<Self> {
        let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = Pool::builder(config).max_size(max_connections).build()?;

        Ok(Self { pool })
    }
}

fn unique_violation(error: diesel::result::Error, constraint: &str, what: &'static str) -> StoreError {
    if let DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) = error {
        if info.constraint_name() == Some(constraint) {
            return StoreError::Conflict(what);
        }
    }
    StoreError::Diesel(error)
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut db = self.pool.get().await?;

        diesel::insert_into(users::table)
            .values(&user)
            .returning(User::as_returning())
            .get_result::<User>(&mut db)
            .await
            .map_err(|e| unique_violation(e, "users_username_key", "username"))
    }

    async fn find_user(&self, username: &str) -> StoreResult<Option<User>> {
        let mut db = self.pool.get().await?;

        Ok(users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first::<User>(&mut db)
            .await
            .optional()?)
    }

    async fn insert_group(&self, group: NewGroup) -> StoreResult<Group> {
        let mut db = self.pool.get().await?;

        diesel::insert_into(groups::table)
            .values(&group)
            .returning(Group::as_returning())
            .get_result::<Group>(&mut db)
            .await
            .map_err(|e| unique_violation(e, "groups_slug_key", "group slug"))
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        let mut db = self.pool.get().await?;

        Ok(groups::table
            .order((groups::title.asc(), groups::id.asc()))
            .select(Group::as_select())
            .load::<Group>(&mut db)
            .await?)
    }

    async fn find_group(&self, slug: &str) -> StoreResult<Option<Group>> {
        let mut db = self.pool.get().await?;

        Ok(groups::table
            .filter(groups::slug.eq(slug))
            .select(Group::as_select())
            .first::<Group>(&mut db)
            .await
            .optional()?)
    }

    async fn get_group(&self, id: i64) -> StoreResult<Option<Group>> {
        let mut db = self.pool.get().await?;

        Ok(groups::table
            .find(id)
            .select(Group::as_select())
            .first::<Group>(&mut db)
            .await
            .optional()?)
    }

    async fn count_posts(&self, filter: PostFilter) -> StoreResult<i64> {
        let mut db = self.pool.get().await?;

        let query = posts::table
            .select(diesel::dsl::count_star())
            .into_boxed();

        Ok(filter_posts!(query, filter)
            .get_result::<i64>(&mut db)
            .await?)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        window: Option<Window>,
    ) -> StoreResult<Vec<PostCard>> {
        let mut db = self.pool.get().await?;

        let query = posts::table
            .inner_join(users::table)
            .left_join(groups::table)
            .select((
                Post::as_select(),
                UserBrief::as_select(),
                Option::<Group>::as_select(),
            ))
            .order((posts::created_at.desc(), posts::id.desc()))
            .into_boxed();

        let mut query = filter_posts!(query, filter);

        if let Some(window) = window {
            query = query.offset(window.offset).limit(window.limit);
        }

        let rows = query
            .load::<(Post, UserBrief, Option<Group>)>(&mut db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(post, author, group)| PostCard::new(post, author, group))
            .collect())
    }

    async fn get_post(&self, id: i64) -> StoreResult<Option<PostCard>> {
        let mut db = self.pool.get().await?;

        let row = posts::table
            .inner_join(users::table)
            .left_join(groups::table)
            .filter(posts::id.eq(id))
            .select((
                Post::as_select(),
                UserBrief::as_select(),
                Option::<Group>::as_select(),
            ))
            .first::<(Post, UserBrief, Option<Group>)>(&mut db)
            .await
            .optional()?;

        Ok(row.map(|(post, author, group)| PostCard::new(post, author, group)))
    }

    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let mut db = self.pool.get().await?;

        Ok(diesel::insert_into(posts::table)
            .values(&post)
            .returning(Post::as_returning())
            .get_result::<Post>(&mut db)
            .await?)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> StoreResult<()> {
        let mut db = self.pool.get().await?;

        diesel::update(posts::table.find(id))
            .set(&changes)
            .execute(&mut db)
            .await?;

        Ok(())
    }

    async fn list_comments(&self, post_id: i64) -> StoreResult<Vec<CommentView>> {
        let mut db = self.pool.get().await?;

        let rows = comments::table
            .inner_join(users::table)
            .filter(comments::post_id.eq(post_id))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select((Comment::as_select(), UserBrief::as_select()))
            .load::<(Comment, UserBrief)>(&mut db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentView::new(comment, author))
            .collect())
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<()> {
        let mut db = self.pool.get().await?;

        diesel::insert_into(comments::table)
            .values(&comment)
            .execute(&mut db)
            .await?;

        Ok(())
    }

    async fn insert_follow(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<()> {
        let mut db = self.pool.get().await?;

        diesel::insert_into(follows::table)
            .values(NewFollow { user_id, author_id })
            .execute(&mut db)
            .await?;

        Ok(())
    }

    async fn delete_follows(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<usize> {
        let mut db = self.pool.get().await?;

        Ok(diesel::delete(
            follows::table
                .filter(follows::user_id.eq(user_id))
                .filter(follows::author_id.eq(author_id)),
        )
        .execute(&mut db)
        .await?)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<bool> {
        let mut db = self.pool.get().await?;

        Ok(diesel::select(diesel::dsl::exists(
            follows::table
                .filter(follows::user_id.eq(user_id))
                .filter(follows::author_id.eq(author_id)),
        ))
        .get_result::<bool>(&mut db)
        .await?)
    }

    async fn insert_session(&self, session: CreateSession) -> StoreResult<()> {
        let mut db = self.pool.get().await?;

        diesel::insert_into(sessions::table)
            .values(&session)
            .execute(&mut db)
            .await?;

        Ok(())
    }

    async fn session_user(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<UserBrief>> {
        let mut db = self.pool.get().await?;

        Ok(sessions::table
            .inner_join(users::table)
            .filter(sessions::id.eq(session_id))
            .filter(sessions::expires_at.gt(now))
            .select(UserBrief::as_select())
            .first::<UserBrief>(&mut db)
            .await
            .optional()?)
    }

    async fn refresh_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut db = self.pool.get().await?;

        diesel::update(
            sessions::table
                .filter(sessions::id.eq(session_id))
                .filter(sessions::expires_at.gt(now)),
        )
        .set(sessions::expires_at.eq(expires_at))
        .execute(&mut db)
        .await?;

        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> StoreResult<()> {
        let mut db = self.pool.get().await?;

        diesel::delete(sessions::table.filter(sessions::id.eq(session_id)))
            .execute(&mut db)
            .await?;

        Ok(())
    }
}
