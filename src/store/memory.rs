use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    follows::models::Follow,
    groups::models::{Group, NewGroup},
    paginator::Window,
    posts::{
        comments::models::{Comment, CommentView, NewComment},
        models::{NewPost, Post, PostCard, PostChanges},
    },
    sessions::models::{CreateSession, Session},
    users::models::{NewUser, User, UserBrief},
};

use super::{PostFilter, Store, StoreError, StoreResult};

#[derive(Default, Debug)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
    sessions: Vec<Session>,
    last_group_id: i64,
    last_post_id: i64,
    last_comment_id: i64,
    last_follow_id: i64,
}

impl Tables {
    fn matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(group_id),
            PostFilter::Author(author_id) => post.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .iter()
                .any(|follow| follow.user_id == user_id && follow.author_id == post.author_id),
        }
    }

    fn card(&self, post: &Post) -> Option<PostCard> {
        let author = self.users.iter().find(|user| user.id == post.author_id)?;
        let group = post
            .group_id
            .and_then(|group_id| self.groups.iter().find(|group| group.id == group_id))
            .cloned();

        Some(PostCard::new(post.clone(), author.brief(), group))
    }
}

/// In-process [`Store`] with the same ordering and uniqueness rules as the
/// Postgres schema. Ids are sequential from 1, like `BIGSERIAL`.
#[derive(Default, Debug)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.inner.write().await;

        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("username"));
        }

        let user = User {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            password: user.password,
            created_at: user.created_at,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.inner.read().await;

        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_group(&self, group: NewGroup) -> StoreResult<Group> {
        let mut tables = self.inner.write().await;

        if tables.groups.iter().any(|g| g.slug == group.slug) {
            return Err(StoreError::Conflict("group slug"));
        }

        tables.last_group_id += 1;
        let group = Group {
            id: tables.last_group_id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        tables.groups.push(group.clone());

        Ok(group)
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        let tables = self.inner.read().await;

        let mut groups = tables.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

        Ok(groups)
    }

    async fn find_group(&self, slug: &str) -> StoreResult<Option<Group>> {
        let tables = self.inner.read().await;

        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn get_group(&self, id: i64) -> StoreResult<Option<Group>> {
        let tables = self.inner.read().await;

        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn count_posts(&self, filter: PostFilter) -> StoreResult<i64> {
        let tables = self.inner.read().await;

        Ok(tables
            .posts
            .iter()
            .filter(|post| tables.matches(post, filter))
            .count() as i64)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        window: Option<Window>,
    ) -> StoreResult<Vec<PostCard>> {
        let tables = self.inner.read().await;

        let mut posts: Vec<&Post> = tables
            .posts
            .iter()
            .filter(|post| tables.matches(post, filter))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let (offset, limit) = match window {
            Some(window) => (window.offset.max(0) as usize, window.limit.max(0) as usize),
            None => (0, posts.len()),
        };

        Ok(posts
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|post| tables.card(post))
            .collect())
    }

    async fn get_post(&self, id: i64) -> StoreResult<Option<PostCard>> {
        let tables = self.inner.read().await;

        Ok(tables
            .posts
            .iter()
            .find(|post| post.id == id)
            .and_then(|post| tables.card(post)))
    }

    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let mut tables = self.inner.write().await;

        tables.last_post_id += 1;
        let post = Post {
            id: tables.last_post_id,
            text: post.text,
            created_at: post.created_at,
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        };
        tables.posts.push(post.clone());

        Ok(post)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> StoreResult<()> {
        let mut tables = self.inner.write().await;

        if let Some(post) = tables.posts.iter_mut().find(|post| post.id == id) {
            post.text = changes.text;
            post.group_id = changes.group_id;
        }

        Ok(())
    }

    async fn list_comments(&self, post_id: i64) -> StoreResult<Vec<CommentView>> {
        let tables = self.inner.read().await;

        let mut comments: Vec<&Comment> = tables
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                let author = tables.users.iter().find(|u| u.id == comment.author_id)?;
                Some(CommentView::new(comment.clone(), author.brief()))
            })
            .collect())
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<()> {
        let mut tables = self.inner.write().await;

        tables.last_comment_id += 1;
        let comment = Comment {
            id: tables.last_comment_id,
            text: comment.text,
            created_at: comment.created_at,
            post_id: comment.post_id,
            author_id: comment.author_id,
        };
        tables.comments.push(comment);

        Ok(())
    }

    async fn insert_follow(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<()> {
        let mut tables = self.inner.write().await;

        tables.last_follow_id += 1;
        let follow = Follow {
            id: tables.last_follow_id,
            user_id,
            author_id,
        };
        tables.follows.push(follow);

        Ok(())
    }

    async fn delete_follows(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<usize> {
        let mut tables = self.inner.write().await;

        let before = tables.follows.len();
        tables
            .follows
            .retain(|follow| !(follow.user_id == user_id && follow.author_id == author_id));

        Ok(before - tables.follows.len())
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<bool> {
        let tables = self.inner.read().await;

        Ok(tables
            .follows
            .iter()
            .any(|follow| follow.user_id == user_id && follow.author_id == author_id))
    }

    async fn insert_session(&self, session: CreateSession) -> StoreResult<()> {
        let mut tables = self.inner.write().await;

        tables.sessions.push(Session {
            id: session.id,
            created_at: session.created_at,
            expires_at: session.expires_at,
            user_id: session.user_id,
        });

        Ok(())
    }

    async fn session_user(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<UserBrief>> {
        let tables = self.inner.read().await;

        Ok(tables
            .sessions
            .iter()
            .find(|session| session.id == session_id && session.is_live(now))
            .and_then(|session| tables.users.iter().find(|u| u.id == session.user_id))
            .map(User::brief))
    }

    async fn refresh_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut tables = self.inner.write().await;

        if let Some(session) = tables
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.is_live(now))
        {
            session.expires_at = expires_at;
        }

        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> StoreResult<()> {
        let mut tables = self.inner.write().await;

        tables.sessions.retain(|session| session.id != session_id);

        Ok(())
    }
}
