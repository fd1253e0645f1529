use chrono::{DateTime, Utc};
use derive_builder::Builder;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::forms::FormErrors,
    groups::models::Group,
    paginator::Page,
    posts::comments::models::CommentView,
    schema::posts,
    users::models::UserBrief,
};

use super::forms::PostForm;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// A post that has not been stored yet.
///
/// Only built through [`NewPostBuilder`]: the form fills `text` and `group_id`,
/// the handler injects `author_id` from the session before `build()`.
#[derive(Builder, Insertable, Debug, Clone)]
#[builder(pattern = "owned")]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub text: String,
    pub author_id: Uuid,
    #[builder(default)]
    pub group_id: Option<i64>,
    #[builder(default)]
    pub image: Option<String>,
    #[builder(default = "Utc::now()")]
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    #[must_use]
    pub fn builder() -> NewPostBuilder {
        NewPostBuilder::default()
    }
}

#[derive(AsChangeset, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = posts)]
#[diesel(treat_none_as_null = true)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i64>,
}

/// A post joined with its author and group, as listed on every page.
#[derive(Serialize, Deserialize, ToSchema, TS, Debug, Clone, PartialEq)]
#[ts(export)]
pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub image: Option<String>,
    pub author: UserBrief,
    pub group: Option<Group>,
}

impl PostCard {
    pub fn new(post: Post, author: UserBrief, group: Option<Group>) -> Self {
        Self {
            id: post.id,
            text: post.text,
            created_at: post.created_at,
            image: post.image,
            author,
            group,
        }
    }

    /// First `length` characters of the text.
    pub fn title(&self, length: usize) -> String {
        self.text.chars().take(length).collect()
    }
}

#[derive(Serialize, Debug)]
pub struct IndexContext {
    pub page_obj: Page<PostCard>,
    pub posts_list: Vec<PostCard>,
}

#[derive(Serialize, Debug)]
pub struct PostDetailContext {
    pub post_title: String,
    pub author: UserBrief,
    pub author_posts: i64,
    pub pub_date: DateTime<Utc>,
    pub comments: Vec<CommentView>,
    pub post: PostCard,
}

#[derive(Serialize, Debug)]
pub struct PostFormContext {
    pub form: PostForm,
    pub errors: FormErrors,
    pub groups: Vec<Group>,
    pub is_edit: bool,
    pub post: Option<PostCard>,
}
