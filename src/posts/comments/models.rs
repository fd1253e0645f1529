use chrono::{DateTime, Utc};
use diesel::prelude::*;
use garde::Validate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{schema::comments, users::models::UserBrief};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub post_id: i64,
    pub author_id: Uuid,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub post_id: i64,
    pub author_id: Uuid,
}

#[derive(Validate, Deserialize, ToSchema, Debug, Default)]
pub struct CommentForm {
    #[garde(length(min = 1))]
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Deserialize, ToSchema, TS, Debug, Clone, PartialEq)]
#[ts(export)]
pub struct CommentView {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: UserBrief,
}

impl CommentView {
    pub fn new(comment: Comment, author: UserBrief) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            created_at: comment.created_at,
            author,
        }
    }
}
