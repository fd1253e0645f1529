use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{paginator::Page, posts::models::PostCard, schema::follows};

/// Directed edge: `user_id` follows `author_id`.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = follows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Follow {
    pub id: i64,
    pub user_id: Uuid,
    pub author_id: Uuid,
}

#[derive(Insertable, Debug, Clone, Copy)]
#[diesel(table_name = follows)]
pub struct NewFollow {
    pub user_id: Uuid,
    pub author_id: Uuid,
}

#[derive(Serialize, Debug)]
pub struct FollowContext {
    pub page_obj: Page<PostCard>,
}
