use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{paginator::Page, posts::models::PostCard, schema::groups};

#[derive(
    Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema, TS, Debug, Clone, PartialEq, Eq,
)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[ts(export)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = groups)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Serialize, Debug)]
pub struct GroupContext {
    pub group: Group,
    pub posts: Vec<PostCard>,
    pub page_obj: Page<PostCard>,
}
