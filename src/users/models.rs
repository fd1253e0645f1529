use chrono::{DateTime, Utc};
use diesel::prelude::*;
use garde::Validate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{paginator::Page, posts::models::PostCard, schema::users};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn brief(&self) -> UserBrief {
        UserBrief {
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Public part of a user, safe to put in any page context.
#[derive(Queryable, Selectable, Serialize, Deserialize, ToSchema, TS, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[ts(export)]
pub struct UserBrief {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Validate, Deserialize, ToSchema, Debug)]
pub struct SignupForm {
    #[garde(length(min = 1, max = 150), custom(valid_username))]
    pub username: String,
    #[garde(length(min = 8))]
    pub password: String,
    #[garde(skip)]
    #[serde(default)]
    pub first_name: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub last_name: Option<String>,
}

fn valid_username(value: &str, _context: &()) -> garde::Result {
    if value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        Ok(())
    } else {
        Err(garde::Error::new(
            "may contain only letters, numbers, and @/./+/-/_ characters",
        ))
    }
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct LoginContext {
    pub next: String,
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ProfileContext {
    pub author: UserBrief,
    pub count: i64,
    pub following: bool,
    pub page_obj: Page<PostCard>,
}
