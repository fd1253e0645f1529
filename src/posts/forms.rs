use garde::Validate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::forms::FormErrors,
    store::{Store, StoreResult},
};

use super::models::{NewPostBuilder, PostChanges};

const INVALID_GROUP: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Submitted create/edit form. `group` is the raw value of the group select,
/// empty when no group is chosen.
#[derive(Validate, Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
pub struct PostForm {
    #[garde(custom(required))]
    #[serde(default)]
    pub text: String,
    #[garde(skip)]
    #[serde(default)]
    pub group: Option<String>,
}

fn required(value: &str, _context: &()) -> garde::Result {
    if value.is_empty() {
        return Err(garde::Error::new("This field is required."));
    }
    Ok(())
}

/// Form data that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPost {
    pub text: String,
    pub group_id: Option<i64>,
}

impl CleanedPost {
    /// A draft still missing its author.
    pub fn into_draft(self) -> NewPostBuilder {
        NewPostBuilder::default()
            .text(self.text)
            .group_id(self.group_id)
    }

    pub fn into_changes(self) -> PostChanges {
        PostChanges {
            text: self.text,
            group_id: self.group_id,
        }
    }
}

impl PostForm {
    /// Cleans and validates the submission. The outer result carries storage
    /// failures, the inner one the field errors to show with the form.
    pub async fn bind(&self, store: &dyn Store) -> StoreResult<Result<CleanedPost, FormErrors>> {
        let form = PostForm {
            text: self.text.trim().to_owned(),
            group: self.group.clone(),
        };

        let mut errors = match form.validate(&()) {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from(e),
        };

        let group_id = match form.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => match store.get_group(id).await? {
                    Some(group) => Some(group.id),
                    None => {
                        errors.add("group", INVALID_GROUP);
                        None
                    }
                },
                Err(_) => {
                    errors.add("group", INVALID_GROUP);
                    None
                }
            },
        };

        if !errors.is_empty() {
            tracing::debug!("post form rejected: {:?}", errors.details());
            return Ok(Err(errors));
        }

        Ok(Ok(CleanedPost {
            text: form.text,
            group_id,
        }))
    }

    /// The form as shown when editing `text` in `group_id`.
    pub fn initial(text: &str, group_id: Option<i64>) -> Self {
        Self {
            text: text.to_owned(),
            group: group_id.map(|id| id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{groups::models::NewGroup, store::MemoryStore};

    async fn store_with_group() -> (MemoryStore, i64) {
        let store = MemoryStore::new();
        let group = store
            .insert_group(NewGroup {
                title: String::from("Cats"),
                slug: String::from("cats"),
                description: String::from("all about cats"),
            })
            .await
            .unwrap();

        (store, group.id)
    }

    fn form(text: &str, group: Option<&str>) -> PostForm {
        PostForm {
            text: text.to_owned(),
            group: group.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn text_is_trimmed_and_group_resolved() {
        let (store, group_id) = store_with_group().await;

        let cleaned = form("  hello  ", Some(&group_id.to_string()))
            .bind(&store)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            cleaned,
            CleanedPost {
                text: String::from("hello"),
                group_id: Some(group_id),
            }
        );
    }

    #[tokio::test]
    async fn empty_group_means_no_group() {
        let (store, _) = store_with_group().await;

        let cleaned = form("hello", Some("")).bind(&store).await.unwrap().unwrap();
        assert_eq!(cleaned.group_id, None);

        let cleaned = form("hello", None).bind(&store).await.unwrap().unwrap();
        assert_eq!(cleaned.group_id, None);
    }

    #[tokio::test]
    async fn blank_text_is_required() {
        let (store, _) = store_with_group().await;

        let errors = form("   ", None).bind(&store).await.unwrap().unwrap_err();

        assert_eq!(errors.field("text"), ["This field is required."]);
        assert!(errors.field("group").is_empty());
    }

    #[tokio::test]
    async fn unknown_or_garbled_group_is_rejected() {
        let (store, group_id) = store_with_group().await;

        for group in [(group_id + 1).to_string(), String::from("cats")] {
            let errors = form("hello", Some(&group))
                .bind(&store)
                .await
                .unwrap()
                .unwrap_err();

            assert_eq!(errors.field("group"), [INVALID_GROUP]);
        }
    }

    #[tokio::test]
    async fn draft_needs_only_an_author() {
        let (store, group_id) = store_with_group().await;
        let author_id = Uuid::now_v7();

        let post = form("hello", Some(&group_id.to_string()))
            .bind(&store)
            .await
            .unwrap()
            .unwrap()
            .into_draft()
            .author_id(author_id)
            .build()
            .unwrap();

        assert_eq!(post.author_id, author_id);
        assert_eq!(post.group_id, Some(group_id));
        assert_eq!(post.image, None);
    }
}
