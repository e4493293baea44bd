//! User document schema
//!
//! Email uniqueness is enforced by the database through a unique index,
//! not by application code.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Display name
    pub name: String,

    /// Email address, unique across all users
    pub email: String,

    /// When the document was created
    #[serde(default = "DateTime::now")]
    pub created_on: DateTime,

    /// When the document was last modified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime>,

    /// Last login timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime>,
}

impl UserDoc {
    /// Create a new user document with creation-time defaults
    pub fn new(name: String, email: String) -> Self {
        Self {
            id: None,
            name,
            email,
            created_on: DateTime::now(),
            modified_on: Some(DateTime::now()),
            last_login: Some(DateTime::now()),
        }
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on email
            (
                doc! { "email": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("email_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_timestamps() {
        let user = UserDoc::new("Ann".to_string(), "ann@x.com".to_string());

        assert!(user.id.is_none());
        assert!(user.modified_on.is_some());
        assert!(user.last_login.is_some());
        assert!(user.modified_on.unwrap() >= user.created_on);
    }

    #[test]
    fn test_email_index_is_unique() {
        let indices = UserDoc::into_indices();
        assert_eq!(indices.len(), 1);

        let (keys, opts) = &indices[0];
        assert_eq!(keys.get_i32("email").unwrap(), 1);
        assert_eq!(opts.as_ref().unwrap().unique, Some(true));
    }

    #[test]
    fn test_bson_field_names_are_camel_case() {
        let user = UserDoc::new("Ann".to_string(), "ann@x.com".to_string());
        let doc = bson::to_document(&user).unwrap();

        assert!(doc.contains_key("createdOn"));
        assert!(doc.contains_key("modifiedOn"));
        assert!(doc.contains_key("lastLogin"));
        assert!(!doc.contains_key("_id"));
    }
}
