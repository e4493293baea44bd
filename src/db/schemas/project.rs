//! Project document schema
//!
//! Declared storage only: the collection is ensured at startup but no HTTP
//! handlers operate on it. `created_by` and `contributors` are plain text,
//! not references into the users collection.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for projects
pub const PROJECT_COLLECTION: &str = "projects";

/// Project document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub project_name: String,

    /// When the document was created
    #[serde(default = "DateTime::now")]
    pub created_on: DateTime,

    /// When the document was last modified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime>,

    pub created_by: String,

    pub contributors: String,

    pub tasks: String,
}

impl ProjectDoc {
    /// Create a new project document with creation-time defaults
    pub fn new(project_name: String, created_by: String) -> Self {
        Self {
            id: None,
            project_name,
            created_on: DateTime::now(),
            modified_on: None,
            created_by,
            contributors: String::new(),
            tasks: String::new(),
        }
    }
}

impl IntoIndexes for ProjectDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "projectName": 1 },
            Some(
                IndexOptions::builder()
                    .name("project_name_index".to_string())
                    .build(),
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let project = ProjectDoc::new("experiments".to_string(), "ann@x.com".to_string());

        assert!(project.id.is_none());
        assert!(project.modified_on.is_none());
        assert!(project.contributors.is_empty());
        assert!(project.tasks.is_empty());
    }

    #[test]
    fn test_bson_field_names_are_camel_case() {
        let project = ProjectDoc::new("experiments".to_string(), "ann@x.com".to_string());
        let doc = bson::to_document(&project).unwrap();

        assert!(doc.contains_key("projectName"));
        assert!(doc.contains_key("createdOn"));
        assert!(doc.contains_key("createdBy"));
    }
}
