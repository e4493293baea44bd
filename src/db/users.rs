//! User store
//!
//! One method per HTTP operation, each a single database round trip
//! returning a typed result. The store owns the typed collection so the
//! unique email index is applied once at startup.

use bson::{doc, oid::ObjectId, DateTime};
use tracing::info;

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{UserDoc, USER_COLLECTION};
use crate::types::{Result, RosterError};

/// Data-access layer for the users collection
#[derive(Clone)]
pub struct UserStore {
    collection: MongoCollection<UserDoc>,
}

impl UserStore {
    /// Open the users collection and ensure its indexes
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        let collection = mongo.collection::<UserDoc>(USER_COLLECTION).await?;
        Ok(Self { collection })
    }

    /// List all users
    pub async fn list(&self) -> Result<Vec<UserDoc>> {
        self.collection.find_many(doc! {}).await
    }

    /// Fetch one user by id
    pub async fn get(&self, id: ObjectId) -> Result<UserDoc> {
        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| RosterError::NotFound(format!("user {}", id.to_hex())))
    }

    /// Insert a new user; `modifiedOn` and `lastLogin` are set to now.
    /// A duplicate email surfaces as `RosterError::Duplicate`.
    pub async fn create(&self, name: String, email: String) -> Result<ObjectId> {
        let user = UserDoc::new(name, email);
        let id = self.collection.insert_one(user).await?;
        info!("User {} created", id.to_hex());
        Ok(id)
    }

    /// Update a user's name and email, advancing `modifiedOn`.
    /// `lastLogin` is deliberately untouched here; it records login events,
    /// not edits.
    pub async fn update(&self, id: ObjectId, name: String, email: String) -> Result<()> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "name": name,
                        "email": email,
                        "modifiedOn": DateTime::now(),
                    }
                },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(RosterError::NotFound(format!("user {}", id.to_hex())));
        }

        info!("User {} updated", id.to_hex());
        Ok(())
    }

    /// Remove a user by id
    pub async fn remove(&self, id: ObjectId) -> Result<()> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        if result.deleted_count == 0 {
            return Err(RosterError::NotFound(format!("user {}", id.to_hex())));
        }

        info!("User {} removed", id.to_hex());
        Ok(())
    }
}
