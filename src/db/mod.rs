//! Database layer: MongoDB client wrapper, schemas, and stores.

pub mod mongo;
pub mod schemas;
pub mod users;

pub use mongo::{IntoIndexes, MongoClient, MongoCollection};
pub use users::UserStore;
