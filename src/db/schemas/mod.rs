//! Database schemas for Roster
//!
//! Defines MongoDB document structures for users and projects.

mod project;
mod user;

pub use project::{ProjectDoc, PROJECT_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};
