//! Roster - user and project management service backed by MongoDB
//!
//! A thin mapping from HTTP routes to document-database queries:
//! CRUD handlers for the User resource, a declared Project collection,
//! and JSON views in place of server-side templates.

pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, RosterError};
