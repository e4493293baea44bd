//! HTTP routes for Roster

pub mod health;
pub mod users;

pub use health::{health_check, version_info};
pub use users::handle_users_request;
