//! HTTP server for Roster

mod http;

pub use http::{run, AppState};
