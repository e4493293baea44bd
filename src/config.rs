//! Configuration for Roster
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Roster - user and project management service backed by MongoDB
#[derive(Parser, Debug, Clone)]
#[command(name = "roster")]
#[command(about = "HTTP CRUD service for users and projects over MongoDB")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "roster")]
    pub mongodb_db: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.mongodb_uri.starts_with("mongodb://")
            && !self.mongodb_uri.starts_with("mongodb+srv://")
        {
            return Err(format!(
                "MONGODB_URI must be a mongodb:// or mongodb+srv:// URI, got '{}'",
                self.mongodb_uri
            ));
        }

        if self.mongodb_db.trim().is_empty() {
            return Err("MONGODB_DB must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            node_id: Uuid::new_v4(),
            listen: "127.0.0.1:8080".parse().unwrap(),
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_db: "roster".to_string(),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(base_args().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_mongodb_uri() {
        let mut args = base_args();
        args.mongodb_uri = "postgres://localhost".to_string();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_accepts_srv_uri() {
        let mut args = base_args();
        args.mongodb_uri = "mongodb+srv://cluster.example.com".to_string();
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_db_name() {
        let mut args = base_args();
        args.mongodb_db = "  ".to_string();
        assert!(args.validate().is_err());
    }
}
