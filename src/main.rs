//! Roster - user and project management service backed by MongoDB

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster::{
    config::Args,
    db::{schemas, MongoClient, UserStore},
    server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("roster={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  Roster - user/project management");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("MongoDB: {}", args.mongodb_uri);
    info!("Database: {}", args.mongodb_db);
    info!("======================================");

    // Connect to MongoDB - the single client handle owned by this
    // composition root and injected into the application state
    let mongo = match MongoClient::connect(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => {
            info!("MongoDB connected successfully");
            client
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    // Open the users collection; this applies the unique email index
    let users = match UserStore::new(&mongo).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize users collection: {}", e);
            std::process::exit(1);
        }
    };

    // Ensure the projects collection and its indexes. Declared storage only;
    // no handlers operate on it.
    if let Err(e) = mongo
        .collection::<schemas::ProjectDoc>(schemas::PROJECT_COLLECTION)
        .await
    {
        error!("Failed to initialize projects collection: {}", e);
        std::process::exit(1);
    }

    let state = Arc::new(server::AppState::new(args, mongo.clone(), users));

    // Run until interrupted, then close the database connection once
    // before exit
    tokio::select! {
        result = server::run(state) => {
            if let Err(e) = result {
                error!("Server error: {:?}", e);
                mongo.close().await;
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    mongo.close().await;
    info!("MongoDB connection closed, exiting");

    Ok(())
}
