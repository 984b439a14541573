// This is the entry point of the chat relay.
//
// **Architecture Overview:**
// - `core/` = Business logic (transport-agnostic)
// - `infra/` = Implementations of core traits (SQLite stores)
// - `web/` = axum adapters (WebSocket sessions, JSON endpoints)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Start the HTTP/WebSocket server

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "web/web_layer.rs"]
mod web;

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::presence::ConnectionRegistry;
use crate::core::relay::RelayService;
use crate::infra::blocks::SqliteBlockStore;
use crate::infra::incidents::SqliteIncidentStore;
use crate::infra::messages::SqliteMessageStore;
use crate::infra::settings::SqliteSettingsStore;
use crate::web::router::build_router;
use crate::web::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Keep the runtime database in a dedicated folder so the repo root stays tidy.
    let data_dir = "data";
    std::fs::create_dir_all(data_dir).expect("Failed to create data directory for SQLite files");
    let db_path =
        std::env::var("CHATGUARD_DB").unwrap_or_else(|_| format!("{}/chatguard.db", data_dir));

    let evidence_dir: PathBuf = std::env::var("CHATGUARD_EVIDENCE_DIR")
        .unwrap_or_else(|_| "evidence".to_string())
        .into();
    std::fs::create_dir_all(&evidence_dir).expect("Failed to create evidence directory");

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&format!("sqlite://{}?mode=rwc", db_path))
        .await
        .expect("Failed to connect to chat DB");

    let messages = SqliteMessageStore::new(pool.clone());
    messages
        .migrate()
        .await
        .expect("Failed to migrate messages table");

    let incidents = SqliteIncidentStore::new(pool.clone());
    incidents
        .migrate()
        .await
        .expect("Failed to migrate incidents table");

    let blocks = SqliteBlockStore::new(pool.clone());
    blocks
        .migrate()
        .await
        .expect("Failed to migrate block relationships table");

    let settings = SqliteSettingsStore::new(pool.clone());
    settings
        .migrate()
        .await
        .expect("Failed to migrate escalation settings table");

    let registry = Arc::new(ConnectionRegistry::new());
    let relay = Arc::new(RelayService::new(
        messages,
        incidents.clone(),
        blocks.clone(),
        settings.clone(),
        Arc::clone(&registry),
    ));

    let state = AppState {
        relay,
        registry,
        incidents,
        blocks,
        settings,
        evidence_dir,
    };

    // ========================================================================
    // SERVER SETUP
    // ========================================================================

    let addr = std::env::var("CHATGUARD_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!(%addr, "chatguard listening");

    axum::serve(listener, build_router(state))
        .await
        .expect("Server error");
}
