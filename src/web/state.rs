//! Shared application state handed to every handler.

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::presence::ConnectionRegistry;
use crate::core::relay::RelayService;
use crate::infra::blocks::SqliteBlockStore;
use crate::infra::incidents::SqliteIncidentStore;
use crate::infra::messages::SqliteMessageStore;
use crate::infra::settings::SqliteSettingsStore;

/// The relay engine wired to the SQLite adapters.
pub type Relay =
    RelayService<SqliteMessageStore, SqliteIncidentStore, SqliteBlockStore, SqliteSettingsStore>;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub registry: Arc<ConnectionRegistry>,
    pub incidents: SqliteIncidentStore,
    pub blocks: SqliteBlockStore,
    pub settings: SqliteSettingsStore,
    pub evidence_dir: PathBuf,
}
