// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "blocks/sqlite_block_store.rs"]
pub mod blocks;

#[path = "incidents/sqlite_incident_store.rs"]
pub mod incidents;

#[path = "messages/sqlite_message_store.rs"]
pub mod messages;

#[path = "settings/sqlite_settings_store.rs"]
pub mod settings;
