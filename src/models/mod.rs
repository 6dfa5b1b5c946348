//! Typed records shared by the engine, the scope loader, and the CLI.
//!
//! - [`server`]: entries of an on-disk server map (plain or blocked override)
//! - [`source`]: descriptors of the locations that contribute configuration
//! - [`view`]: merged-view entities rebuilt on every resolution pass
//! - [`migration`]: proposed batches of server promotions
//!
//! Every record exposes a `validate()` returning a [`GateError::ValidationFailure`]
//! (or [`GateError::InvalidMigration`]) that names the failing record.
//!
//! [`GateError::ValidationFailure`]: crate::core::GateError::ValidationFailure
//! [`GateError::InvalidMigration`]: crate::core::GateError::InvalidMigration

pub mod migration;
pub mod server;
pub mod source;
pub mod view;

pub use migration::{ConflictResolution, MigrationPlan, NameConflict};
pub use server::{
    BLOCKED_KEY, BlockedServerConfig, ServerConfig, ServerEntry, is_blocked_value,
    validate_server_name,
};
pub use source::{ConfigSource, Provenance, SourceKind, SourceType};
pub use view::{McpServer, MemoryFile};
