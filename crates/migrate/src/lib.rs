//! # stratum-migrate: Migration Orchestration Engine
//!
//! Ordered, reversible schema/data migrations split across two deployment
//! scopes: `pre` (schema changes applied before code deploy) and `post`
//! (data backfills applied after). The engine tracks applied versions
//! through a [`VersionStore`], so re-running a pass is idempotent, and a
//! hook that fails is compensated within its own unit before the run
//! terminates.
//!
//! A host process builds a [`Registry`] of [`MigrationUnit`]s, supplies a
//! store handle, and invokes [`MigrationRunner::run`] with a [`RunRequest`]:
//!
//! ```no_run
//! use stratum_migrate::{MigrationRunner, MigrationUnit, MemoryStore, Registry, RunRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), stratum_migrate::MigrateError> {
//! let mut registry = Registry::new();
//! registry.register(
//!     MigrationUnit::new(2026_08_07_03723)
//!         .up(|_store: MemoryStore| async move { Ok(()) })
//!         .down(|_store| async move { Ok(()) }),
//! )?;
//!
//! let runner = MigrationRunner::new(registry, MemoryStore::new());
//! let report = runner.run(&RunRequest::up()).await?;
//! println!("applied {} pre migrations", report.pre.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod postgres;
pub mod registry;
pub mod request;
pub mod runner;
pub mod store;
pub mod unit;

// Re-export core traits and types
pub use error::*;
pub use postgres::*;
pub use registry::*;
pub use request::*;
pub use runner::*;
pub use store::*;
pub use unit::*;
