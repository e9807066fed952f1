//! Storage abstractions for snapshot persistence.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Watcher configuration
//! ├── last_check.json       # Previously observed snapshot
//! └── docs/
//!     └── data.json         # Website export
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Snapshot, WebData};

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the previously persisted snapshot; empty if none was saved.
    async fn load(&self) -> Result<Snapshot>;

    /// Persist a snapshot, replacing the previous one.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Write the website-facing export of a snapshot.
    async fn publish(&self, data: &WebData) -> Result<()>;
}
