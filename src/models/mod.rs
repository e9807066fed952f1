// src/models/mod.rs

//! Domain models for the vacancy watcher.

mod config;
mod snapshot;

// Re-export all public types
pub use config::{
    Config, ExtractionRules, GuardConfig, NotifyConfig, ScheduleConfig, SourceConfig,
    StorageConfig,
};
pub use snapshot::{DistrictSpots, Snapshot, WebData};
