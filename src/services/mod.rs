//! Service layer for the vacancy watcher.
//!
//! This module contains the collaborators of a watch cycle:
//! - Vacancy extraction (`SpotExtractor`)
//! - Document fetching (`DocumentFetcher`, `HttpFetcher`)
//! - Notification delivery (`Notifier`)

mod extractor;
mod fetcher;
mod notifier;

pub use extractor::{SpotExtractor, extract};
pub use fetcher::{DocumentFetcher, HttpFetcher};
#[cfg(target_os = "macos")]
pub use notifier::MacNotifier;
pub use notifier::{LogNotifier, Notifier, platform_notifier};
