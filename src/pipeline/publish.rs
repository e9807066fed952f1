// src/pipeline/publish.rs

//! Website data export.

use crate::error::Result;
use crate::models::WebData;
use crate::pipeline::Watcher;

/// Fetch the page, extract it, and write the website data file.
///
/// Unlike a watch cycle this always writes, and a fetch failure is an error.
pub async fn run_publish(watcher: &Watcher) -> Result<WebData> {
    let snapshot = watcher.fetch_snapshot().await?;
    let data = WebData::new(snapshot);
    watcher.store().publish(&data).await?;
    Ok(data)
}
