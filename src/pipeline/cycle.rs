// src/pipeline/cycle.rs

//! A single watch cycle.
//!
//! Fetch → extract → diff against the stored snapshot → (on change)
//! compose + notify → persist. Nothing in a cycle is fatal: a failed fetch
//! skips the cycle, and notifier or store failures are logged.

use chrono::Local;

use crate::error::Result;
use crate::models::{Config, Snapshot, WebData};
use crate::pipeline::{
    CircuitBreaker, CircuitBreakerConfig, DiffCalculator, DiffResult, Notification,
    NotificationComposer,
};
use crate::services::{DocumentFetcher, Notifier, SpotExtractor};
use crate::storage::SnapshotStore;

/// What a cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The document could not be fetched; nothing was touched
    Skipped { reason: String },
    /// Current snapshot equals the stored one
    Unchanged { snapshot: Snapshot },
    /// Snapshot differs from the stored one
    Changed {
        snapshot: Snapshot,
        diff: DiffResult,
        /// Composed notification; lists no districts when only removals occurred
        notification: Notification,
        /// Whether the snapshot was written to the store
        persisted: bool,
    },
}

impl CycleOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Skipped { .. } => None,
            Self::Unchanged { snapshot } | Self::Changed { snapshot, .. } => Some(snapshot),
        }
    }
}

/// Runs watch cycles against injected collaborators.
pub struct Watcher {
    source_url: String,
    publish_on_cycle: bool,
    extractor: SpotExtractor,
    differ: DiffCalculator,
    composer: NotificationComposer,
    breaker: CircuitBreaker,
    fetcher: Box<dyn DocumentFetcher>,
    store: Box<dyn SnapshotStore>,
    notifier: Box<dyn Notifier>,
}

impl Watcher {
    /// Build a watcher from configuration and collaborators.
    pub fn new(
        config: &Config,
        fetcher: Box<dyn DocumentFetcher>,
        store: Box<dyn SnapshotStore>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self> {
        Ok(Self {
            source_url: config.source.url.clone(),
            publish_on_cycle: config.storage.publish_on_cycle,
            extractor: SpotExtractor::new(&config.rules)?,
            differ: DiffCalculator::new(&config.rules.districts),
            composer: NotificationComposer::new(&config.notify),
            breaker: CircuitBreaker::with_config(CircuitBreakerConfig::from(&config.guard)),
            fetcher,
            store,
            notifier,
        })
    }

    /// Permit snapshot writes the circuit breaker would otherwise refuse.
    pub fn force(mut self) -> Self {
        self.breaker = self.breaker.forced();
        self
    }

    pub fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    /// Fetch the page and extract the current snapshot.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let document = self.fetcher.fetch(&self.source_url).await?;
        let snapshot = self.extractor.extract(&document);
        log::info!(
            "Extracted {} spots across {} districts",
            snapshot.spot_count(),
            snapshot.district_count()
        );
        Ok(snapshot)
    }

    /// Run one cycle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        log::info!(
            "Checking for updates at {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        let current = match self.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Skipping cycle: {}", e);
                return CycleOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        let previous = self.store.load().await.unwrap_or_else(|e| {
            log::warn!("Could not load previous snapshot: {}. Treating as empty.", e);
            Snapshot::new()
        });

        let diff = self.differ.calculate(&current, &previous);
        if !diff.has_changes() {
            log::info!("No new updates found.");
            self.publish_if_enabled(&current).await;
            return CycleOutcome::Unchanged { snapshot: current };
        }

        log::info!("New updates found!");
        report(&current, &self.differ);

        let notification = self.composer.compose(&current, &diff.changed_districts);
        if let Err(e) = self
            .notifier
            .deliver(&notification.title, &notification.body)
            .await
        {
            log::warn!("Failed to send notification: {}", e);
        }

        let persisted = self.persist(&current, &previous).await;
        if persisted {
            self.publish_if_enabled(&current).await;
        }

        CycleOutcome::Changed {
            snapshot: current,
            diff,
            notification,
            persisted,
        }
    }

    /// Write `current` unless the circuit breaker refuses it.
    async fn persist(&self, current: &Snapshot, previous: &Snapshot) -> bool {
        let result = match self.breaker.validate(current, previous) {
            Ok(()) => self.store.save(current).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => true,
            Err(e) if e.is_guard_refusal() => {
                log::warn!("Keeping previous snapshot: {}", e);
                false
            }
            Err(e) => {
                log::error!("Failed to save snapshot: {}", e);
                false
            }
        }
    }

    async fn publish_if_enabled(&self, snapshot: &Snapshot) {
        if !self.publish_on_cycle {
            return;
        }
        if let Err(e) = self.store.publish(&WebData::new(snapshot.clone())).await {
            log::error!("Failed to write website data: {}", e);
        }
    }
}

/// Log every district and its spots, in reporting order.
fn report(snapshot: &Snapshot, differ: &DiffCalculator) {
    log::info!("Available spots:");
    log::info!("{}", "-".repeat(50));
    for district in differ.ordered_districts(snapshot) {
        let Some(spots) = snapshot.get(district) else {
            continue;
        };
        log::info!("{}", district);
        for spot in &spots.available_spots {
            log::info!("- {}", spot);
        }
    }
}
