//! Diff calculation between snapshots.
//!
//! Decides whether anything changed since the previous cycle and which
//! districts should be mentioned in a notification. Districts that gained
//! spots or whose spot list changed are reported; districts that vanished
//! are not.

use serde::{Deserialize, Serialize};

use crate::models::Snapshot;

/// Result of comparing two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Snapshots differ structurally
    pub changed: bool,
    /// New or modified districts, in district order
    pub changed_districts: Vec<String>,
}

impl DiffResult {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        self.changed
    }
}

/// Calculator for computing diffs between snapshots.
#[derive(Debug, Clone, Default)]
pub struct DiffCalculator {
    /// Reporting order of districts
    district_order: Vec<String>,
}

impl DiffCalculator {
    /// Create a diff calculator reporting districts in the given order.
    pub fn new(district_order: &[String]) -> Self {
        Self {
            district_order: district_order.to_vec(),
        }
    }

    /// Districts present in `snapshot`, in reporting order.
    ///
    /// Configured districts come first in configured order; any others
    /// follow alphabetically.
    pub fn ordered_districts<'a>(&self, snapshot: &'a Snapshot) -> Vec<&'a str> {
        let mut ordered: Vec<&'a str> = self
            .district_order
            .iter()
            .filter_map(|d| snapshot.districts().find(|&s| s == d.as_str()))
            .collect();
        ordered.extend(
            snapshot
                .districts()
                .filter(|&d| !self.district_order.iter().any(|o| o == d)),
        );
        ordered
    }

    /// Calculate the diff between the current and previous snapshots.
    pub fn calculate(&self, current: &Snapshot, previous: &Snapshot) -> DiffResult {
        let changed = current != previous;
        if !changed {
            return DiffResult::default();
        }

        let changed_districts = self
            .ordered_districts(current)
            .into_iter()
            .filter(|&district| {
                let spots = current.get(district);
                spots.is_some() && spots != previous.get(district)
            })
            .map(String::from)
            .collect();

        DiffResult {
            changed,
            changed_districts,
        }
    }
}

/// Convenience function to calculate diff.
pub fn calculate_diff(
    current: &Snapshot,
    previous: &Snapshot,
    district_order: &[String],
) -> DiffResult {
    DiffCalculator::new(district_order).calculate(current, previous)
}
