//! Per-district vacancy snapshot.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Spots advertised for one district.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictSpots {
    /// Sorted, deduplicated vacancy lines
    pub available_spots: Vec<String>,
}

impl DistrictSpots {
    /// Build from an already deduplicated set; the set's order is the sort order.
    pub fn from_set(spots: BTreeSet<String>) -> Self {
        Self {
            available_spots: spots.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.available_spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available_spots.is_empty()
    }
}

/// Mapping from district name to its spots.
///
/// Serializes as a plain JSON object (`{"Frogner": {"available_spots": [...]}}`).
/// Equality is structural: same districts, same ordered spot lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    districts: BTreeMap<String, DistrictSpots>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a district's spots. Empty sets are not stored.
    pub fn insert(&mut self, district: impl Into<String>, spots: BTreeSet<String>) {
        if spots.is_empty() {
            return;
        }
        self.districts
            .insert(district.into(), DistrictSpots::from_set(spots));
    }

    pub fn get(&self, district: &str) -> Option<&DistrictSpots> {
        self.districts.get(district)
    }

    pub fn contains(&self, district: &str) -> bool {
        self.districts.contains_key(district)
    }

    pub fn districts(&self) -> impl Iterator<Item = &str> {
        self.districts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DistrictSpots)> {
        self.districts.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn district_count(&self) -> usize {
        self.districts.len()
    }

    /// Total number of spot lines across all districts.
    pub fn spot_count(&self) -> usize {
        self.districts.values().map(DistrictSpots::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, BTreeSet<String>)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (S, BTreeSet<String>)>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for (district, spots) in iter {
            snapshot.insert(district, spots);
        }
        snapshot
    }
}

/// Spot lists read from disk are re-sorted and deduplicated, and districts
/// without spots are dropped, so a hand-edited file compares equal to a
/// fresh extraction of the same content.
impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RawSpots {
            #[serde(default)]
            available_spots: BTreeSet<String>,
        }

        let raw = BTreeMap::<String, RawSpots>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(district, spots)| (district, spots.available_spots))
            .collect())
    }
}

/// Website-facing export of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebData {
    /// ISO 8601 timestamp of the export
    #[serde(rename = "lastUpdate")]
    pub last_update: DateTime<Utc>,
    pub spots: Snapshot,
}

impl WebData {
    pub fn new(spots: Snapshot) -> Self {
        Self {
            last_update: Utc::now(),
            spots,
        }
    }
}
