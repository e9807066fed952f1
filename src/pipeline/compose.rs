// src/pipeline/compose.rs

//! Notification composition.

use crate::models::{NotifyConfig, Snapshot};

/// A composed notification, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Builds notification text from a snapshot and its changed districts.
#[derive(Debug, Clone, Default)]
pub struct NotificationComposer {
    config: NotifyConfig,
}

impl NotificationComposer {
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Compose the title and body for the given changed districts.
    ///
    /// Body layout:
    ///
    /// ```text
    /// Updates in: Frogner, Sagene
    ///
    /// Frogner: Eventyrskogen, Majorstuen
    /// Sagene: Bjølsen
    /// ```
    pub fn compose(&self, current: &Snapshot, changed_districts: &[String]) -> Notification {
        let separator = self.config.separator.as_str();
        let mut lines = vec![
            format!("Updates in: {}", changed_districts.join(separator)),
            String::new(),
        ];

        for district in changed_districts {
            let Some(spots) = current.get(district) else {
                continue;
            };
            let names: Vec<String> = spots
                .available_spots
                .iter()
                .map(|spot| self.kindergarten_name(spot))
                .collect();
            if !names.is_empty() {
                lines.push(format!("{}: {}", district, names.join(separator)));
            }
        }

        Notification {
            title: self.config.title.clone(),
            body: lines.join("\n"),
        }
    }

    /// Display name of the kindergarten advertised by a spot line.
    ///
    /// With the delimiter present, the name sits between its first
    /// occurrence and the next comma; otherwise it is everything before the
    /// first comma.
    pub fn kindergarten_name(&self, spot: &str) -> String {
        kindergarten_name(spot, &self.config.name_delimiter)
    }
}

/// See [`NotificationComposer::kindergarten_name`].
pub fn kindergarten_name(spot: &str, delimiter: &str) -> String {
    let rest = match spot.split_once(delimiter) {
        Some((_, after)) if !delimiter.is_empty() => after,
        _ => spot,
    };
    rest.split(',').next().unwrap_or(rest).trim().to_string()
}

/// Compose with the default notification settings.
pub fn compose(current: &Snapshot, changed_districts: &[String]) -> Notification {
    NotificationComposer::default().compose(current, changed_districts)
}
