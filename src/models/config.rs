//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where and how the vacancy page is fetched
    #[serde(default)]
    pub source: SourceConfig,

    /// District and age-band matching rules
    #[serde(default)]
    pub rules: ExtractionRules,

    /// Snapshot and website data locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Polling interval
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Notification text settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Snapshot overwrite protection
    #[serde(default)]
    pub guard: GuardConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Render the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.source.url)?;
        if self.schedule.interval_secs == 0 {
            return Err(AppError::validation("schedule.interval_secs must be > 0"));
        }
        self.rules.validate()?;
        if self.guard.max_drop_percent > 100 {
            return Err(AppError::validation(
                "guard.max_drop_percent must be within 0-100",
            ));
        }
        Ok(())
    }

    /// URL opened when a desktop notification is clicked.
    pub fn open_url(&self) -> &str {
        self.notify.open_url.as_deref().unwrap_or(&self.source.url)
    }
}

/// HTTP source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Vacancy listing page
    #[serde(default = "defaults::url")]
    pub url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// The rule table driving extraction.
///
/// Matching rules live here rather than in the traversal so they can be
/// tuned from `config.toml` when the page wording changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRules {
    /// Word placed before a district name in section headings ("Bydel")
    #[serde(default = "defaults::district_marker_prefix")]
    pub district_marker_prefix: String,

    /// Substrings marking a line as relevant to the target age band
    #[serde(default = "defaults::age_markers")]
    pub age_markers: Vec<String>,

    /// Known districts, in reporting order
    #[serde(default = "defaults::districts")]
    pub districts: Vec<String>,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            district_marker_prefix: defaults::district_marker_prefix(),
            age_markers: defaults::age_markers(),
            districts: defaults::districts(),
        }
    }
}

impl ExtractionRules {
    /// Full anchor phrase for a district, e.g. "Bydel Frogner".
    pub fn anchor_phrase(&self, district: &str) -> String {
        format!("{} {}", self.district_marker_prefix.trim(), district)
    }

    /// Validate the rule table.
    pub fn validate(&self) -> Result<()> {
        if self.district_marker_prefix.trim().is_empty() {
            return Err(AppError::validation("rules.district_marker_prefix is empty"));
        }
        if self.age_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(AppError::validation("No age markers defined"));
        }
        if self.districts.is_empty() {
            return Err(AppError::validation("No districts defined"));
        }

        let mut seen = HashSet::new();
        for district in &self.districts {
            if district.trim().is_empty() {
                return Err(AppError::validation("Empty district name"));
            }
            if !seen.insert(district.to_lowercase()) {
                return Err(AppError::validation(format!(
                    "Duplicate district: {district}"
                )));
            }
        }
        Ok(())
    }
}

/// File locations, relative to the storage directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Previously observed snapshot
    #[serde(default = "defaults::snapshot_file")]
    pub snapshot_file: String,

    /// Website-facing data file
    #[serde(default = "defaults::web_data_file")]
    pub web_data_file: String,

    /// Also write the website data file on every successful cycle
    #[serde(default)]
    pub publish_on_cycle: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_file: defaults::snapshot_file(),
            web_data_file: defaults::web_data_file(),
            publish_on_cycle: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Delay between cycle starts in seconds
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
        }
    }
}

/// Notification text settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "defaults::title")]
    pub title: String,

    /// Joins district and kindergarten names
    #[serde(default = "defaults::separator")]
    pub separator: String,

    /// Token after which a spot line carries the kindergarten name
    #[serde(default = "defaults::name_delimiter")]
    pub name_delimiter: String,

    /// Link opened from the notification (defaults to the source URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_url: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            title: defaults::title(),
            separator: defaults::separator(),
            name_delimiter: defaults::name_delimiter(),
            open_url: None,
        }
    }
}

/// Snapshot overwrite protection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Permit an empty extraction to replace a non-empty snapshot
    #[serde(default)]
    pub allow_empty_overwrite: bool,

    /// Maximum allowed drop in total spot count (0-100)
    #[serde(default = "defaults::max_drop_percent")]
    pub max_drop_percent: u8,

    /// Previous totals below this skip the drop check
    #[serde(default = "defaults::min_baseline")]
    pub min_baseline: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            allow_empty_overwrite: false,
            max_drop_percent: defaults::max_drop_percent(),
            min_baseline: defaults::min_baseline(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn url() -> String {
        "https://www.oslo.kommune.no/barnehage/ledige-barnehageplasser/".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Rule defaults
    pub fn district_marker_prefix() -> String {
        "Bydel".into()
    }
    pub fn age_markers() -> Vec<String> {
        ["0-3", "1-3", "under 3", "småbarn"]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn districts() -> Vec<String> {
        [
            "Alna",
            "Bjerke",
            "Frogner",
            "Gamle Oslo",
            "Grorud",
            "Grünerløkka",
            "Nordre Aker",
            "Nordstrand",
            "Sagene",
            "St. Hanshaugen",
            "Stovner",
            "Søndre Nordstrand",
            "Ullern",
            "Vestre Aker",
            "Østensjø",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    // Storage defaults
    pub fn snapshot_file() -> String {
        "last_check.json".into()
    }
    pub fn web_data_file() -> String {
        "docs/data.json".into()
    }

    pub fn interval() -> u64 {
        1800
    }

    // Notify defaults
    pub fn title() -> String {
        "Kindergarten Updates Available".into()
    }
    pub fn separator() -> String {
        ", ".into()
    }
    pub fn name_delimiter() -> String {
        ">".into()
    }

    // Guard defaults
    pub fn max_drop_percent() -> u8 {
        100
    }
    pub fn min_baseline() -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.source.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_url() {
        let mut config = Config::default();
        config.source.url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(AppError::Url(_))));
    }

    #[test]
    fn validate_rejects_duplicate_districts() {
        let mut config = Config::default();
        config.rules.districts.push("frogner".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_age_markers() {
        let mut config = Config::default();
        config.rules.age_markers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [rules]
            districts = ["Frogner", "Sagene"]

            [schedule]
            interval_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.rules.districts, vec!["Frogner", "Sagene"]);
        assert_eq!(config.rules.district_marker_prefix, "Bydel");
        assert_eq!(config.schedule.interval_secs, 60);
        assert_eq!(config.storage.snapshot_file, "last_check.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_round_trip() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.rules, config.rules);
        assert_eq!(parsed.notify, config.notify);
    }

    #[test]
    fn anchor_phrase_joins_prefix_and_name() {
        let rules = ExtractionRules::default();
        assert_eq!(rules.anchor_phrase("Frogner"), "Bydel Frogner");
    }

    #[test]
    fn open_url_falls_back_to_source() {
        let mut config = Config::default();
        assert_eq!(config.open_url(), config.source.url);
        config.notify.open_url = Some("https://example.com".to_string());
        assert_eq!(config.open_url(), "https://example.com");
    }
}
