use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Pixels per slot the schedule can be drawn at
pub const SLOT_HEIGHT_RANGE: RangeInclusive<f32> = 16.0..=120.0;
pub const TRIP_DAYS_RANGE: RangeInclusive<u32> = 1..=14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClockFormat {
    #[default]
    Hour24,      // "14:30"
    Hour12,      // "2:30pm"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the recommendation/gesture service
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "default_user_age")]
    pub user_age: u32,
    #[serde(default)]
    pub destination: String,
    /// Pixels per 30-minute slot in the schedule view
    #[serde(default = "default_slot_height")]
    pub slot_height: f32,
    #[serde(default = "default_trip_days")]
    pub trip_days: u32,
    #[serde(default)]
    pub clock_format: ClockFormat,
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
    /// Poll the hand-tracking endpoint for swipe gestures
    #[serde(default)]
    pub gestures_enabled: bool,
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: u32,
}

fn default_service_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_user_age() -> u32 {
    25
}

fn default_slot_height() -> f32 {
    40.0
}

fn default_trip_days() -> u32 {
    3
}

fn default_font_scale() -> f32 {
    1.0
}

fn default_recommendation_count() -> u32 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            user_id: String::new(),
            user_age: default_user_age(),
            destination: String::new(),
            slot_height: default_slot_height(),
            trip_days: default_trip_days(),
            clock_format: ClockFormat::Hour24,
            font_scale: default_font_scale(),
            gestures_enabled: false,
            recommendation_count: default_recommendation_count(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .context("Failed to read config file")?;
            let config: Config = serde_json::from_str(&contents)
                .context("Failed to parse config file")?;
            Ok(config.clamped())
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config file {}", config_path.display()))?;

        Ok(())
    }

    /// Pull layout values back into the ranges the settings dialog offers
    pub fn clamped(mut self) -> Self {
        self.slot_height = if self.slot_height.is_finite() {
            self.slot_height.clamp(*SLOT_HEIGHT_RANGE.start(), *SLOT_HEIGHT_RANGE.end())
        } else {
            default_slot_height()
        };
        self.trip_days = self.trip_days.clamp(*TRIP_DAYS_RANGE.start(), *TRIP_DAYS_RANGE.end());
        self
    }

    /// Recommendations need someone to recommend for and somewhere to go
    pub fn is_configured(&self) -> bool {
        !self.user_id.trim().is_empty() && !self.destination.trim().is_empty()
    }

    fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "tripboard", "tripboard")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    pub fn base_url(&self) -> String {
        let url = self.service_url.trim().trim_end_matches('/');
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("http://{}", url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"user_id":"u1"}"#).unwrap();
        assert_eq!(config.user_id, "u1");
        assert_eq!(config.slot_height, 40.0);
        assert_eq!(config.trip_days, 3);
        assert_eq!(config.service_url, "http://localhost:8000");
        assert_eq!(config.clock_format, ClockFormat::Hour24);
        assert!(!config.is_configured());
    }

    #[test]
    fn base_url_is_normalised() {
        let mut config = Config::default();
        config.service_url = " localhost:9000/ ".to_string();
        assert_eq!(config.base_url(), "http://localhost:9000");
        config.service_url = "https://trips.example.com/".to_string();
        assert_eq!(config.base_url(), "https://trips.example.com");
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("config.json");

        let mut config = Config::default();
        config.user_id = "traveller".to_string();
        config.destination = "Lisbon".to_string();
        config.clock_format = ClockFormat::Hour12;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.is_configured());
        assert_eq!(loaded.destination, "Lisbon");
        assert_eq!(loaded.clock_format, ClockFormat::Hour12);
    }

    #[test]
    fn hand_edited_layout_values_are_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"slot_height":0.0,"trip_days":0}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.slot_height, 16.0);
        assert_eq!(loaded.trip_days, 1);

        fs::write(&path, r#"{"slot_height":900.0,"trip_days":60}"#).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.slot_height, 120.0);
        assert_eq!(loaded.trip_days, 14);
    }

    #[test]
    fn save_error_names_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let err = Config::default().save_to(&blocker.join("config.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to create config directory"));
    }
}
