use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::schedule::{ScheduleEntry, ScheduleStore};

#[derive(Serialize)]
pub struct Itinerary {
    pub destination: String,
    pub exported_at: String,
    pub total_minutes: i32,
    pub days: Vec<ItineraryDay>,
}

#[derive(Serialize)]
pub struct ItineraryDay {
    pub day: u32,
    pub total_minutes: i32,
    pub entries: Vec<ExportEntry>,
}

#[derive(Serialize)]
pub struct ExportEntry {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub minutes: i32,
}

impl From<&ScheduleEntry> for ExportEntry {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            description: entry.description.clone(),
            start_time: entry.start_time.clone(),
            end_time: entry.end_time.clone(),
            minutes: entry.duration_minutes(),
        }
    }
}

impl Itinerary {
    pub fn build(store: &ScheduleStore, destination: &str, trip_days: u32) -> Self {
        let days: Vec<ItineraryDay> = (0..trip_days)
            .map(|day| ItineraryDay {
                day,
                total_minutes: store.minutes_for_day(day),
                entries: store.entries_for_day(day).map(ExportEntry::from).collect(),
            })
            .collect();

        Self {
            destination: destination.to_string(),
            exported_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            total_minutes: days.iter().map(|d| d.total_minutes).sum(),
            days,
        }
    }
}

/// Write the itinerary as JSON under `dir/itineraries`, returning the file path
pub fn export_itinerary(itinerary: &Itinerary, dir: &Path) -> Result<PathBuf> {
    let out_dir = dir.join("itineraries");
    fs::create_dir_all(&out_dir).context("Failed to create itineraries directory")?;

    // Sanitize destination for filename (lowercase, dashes for anything else)
    let safe_name: String = itinerary
        .destination
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let safe_name = if safe_name.is_empty() { "trip".to_string() } else { safe_name };
    let filename = format!("{}-{}.json", safe_name, Local::now().format("%Y%m%d-%H%M%S"));
    let file_path = out_dir.join(filename);

    let json = serde_json::to_string_pretty(itinerary).context("Failed to serialize itinerary")?;
    fs::write(&file_path, json).context("Failed to write itinerary file")?;

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ScheduleStore {
        ScheduleStore::from_entries(vec![
            ScheduleEntry::new("a", "Castle", "09:00", "11:00", "red").unwrap(),
            ScheduleEntry::new("b", "Dinner", "19:00", "20:30", "red").unwrap().on_day(1),
        ])
    }

    #[test]
    fn groups_entries_by_day() {
        let itinerary = Itinerary::build(&store(), "Lisbon", 3);
        assert_eq!(itinerary.days.len(), 3);
        assert_eq!(itinerary.days[0].entries[0].name, "Castle");
        assert_eq!(itinerary.days[1].total_minutes, 90);
        assert!(itinerary.days[2].entries.is_empty());
        assert_eq!(itinerary.total_minutes, 210);
    }

    #[test]
    fn writes_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let itinerary = Itinerary::build(&store(), "São Paulo", 2);
        let path = export_itinerary(&itinerary, dir.path()).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("são-paulo-"));
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["destination"], "São Paulo");
        assert_eq!(written["days"][0]["entries"][0]["minutes"], 120);
    }
}
