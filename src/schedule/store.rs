use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::entry::{EntryError, EntryId, ScheduleEntry};
use super::interaction::{PointerEvent, ScheduleActions};
use super::layout::{DAY_END_MINUTES, DAY_START_MINUTES, SLOT_MINUTES};
use super::time::minutes_to_time;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no free {duration}-minute slot on day {day}")]
    NoFreeSlot { day: u32, duration: i32 },
    #[error("no entry with id {0}")]
    UnknownEntry(EntryId),
    #[error(transparent)]
    InvalidEntry(#[from] EntryError),
}

/// The trip schedule: every placed entry plus the in-flight drag, if any
#[derive(Debug, Default)]
pub struct ScheduleStore {
    entries: Vec<ScheduleEntry>,
    drag_target: Option<EntryId>,
    dirty: bool,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<ScheduleEntry>) -> Self {
        let mut store = Self {
            entries,
            ..Self::default()
        };
        store.sort();
        store
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries_for_day(&self, day: u32) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter().filter(move |e| e.day == day)
    }

    /// Total scheduled minutes on a day
    pub fn minutes_for_day(&self, day: u32) -> i32 {
        self.entries_for_day(day).map(|e| e.duration_minutes()).sum()
    }

    pub fn drag_target(&self) -> Option<&ScheduleEntry> {
        self.drag_target.as_deref().and_then(|id| self.get(id))
    }

    /// True if anything changed since the last save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn insert(&mut self, entry: ScheduleEntry) -> Result<(), StoreError> {
        entry.validate()?;
        info!(id = %entry.id, name = %entry.name, day = entry.day, "entry added");
        self.entries.push(entry);
        self.sort();
        self.dirty = true;
        Ok(())
    }

    /// Place a new entry in the first free slot of `day`
    pub fn add(
        &mut self,
        name: &str,
        description: Option<&str>,
        color: &str,
        day: u32,
        duration: i32,
    ) -> Result<EntryId, StoreError> {
        let start = self
            .first_free_slot(day, duration)
            .ok_or(StoreError::NoFreeSlot { day, duration })?;

        let id = uuid::Uuid::new_v4().to_string();
        let mut entry = ScheduleEntry::new(
            id.clone(),
            name,
            &minutes_to_time(start),
            &minutes_to_time(start + duration),
            color,
        )?
        .on_day(day);
        if let Some(description) = description {
            entry = entry.with_description(description);
        }
        self.insert(entry)?;
        Ok(id)
    }

    /// Earliest slot-aligned start on `day` that fits `duration` without overlapping
    pub fn first_free_slot(&self, day: u32, duration: i32) -> Option<i32> {
        (DAY_START_MINUTES..=DAY_END_MINUTES - duration)
            .step_by(SLOT_MINUTES as usize)
            .find(|&start| {
                !self
                    .entries_for_day(day)
                    .any(|e| e.overlaps(day, start, start + duration))
            })
    }

    /// Replace an existing entry after validating the new values
    pub fn update(&mut self, entry: ScheduleEntry) -> Result<(), StoreError> {
        entry.validate()?;
        let existing = self
            .entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| StoreError::UnknownEntry(entry.id.clone()))?;
        *existing = entry;
        self.sort();
        self.dirty = true;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<ScheduleEntry, StoreError> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::UnknownEntry(id.to_string()))?;
        if self.drag_target.as_deref() == Some(id) {
            self.drag_target = None;
        }
        self.dirty = true;
        Ok(self.entries.remove(pos))
    }

    /// Land the dragged entry at `start` on `day`, keeping its duration
    pub fn drop_dragged(&mut self, day: u32, start: i32) -> Option<EntryId> {
        let id = self.drag_target.take()?;
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;

        let duration = entry.duration_minutes();
        let start = start
            .min(DAY_END_MINUTES - duration)
            .max(DAY_START_MINUTES);
        let new_start = minutes_to_time(start);
        let new_end = minutes_to_time(start + duration);

        if entry.day == day && entry.start_time == new_start {
            return None;
        }

        debug!(id = %id, day, start = %new_start, end = %new_end, "entry moved");
        entry.day = day;
        entry.start_time = new_start;
        entry.end_time = new_end;
        self.sort();
        self.dirty = true;
        Some(id)
    }

    pub fn cancel_drag(&mut self) {
        self.drag_target = None;
    }

    fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| a.day.cmp(&b.day).then_with(|| a.start_minutes().cmp(&b.start_minutes())));
    }

    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "tripboard", "tripboard")
            .context("Could not determine data directory")?;
        Ok(proj_dirs.data_dir().join("schedule.json"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read schedule file {}", path.display()))?;
        let entries: Vec<ScheduleEntry> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse schedule file {}", path.display()))?;

        // Drop anything that can't be shown rather than refusing the whole file
        let total = entries.len();
        let entries: Vec<ScheduleEntry> = entries
            .into_iter()
            .filter(|e| match e.validate() {
                Ok(()) => true,
                Err(err) => {
                    warn!(id = %e.id, error = %err, "skipping invalid schedule entry");
                    false
                }
            })
            .collect();

        info!(path = %path.display(), loaded = entries.len(), total, "schedule loaded");
        Ok(Self::from_entries(entries))
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create schedule directory {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write schedule file {}", path.display()))?;

        self.dirty = false;
        info!(path = %path.display(), entries = self.entries.len(), "schedule saved");
        Ok(())
    }
}

impl ScheduleActions for ScheduleStore {
    fn on_delete(&mut self, id: &str) {
        match self.remove(id) {
            Ok(entry) => info!(id, name = %entry.name, "entry deleted"),
            Err(e) => warn!(error = %e, "delete failed"),
        }
    }

    fn on_drag_start(&mut self, _event: &PointerEvent, item: &ScheduleEntry) {
        self.drag_target = Some(item.id.clone());
    }

    fn on_resize(&mut self, id: &str, start_time: &str, end_time: &str) {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            warn!(id, "resize for unknown entry");
            return;
        };
        entry.start_time = start_time.to_string();
        entry.end_time = end_time.to_string();
        self.sort();
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, day: u32, start: &str, end: &str) -> ScheduleEntry {
        ScheduleEntry::new(id, format!("Item {}", id), start, end, "blue")
            .unwrap()
            .on_day(day)
    }

    fn store() -> ScheduleStore {
        ScheduleStore::from_entries(vec![
            entry("b", 0, "10:00", "11:00"),
            entry("a", 0, "06:00", "08:00"),
            entry("c", 1, "09:00", "09:30"),
        ])
    }

    #[test]
    fn keeps_entries_sorted() {
        let store = store();
        let ids: Vec<&str> = store.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.minutes_for_day(0), 180);
    }

    #[test]
    fn finds_first_gap() {
        let store = store();
        assert_eq!(store.first_free_slot(0, 60), Some(480));
        assert_eq!(store.first_free_slot(0, 150), Some(660));
        assert_eq!(store.first_free_slot(2, 60), Some(360));
    }

    #[test]
    fn add_places_entry_in_free_slot() {
        let mut store = store();
        let id = store.add("Lunch", Some("Near the river"), "green", 0, 60).unwrap();
        let added = store.get(&id).unwrap();
        assert_eq!(added.start_time, "08:00");
        assert_eq!(added.end_time, "09:00");
        assert_eq!(added.description.as_deref(), Some("Near the river"));
        assert!(store.is_dirty());
    }

    #[test]
    fn add_fails_on_full_day() {
        let mut store = ScheduleStore::from_entries(vec![entry("all", 0, "06:00", "23:30")]);
        assert!(matches!(
            store.add("More", None, "red", 0, 30),
            Err(StoreError::NoFreeSlot { day: 0, duration: 30 })
        ));
    }

    #[test]
    fn resize_callback_updates_entry() {
        let mut store = store();
        store.on_resize("b", "09:30", "11:00");
        let b = store.get("b").unwrap();
        assert_eq!((b.start_time.as_str(), b.end_time.as_str()), ("09:30", "11:00"));
    }

    #[test]
    fn update_validates_before_replacing() {
        let mut store = store();
        let mut b = store.get("b").unwrap().clone();
        b.name = "Tile museum".to_string();
        b.start_time = "14:00".to_string();
        b.end_time = "15:00".to_string();
        store.update(b).unwrap();
        assert_eq!(store.get("b").unwrap().name, "Tile museum");
        // still second on day 0
        assert_eq!(store.entries()[1].id, "b");

        let mut bad = store.get("b").unwrap().clone();
        bad.end_time = "14:10".to_string();
        assert!(matches!(store.update(bad), Err(StoreError::InvalidEntry(_))));
        assert_eq!(store.get("b").unwrap().end_time, "15:00");

        let ghost = entry("nope", 0, "07:00", "08:00");
        assert!(matches!(store.update(ghost), Err(StoreError::UnknownEntry(_))));
    }

    #[test]
    fn delete_callback_removes_entry() {
        let mut store = store();
        store.on_delete("b");
        assert!(store.get("b").is_none());
        assert_eq!(store.entries().len(), 2);
        // unknown ids are logged and ignored
        store.on_delete("zzz");
        assert_eq!(store.entries().len(), 2);
    }

    #[test]
    fn drop_moves_dragged_entry_keeping_duration() {
        let mut store = store();
        let b = store.get("b").unwrap().clone();
        store.on_drag_start(&PointerEvent::new(0.0, 0.0), &b);
        assert_eq!(store.drag_target().map(|e| e.id.as_str()), Some("b"));

        assert_eq!(store.drop_dragged(1, 900), Some("b".to_string()));
        let b = store.get("b").unwrap();
        assert_eq!(b.day, 1);
        assert_eq!((b.start_time.as_str(), b.end_time.as_str()), ("15:00", "16:00"));
        assert!(store.drag_target().is_none());
    }

    #[test]
    fn drop_near_day_end_shifts_back() {
        let mut store = store();
        let a = store.get("a").unwrap().clone();
        store.on_drag_start(&PointerEvent::new(0.0, 0.0), &a);
        store.drop_dragged(0, 1380);
        let a = store.get("a").unwrap();
        assert_eq!((a.start_time.as_str(), a.end_time.as_str()), ("21:30", "23:30"));
    }

    #[test]
    fn drop_without_drag_does_nothing() {
        let mut store = store();
        assert_eq!(store.drop_dragged(0, 600), None);
        let b = store.get("b").unwrap().clone();
        store.on_drag_start(&PointerEvent::new(0.0, 0.0), &b);
        store.cancel_drag();
        assert_eq!(store.drop_dragged(0, 600), None);
    }

    #[test]
    fn saves_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("schedule.json");

        let mut original = store();
        original.save(&path).unwrap();
        assert!(!original.is_dirty());

        let loaded = ScheduleStore::load(&path).unwrap();
        assert_eq!(loaded.entries(), original.entries());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ScheduleStore::load(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.entries().is_empty());
    }

    #[test]
    fn load_skips_invalid_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        fs::write(
            &path,
            r#"[
                {"id":"ok","name":"Walk","startTime":"07:00","endTime":"08:00","color":"red"},
                {"id":"bad","name":"Late","startTime":"23:00","endTime":"23:59","color":"red"}
            ]"#,
        )
        .unwrap();

        let loaded = ScheduleStore::load(&path).unwrap();
        assert_eq!(loaded.entries().len(), 1);
        assert_eq!(loaded.entries()[0].id, "ok");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        fs::write(&path, "not json").unwrap();
        let err = ScheduleStore::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse schedule file"));
    }

    #[test]
    fn save_error_names_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        fs::write(&blocker, "").unwrap();

        let mut store = ScheduleStore::new();
        let err = store.save(&blocker.join("schedule.json")).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Failed to create schedule directory"));
        assert!(message.contains("taken"));
    }
}
