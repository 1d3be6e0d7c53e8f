use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::layout::{DAY_END_MINUTES, DAY_START_MINUTES, SLOT_MINUTES};
use super::time::{parse_time, time_to_minutes, TimeError};

pub type EntryId = String;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("entry name must not be empty")]
    EmptyName,
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error("{0} is before the start of the day (06:00)")]
    StartsTooEarly(String),
    #[error("{0} is after the end of the day (23:30)")]
    EndsTooLate(String),
    #[error("{start}-{end} is shorter than 30 minutes")]
    TooShort { start: String, end: String },
}

/// One placed activity on the trip schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: EntryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: String,  // "HH:MM"
    pub end_time: String,    // "HH:MM"
    pub color: String,
    /// Zero-based trip day (day column)
    #[serde(default)]
    pub day: u32,
}

impl ScheduleEntry {
    pub fn new(
        id: impl Into<EntryId>,
        name: impl Into<String>,
        start_time: &str,
        end_time: &str,
        color: impl Into<String>,
    ) -> Result<Self, EntryError> {
        let entry = Self {
            id: id.into(),
            name: name.into(),
            description: None,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            color: color.into(),
            day: 0,
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.trim().is_empty()).then_some(description);
        self
    }

    pub fn on_day(mut self, day: u32) -> Self {
        self.day = day;
        self
    }

    /// Check the entry against the schedule window and minimum duration
    pub fn validate(&self) -> Result<(), EntryError> {
        if self.name.trim().is_empty() {
            return Err(EntryError::EmptyName);
        }

        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;

        if start < DAY_START_MINUTES {
            return Err(EntryError::StartsTooEarly(self.start_time.clone()));
        }
        if end > DAY_END_MINUTES {
            return Err(EntryError::EndsTooLate(self.end_time.clone()));
        }
        if end - start < SLOT_MINUTES {
            return Err(EntryError::TooShort {
                start: self.start_time.clone(),
                end: self.end_time.clone(),
            });
        }
        Ok(())
    }

    pub fn start_minutes(&self) -> i32 {
        time_to_minutes(&self.start_time)
    }

    pub fn end_minutes(&self) -> i32 {
        time_to_minutes(&self.end_time)
    }

    pub fn duration_minutes(&self) -> i32 {
        self.end_minutes() - self.start_minutes()
    }

    /// True if this entry shares any time with `[start, end)` on `day`
    pub fn overlaps(&self, day: u32, start: i32, end: i32) -> bool {
        self.day == day && start < self.end_minutes() && end > self.start_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_valid_entry() {
        let entry = ScheduleEntry::new("a1", "Louvre", "09:00", "11:30", "blue")
            .unwrap()
            .with_description("Skip the line")
            .on_day(2);
        assert_eq!(entry.duration_minutes(), 150);
        assert_eq!(entry.description.as_deref(), Some("Skip the line"));
        assert_eq!(entry.day, 2);
    }

    #[test]
    fn blank_description_is_dropped() {
        let entry = ScheduleEntry::new("a1", "Cafe", "09:00", "10:00", "red")
            .unwrap()
            .with_description("   ");
        assert_eq!(entry.description, None);
    }

    #[test]
    fn rejects_invalid_entries() {
        assert_eq!(
            ScheduleEntry::new("x", " ", "09:00", "10:00", "red"),
            Err(EntryError::EmptyName)
        );
        assert!(matches!(
            ScheduleEntry::new("x", "Run", "05:30", "07:00", "red"),
            Err(EntryError::StartsTooEarly(_))
        ));
        assert!(matches!(
            ScheduleEntry::new("x", "Bar", "22:00", "23:45", "red"),
            Err(EntryError::EndsTooLate(_))
        ));
        assert!(matches!(
            ScheduleEntry::new("x", "Nap", "13:00", "13:15", "red"),
            Err(EntryError::TooShort { .. })
        ));
        assert!(matches!(
            ScheduleEntry::new("x", "Oops", "9:00", "10:00", "red"),
            Err(EntryError::Time(TimeError::Malformed(_)))
        ));
    }

    #[test]
    fn unaligned_times_are_allowed_at_creation() {
        assert!(ScheduleEntry::new("x", "Tour", "09:10", "10:05", "red").is_ok());
    }

    #[test]
    fn overlap_is_half_open() {
        let entry = ScheduleEntry::new("x", "Tour", "09:00", "10:00", "red").unwrap();
        assert!(entry.overlaps(0, 570, 630));
        assert!(!entry.overlaps(0, 600, 660));
        assert!(!entry.overlaps(0, 480, 540));
        assert!(!entry.overlaps(1, 570, 630));
    }

    #[test]
    fn deserializes_without_day() {
        let json = r#"{"id":"e1","name":"Museum","startTime":"10:00","endTime":"12:00","color":"teal"}"#;
        let entry: ScheduleEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.day, 0);
        assert_eq!(entry.description, None);
        assert_eq!(entry.start_time, "10:00");
    }
}
