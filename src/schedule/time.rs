//! Conversions between "HH:MM" wall-clock strings and minutes since midnight

use thiserror::Error;

use crate::config::ClockFormat;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("expected HH:MM, got {0:?}")]
    Malformed(String),
    #[error("time out of range: {0:?}")]
    OutOfRange(String),
}

/// Convert "HH:MM" to minutes since midnight.
///
/// Callers pass well-formed times; an unparsable component counts as 0.
pub fn time_to_minutes(time: &str) -> i32 {
    let mut parts = time.split(':');
    let hours = parts.next().and_then(|h| h.trim().parse::<i32>().ok()).unwrap_or(0);
    let minutes = parts.next().and_then(|m| m.trim().parse::<i32>().ok()).unwrap_or(0);
    hours.saturating_mul(60).saturating_add(minutes)
}

/// Convert minutes since midnight to zero-padded "HH:MM"
pub fn minutes_to_time(minutes: i32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Strict variant of [`time_to_minutes`] for input we don't control (files, dialogs)
pub fn parse_time(time: &str) -> Result<i32, TimeError> {
    let (h, m) = time
        .split_once(':')
        .ok_or_else(|| TimeError::Malformed(time.to_string()))?;

    if h.len() != 2 || m.len() != 2 {
        return Err(TimeError::Malformed(time.to_string()));
    }

    let hours = h.parse::<i32>().map_err(|_| TimeError::Malformed(time.to_string()))?;
    let minutes = m.parse::<i32>().map_err(|_| TimeError::Malformed(time.to_string()))?;

    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(TimeError::OutOfRange(time.to_string()));
    }

    Ok(hours * 60 + minutes)
}

/// Parse a user-entered time ("9am", "14:30", "2p", "9:30pm") to "HH:MM"
pub fn parse_user_time(input: &str) -> Option<String> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    // am/pm suffix, None means 24-hour input
    let (time_part, meridiem) = if let Some(t) = input.strip_suffix("pm") {
        (t, Some(true))
    } else if let Some(t) = input.strip_suffix("am") {
        (t, Some(false))
    } else if let Some(t) = input.strip_suffix('p') {
        (t, Some(true))
    } else if let Some(t) = input.strip_suffix('a') {
        (t, Some(false))
    } else {
        (input.as_str(), None)
    };

    let time_part = time_part.trim();
    let (hour, minute) = match time_part.split_once(':') {
        Some((h, m)) => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        None => (time_part.parse::<u32>().ok()?, 0),
    };

    let hour_24 = match meridiem {
        Some(true) if hour < 12 => hour + 12,
        Some(false) if hour == 12 => 0,
        Some(_) if hour > 12 => return None,
        _ => hour,
    };

    if hour_24 > 23 || minute > 59 {
        return None;
    }

    Some(format!("{:02}:{:02}", hour_24, minute))
}

/// Format "HH:MM" according to the configured clock
pub fn format_clock_time(time_24: &str, clock_format: ClockFormat) -> String {
    match clock_format {
        ClockFormat::Hour24 => time_24.to_string(),
        ClockFormat::Hour12 => {
            let minutes = time_to_minutes(time_24);
            let (hour, min) = (minutes / 60, minutes % 60);
            let (h12, ampm) = match hour {
                0 => (12, "am"),
                1..=11 => (hour, "am"),
                12 => (12, "pm"),
                _ => (hour - 12, "pm"),
            };
            format!("{}:{:02}{}", h12, min, ampm)
        }
    }
}

/// Format a minute count as "1h 30m"
pub fn format_duration(minutes: i32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_clock_to_minutes() {
        assert_eq!(time_to_minutes("00:00"), 0);
        assert_eq!(time_to_minutes("06:00"), 360);
        assert_eq!(time_to_minutes("09:30"), 570);
        assert_eq!(time_to_minutes("23:30"), 1410);
    }

    #[test]
    fn pads_minutes_back_to_clock() {
        assert_eq!(minutes_to_time(0), "00:00");
        assert_eq!(minutes_to_time(65), "01:05");
        assert_eq!(minutes_to_time(1410), "23:30");
    }

    #[test]
    fn every_valid_clock_time_survives_conversion() {
        for h in 0..24 {
            for m in 0..60 {
                let t = format!("{:02}:{:02}", h, m);
                assert_eq!(minutes_to_time(time_to_minutes(&t)), t);
            }
        }
    }

    #[test]
    fn trusted_parse_never_panics_on_garbage() {
        assert_eq!(time_to_minutes(""), 0);
        assert_eq!(time_to_minutes("ab:cd"), 0);
        assert_eq!(time_to_minutes("07"), 420);
    }

    #[test]
    fn trusted_parse_saturates_oversize_components() {
        assert_eq!(time_to_minutes("99999999:00"), i32::MAX);
        assert_eq!(time_to_minutes("-99999999:00"), i32::MIN);
        assert_eq!(time_to_minutes("00:2147483647"), i32::MAX);
    }

    #[test]
    fn strict_parse_rejects_bad_input() {
        assert_eq!(parse_time("08:15"), Ok(495));
        assert!(matches!(parse_time("8:15"), Err(TimeError::Malformed(_))));
        assert!(matches!(parse_time("0815"), Err(TimeError::Malformed(_))));
        assert!(matches!(parse_time("24:00"), Err(TimeError::OutOfRange(_))));
        assert!(matches!(parse_time("10:60"), Err(TimeError::OutOfRange(_))));
    }

    #[test]
    fn parses_user_times() {
        assert_eq!(parse_user_time("9am").as_deref(), Some("09:00"));
        assert_eq!(parse_user_time("9:30pm").as_deref(), Some("21:30"));
        assert_eq!(parse_user_time("2p").as_deref(), Some("14:00"));
        assert_eq!(parse_user_time("12am").as_deref(), Some("00:00"));
        assert_eq!(parse_user_time("12pm").as_deref(), Some("12:00"));
        assert_eq!(parse_user_time(" 14:30 ").as_deref(), Some("14:30"));
        assert_eq!(parse_user_time("13pm"), None);
        assert_eq!(parse_user_time("25:00"), None);
        assert_eq!(parse_user_time(""), None);
    }

    #[test]
    fn formats_twelve_hour_clock() {
        assert_eq!(format_clock_time("00:15", ClockFormat::Hour12), "12:15am");
        assert_eq!(format_clock_time("09:00", ClockFormat::Hour12), "9:00am");
        assert_eq!(format_clock_time("12:30", ClockFormat::Hour12), "12:30pm");
        assert_eq!(format_clock_time("23:30", ClockFormat::Hour12), "11:30pm");
        assert_eq!(format_clock_time("23:30", ClockFormat::Hour24), "23:30");
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(30), "30m");
        assert_eq!(format_duration(60), "1h");
        assert_eq!(format_duration(150), "2h 30m");
    }
}
