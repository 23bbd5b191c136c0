// libs/schedule-cell/src/services/slots.rs
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime, Timelike};
use regex::Regex;
use tracing::debug;

use crate::models::ScheduleError;

/// The salon's daily slot catalog, in display form. There is no 1:00 PM slot.
pub const SLOT_LABELS: [&str; 9] = [
    "9:00 AM", "10:00 AM", "11:00 AM", "12:00 PM",
    "2:00 PM", "3:00 PM", "4:00 PM", "5:00 PM", "6:00 PM",
];

static TWELVE_HOUR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*([AaPp][Mm])\s*$").expect("12-hour pattern is valid")
});

pub struct SlotCalendar;

impl SlotCalendar {
    pub fn labels() -> &'static [&'static str] {
        &SLOT_LABELS
    }

    /// The catalog as stored 24-hour times, in display order.
    pub fn times() -> Vec<NaiveTime> {
        SLOT_LABELS
            .iter()
            .filter_map(|label| normalize_time(label).ok())
            .collect()
    }

    /// Catalog label for a stored time, if the time is a catalog slot.
    pub fn label_for(time: NaiveTime) -> Option<&'static str> {
        let label = display_label(time);
        SLOT_LABELS.iter().copied().find(|candidate| *candidate == label)
    }

    pub fn contains(time: NaiveTime) -> bool {
        Self::label_for(time).is_some()
    }

    /// Accepts either form and returns the canonical catalog label.
    pub fn canonical_label(input: &str) -> Result<&'static str, ScheduleError> {
        let time = normalize_time(input)?;
        Self::label_for(time).ok_or_else(|| ScheduleError::UnknownSlot(input.trim().to_string()))
    }
}

/// Converts a 12-hour label (`"9:00 AM"`) or a 24-hour time (`"09:00"`,
/// `"09:00:00"`) into a time of day. `12:00 AM` is midnight, `12:00 PM` noon.
pub fn normalize_time(input: &str) -> Result<NaiveTime, ScheduleError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScheduleError::MissingTime);
    }

    if let Some(caps) = TWELVE_HOUR.captures(trimmed) {
        let hours: u32 = caps[1].parse().map_err(|_| ScheduleError::InvalidTime(trimmed.to_string()))?;
        let minutes: u32 = caps[2].parse().map_err(|_| ScheduleError::InvalidTime(trimmed.to_string()))?;
        if !(1..=12).contains(&hours) {
            return Err(ScheduleError::InvalidTime(trimmed.to_string()));
        }

        let is_pm = caps[3].eq_ignore_ascii_case("pm");
        let hours = match (is_pm, hours) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };

        let time = NaiveTime::from_hms_opt(hours, minutes, 0)
            .ok_or_else(|| ScheduleError::InvalidTime(trimmed.to_string()))?;
        debug!("Normalized '{}' to {}", trimmed, format_time(time));
        return Ok(time);
    }

    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map(|time| time.with_nanosecond(0).unwrap_or(time))
        .map_err(|_| ScheduleError::InvalidTime(trimmed.to_string()))
}

/// Stored form, `HH:MM:SS`.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Display form without a leading zero, e.g. `"9:00 AM"`, `"12:00 PM"`.
pub fn display_label(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    format!("{}:{:02} {}", hour, time.minute(), if is_pm { "PM" } else { "AM" })
}

pub fn parse_date(input: &str) -> Result<NaiveDate, ScheduleError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScheduleError::MissingDate);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use assert_matches::assert_matches;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_known_labels() {
        assert_eq!(format_time(normalize_time("9:00 AM").unwrap()), "09:00:00");
        assert_eq!(format_time(normalize_time("12:00 PM").unwrap()), "12:00:00");
        assert_eq!(format_time(normalize_time("6:00 PM").unwrap()), "18:00:00");
        assert_eq!(format_time(normalize_time("12:00 AM").unwrap()), "00:00:00");
    }

    #[test]
    fn test_catalog_round_trips_and_is_injective() {
        let times = SlotCalendar::times();
        assert_eq!(times.len(), SLOT_LABELS.len());

        let distinct: HashSet<_> = times.iter().collect();
        assert_eq!(distinct.len(), SLOT_LABELS.len());

        for (label, time) in SLOT_LABELS.iter().zip(&times) {
            assert_eq!(time.second(), 0);
            assert_eq!(display_label(*time), *label);
            assert_eq!(SlotCalendar::label_for(*time), Some(*label));
        }
    }

    #[test]
    fn test_24_hour_input() {
        assert_eq!(normalize_time("14:00:00").unwrap(), t(14, 0));
        assert_eq!(normalize_time("09:00").unwrap(), t(9, 0));
        assert_eq!(SlotCalendar::canonical_label("14:00:00").unwrap(), "2:00 PM");
    }

    #[test]
    fn test_lenient_twelve_hour_input() {
        assert_eq!(normalize_time(" 2:00pm ").unwrap(), t(14, 0));
        assert_eq!(normalize_time("10:30 am").unwrap(), t(10, 30));
    }

    #[test]
    fn test_invalid_times() {
        assert_matches!(normalize_time(""), Err(ScheduleError::MissingTime));
        assert_matches!(normalize_time("13:00 PM"), Err(ScheduleError::InvalidTime(_)));
        assert_matches!(normalize_time("0:00 AM"), Err(ScheduleError::InvalidTime(_)));
        assert_matches!(normalize_time("noon"), Err(ScheduleError::InvalidTime(_)));
        assert_matches!(normalize_time("25:00:00"), Err(ScheduleError::InvalidTime(_)));
    }

    #[test]
    fn test_off_catalog_slot() {
        assert!(!SlotCalendar::contains(t(13, 0)));
        assert_matches!(
            SlotCalendar::canonical_label("1:00 PM"),
            Err(ScheduleError::UnknownSlot(_))
        );
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-06-01").unwrap(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_matches!(parse_date(""), Err(ScheduleError::MissingDate));
        assert_matches!(parse_date("01/06/2025"), Err(ScheduleError::InvalidDate(_)));
    }
}
