//! Clock strings, minute offsets and progress fractions.

use crate::errors::DashboardError;
use serde::{Serialize, Serializer};
use std::fmt;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// 05:50
pub const DEFAULT_DAY_START: u32 = 350;
/// 23:10
pub const DEFAULT_DAY_END: u32 = 1390;

/// Half-open span of minutes within one day, `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockRange {
    pub start: u32,
    pub end: u32,
}

impl ClockRange {
    pub fn new(start: u32, end: u32) -> Result<Self, DashboardError> {
        if end >= MINUTES_PER_DAY || end <= start {
            return Err(DashboardError::Format(format!(
                "invalid range {} - {}",
                format_clock(start),
                format_clock(end)
            )));
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for ClockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", format_clock(self.start), format_clock(self.end))
    }
}

impl Serialize for ClockRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses `"HH:MM"` into minutes since midnight.
pub fn parse_clock(s: &str) -> Result<u32, DashboardError> {
    let bad = || DashboardError::Format(format!("expected HH:MM, got {s:?}"));

    let (hours, minutes) = s.split_once(':').ok_or_else(bad)?;
    let hours = parse_group(hours).ok_or_else(bad)?;
    let minutes = parse_group(minutes).ok_or_else(bad)?;
    if hours >= 24 || minutes >= 60 {
        return Err(bad());
    }

    Ok(hours * 60 + minutes)
}

fn parse_group(group: &str) -> Option<u32> {
    if group.is_empty() || group.len() > 2 || !group.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    group.parse().ok()
}

/// Parses `"HH:MM - HH:MM"`. The end must be strictly after the start.
pub fn parse_range(s: &str) -> Result<ClockRange, DashboardError> {
    let (start, end) = s
        .split_once(" - ")
        .ok_or_else(|| DashboardError::Format(format!("expected HH:MM - HH:MM, got {s:?}")))?;
    ClockRange::new(parse_clock(start)?, parse_clock(end)?)
}

pub fn format_clock(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Fraction of the waking day elapsed at `now`, clamped to `[0, 1]`.
pub fn day_progress(now: u32, day_start: u32, day_end: u32) -> f64 {
    clamp_progress(now, day_start, day_end)
}

/// Fraction of one column's span elapsed at `now`, clamped to `[0, 1]`.
pub fn column_progress(now: u32, column_start: u32, column_end: u32) -> f64 {
    clamp_progress(now, column_start, column_end)
}

fn clamp_progress(now: u32, start: u32, end: u32) -> f64 {
    if now <= start {
        return if end <= start && now >= end { 1.0 } else { 0.0 };
    }
    if now >= end {
        return 1.0;
    }
    f64::from(now - start) / f64::from(end - start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_clock_accepts_two_integer_groups() {
        assert_eq!(parse_clock("05:50").unwrap(), 350);
        assert_eq!(parse_clock("23:10").unwrap(), 1390);
        assert_eq!(parse_clock("7:05").unwrap(), 425);
        assert_eq!(parse_clock("00:00").unwrap(), 0);
    }

    #[test]
    fn parse_clock_rejects_malformed_input() {
        for input in ["", "12", "12:", ":30", "12:30:00", "ab:cd", "24:00", "12:60", " 12:30", "1 2:30"] {
            assert!(
                matches!(parse_clock(input), Err(DashboardError::Format(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_range_requires_separator_and_order() {
        let range = parse_range("09:00 - 10:30").unwrap();
        assert_eq!(range, ClockRange { start: 540, end: 630 });
        assert_eq!(range.to_string(), "09:00 - 10:30");

        assert!(parse_range("09:00-10:30").is_err());
        assert!(parse_range("10:30 - 09:00").is_err());
        assert!(parse_range("10:30 - 10:30").is_err());
        assert!(parse_range("10:30 - 25:00").is_err());
    }

    #[test]
    fn day_progress_clamps_and_interpolates() {
        assert_eq!(day_progress(0, DEFAULT_DAY_START, DEFAULT_DAY_END), 0.0);
        assert_eq!(day_progress(350, DEFAULT_DAY_START, DEFAULT_DAY_END), 0.0);
        assert_eq!(day_progress(1390, DEFAULT_DAY_START, DEFAULT_DAY_END), 1.0);
        assert_eq!(day_progress(1439, DEFAULT_DAY_START, DEFAULT_DAY_END), 1.0);
        assert_eq!(day_progress(870, DEFAULT_DAY_START, DEFAULT_DAY_END), 0.5);
    }

    #[test]
    fn progress_is_monotonic_over_the_whole_day() {
        let mut last_day = 0.0;
        let mut last_column = 0.0;
        for now in 0..MINUTES_PER_DAY {
            let day = day_progress(now, DEFAULT_DAY_START, DEFAULT_DAY_END);
            let column = column_progress(now, 600, 720);
            assert!((0.0..=1.0).contains(&day));
            assert!((0.0..=1.0).contains(&column));
            assert!(day >= last_day);
            assert!(column >= last_column);
            last_day = day;
            last_column = column;
        }
    }
}
