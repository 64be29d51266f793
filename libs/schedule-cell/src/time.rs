// libs/schedule-cell/src/time.rs
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

const CLOCK_FORMAT: &str = "%H:%M";

/// Wall-clock time of day with minute precision, exchanged as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(ClockTime)
    }

}

impl FromStr for ClockTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // chrono accepts single-digit hours; the wire format does not.
        if trimmed.len() != 5 {
            return Err(format!("Invalid time '{}', expected HH:MM", s));
        }

        NaiveTime::parse_from_str(trimmed, CLOCK_FORMAT)
            .map(ClockTime)
            .map_err(|_| format!("Invalid time '{}', expected HH:MM", s))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CLOCK_FORMAT))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Day-of-week index used by weekly schedules: 0 = Sunday .. 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Lazy walk over every calendar day in `[start, end]`, both ends included.
/// An inverted range is empty.
#[derive(Debug, Clone)]
pub struct DateRange {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl DateRange {
    pub fn inclusive(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            next: (start <= end).then_some(start),
            end,
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = current.succ_opt().filter(|next| *next <= self.end);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_clock_time_parse_and_display() {
        let time: ClockTime = "09:30".parse().unwrap();
        assert_eq!(time, ClockTime::new(9, 30).unwrap());
        assert_eq!(time.to_string(), "09:30");
    }

    #[test]
    fn test_clock_time_rejects_bad_input() {
        assert!("9:30".parse::<ClockTime>().is_err());
        assert!("24:00".parse::<ClockTime>().is_err());
        assert!("09:60".parse::<ClockTime>().is_err());
        assert!("09:30:00".parse::<ClockTime>().is_err());
        assert!("nine".parse::<ClockTime>().is_err());
    }

    #[test]
    fn test_clock_time_ordering() {
        let early: ClockTime = "08:00".parse().unwrap();
        let late: ClockTime = "14:15".parse().unwrap();
        assert!(early < late);
    }

    #[test]
    fn test_clock_time_serde() {
        let time = ClockTime::new(7, 5).unwrap();
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "\"07:05\"");

        let back: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, time);
        assert!(serde_json::from_str::<ClockTime>("\"7:05pm\"").is_err());
    }

    #[test]
    fn test_day_of_week_numbering() {
        // 2024-06-02 was a Sunday.
        assert_eq!(day_of_week(date(2024, 6, 2)), 0);
        assert_eq!(day_of_week(date(2024, 6, 3)), 1);
        assert_eq!(day_of_week(date(2024, 6, 8)), 6);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let days: Vec<_> = DateRange::inclusive(date(2024, 2, 28), date(2024, 3, 1)).collect();
        assert_eq!(days, vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]);
    }

    #[test]
    fn test_date_range_single_day_and_inverted() {
        assert_eq!(DateRange::inclusive(date(2024, 6, 3), date(2024, 6, 3)).count(), 1);
        assert_eq!(DateRange::inclusive(date(2024, 6, 4), date(2024, 6, 3)).count(), 0);
    }
}
