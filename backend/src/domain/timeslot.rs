//! Time-of-day slots expressed as minutes since midnight.
//!
//! Declared results attach to a slot in a day's timeline. Operators enter
//! slots as `"3:40 PM"` or `"15:40"`; storage and queries use the integer
//! minute count so range comparisons stay trivial.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Number of minutes in a day; slots are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Validation errors returned by [`TimeSlot::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSlotParseError {
    /// Input was empty or matched neither the 12-hour nor 24-hour shape.
    Unrecognized,
    /// Hour or minute component fell outside its valid range.
    OutOfRange,
}

impl fmt::Display for TimeSlotParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized => {
                write!(f, "time must look like HH:MM or HH:MM AM/PM")
            }
            Self::OutOfRange => write!(f, "time components are out of range"),
        }
    }
}

impl std::error::Error for TimeSlotParseError {}

static TWELVE_HOUR_RE: OnceLock<Regex> = OnceLock::new();
static TWENTY_FOUR_HOUR_RE: OnceLock<Regex> = OnceLock::new();

fn twelve_hour_regex() -> &'static Regex {
    TWELVE_HOUR_RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2}):(\d{2})\s*([AaPp][Mm])$").expect("valid regex")
    })
}

fn twenty_four_hour_regex() -> &'static Regex {
    TWENTY_FOUR_HOUR_RE
        .get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid regex"))
}

/// A point in a day's timeline, stored as minutes since midnight.
///
/// ## Invariants
/// - The wrapped value is always in `0..=1439`; out-of-range input is
///   rejected at parse time, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct TimeSlot(u16);

impl TimeSlot {
    /// Wrap a raw minute count, rejecting values outside the day.
    pub fn from_minutes(minutes: u16) -> Result<Self, TimeSlotParseError> {
        if minutes < MINUTES_PER_DAY {
            Ok(Self(minutes))
        } else {
            Err(TimeSlotParseError::OutOfRange)
        }
    }

    /// Parse a `"H:MM AM/PM"` or `"H:MM"` time string.
    ///
    /// Both forms are case-insensitive and tolerate surrounding whitespace.
    /// 12-hour input maps `12 AM` to hour 0 and `12 PM` to hour 12.
    pub fn parse(input: &str) -> Result<Self, TimeSlotParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TimeSlotParseError::Unrecognized);
        }

        if let Some(caps) = twelve_hour_regex().captures(trimmed) {
            let hour: u16 = caps[1].parse().map_err(|_| TimeSlotParseError::Unrecognized)?;
            let minute: u16 = caps[2].parse().map_err(|_| TimeSlotParseError::Unrecognized)?;
            if !(1..=12).contains(&hour) || minute > 59 {
                return Err(TimeSlotParseError::OutOfRange);
            }
            let is_pm = caps[3].eq_ignore_ascii_case("pm");
            let hour24 = match (hour, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            };
            return Self::from_minutes(hour24 * 60 + minute);
        }

        if let Some(caps) = twenty_four_hour_regex().captures(trimmed) {
            let hour: u16 = caps[1].parse().map_err(|_| TimeSlotParseError::Unrecognized)?;
            let minute: u16 = caps[2].parse().map_err(|_| TimeSlotParseError::Unrecognized)?;
            if hour > 23 || minute > 59 {
                return Err(TimeSlotParseError::OutOfRange);
            }
            return Self::from_minutes(hour * 60 + minute);
        }

        Err(TimeSlotParseError::Unrecognized)
    }

    /// Raw minutes-since-midnight value.
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Render as zero-padded 24-hour `HH:MM`.
    pub fn to_hhmm(self) -> String {
        format!("{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hhmm())
    }
}

impl TryFrom<u16> for TimeSlot {
    type Error = TimeSlotParseError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_minutes(value)
    }
}

impl From<TimeSlot> for u16 {
    fn from(value: TimeSlot) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("00:00", 0)]
    #[case("9:05", 545)]
    #[case("09:00", 540)]
    #[case("23:59", 1439)]
    #[case("12:00 AM", 0)]
    #[case("12:30 am", 30)]
    #[case("12:00 PM", 720)]
    #[case("3:40 PM", 940)]
    #[case("03:40 pm", 940)]
    #[case("  10:15 Am  ", 615)]
    #[case("11:59 PM", 1439)]
    fn parses_valid_time_strings(#[case] input: &str, #[case] minutes: u16) {
        let slot = TimeSlot::parse(input).expect("valid time");
        assert_eq!(slot.minutes(), minutes);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("noon")]
    #[case("9")]
    #[case("9:5")]
    #[case("9.30")]
    #[case("9:30:15")]
    #[case("9:30 XM")]
    fn rejects_unrecognized_shapes(#[case] input: &str) {
        assert_eq!(
            TimeSlot::parse(input),
            Err(TimeSlotParseError::Unrecognized)
        );
    }

    #[rstest]
    #[case("24:00")]
    #[case("25:00")]
    #[case("10:60")]
    #[case("0:15 PM")]
    #[case("13:00 PM")]
    fn rejects_out_of_range_components(#[case] input: &str) {
        assert_eq!(TimeSlot::parse(input), Err(TimeSlotParseError::OutOfRange));
    }

    #[test]
    fn every_minute_of_the_day_round_trips() {
        for minutes in 0..MINUTES_PER_DAY {
            let slot = TimeSlot::from_minutes(minutes).expect("in range");
            let rendered = slot.to_hhmm();
            let reparsed = TimeSlot::parse(&rendered).expect("rendered form parses");
            assert_eq!(reparsed.minutes(), minutes, "round trip for {rendered}");
        }
    }

    #[rstest]
    #[case(0, "00:00")]
    #[case(5, "00:05")]
    #[case(540, "09:00")]
    #[case(940, "15:40")]
    #[case(1439, "23:59")]
    fn rendering_zero_pads_both_components(#[case] minutes: u16, #[case] expected: &str) {
        let slot = TimeSlot::from_minutes(minutes).expect("in range");
        assert_eq!(slot.to_hhmm(), expected);
    }

    #[test]
    fn minutes_outside_the_day_are_rejected() {
        assert_eq!(
            TimeSlot::from_minutes(1440),
            Err(TimeSlotParseError::OutOfRange)
        );
    }
}
