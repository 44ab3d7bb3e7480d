//! Result entities: append-only declared values per game, date, and slot.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::game::GameCode;
use super::timeslot::TimeSlot;

/// Marker value meaning "no value declared yet".
pub const UNDECLARED_VALUE: &str = "XX";

/// Source label attached to rows created through the live API.
pub const MANUAL_SOURCE: &str = "manual";

/// Validation errors for result fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultValidationError {
    /// Date string does not match `YYYY-MM-DD`.
    BadDate,
    /// Declared value is longer than four characters.
    ValueTooLong,
    /// Month is outside `1..=12` or the year is not positive.
    BadMonth,
}

impl fmt::Display for ResultValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadDate => write!(f, "dateStr must look like YYYY-MM-DD"),
            Self::ValueTooLong => write!(f, "value must be at most 4 characters"),
            Self::BadMonth => write!(f, "year and month (1-12) are required"),
        }
    }
}

impl std::error::Error for ResultValidationError {}

static DATE_RE: OnceLock<Regex> = OnceLock::new();

fn date_regex() -> &'static Regex {
    DATE_RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"))
}

/// Calendar date carried as a `YYYY-MM-DD` string.
///
/// The store keys results by this string rather than a parsed date type, so
/// validation is shape-only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateStamp(String);

impl DateStamp {
    /// Validate a raw date string.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ResultValidationError> {
        let trimmed = raw.as_ref().trim();
        if date_regex().is_match(trimmed) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(ResultValidationError::BadDate)
        }
    }

    /// The validated date string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DateStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DateStamp> for String {
    fn from(value: DateStamp) -> Self {
        value.0
    }
}

impl TryFrom<String> for DateStamp {
    type Error = ResultValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A calendar month used by the monthly aggregation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRef {
    year: i32,
    month: u32,
}

impl MonthRef {
    /// Validate a year/month pair.
    pub fn new(year: i32, month: u32) -> Result<Self, ResultValidationError> {
        if year < 1 || !(1..=12).contains(&month) {
            return Err(ResultValidationError::BadMonth);
        }
        Ok(Self { year, month })
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// `YYYY-MM-` prefix matching every date stamp inside the month.
    pub fn date_prefix(self) -> String {
        format!("{:04}-{:02}-", self.year, self.month)
    }
}

/// Declared value: one to four characters, or the `"XX"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResultValue(String);

impl ResultValue {
    /// Validate a raw value; blank input collapses to the sentinel.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ResultValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Ok(Self::undeclared());
        }
        if trimmed.chars().count() > 4 {
            return Err(ResultValidationError::ValueTooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The `"XX"` sentinel.
    pub fn undeclared() -> Self {
        Self(UNDECLARED_VALUE.to_owned())
    }

    /// The validated value string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for ResultValue {
    fn default() -> Self {
        Self::undeclared()
    }
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ResultValue> for String {
    fn from(value: ResultValue) -> Self {
        value.0
    }
}

impl TryFrom<String> for ResultValue {
    type Error = ResultValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A persisted history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub id: i64,
    pub game_id: i32,
    pub date: DateStamp,
    pub slot: TimeSlot,
    pub value: ResultValue,
    pub source: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Validated input for appending one history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResult {
    pub game_id: i32,
    pub date: DateStamp,
    pub slot: TimeSlot,
    pub value: ResultValue,
    pub source: String,
    pub note: String,
}

/// Receipt returned after a successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedResult {
    pub id: i64,
    pub game_code: GameCode,
    pub date: DateStamp,
    pub slot: TimeSlot,
    pub value: ResultValue,
}
