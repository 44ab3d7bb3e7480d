//! Game entities: named recurring draws identified by a short unique code.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sort key applied when a single create omits `orderIndex`.
pub const CREATE_ORDER_INDEX_DEFAULT: i32 = 1;

/// Sort key applied when a bulk-upsert item omits `orderIndex`.
pub const BULK_ORDER_INDEX_DEFAULT: i32 = 999;

/// Validation errors for game fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameValidationError {
    EmptyName,
    EmptyCode,
}

impl fmt::Display for GameValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyCode => write!(f, "code must not be empty"),
        }
    }
}

impl std::error::Error for GameValidationError {}

/// Stable game identifier: trimmed, upper-cased, never empty.
///
/// Every lookup, rename collision check, and result append goes through the
/// code rather than the surrogate id, so normalization happens exactly once,
/// here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameCode(String);

impl GameCode {
    /// Normalize and validate a raw code string.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, GameValidationError> {
        let normalized = raw.as_ref().trim().to_uppercase();
        if normalized.is_empty() {
            return Err(GameValidationError::EmptyCode);
        }
        Ok(Self(normalized))
    }

    /// The normalized code string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for GameCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<GameCode> for String {
    fn from(value: GameCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for GameCode {
    type Error = GameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Trimmed, non-empty display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameName(String);

impl GameName {
    /// Trim and validate a raw name string.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, GameValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GameValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The trimmed name string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for GameName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<GameName> for String {
    fn from(value: GameName) -> Self {
        value.0
    }
}

impl TryFrom<String> for GameName {
    type Error = GameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A persisted game row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: i32,
    pub name: String,
    pub code: GameCode,
    pub default_time: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a single game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameDraft {
    pub name: GameName,
    pub code: GameCode,
    pub default_time: String,
    pub order_index: i32,
}

impl GameDraft {
    /// Build a draft from raw request fields, applying the single-create
    /// `order_index` default of 1.
    pub fn from_request(
        name: &str,
        code: &str,
        default_time: Option<&str>,
        order_index: Option<i32>,
    ) -> Result<Self, GameValidationError> {
        Ok(Self {
            name: GameName::new(name)?,
            code: GameCode::new(code)?,
            default_time: default_time.unwrap_or_default().trim().to_owned(),
            order_index: order_index.unwrap_or(CREATE_ORDER_INDEX_DEFAULT),
        })
    }
}

/// Validated item for the transactional bulk upsert.
///
/// Bulk input is operator-pasted and forgiving: items with a blank name or
/// code are skipped rather than rejected, and omitted sort keys fall back to
/// 999 so new rows sink to the bottom of listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameUpsertItem {
    pub name: GameName,
    pub code: GameCode,
    pub default_time: String,
    pub order_index: i32,
}

impl GameUpsertItem {
    /// Build an item from loose bulk input; `None` means "skip this item".
    pub fn from_loose(
        name: &str,
        code: &str,
        default_time: Option<&str>,
        order_index: Option<i32>,
    ) -> Option<Self> {
        let name = GameName::new(name).ok()?;
        let code = GameCode::new(code).ok()?;
        Some(Self {
            name,
            code,
            default_time: default_time.unwrap_or_default().trim().to_owned(),
            order_index: order_index.unwrap_or(BULK_ORDER_INDEX_DEFAULT),
        })
    }
}

/// Partial update for an existing game; omitted fields keep current values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamePatch {
    pub new_code: Option<GameCode>,
    pub name: Option<GameName>,
    pub default_time: Option<String>,
    pub order_index: Option<i32>,
}

impl GamePatch {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.new_code.is_none()
            && self.name.is_none()
            && self.default_time.is_none()
            && self.order_index.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("gali", "GALI")]
    #[case("  desawer  ", "DESAWER")]
    #[case("Faridabad", "FARIDABAD")]
    fn codes_are_trimmed_and_upper_cased(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(GameCode::new(raw).expect("valid code").as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_codes_are_rejected(#[case] raw: &str) {
        assert_eq!(GameCode::new(raw), Err(GameValidationError::EmptyCode));
    }

    #[rstest]
    fn draft_defaults_order_index_to_one() {
        let draft =
            GameDraft::from_request("Gali", "gali", None, None).expect("valid draft");
        assert_eq!(draft.order_index, CREATE_ORDER_INDEX_DEFAULT);
        assert_eq!(draft.code.as_str(), "GALI");
    }

    #[rstest]
    fn draft_rejects_blank_name() {
        assert_eq!(
            GameDraft::from_request("  ", "gali", None, None),
            Err(GameValidationError::EmptyName)
        );
    }

    #[rstest]
    fn bulk_item_defaults_order_index_to_999() {
        let item = GameUpsertItem::from_loose("Gali", "gali", None, None).expect("kept");
        assert_eq!(item.order_index, BULK_ORDER_INDEX_DEFAULT);
    }

    #[rstest]
    #[case("", "gali")]
    #[case("Gali", "")]
    #[case("  ", "  ")]
    fn bulk_items_with_blank_fields_are_skipped(#[case] name: &str, #[case] code: &str) {
        assert!(GameUpsertItem::from_loose(name, code, None, None).is_none());
    }

    #[rstest]
    fn empty_patch_reports_empty() {
        assert!(GamePatch::default().is_empty());
        let patch = GamePatch {
            order_index: Some(5),
            ..GamePatch::default()
        };
        assert!(!patch.is_empty());
    }
}
