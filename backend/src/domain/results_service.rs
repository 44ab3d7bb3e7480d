//! Read and write use-cases over the append-only result history.
//!
//! The repositories hand back raw rows; everything "latest" is derived here.
//! Recency is insertion order: among competing rows the largest id wins,
//! regardless of slot. An operator can declare 11:00 first and 09:30 later,
//! and the 09:30 row is the more recent fact.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::error::Error;
use super::game::{Game, GameCode};
use super::ports::{GameRepository, ResultRepository};
use super::result::{
    AppendedResult, DateStamp, MonthRef, NewResult, ResultRow, ResultValue, MANUAL_SOURCE,
    UNDECLARED_VALUE,
};
use super::timeslot::TimeSlot;

/// One output row of the per-day timewise table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimewiseRow {
    pub slot: TimeSlot,
    /// Game code → declared value at this slot.
    pub values: BTreeMap<String, String>,
}

/// Per-day timewise table: full game list plus one row per populated slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimewiseDay {
    pub date: DateStamp,
    pub games: Vec<Game>,
    pub rows: Vec<TimewiseRow>,
}

/// Values declared as of a time of day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotView {
    pub date: DateStamp,
    pub slot: TimeSlot,
    /// Game code → latest value with `slot_min <= slot`, or `"XX"`.
    pub values: BTreeMap<String, String>,
}

/// One output row of the monthly table: a date plus each game's final value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyRow {
    pub date: DateStamp,
    pub values: BTreeMap<String, String>,
}

/// Month-wide table of final values per day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTable {
    pub month: MonthRef,
    /// Codes included in the value mappings, in display order.
    pub games: Vec<String>,
    pub rows: Vec<MonthlyRow>,
}

/// Use-cases over games and their result history.
#[derive(Clone)]
pub struct ResultsService {
    games: Arc<dyn GameRepository>,
    results: Arc<dyn ResultRepository>,
}

impl ResultsService {
    pub fn new(games: Arc<dyn GameRepository>, results: Arc<dyn ResultRepository>) -> Self {
        Self { games, results }
    }

    /// Append one history row for a game, never overwriting prior rows.
    pub async fn append(
        &self,
        code: &GameCode,
        date: DateStamp,
        slot: TimeSlot,
        value: ResultValue,
        note: Option<String>,
    ) -> Result<AppendedResult, Error> {
        let game = self
            .games
            .find_by_code(code)
            .await?
            .ok_or_else(|| Error::not_found("Game not found"))?;

        let row = NewResult {
            game_id: game.id,
            date: date.clone(),
            slot,
            value: value.clone(),
            source: MANUAL_SOURCE.to_owned(),
            note: note.unwrap_or_default(),
        };
        let id = self.results.insert(&row).await?;

        Ok(AppendedResult {
            id,
            game_code: game.code,
            date,
            slot,
            value,
        })
    }

    /// Delete one historical row by id.
    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        self.results.delete_by_id(id).await?;
        Ok(())
    }

    /// Per-slot values for a day.
    ///
    /// The full game list is always returned so callers can render every
    /// column; `filter` only narrows which codes appear in the mappings.
    pub async fn timewise(
        &self,
        date: &DateStamp,
        filter: &[GameCode],
    ) -> Result<TimewiseDay, Error> {
        let games = self.games.list().await?;
        let in_scope = scope_codes(&games, filter);
        let scope_set: BTreeSet<&str> = in_scope.iter().map(String::as_str).collect();
        let code_of: BTreeMap<i32, &GameCode> =
            games.iter().map(|g| (g.id, &g.code)).collect();

        let rows = self.results.rows_for_date(date).await?;
        let mut by_slot: BTreeMap<TimeSlot, BTreeMap<String, String>> = BTreeMap::new();
        for row in ordered_by_id(rows) {
            let Some(code) = code_of.get(&row.game_id) else {
                continue;
            };
            if !scope_set.contains(code.as_str()) {
                continue;
            }
            by_slot
                .entry(row.slot)
                .or_default()
                .insert(code.as_str().to_owned(), row.value.as_str().to_owned());
        }

        Ok(TimewiseDay {
            date: date.clone(),
            games,
            rows: by_slot
                .into_iter()
                .map(|(slot, values)| TimewiseRow { slot, values })
                .collect(),
        })
    }

    /// Latest value per game as of `slot` on `date`, `"XX"` where nothing has
    /// been declared yet.
    pub async fn snapshot(
        &self,
        date: &DateStamp,
        slot: TimeSlot,
        filter: &[GameCode],
    ) -> Result<SnapshotView, Error> {
        let games = self.games.list().await?;
        let in_scope = scope_codes(&games, filter);
        let scope_set: BTreeSet<&str> = in_scope.iter().map(String::as_str).collect();
        let code_of: BTreeMap<i32, &GameCode> =
            games.iter().map(|g| (g.id, &g.code)).collect();

        let mut values: BTreeMap<String, String> = games
            .iter()
            .filter(|g| scope_set.contains(g.code.as_str()))
            .map(|g| (g.code.as_str().to_owned(), UNDECLARED_VALUE.to_owned()))
            .collect();

        let rows = self.results.rows_for_date(date).await?;
        for row in ordered_by_id(rows) {
            if row.slot > slot {
                continue;
            }
            let Some(code) = code_of.get(&row.game_id) else {
                continue;
            };
            if let Some(entry) = values.get_mut(code.as_str()) {
                *entry = row.value.as_str().to_owned();
            }
        }

        Ok(SnapshotView {
            date: date.clone(),
            slot,
            values,
        })
    }

    /// Final value per game per day across a month.
    pub async fn monthly(
        &self,
        month: MonthRef,
        filter: &[GameCode],
    ) -> Result<MonthlyTable, Error> {
        let games = self.games.list().await?;
        let in_scope = scope_codes(&games, filter);
        let scope_set: BTreeSet<&str> = in_scope.iter().map(String::as_str).collect();
        let code_of: BTreeMap<i32, &GameCode> =
            games.iter().map(|g| (g.id, &g.code)).collect();

        let rows = self.results.rows_for_month(month).await?;
        let mut by_date: BTreeMap<DateStamp, BTreeMap<String, String>> = BTreeMap::new();
        for row in ordered_by_id(rows) {
            let Some(code) = code_of.get(&row.game_id) else {
                continue;
            };
            if !scope_set.contains(code.as_str()) {
                continue;
            }
            by_date
                .entry(row.date.clone())
                .or_default()
                .insert(code.as_str().to_owned(), row.value.as_str().to_owned());
        }

        Ok(MonthlyTable {
            month,
            games: in_scope,
            rows: by_date
                .into_iter()
                .map(|(date, values)| MonthlyRow { date, values })
                .collect(),
        })
    }
}

/// Codes included in value mappings: the filter when given, else every game
/// in display order.
fn scope_codes(games: &[Game], filter: &[GameCode]) -> Vec<String> {
    if filter.is_empty() {
        games.iter().map(|g| g.code.as_str().to_owned()).collect()
    } else {
        filter.iter().map(|c| c.as_str().to_owned()).collect()
    }
}

/// Re-sort rows by id so later folds apply appends in insertion order and the
/// largest id ends up winning every mapping.
fn ordered_by_id(mut rows: Vec<ResultRow>) -> Vec<ResultRow> {
    rows.sort_by_key(|row| row.id);
    rows
}
