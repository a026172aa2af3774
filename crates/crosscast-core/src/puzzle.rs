//! Daily puzzle domain types.
//!
//! A puzzle is a 3×3 grid: three row shows crossed with three column shows.
//! The header row stores the show selection; the nine cell rows cache the
//! answer count per intersection, computed at generation time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ShowId;

pub type PuzzleId = Uuid;

/// A persisted daily puzzle header. At most one exists per calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPuzzle {
  pub puzzle_id:    PuzzleId,
  pub date:         NaiveDate,
  /// Label of the attempt that produced this grid, `"<date>:<attempt>"`.
  /// Recorded for reproducibility; see [`crate::rng`].
  pub seed:         String,
  pub row_show_ids: [ShowId; 3],
  pub col_show_ids: [ShowId; 3],
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::GridStore::upsert_daily_puzzle`]. The puzzle id
/// and creation timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDailyPuzzle {
  pub date:         NaiveDate,
  pub seed:         String,
  pub row_show_ids: [ShowId; 3],
  pub col_show_ids: [ShowId; 3],
}

/// A persisted cell of a daily puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCell {
  pub puzzle_id:    PuzzleId,
  /// Row index, 0..=2.
  pub row:          u8,
  /// Column index, 0..=2.
  pub col:          u8,
  /// Number of eligible people satisfying this row × column pair at
  /// generation time. Always at least 1 for a published puzzle.
  pub answer_count: u32,
}

/// One cell's coordinates and answer count, before a puzzle id exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCount {
  pub row:          u8,
  pub col:          u8,
  pub answer_count: u32,
}
