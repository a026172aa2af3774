//! Conversions between domain types and the plain-text forms stored in
//! SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as ISO 8601,
//! show-id triples as compact JSON arrays, and UUIDs as hyphenated lowercase
//! strings.

use chrono::{DateTime, NaiveDate, Utc};
use crosscast_core::{
  catalog::{AppearanceKind, ShowId},
  puzzle::DailyPuzzle,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String { date.to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse().map_err(|e: chrono::ParseError| Error::DateParse(e.to_string()))
}

// ─── AppearanceKind ──────────────────────────────────────────────────────────

pub fn encode_kind(kind: AppearanceKind) -> &'static str {
  match kind {
    AppearanceKind::Main => "main",
    AppearanceKind::Guest => "guest",
    AppearanceKind::Both => "both",
  }
}

pub fn decode_kind(s: &str) -> Result<AppearanceKind> {
  match s {
    "main" => Ok(AppearanceKind::Main),
    "guest" => Ok(AppearanceKind::Guest),
    "both" => Ok(AppearanceKind::Both),
    other => Err(Error::UnknownKind(other.to_owned())),
  }
}

// ─── Show-id triples ─────────────────────────────────────────────────────────

pub fn encode_show_ids(ids: &[ShowId; 3]) -> Result<String> {
  Ok(serde_json::to_string(ids)?)
}

pub fn decode_show_ids(s: &str) -> Result<[ShowId; 3]> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `daily_puzzles` row.
pub struct RawPuzzle {
  pub puzzle_id:    String,
  pub puzzle_date:  String,
  pub seed:         String,
  pub row_show_ids: String,
  pub col_show_ids: String,
  pub created_at:   String,
}

impl RawPuzzle {
  pub fn into_puzzle(self) -> Result<DailyPuzzle> {
    Ok(DailyPuzzle {
      puzzle_id:    decode_uuid(&self.puzzle_id)?,
      date:         decode_date(&self.puzzle_date)?,
      seed:         self.seed,
      row_show_ids: decode_show_ids(&self.row_show_ids)?,
      col_show_ids: decode_show_ids(&self.col_show_ids)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
