//! Handlers for `/puzzle` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/puzzle/today` | Today in UTC; 404 until generated |
//! | `GET`  | `/puzzle/{date}` | `YYYY-MM-DD`; 404 if absent or incomplete |

use std::{collections::HashMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::{NaiveDate, Utc};
use crosscast_core::{
  catalog::ShowId,
  puzzle::PuzzleId,
  store::GridStore,
};
use serde::Serialize;

use crate::{MAX_WRONG_GUESSES, error::ApiError};

#[derive(Debug, Serialize)]
pub struct PuzzleResponse {
  pub puzzle_id: PuzzleId,
  pub date:      NaiveDate,
  pub rows:      Vec<ShowSummary>,
  pub cols:      Vec<ShowSummary>,
  pub cells:     Vec<CellSummary>,
  pub rules:     Rules,
}

#[derive(Debug, Serialize)]
pub struct ShowSummary {
  pub id:          ShowId,
  pub name:        String,
  pub poster_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CellSummary {
  pub row:          u8,
  pub col:          u8,
  pub answer_count: u32,
}

#[derive(Debug, Serialize)]
pub struct Rules {
  pub max_wrong: u32,
}

/// `GET /puzzle/today`
pub async fn today<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<PuzzleResponse>, ApiError>
where
  S: GridStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  fetch_for_date(store.as_ref(), Utc::now().date_naive()).await.map(Json)
}

/// `GET /puzzle/{date}`
pub async fn by_date<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<PuzzleResponse>, ApiError>
where
  S: GridStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  fetch_for_date(store.as_ref(), date).await.map(Json)
}

async fn fetch_for_date<S>(
  store: &S,
  date: NaiveDate,
) -> Result<PuzzleResponse, ApiError>
where
  S: GridStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let not_found = || ApiError::NotFound(format!("no puzzle for {date}"));

  let puzzle = store
    .read_puzzle_by_date(date)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(not_found)?;

  let cells = store
    .read_cells(puzzle.puzzle_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  // A header without its full cell set is a partially persisted puzzle.
  // Report it as absent rather than serving an unplayable grid.
  if cells.len() != 9 {
    return Err(not_found());
  }

  let show_ids: Vec<ShowId> = puzzle
    .row_show_ids
    .iter()
    .chain(puzzle.col_show_ids.iter())
    .copied()
    .collect();
  let shows = store
    .read_shows(show_ids)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let by_id: HashMap<ShowId, crosscast_core::catalog::Show> =
    shows.into_iter().map(|s| (s.show_id, s)).collect();

  let summarize = |id: &ShowId| match by_id.get(id) {
    Some(show) => ShowSummary {
      id:          *id,
      name:        show.name.clone(),
      poster_path: show.poster_path.clone(),
    },
    None => ShowSummary {
      id:          *id,
      name:        "Unknown".to_owned(),
      poster_path: None,
    },
  };

  Ok(PuzzleResponse {
    puzzle_id: puzzle.puzzle_id,
    date:      puzzle.date,
    rows:      puzzle.row_show_ids.iter().map(summarize).collect(),
    cols:      puzzle.col_show_ids.iter().map(summarize).collect(),
    cells:     cells
      .iter()
      .map(|c| CellSummary {
        row:          c.row,
        col:          c.col,
        answer_count: c.answer_count,
      })
      .collect(),
    rules:     Rules { max_wrong: MAX_WRONG_GUESSES },
  })
}
