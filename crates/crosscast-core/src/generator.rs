//! Daily puzzle generation.
//!
//! Generation is a bounded randomized search. Each attempt shuffles the pool
//! of shows that have at least one eligible person, takes the first three as
//! rows and the next three as columns, and accepts the grid only if all nine
//! row × column intersections (over eligible people) are non-empty. The
//! shuffle is seeded from the target date and attempt number, so the search
//! is fully deterministic per date; see [`crate::rng`].

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::{
  catalog::{AppearanceRef, PersonId, ShowId},
  error::{Error, Result},
  puzzle::{CellCount, DailyPuzzle, NewDailyPuzzle},
  rng::{GridRng, attempt_label},
  store::GridStore,
};

/// A grid needs three rows and three columns, all distinct.
pub const MIN_POOL_SHOWS: usize = 6;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
  /// Shuffle attempts before giving up on a date.
  pub max_attempts: u32,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self { max_attempts: 100 }
  }
}

/// A persisted puzzle together with generation metadata.
#[derive(Debug, Clone)]
pub struct GeneratedPuzzle {
  pub puzzle:  DailyPuzzle,
  /// Answer counts per cell, indexed `[row][col]`.
  pub counts:  [[u32; 3]; 3],
  /// The attempt number that produced the accepted grid, from 1.
  pub attempt: u32,
}

/// Generate and persist the puzzle for `date`, replacing any existing one.
///
/// Fails with [`Error::InsufficientData`] when fewer than
/// [`MIN_POOL_SHOWS`] shows have eligible people (nothing is written), and
/// with [`Error::GenerationFailed`] when the attempt budget is exhausted
/// without finding a valid grid. Exhaustion is a real error: no partial or
/// invalid grid is ever persisted.
pub async fn generate<S: GridStore>(
  store: &S,
  date: NaiveDate,
  config: &GeneratorConfig,
) -> Result<GeneratedPuzzle> {
  let edges = store
    .read_eligible_appearances()
    .await
    .map_err(Error::store_read)?;
  let pool = people_by_show(&edges);

  if pool.len() < MIN_POOL_SHOWS {
    return Err(Error::InsufficientData {
      available: pool.len(),
      required:  MIN_POOL_SHOWS,
    });
  }

  // The shuffle input must not depend on map iteration order.
  let mut show_ids: Vec<ShowId> = pool.keys().copied().collect();
  show_ids.sort_unstable();

  for attempt in 1..=config.max_attempts {
    let Some(candidate) = attempt_grid(&pool, &show_ids, date, attempt)
    else {
      continue;
    };
    tracing::debug!(%date, attempt, "grid candidate accepted");

    let puzzle = store
      .upsert_daily_puzzle(candidate.to_new_puzzle(date, attempt))
      .await
      .map_err(Error::store_write)?;
    store
      .upsert_daily_cells(puzzle.puzzle_id, candidate.cells())
      .await
      .map_err(Error::store_write)?;

    return Ok(GeneratedPuzzle {
      puzzle,
      counts: candidate.counts,
      attempt,
    });
  }

  tracing::warn!(
    %date,
    attempts = config.max_attempts,
    pool = pool.len(),
    "attempt budget exhausted without a valid grid"
  );
  Err(Error::GenerationFailed { date, attempts: config.max_attempts })
}

/// Index the eligible-appearance edges as show → set of people.
fn people_by_show(
  edges: &[AppearanceRef],
) -> HashMap<ShowId, HashSet<PersonId>> {
  let mut pool: HashMap<ShowId, HashSet<PersonId>> = HashMap::new();
  for edge in edges {
    pool.entry(edge.show_id).or_default().insert(edge.person_id);
  }
  pool
}

struct GridCandidate {
  rows:   [ShowId; 3],
  cols:   [ShowId; 3],
  counts: [[u32; 3]; 3],
}

impl GridCandidate {
  fn to_new_puzzle(&self, date: NaiveDate, attempt: u32) -> NewDailyPuzzle {
    NewDailyPuzzle {
      date,
      seed: attempt_label(date, attempt),
      row_show_ids: self.rows,
      col_show_ids: self.cols,
    }
  }

  fn cells(&self) -> [CellCount; 9] {
    let mut cells = [CellCount { row: 0, col: 0, answer_count: 0 }; 9];
    for (r, row_counts) in self.counts.iter().enumerate() {
      for (c, count) in row_counts.iter().enumerate() {
        cells[r * 3 + c] = CellCount {
          row:          r as u8,
          col:          c as u8,
          answer_count: *count,
        };
      }
    }
    cells
  }
}

/// One seeded attempt: shuffle, split, validate.
fn attempt_grid(
  pool: &HashMap<ShowId, HashSet<PersonId>>,
  show_ids: &[ShowId],
  date: NaiveDate,
  attempt: u32,
) -> Option<GridCandidate> {
  let mut rng = GridRng::for_attempt(date, attempt);
  let mut shuffled = show_ids.to_vec();
  shuffle(&mut rng, &mut shuffled);

  let rows = [shuffled[0], shuffled[1], shuffled[2]];
  let cols = [shuffled[3], shuffled[4], shuffled[5]];
  let counts = grid_counts(pool, &rows, &cols)?;
  Some(GridCandidate { rows, cols, counts })
}

/// Fisher–Yates, one draw per swap.
fn shuffle<T>(rng: &mut GridRng, slice: &mut [T]) {
  for i in (1..slice.len()).rev() {
    let j = rng.next_index(i + 1);
    slice.swap(i, j);
  }
}

/// Answer counts for all nine cells, or `None` as soon as one row × column
/// intersection is empty. Callers guarantee every id is a pool key.
fn grid_counts(
  pool: &HashMap<ShowId, HashSet<PersonId>>,
  rows: &[ShowId; 3],
  cols: &[ShowId; 3],
) -> Option<[[u32; 3]; 3]> {
  let mut counts = [[0u32; 3]; 3];
  for (r, row_show) in rows.iter().enumerate() {
    for (c, col_show) in cols.iter().enumerate() {
      let shared = pool[row_show].intersection(&pool[col_show]).count();
      if shared == 0 {
        return None;
      }
      counts[r][c] = shared as u32;
    }
  }
  Some(counts)
}
