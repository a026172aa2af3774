//! [`SqliteStore`] — the SQLite implementation of [`GridStore`].

use std::{collections::HashSet, path::Path};

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crosscast_core::{
  catalog::{
    Appearance, AppearanceRef, NewAppearance, NewPerson, Person,
    PersonEligibility, PersonId, Show, ShowId,
  },
  puzzle::{CellCount, DailyCell, DailyPuzzle, NewDailyPuzzle, PuzzleId},
  store::GridStore,
};

use crate::{
  Error, Result,
  encode::{
    RawPuzzle, decode_kind, encode_date, encode_dt, encode_kind,
    encode_show_ids, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A crosscast grid store backed by a single SQLite file.
///
/// Cheap to clone: the wrapped connection handle is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a transient in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── GridStore impl ──────────────────────────────────────────────────────────

impl GridStore for SqliteStore {
  type Error = Error;

  // ── Catalog ingestion ─────────────────────────────────────────────────────

  async fn upsert_shows(&self, shows: Vec<Show>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO shows (show_id, name, poster_path, popularity_rank)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(show_id) DO UPDATE SET
               name            = excluded.name,
               poster_path     = excluded.poster_path,
               popularity_rank = excluded.popularity_rank",
          )?;
          for show in &shows {
            stmt.execute(rusqlite::params![
              show.show_id,
              show.name,
              show.poster_path,
              show.popularity_rank,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn upsert_people(&self, people: Vec<NewPerson>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          // Derived columns keep their defaults on insert and are left
          // untouched on conflict; only the eligibility pass writes them.
          let mut stmt = tx.prepare(
            "INSERT INTO people (person_id, name, profile_path)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(person_id) DO UPDATE SET
               name         = excluded.name,
               profile_path = excluded.profile_path",
          )?;
          for person in &people {
            stmt.execute(rusqlite::params![
              person.person_id,
              person.name,
              person.profile_path,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn upsert_appearances(
    &self,
    appearances: Vec<NewAppearance>,
  ) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          // On conflict the episode counts merge by per-field maximum
          // (NULL only survives when both sides are NULL) and kind is
          // reclassified from the merged counts. All SET expressions see
          // the pre-update row, so the two are consistent.
          let mut stmt = tx.prepare(
            "INSERT INTO appearances
               (show_id, person_id, episode_count, guest_episode_count, kind)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(show_id, person_id) DO UPDATE SET
               episode_count = CASE
                 WHEN appearances.episode_count IS NULL
                   THEN excluded.episode_count
                 WHEN excluded.episode_count IS NULL
                   THEN appearances.episode_count
                 ELSE max(appearances.episode_count, excluded.episode_count)
               END,
               guest_episode_count = CASE
                 WHEN appearances.guest_episode_count IS NULL
                   THEN excluded.guest_episode_count
                 WHEN excluded.guest_episode_count IS NULL
                   THEN appearances.guest_episode_count
                 ELSE max(appearances.guest_episode_count,
                          excluded.guest_episode_count)
               END,
               kind = CASE
                 WHEN max(coalesce(appearances.episode_count, 0),
                          coalesce(excluded.episode_count, 0)) > 0
                  AND max(coalesce(appearances.guest_episode_count, 0),
                          coalesce(excluded.guest_episode_count, 0)) > 0
                   THEN 'both'
                 WHEN max(coalesce(appearances.episode_count, 0),
                          coalesce(excluded.episode_count, 0)) > 0
                   THEN 'main'
                 WHEN max(coalesce(appearances.guest_episode_count, 0),
                          coalesce(excluded.guest_episode_count, 0)) > 0
                   THEN 'guest'
                 ELSE NULL
               END",
          )?;
          for row in &appearances {
            stmt.execute(rusqlite::params![
              row.show_id,
              row.person_id,
              row.episode_count,
              row.guest_episode_count,
              row.kind().map(encode_kind),
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Appearance relation reads ─────────────────────────────────────────────

  async fn read_all_appearances(&self) -> Result<Vec<AppearanceRef>> {
    let rows: Vec<AppearanceRef> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT person_id, show_id FROM appearances")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(AppearanceRef { person_id: row.get(0)?, show_id: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn read_eligible_appearances(&self) -> Result<Vec<AppearanceRef>> {
    let rows: Vec<AppearanceRef> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT person_id, show_id FROM eligible_appearances")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(AppearanceRef { person_id: row.get(0)?, show_id: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn read_appearances_for_show(
    &self,
    show_id: ShowId,
    eligible_only: bool,
  ) -> Result<HashSet<PersonId>> {
    let people: HashSet<PersonId> = self
      .conn
      .call(move |conn| {
        let sql = if eligible_only {
          "SELECT person_id FROM eligible_appearances WHERE show_id = ?1"
        } else {
          "SELECT person_id FROM appearances WHERE show_id = ?1"
        };
        let mut stmt = conn.prepare(sql)?;
        let people = stmt
          .query_map(rusqlite::params![show_id], |row| row.get(0))?
          .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(people)
      })
      .await?;
    Ok(people)
  }

  async fn read_shows_for_person(
    &self,
    person_id: PersonId,
  ) -> Result<HashSet<ShowId>> {
    let shows: HashSet<ShowId> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare("SELECT show_id FROM appearances WHERE person_id = ?1")?;
        let shows = stmt
          .query_map(rusqlite::params![person_id], |row| row.get(0))?
          .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(shows)
      })
      .await?;
    Ok(shows)
  }

  async fn read_appearance(
    &self,
    show_id: ShowId,
    person_id: PersonId,
  ) -> Result<Option<Appearance>> {
    let row: Option<(Option<u32>, Option<u32>, Option<String>)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT episode_count, guest_episode_count, kind
               FROM appearances WHERE show_id = ?1 AND person_id = ?2",
              rusqlite::params![show_id, person_id],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((episode_count, guest_episode_count, kind_str)) = row else {
      return Ok(None);
    };
    Ok(Some(Appearance {
      show_id,
      person_id,
      episode_count,
      guest_episode_count,
      kind: kind_str.as_deref().map(decode_kind).transpose()?,
    }))
  }

  // ── Eligibility ───────────────────────────────────────────────────────────

  async fn read_person_ids(&self) -> Result<Vec<PersonId>> {
    let ids: Vec<PersonId> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT person_id FROM people")?;
        let ids = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  async fn write_person_eligibility(
    &self,
    rows: Vec<PersonEligibility>,
  ) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "UPDATE people
             SET distinct_show_count = ?2, is_eligible = ?3
             WHERE person_id = ?1",
          )?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              row.person_id,
              row.distinct_show_count,
              row.is_eligible,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Hydration reads ───────────────────────────────────────────────────────

  async fn read_people(&self, ids: Vec<PersonId>) -> Result<Vec<Person>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let people: Vec<Person> = self
      .conn
      .call(move |conn| {
        let placeholders =
          ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
          "SELECT person_id, name, profile_path, distinct_show_count,
                  is_eligible
           FROM people WHERE person_id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let people = stmt
          .query_map(rusqlite::params_from_iter(ids), |row| {
            Ok(Person {
              person_id:           row.get(0)?,
              name:                row.get(1)?,
              profile_path:        row.get(2)?,
              distinct_show_count: row.get(3)?,
              is_eligible:         row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(people)
      })
      .await?;
    Ok(people)
  }

  async fn read_shows(&self, ids: Vec<ShowId>) -> Result<Vec<Show>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let shows: Vec<Show> = self
      .conn
      .call(move |conn| {
        let placeholders =
          ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
          "SELECT show_id, name, poster_path, popularity_rank
           FROM shows WHERE show_id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let shows = stmt
          .query_map(rusqlite::params_from_iter(ids), |row| {
            Ok(Show {
              show_id:         row.get(0)?,
              name:            row.get(1)?,
              poster_path:     row.get(2)?,
              popularity_rank: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(shows)
      })
      .await?;
    Ok(shows)
  }

  // ── Daily puzzles ─────────────────────────────────────────────────────────

  async fn upsert_daily_puzzle(
    &self,
    input: NewDailyPuzzle,
  ) -> Result<DailyPuzzle> {
    let puzzle = DailyPuzzle {
      puzzle_id:    Uuid::new_v4(),
      date:         input.date,
      seed:         input.seed,
      row_show_ids: input.row_show_ids,
      col_show_ids: input.col_show_ids,
      created_at:   Utc::now(),
    };

    let id_str      = encode_uuid(puzzle.puzzle_id);
    let date_str    = encode_date(puzzle.date);
    let seed        = puzzle.seed.clone();
    let rows_json   = encode_show_ids(&puzzle.row_show_ids)?;
    let cols_json   = encode_show_ids(&puzzle.col_show_ids)?;
    let created_str = encode_dt(puzzle.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Replace by date: dropping the old header cascades to its cells,
        // so a regenerated date never leaves orphans.
        tx.execute(
          "DELETE FROM daily_puzzles WHERE puzzle_date = ?1",
          rusqlite::params![date_str],
        )?;
        tx.execute(
          "INSERT INTO daily_puzzles
             (puzzle_id, puzzle_date, seed, row_show_ids, col_show_ids,
              created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str, date_str, seed, rows_json, cols_json, created_str
          ],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(puzzle)
  }

  async fn upsert_daily_cells(
    &self,
    puzzle_id: PuzzleId,
    cells: [CellCount; 9],
  ) -> Result<()> {
    let id_str = encode_uuid(puzzle_id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO daily_cells (puzzle_id, row_idx, col_idx,
                                      answer_count)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(puzzle_id, row_idx, col_idx) DO UPDATE SET
               answer_count = excluded.answer_count",
          )?;
          for cell in cells {
            stmt.execute(rusqlite::params![
              id_str,
              cell.row,
              cell.col,
              cell.answer_count,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn read_puzzle_by_date(
    &self,
    date: NaiveDate,
  ) -> Result<Option<DailyPuzzle>> {
    let date_str = encode_date(date);

    let raw: Option<RawPuzzle> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT puzzle_id, puzzle_date, seed, row_show_ids,
                      col_show_ids, created_at
               FROM daily_puzzles WHERE puzzle_date = ?1",
              rusqlite::params![date_str],
              |row| {
                Ok(RawPuzzle {
                  puzzle_id:    row.get(0)?,
                  puzzle_date:  row.get(1)?,
                  seed:         row.get(2)?,
                  row_show_ids: row.get(3)?,
                  col_show_ids: row.get(4)?,
                  created_at:   row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPuzzle::into_puzzle).transpose()
  }

  async fn read_cells(&self, puzzle_id: PuzzleId) -> Result<Vec<DailyCell>> {
    let id_str = encode_uuid(puzzle_id);

    let cells: Vec<DailyCell> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT row_idx, col_idx, answer_count
           FROM daily_cells WHERE puzzle_id = ?1
           ORDER BY row_idx, col_idx",
        )?;
        let cells = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(DailyCell {
              puzzle_id,
              row:          row.get(0)?,
              col:          row.get(1)?,
              answer_count: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cells)
      })
      .await?;
    Ok(cells)
  }
}
