//! The `GridStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `crosscast-store-sqlite`). The algorithm layer and the API crate depend on
//! this abstraction, not on any concrete backend, so tests can substitute an
//! in-memory store.

use std::{
  collections::HashSet,
  future::Future,
};

use chrono::NaiveDate;

use crate::{
  catalog::{
    Appearance, AppearanceRef, NewAppearance, NewPerson, Person,
    PersonEligibility, PersonId, Show, ShowId,
  },
  puzzle::{CellCount, DailyCell, DailyPuzzle, NewDailyPuzzle, PuzzleId},
};

/// Abstraction over a crosscast storage backend.
///
/// Ingest writes are idempotent upserts keyed by the upstream catalog ids.
/// Bulk parameters are taken by value; backends typically move them onto a
/// connection worker.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait GridStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Catalog ingestion ─────────────────────────────────────────────────

  /// Upsert shows by `show_id`, replacing display metadata.
  fn upsert_shows(
    &self,
    shows: Vec<Show>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Upsert people by `person_id`, replacing identity fields only. Derived
  /// eligibility fields are never touched by this call.
  fn upsert_people(
    &self,
    people: Vec<NewPerson>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Upsert appearance edges by `(show_id, person_id)`.
  ///
  /// Re-ingesting an existing edge merges episode counts by taking the
  /// per-field maximum and reclassifies the appearance kind from the merged
  /// counts. The relation never holds two rows for the same pair.
  fn upsert_appearances(
    &self,
    appearances: Vec<NewAppearance>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Appearance relation reads ─────────────────────────────────────────

  /// The complete appearance relation as bare edges, in unspecified order.
  ///
  /// Implementations must return every row; a backend that silently caps
  /// the result (e.g. a default page size) corrupts eligibility derivation.
  fn read_all_appearances(
    &self,
  ) -> impl Future<Output = Result<Vec<AppearanceRef>, Self::Error>> + Send + '_;

  /// The appearance relation restricted to eligible people, in unspecified
  /// order. Same no-truncation requirement as [`read_all_appearances`].
  ///
  /// [`read_all_appearances`]: GridStore::read_all_appearances
  fn read_eligible_appearances(
    &self,
  ) -> impl Future<Output = Result<Vec<AppearanceRef>, Self::Error>> + Send + '_;

  /// People appearing in one show. With `eligible_only`, restricted to
  /// people whose eligibility flag is currently set.
  fn read_appearances_for_show(
    &self,
    show_id: ShowId,
    eligible_only: bool,
  ) -> impl Future<Output = Result<HashSet<PersonId>, Self::Error>> + Send + '_;

  /// Every show a person appears in, regardless of eligibility.
  fn read_shows_for_person(
    &self,
    person_id: PersonId,
  ) -> impl Future<Output = Result<HashSet<ShowId>, Self::Error>> + Send + '_;

  /// One appearance edge with its merged counts, or `None`. Diagnostic read.
  fn read_appearance(
    &self,
    show_id: ShowId,
    person_id: PersonId,
  ) -> impl Future<Output = Result<Option<Appearance>, Self::Error>> + Send + '_;

  // ── Eligibility ───────────────────────────────────────────────────────

  /// Ids of every stored person.
  fn read_person_ids(
    &self,
  ) -> impl Future<Output = Result<Vec<PersonId>, Self::Error>> + Send + '_;

  /// Bulk write of derived eligibility fields, keyed by person id.
  /// Rows whose person id is not stored are skipped.
  fn write_person_eligibility(
    &self,
    rows: Vec<PersonEligibility>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Hydration reads ───────────────────────────────────────────────────

  /// People by id, in unspecified order. Unknown ids are omitted.
  fn read_people(
    &self,
    ids: Vec<PersonId>,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Shows by id, in unspecified order. Unknown ids are omitted.
  fn read_shows(
    &self,
    ids: Vec<ShowId>,
  ) -> impl Future<Output = Result<Vec<Show>, Self::Error>> + Send + '_;

  // ── Daily puzzles ─────────────────────────────────────────────────────

  /// Persist a puzzle header, replacing any existing puzzle for the same
  /// date along with its cells. Returns the stored header with its assigned
  /// puzzle id and creation timestamp.
  fn upsert_daily_puzzle(
    &self,
    input: NewDailyPuzzle,
  ) -> impl Future<Output = Result<DailyPuzzle, Self::Error>> + Send + '_;

  /// Persist the nine cells of a puzzle, upserting by
  /// `(puzzle_id, row, col)`.
  fn upsert_daily_cells(
    &self,
    puzzle_id: PuzzleId,
    cells: [CellCount; 9],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The puzzle header for a date, if one has been generated.
  fn read_puzzle_by_date(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<DailyPuzzle>, Self::Error>> + Send + '_;

  /// All persisted cells for a puzzle, ordered by `(row, col)`. A complete
  /// puzzle has exactly nine; readers must treat fewer as "not published".
  fn read_cells(
    &self,
    puzzle_id: PuzzleId,
  ) -> impl Future<Output = Result<Vec<DailyCell>, Self::Error>> + Send + '_;
}
