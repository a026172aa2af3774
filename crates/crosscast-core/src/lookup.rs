//! Play-time lookups: cell solutions and answer validation.
//!
//! Solutions are recomputed from the live appearance relation rather than
//! read from the persisted cell counts, so they reflect catalog changes made
//! after generation. The persisted counts remain what the grid was validated
//! against.

use crate::{
  catalog::{Person, PersonId, ShowId},
  error::{Error, Result},
  store::GridStore,
};

/// Everyone who may be entered as an answer for a cell: eligible people
/// appearing in both shows, sorted by display name (case-insensitive,
/// person id as tiebreak).
pub async fn solutions_for<S: GridStore>(
  store: &S,
  row_show_id: ShowId,
  col_show_id: ShowId,
) -> Result<Vec<Person>> {
  let row_people = store
    .read_appearances_for_show(row_show_id, true)
    .await
    .map_err(Error::store_read)?;
  let col_people = store
    .read_appearances_for_show(col_show_id, true)
    .await
    .map_err(Error::store_read)?;

  let shared: Vec<PersonId> =
    row_people.intersection(&col_people).copied().collect();
  if shared.is_empty() {
    return Ok(Vec::new());
  }

  let mut people =
    store.read_people(shared).await.map_err(Error::store_read)?;
  people.sort_by_key(|p| (p.name.to_lowercase(), p.person_id));
  Ok(people)
}

/// Whether `person_id` appears in both shows of a cell.
///
/// Eligibility is deliberately not consulted: the flag gates which shows can
/// form a grid, not which appearances count as a correct answer. An
/// ineligible person in both shows is still a correct guess.
pub async fn validate_answer<S: GridStore>(
  store: &S,
  person_id: PersonId,
  row_show_id: ShowId,
  col_show_id: ShowId,
) -> Result<bool> {
  let shows = store
    .read_shows_for_person(person_id)
    .await
    .map_err(Error::store_read)?;
  Ok(shows.contains(&row_show_id) && shows.contains(&col_show_id))
}
