//! Eligibility derivation.
//!
//! A person is eligible for puzzle grids when they appear in at least
//! [`ELIGIBILITY_THRESHOLD`] distinct shows. The pass scans the complete
//! appearance relation, counts distinct shows per person, and writes the
//! derived fields back for every stored person. Running it twice against
//! unchanged data writes identical values, so it is safe to schedule
//! unconditionally after any ingest.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::{
  catalog::{PersonEligibility, PersonId, ShowId},
  error::{Error, Result},
  store::GridStore,
};

/// Minimum number of distinct shows for a person to be grid-eligible.
pub const ELIGIBILITY_THRESHOLD: u32 = 3;

/// Outcome of one derivation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilitySummary {
  /// People whose derived fields were written back.
  pub people:   usize,
  /// How many of them met the threshold.
  pub eligible: usize,
}

/// Recompute distinct-show counts and eligibility flags for every person.
///
/// Counting is per distinct show: duplicate edges for the same
/// `(person, show)` pair cannot occur in a conforming store, and would count
/// once here regardless. People with no appearance rows are written back
/// with a zero count, which clears any stale flag from an earlier pass.
pub async fn derive_eligibility<S: GridStore>(
  store: &S,
) -> Result<EligibilitySummary> {
  let appearances =
    store.read_all_appearances().await.map_err(Error::store_read)?;

  let mut shows_per_person: HashMap<PersonId, HashSet<ShowId>> =
    HashMap::new();
  for edge in &appearances {
    shows_per_person
      .entry(edge.person_id)
      .or_default()
      .insert(edge.show_id);
  }

  // Cover every person the store knows about, not just those with edges,
  // plus anyone only present in the relation (possible when the backend
  // does not enforce referential integrity).
  let mut person_ids: BTreeSet<PersonId> = store
    .read_person_ids()
    .await
    .map_err(Error::store_read)?
    .into_iter()
    .collect();
  person_ids.extend(shows_per_person.keys().copied());

  let rows: Vec<PersonEligibility> = person_ids
    .into_iter()
    .map(|person_id| {
      let count = shows_per_person
        .get(&person_id)
        .map_or(0, |shows| shows.len() as u32);
      PersonEligibility {
        person_id,
        distinct_show_count: count,
        is_eligible: count >= ELIGIBILITY_THRESHOLD,
      }
    })
    .collect();

  let summary = EligibilitySummary {
    people:   rows.len(),
    eligible: rows.iter().filter(|row| row.is_eligible).count(),
  };

  store
    .write_person_eligibility(rows)
    .await
    .map_err(Error::store_write)?;

  tracing::info!(
    people = summary.people,
    eligible = summary.eligible,
    "eligibility derived"
  );
  Ok(summary)
}
