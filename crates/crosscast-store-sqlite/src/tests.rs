//! Integration tests for `SqliteStore` against an in-memory database,
//! covering the store contract and the algorithm layer end to end.

use chrono::NaiveDate;
use crosscast_core::{
  Error as CoreError,
  catalog::{NewAppearance, NewPerson, PersonId, Show, ShowId},
  eligibility::derive_eligibility,
  generator::{self, GeneratorConfig},
  lookup,
  puzzle::NewDailyPuzzle,
  store::GridStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(s: &str) -> NaiveDate {
  s.parse().unwrap()
}

fn show(show_id: ShowId, name: &str) -> Show {
  Show {
    show_id,
    name: name.to_owned(),
    poster_path: None,
    popularity_rank: 0,
  }
}

fn person(person_id: PersonId, name: &str) -> NewPerson {
  NewPerson { person_id, name: name.to_owned(), profile_path: None }
}

fn edge(show_id: ShowId, person_id: PersonId) -> NewAppearance {
  NewAppearance {
    show_id,
    person_id,
    episode_count: Some(1),
    guest_episode_count: None,
  }
}

async fn seed(
  s: &SqliteStore,
  shows: &[(ShowId, &str)],
  people: &[(PersonId, &str)],
  edges: &[(ShowId, PersonId)],
) {
  s.upsert_shows(shows.iter().map(|(id, name)| show(*id, name)).collect())
    .await
    .unwrap();
  s.upsert_people(people.iter().map(|(id, name)| person(*id, name)).collect())
    .await
    .unwrap();
  s.upsert_appearances(
    edges
      .iter()
      .map(|(show_id, person_id)| edge(*show_id, *person_id))
      .collect(),
  )
  .await
  .unwrap();
}

/// Six shows where people 101–103 appear everywhere, so every split into
/// rows and columns is a valid grid. 104 appears in two shows (ineligible),
/// 105 in three. The two "Ana Reyes" rows exercise the id tiebreak.
async fn seed_fully_connected(s: &SqliteStore) {
  let mut edges: Vec<(ShowId, PersonId)> = Vec::new();
  for show_id in 1..=6 {
    for person_id in [101, 102, 103] {
      edges.push((show_id, person_id));
    }
  }
  edges.extend([(1, 104), (4, 104), (1, 105), (4, 105), (5, 105)]);

  seed(
    s,
    &[
      (1, "Alpha House"),
      (2, "Budget Wars"),
      (3, "Crash Course"),
      (4, "Desert Duel"),
      (5, "Echo Beach"),
      (6, "Final Call"),
    ],
    &[
      (101, "Cleo Park"),
      (102, "Ana Reyes"),
      (103, "Ben Okafor"),
      (104, "Drew Santos"),
      (105, "Ana Reyes"),
    ],
    &edges,
  )
  .await;
  derive_eligibility(s).await.unwrap();
}

/// Six shows, five people, all eligible, arranged so that three pairs of
/// shows share nobody. The empty pairs force any valid split to put four
/// shows on one side, which cannot happen, so no attempt ever succeeds.
async fn seed_sparse(s: &SqliteStore) {
  seed(
    s,
    &[
      (1, "Atlas Run"),
      (2, "Border Town"),
      (3, "Cold Open"),
      (4, "Dark Horse"),
      (5, "East Wing"),
      (6, "Free Fall"),
    ],
    &[
      (1, "Person One"),
      (2, "Person Two"),
      (3, "Person Three"),
      (4, "Person Four"),
      (5, "Person Five"),
    ],
    &[
      (1, 1), (1, 2), (1, 3),
      (2, 3), (2, 4),
      (3, 1), (3, 4), (3, 5),
      (4, 2), (4, 5),
      (5, 1), (5, 4),
      (6, 2), (6, 3), (6, 5),
    ],
  )
  .await;
  derive_eligibility(s).await.unwrap();
}

// ─── Catalog ingestion ───────────────────────────────────────────────────────

#[tokio::test]
async fn shows_upsert_replaces_metadata() {
  let s = store().await;
  s.upsert_shows(vec![show(1, "Alpha House"), show(2, "Budget Wars")])
    .await
    .unwrap();

  let mut renamed = show(1, "Alpha Penthouse");
  renamed.popularity_rank = 7;
  s.upsert_shows(vec![renamed]).await.unwrap();

  let mut shows = s.read_shows(vec![1, 2, 999]).await.unwrap();
  shows.sort_by_key(|s| s.show_id);
  assert_eq!(shows.len(), 2);
  assert_eq!(shows[0].name, "Alpha Penthouse");
  assert_eq!(shows[0].popularity_rank, 7);
  assert_eq!(shows[1].name, "Budget Wars");
}

#[tokio::test]
async fn people_upsert_never_touches_derived_fields() {
  let s = store().await;
  seed(
    &s,
    &[(1, "Alpha House"), (2, "Budget Wars"), (3, "Crash Course")],
    &[(101, "Cleo Park")],
    &[(1, 101), (2, 101), (3, 101)],
  )
  .await;
  derive_eligibility(&s).await.unwrap();

  // Re-ingesting the person with new metadata must not reset eligibility.
  s.upsert_people(vec![person(101, "Cleo Parker")]).await.unwrap();

  let people = s.read_people(vec![101]).await.unwrap();
  assert_eq!(people.len(), 1);
  assert_eq!(people[0].name, "Cleo Parker");
  assert_eq!(people[0].distinct_show_count, 3);
  assert!(people[0].is_eligible);
}

#[tokio::test]
async fn appearance_merge_keeps_per_field_maximum() {
  let s = store().await;
  s.upsert_shows(vec![show(1, "Alpha House")]).await.unwrap();
  s.upsert_people(vec![person(101, "Cleo Park")]).await.unwrap();

  s.upsert_appearances(vec![NewAppearance {
    show_id: 1,
    person_id: 101,
    episode_count: Some(5),
    guest_episode_count: None,
  }])
  .await
  .unwrap();
  s.upsert_appearances(vec![NewAppearance {
    show_id: 1,
    person_id: 101,
    episode_count: Some(2),
    guest_episode_count: Some(4),
  }])
  .await
  .unwrap();

  let merged = s.read_appearance(1, 101).await.unwrap().unwrap();
  assert_eq!(merged.episode_count, Some(5));
  assert_eq!(merged.guest_episode_count, Some(4));
  assert_eq!(
    merged.kind,
    Some(crosscast_core::catalog::AppearanceKind::Both)
  );
}

#[tokio::test]
async fn appearance_merge_preserves_missing_counts() {
  let s = store().await;
  s.upsert_shows(vec![show(1, "Alpha House")]).await.unwrap();
  s.upsert_people(vec![person(101, "Cleo Park")]).await.unwrap();

  let bare = NewAppearance {
    show_id: 1,
    person_id: 101,
    episode_count: None,
    guest_episode_count: None,
  };
  s.upsert_appearances(vec![bare.clone()]).await.unwrap();
  s.upsert_appearances(vec![bare]).await.unwrap();

  let merged = s.read_appearance(1, 101).await.unwrap().unwrap();
  assert_eq!(merged.episode_count, None);
  assert_eq!(merged.guest_episode_count, None);
  assert_eq!(merged.kind, None);
}

#[tokio::test]
async fn appearance_relation_keeps_one_row_per_pair() {
  let s = store().await;
  s.upsert_shows(vec![show(1, "Alpha House")]).await.unwrap();
  s.upsert_people(vec![person(101, "Cleo Park")]).await.unwrap();

  s.upsert_appearances(vec![edge(1, 101)]).await.unwrap();
  s.upsert_appearances(vec![edge(1, 101)]).await.unwrap();

  assert_eq!(s.read_all_appearances().await.unwrap().len(), 1);
}

// ─── Eligibility derivation ──────────────────────────────────────────────────

#[tokio::test]
async fn eligibility_threshold_is_three_distinct_shows() {
  let s = store().await;
  seed(
    &s,
    &[
      (1, "Alpha House"),
      (2, "Budget Wars"),
      (3, "Crash Course"),
      (4, "Desert Duel"),
    ],
    &[(101, "Two Shows"), (102, "Three Shows"), (103, "Four Shows")],
    &[
      (1, 101), (2, 101),
      (1, 102), (2, 102), (3, 102),
      (1, 103), (2, 103), (3, 103), (4, 103),
    ],
  )
  .await;

  let summary = derive_eligibility(&s).await.unwrap();
  assert_eq!(summary.people, 3);
  assert_eq!(summary.eligible, 2);

  let mut people = s.read_people(vec![101, 102, 103]).await.unwrap();
  people.sort_by_key(|p| p.person_id);
  assert_eq!(people[0].distinct_show_count, 2);
  assert!(!people[0].is_eligible);
  assert_eq!(people[1].distinct_show_count, 3);
  assert!(people[1].is_eligible);
  assert_eq!(people[2].distinct_show_count, 4);
  assert!(people[2].is_eligible);
}

#[tokio::test]
async fn re_ingesting_edges_does_not_inflate_counts() {
  let s = store().await;
  seed(
    &s,
    &[(1, "Alpha House"), (2, "Budget Wars"), (3, "Crash Course")],
    &[(101, "Cleo Park")],
    &[(1, 101), (2, 101), (3, 101)],
  )
  .await;

  // Same edge again with different episode counts; it merges, not adds.
  s.upsert_appearances(vec![NewAppearance {
    show_id: 2,
    person_id: 101,
    episode_count: Some(9),
    guest_episode_count: Some(1),
  }])
  .await
  .unwrap();

  derive_eligibility(&s).await.unwrap();
  let people = s.read_people(vec![101]).await.unwrap();
  assert_eq!(people[0].distinct_show_count, 3);
}

#[tokio::test]
async fn derivation_is_idempotent() {
  let s = store().await;
  seed_fully_connected(&s).await;

  let before = {
    let mut p = s.read_people(vec![101, 102, 103, 104, 105]).await.unwrap();
    p.sort_by_key(|p| p.person_id);
    p
  };
  let first = derive_eligibility(&s).await.unwrap();
  let second = derive_eligibility(&s).await.unwrap();
  assert_eq!(first, second);

  let after = {
    let mut p = s.read_people(vec![101, 102, 103, 104, 105]).await.unwrap();
    p.sort_by_key(|p| p.person_id);
    p
  };
  assert_eq!(before, after);
}

#[tokio::test]
async fn derivation_resets_people_with_no_appearances() {
  let s = store().await;
  s.upsert_people(vec![person(101, "Cleo Park")]).await.unwrap();

  // Simulate a stale flag left by an earlier pass over since-removed data.
  s.write_person_eligibility(vec![
    crosscast_core::catalog::PersonEligibility {
      person_id:           101,
      distinct_show_count: 5,
      is_eligible:         true,
    },
  ])
  .await
  .unwrap();

  let summary = derive_eligibility(&s).await.unwrap();
  assert_eq!(summary.people, 1);
  assert_eq!(summary.eligible, 0);

  let people = s.read_people(vec![101]).await.unwrap();
  assert_eq!(people[0].distinct_show_count, 0);
  assert!(!people[0].is_eligible);
}

#[tokio::test]
async fn eligible_view_filters_ineligible_people() {
  let s = store().await;
  seed_fully_connected(&s).await;

  let all = s.read_all_appearances().await.unwrap();
  let eligible = s.read_eligible_appearances().await.unwrap();
  // 104's two edges are the only ineligible ones.
  assert_eq!(all.len(), 23);
  assert_eq!(eligible.len(), 21);
  assert!(eligible.iter().all(|e| e.person_id != 104));

  let for_show = s.read_appearances_for_show(1, false).await.unwrap();
  assert!(for_show.contains(&104));
  let for_show = s.read_appearances_for_show(1, true).await.unwrap();
  assert!(!for_show.contains(&104));
  assert_eq!(for_show.len(), 4);
}

// ─── Puzzle generation ───────────────────────────────────────────────────────

#[tokio::test]
async fn generation_persists_header_and_nine_cells() {
  let s = store().await;
  seed_fully_connected(&s).await;
  let d = date("2026-08-25");

  let generated =
    generator::generate(&s, d, &GeneratorConfig::default()).await.unwrap();

  let stored = s.read_puzzle_by_date(d).await.unwrap().unwrap();
  assert_eq!(stored, generated.puzzle);
  assert_eq!(stored.date, d);
  assert_eq!(stored.seed, format!("{d}:{}", generated.attempt));

  let mut used: Vec<ShowId> = stored
    .row_show_ids
    .iter()
    .chain(stored.col_show_ids.iter())
    .copied()
    .collect();
  used.sort_unstable();
  assert_eq!(used, vec![1, 2, 3, 4, 5, 6]);

  let cells = s.read_cells(stored.puzzle_id).await.unwrap();
  assert_eq!(cells.len(), 9);
  for (i, cell) in cells.iter().enumerate() {
    assert_eq!(cell.row as usize, i / 3);
    assert_eq!(cell.col as usize, i % 3);
    assert!(cell.answer_count >= 1);
    assert_eq!(
      cell.answer_count,
      generated.counts[cell.row as usize][cell.col as usize]
    );
  }
}

#[tokio::test]
async fn generation_is_deterministic_per_date() {
  let s = store().await;
  seed_fully_connected(&s).await;
  let d = date("2026-08-25");
  let config = GeneratorConfig::default();

  let first = generator::generate(&s, d, &config).await.unwrap();
  let second = generator::generate(&s, d, &config).await.unwrap();

  assert_eq!(first.attempt, second.attempt);
  assert_eq!(first.puzzle.row_show_ids, second.puzzle.row_show_ids);
  assert_eq!(first.puzzle.col_show_ids, second.puzzle.col_show_ids);
  assert_eq!(first.counts, second.counts);
}

#[tokio::test]
async fn regeneration_replaces_the_previous_puzzle() {
  let s = store().await;
  seed_fully_connected(&s).await;
  let d = date("2026-08-25");
  let config = GeneratorConfig::default();

  let first = generator::generate(&s, d, &config).await.unwrap();
  let second = generator::generate(&s, d, &config).await.unwrap();
  assert_ne!(first.puzzle.puzzle_id, second.puzzle.puzzle_id);

  let stored = s.read_puzzle_by_date(d).await.unwrap().unwrap();
  assert_eq!(stored.puzzle_id, second.puzzle.puzzle_id);

  // The cascade removed the replaced puzzle's cells.
  assert!(s.read_cells(first.puzzle.puzzle_id).await.unwrap().is_empty());
  assert_eq!(s.read_cells(stored.puzzle_id).await.unwrap().len(), 9);
}

#[tokio::test]
async fn insufficient_pool_fails_before_any_write() {
  let s = store().await;
  // Five fully connected shows: one short of a grid.
  let mut edges: Vec<(ShowId, PersonId)> = Vec::new();
  for show_id in 1..=5 {
    for person_id in [101, 102, 103] {
      edges.push((show_id, person_id));
    }
  }
  seed(
    &s,
    &[
      (1, "Alpha House"),
      (2, "Budget Wars"),
      (3, "Crash Course"),
      (4, "Desert Duel"),
      (5, "Echo Beach"),
    ],
    &[(101, "Cleo Park"), (102, "Ana Reyes"), (103, "Ben Okafor")],
    &edges,
  )
  .await;
  derive_eligibility(&s).await.unwrap();

  let d = date("2026-08-25");
  let err = generator::generate(&s, d, &GeneratorConfig::default())
    .await
    .unwrap_err();
  match err {
    CoreError::InsufficientData { available, required } => {
      assert_eq!(available, 5);
      assert_eq!(required, 6);
    }
    other => panic!("expected InsufficientData, got {other:?}"),
  }
  assert!(s.read_puzzle_by_date(d).await.unwrap().is_none());
}

#[tokio::test]
async fn only_shows_with_eligible_people_count_toward_the_pool() {
  let s = store().await;
  // Six shows exist, but eligible people only cover three of them.
  seed(
    &s,
    &[
      (1, "Alpha House"),
      (2, "Budget Wars"),
      (3, "Crash Course"),
      (4, "Desert Duel"),
      (5, "Echo Beach"),
      (6, "Final Call"),
    ],
    &[(101, "Cleo Park"), (102, "Solo Four"), (103, "Solo Five")],
    &[(1, 101), (2, 101), (3, 101), (4, 102), (5, 103)],
  )
  .await;
  derive_eligibility(&s).await.unwrap();

  let err = generator::generate(
    &s,
    date("2026-08-25"),
    &GeneratorConfig::default(),
  )
  .await
  .unwrap_err();
  match err {
    CoreError::InsufficientData { available, .. } => assert_eq!(available, 3),
    other => panic!("expected InsufficientData, got {other:?}"),
  }
}

#[tokio::test]
async fn unsatisfiable_pool_exhausts_the_attempt_budget() {
  let s = store().await;
  seed_sparse(&s).await;
  let d = date("2026-08-25");

  let err = generator::generate(&s, d, &GeneratorConfig { max_attempts: 40 })
    .await
    .unwrap_err();
  match err {
    CoreError::GenerationFailed { date: failed, attempts } => {
      assert_eq!(failed, d);
      assert_eq!(attempts, 40);
    }
    other => panic!("expected GenerationFailed, got {other:?}"),
  }
  // Fail closed: nothing was persisted.
  assert!(s.read_puzzle_by_date(d).await.unwrap().is_none());
}

#[tokio::test]
async fn generated_counts_match_live_solutions() {
  let s = store().await;
  seed_fully_connected(&s).await;

  let generated = generator::generate(
    &s,
    date("2026-08-25"),
    &GeneratorConfig::default(),
  )
  .await
  .unwrap();

  for (r, row_show) in generated.puzzle.row_show_ids.iter().enumerate() {
    for (c, col_show) in generated.puzzle.col_show_ids.iter().enumerate() {
      let solutions =
        lookup::solutions_for(&s, *row_show, *col_show).await.unwrap();
      assert_eq!(solutions.len() as u32, generated.counts[r][c]);
    }
  }
}

// ─── Play-time lookups ───────────────────────────────────────────────────────

#[tokio::test]
async fn solutions_are_eligible_only_and_sorted() {
  let s = store().await;
  seed_fully_connected(&s).await;

  // 104 appears in both shows 1 and 4 but is ineligible.
  let solutions = lookup::solutions_for(&s, 1, 4).await.unwrap();
  let ids: Vec<PersonId> = solutions.iter().map(|p| p.person_id).collect();
  assert_eq!(ids, vec![102, 105, 103, 101]);

  let names: Vec<&str> =
    solutions.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(
    names,
    vec!["Ana Reyes", "Ana Reyes", "Ben Okafor", "Cleo Park"]
  );
}

#[tokio::test]
async fn solution_ordering_ignores_case() {
  let s = store().await;
  seed(
    &s,
    &[(1, "Alpha House"), (2, "Budget Wars"), (3, "Crash Course")],
    &[(101, "ana reyes"), (102, "Ben Okafor"), (103, "Cleo Park")],
    &[
      (1, 101), (2, 101), (3, 101),
      (1, 102), (2, 102), (3, 102),
      (1, 103), (2, 103), (3, 103),
    ],
  )
  .await;
  derive_eligibility(&s).await.unwrap();

  let solutions = lookup::solutions_for(&s, 1, 2).await.unwrap();
  let names: Vec<&str> = solutions.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, vec!["ana reyes", "Ben Okafor", "Cleo Park"]);
}

#[tokio::test]
async fn empty_intersection_yields_no_solutions() {
  let s = store().await;
  seed(
    &s,
    &[(1, "Alpha House"), (2, "Budget Wars")],
    &[(101, "Cleo Park"), (102, "Ana Reyes")],
    &[(1, 101), (2, 102)],
  )
  .await;
  derive_eligibility(&s).await.unwrap();

  let solutions = lookup::solutions_for(&s, 1, 2).await.unwrap();
  assert!(solutions.is_empty());
}

#[tokio::test]
async fn validation_ignores_eligibility() {
  let s = store().await;
  seed_fully_connected(&s).await;

  // Ineligible 104 really does appear in shows 1 and 4.
  assert!(lookup::validate_answer(&s, 104, 1, 4).await.unwrap());
  // ...but would never be offered as a solution for that cell.
  let solutions = lookup::solutions_for(&s, 1, 4).await.unwrap();
  assert!(solutions.iter().all(|p| p.person_id != 104));

  // Eligible 105 is not in show 2.
  assert!(!lookup::validate_answer(&s, 105, 1, 2).await.unwrap());
  // Unknown person.
  assert!(!lookup::validate_answer(&s, 999, 1, 4).await.unwrap());
}

// ─── Puzzle persistence ──────────────────────────────────────────────────────

#[tokio::test]
async fn puzzle_roundtrip_preserves_fields() {
  let s = store().await;
  seed_fully_connected(&s).await;
  let d = date("2026-08-25");

  let stored = s
    .upsert_daily_puzzle(NewDailyPuzzle {
      date:         d,
      seed:         format!("{d}:3"),
      row_show_ids: [1, 2, 3],
      col_show_ids: [4, 5, 6],
    })
    .await
    .unwrap();

  let fetched = s.read_puzzle_by_date(d).await.unwrap().unwrap();
  assert_eq!(fetched, stored);
  assert_eq!(fetched.row_show_ids, [1, 2, 3]);
  assert_eq!(fetched.col_show_ids, [4, 5, 6]);
  assert_eq!(fetched.seed, format!("{d}:3"));
}

#[tokio::test]
async fn missing_date_reads_as_none() {
  let s = store().await;
  assert!(s.read_puzzle_by_date(date("2026-08-25")).await.unwrap().is_none());
  assert!(s.read_cells(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn header_without_cells_reads_as_incomplete() {
  let s = store().await;
  seed_fully_connected(&s).await;
  let d = date("2026-08-25");

  let stored = s
    .upsert_daily_puzzle(NewDailyPuzzle {
      date:         d,
      seed:         format!("{d}:1"),
      row_show_ids: [1, 2, 3],
      col_show_ids: [4, 5, 6],
    })
    .await
    .unwrap();

  // The header alone is readable, but its cell set is empty; readers must
  // treat this state as "no puzzle published".
  assert!(s.read_puzzle_by_date(d).await.unwrap().is_some());
  assert!(s.read_cells(stored.puzzle_id).await.unwrap().is_empty());
}
