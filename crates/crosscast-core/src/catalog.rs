//! Catalog domain types: shows, people, and the appearance relation.
//!
//! Identifiers are the upstream catalog's numeric ids, carried through
//! unchanged so re-ingestion is a natural upsert.

use serde::{Deserialize, Serialize};

pub type ShowId = i64;
pub type PersonId = i64;

/// A show that can appear as a grid row or column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
  pub show_id:         ShowId,
  pub name:            String,
  #[serde(default)]
  pub poster_path:     Option<String>,
  #[serde(default)]
  pub popularity_rank: i64,
}

/// A person as ingested from the catalog.
///
/// Carries identity fields only. The derived eligibility fields are owned by
/// the eligibility pass and never appear in ingest input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPerson {
  pub person_id:    PersonId,
  pub name:         String,
  #[serde(default)]
  pub profile_path: Option<String>,
}

/// A person as read back from the store, derived fields included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:           PersonId,
  pub name:                String,
  pub profile_path:        Option<String>,
  /// Number of distinct shows this person appears in. Derived; stale until
  /// the next eligibility pass.
  pub distinct_show_count: u32,
  /// Whether this person may be counted when forming grids.
  pub is_eligible:         bool,
}

// ─── Appearances ─────────────────────────────────────────────────────────────

/// How a person appears in a show, classified from episode counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppearanceKind {
  Main,
  Guest,
  Both,
}

impl AppearanceKind {
  /// Classify an appearance from its episode counts. Absent counts are
  /// treated as zero; a row with no positive count is unclassified (`None`).
  pub fn from_counts(
    episode_count: Option<u32>,
    guest_episode_count: Option<u32>,
  ) -> Option<Self> {
    let main = episode_count.unwrap_or(0) > 0;
    let guest = guest_episode_count.unwrap_or(0) > 0;
    match (main, guest) {
      (true, true) => Some(Self::Both),
      (true, false) => Some(Self::Main),
      (false, true) => Some(Self::Guest),
      (false, false) => None,
    }
  }
}

/// An appearance edge as ingested from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppearance {
  pub show_id:             ShowId,
  pub person_id:           PersonId,
  #[serde(default)]
  pub episode_count:       Option<u32>,
  #[serde(default)]
  pub guest_episode_count: Option<u32>,
}

impl NewAppearance {
  pub fn kind(&self) -> Option<AppearanceKind> {
    AppearanceKind::from_counts(self.episode_count, self.guest_episode_count)
  }
}

/// A stored appearance edge, episode counts merged across ingest runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
  pub show_id:             ShowId,
  pub person_id:           PersonId,
  pub episode_count:       Option<u32>,
  pub guest_episode_count: Option<u32>,
  pub kind:                Option<AppearanceKind>,
}

/// A bare `(person, show)` edge. Projection of the appearance relation used
/// by the eligibility and generation passes, which only need set membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppearanceRef {
  pub person_id: PersonId,
  pub show_id:   ShowId,
}

/// Derived eligibility fields for one person, as produced by
/// [`crate::eligibility::derive_eligibility`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonEligibility {
  pub person_id:           PersonId,
  pub distinct_show_count: u32,
  pub is_eligible:         bool,
}

// ─── Ingest file ─────────────────────────────────────────────────────────────

/// The shape of a catalog ingest file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
  #[serde(default)]
  pub shows:       Vec<Show>,
  #[serde(default)]
  pub people:      Vec<NewPerson>,
  #[serde(default)]
  pub appearances: Vec<NewAppearance>,
}
