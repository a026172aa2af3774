//! Handler for `POST /solutions`.
//!
//! Returns everyone who may be entered for a cell: eligible people appearing
//! in both shows, sorted by name. Recomputed from the live appearance
//! relation on every call.

use std::sync::Arc;

use axum::{Json, extract::State};
use crosscast_core::{
  catalog::{PersonId, ShowId},
  lookup,
  store::GridStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SolutionsBody {
  pub row_show_id: ShowId,
  pub col_show_id: ShowId,
}

#[derive(Debug, Serialize)]
pub struct SolutionsResponse {
  pub solutions: Vec<SolutionPerson>,
  pub count:     usize,
}

#[derive(Debug, Serialize)]
pub struct SolutionPerson {
  pub id:           PersonId,
  pub name:         String,
  pub profile_path: Option<String>,
}

/// `POST /solutions` — body: `{"row_show_id":1,"col_show_id":2}`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<SolutionsBody>,
) -> Result<Json<SolutionsResponse>, ApiError>
where
  S: GridStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let people =
    lookup::solutions_for(store.as_ref(), body.row_show_id, body.col_show_id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;

  let solutions: Vec<SolutionPerson> = people
    .into_iter()
    .map(|p| SolutionPerson {
      id:           p.person_id,
      name:         p.name,
      profile_path: p.profile_path,
    })
    .collect();
  let count = solutions.len();
  Ok(Json(SolutionsResponse { solutions, count }))
}
