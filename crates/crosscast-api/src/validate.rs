//! Handler for `POST /validate`.

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
pub struct ValidateBody {
  pub person_id:      PersonId,
  pub row_show_id:    ShowId,
  pub column_show_id: ShowId,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
  pub valid: bool,
}

/// `POST /validate` — body:
/// `{"person_id":7,"row_show_id":1,"column_show_id":2}`
///
/// Checks membership in both shows only. Eligibility does not factor in: an
/// ineligible person who genuinely appears in both shows is a valid answer.
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ValidateBody>,
) -> Result<Json<ValidateResponse>, ApiError>
where
  S: GridStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let valid = lookup::validate_answer(
    store.as_ref(),
    body.person_id,
    body.row_show_id,
    body.column_show_id,
  )
  .await
  .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(ValidateResponse { valid }))
}
