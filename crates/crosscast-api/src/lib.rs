//! JSON REST API for crosscast.
//!
//! Exposes an axum [`Router`] backed by any
//! [`crosscast_core::store::GridStore`]. Authentication, TLS, and rate
//! limiting are left to whatever sits in front of the router.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", crosscast_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod puzzle;
pub mod solutions;
pub mod validate;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use crosscast_core::store::GridStore;

pub use error::ApiError;

/// Wrong-guess budget surfaced to clients in puzzle responses: one per cell.
pub const MAX_WRONG_GUESSES: u32 = 9;

/// Build the API router for `store`.
///
/// The returned `Router<()>` carries its own state, so it nests into any
/// parent router.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: GridStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Puzzles
    .route("/puzzle/today", get(puzzle::today::<S>))
    .route("/puzzle/{date}", get(puzzle::by_date::<S>))
    // Play-time lookups
    .route("/solutions", post(solutions::handler::<S>))
    .route("/validate", post(validate::handler::<S>))
    .with_state(store)
}
