//! Error types for `crosscast-core`.

use chrono::NaiveDate;
use thiserror::Error;

/// A storage backend error, boxed so the algorithm layer does not need to be
/// generic over the backend's error type.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store read failed: {source}")]
  StoreRead { source: StoreError },

  #[error("store write failed: {source}")]
  StoreWrite { source: StoreError },

  #[error(
    "not enough shows with eligible people to form a grid: {available} \
     available, {required} required"
  )]
  InsufficientData { available: usize, required: usize },

  #[error("no valid grid found for {date} within {attempts} attempts")]
  GenerationFailed { date: NaiveDate, attempts: u32 },
}

impl Error {
  /// Wrap a backend error that occurred while reading.
  pub fn store_read(
    source: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::StoreRead { source: Box::new(source) }
  }

  /// Wrap a backend error that occurred while writing.
  pub fn store_write(
    source: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::StoreWrite { source: Box::new(source) }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
