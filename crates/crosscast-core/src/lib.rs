//! Core types, traits, and algorithms for the crosscast puzzle backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! It defines the catalog and puzzle domain types, the [`store::GridStore`]
//! abstraction over storage backends, and the three batch/play-time
//! algorithms: eligibility derivation, daily grid generation, and cell
//! solution lookup.

pub mod catalog;
pub mod eligibility;
pub mod error;
pub mod generator;
pub mod lookup;
pub mod puzzle;
pub mod rng;
pub mod store;

pub use error::{Error, Result};
