//! Deterministic randomness for daily puzzle generation.
//!
//! The construction here is a compatibility contract, not an implementation
//! detail: any process that derives the puzzle for a given date must arrive
//! at the same grid. Changing either half below changes every future puzzle.
//!
//! - **Seed**: the attempt label `"<ISO date>:<attempt>"` (e.g.
//!   `"2026-08-25:1"`) is hashed with SHA-256 and the first 8 digest bytes,
//!   little-endian, become the `u64` seed.
//! - **Stream**: a PCG-XSH-RR 64/32 generator. Small, fully specified, and
//!   identical on every platform, unlike the ecosystem's default RNGs whose
//!   streams may change between releases.

use chrono::NaiveDate;
use rand_core::{RngCore, impls};
use sha2::{Digest, Sha256};

const PCG_MULTIPLIER: u64 = 6364136223846793005;
const PCG_INCREMENT: u64 = 1442695040888963407;

/// The label hashed to seed one generation attempt. Attempts are numbered
/// from 1.
pub fn attempt_label(date: NaiveDate, attempt: u32) -> String {
  // NaiveDate's Display is ISO 8601 (YYYY-MM-DD).
  format!("{date}:{attempt}")
}

/// Derive the `u64` seed for one generation attempt.
pub fn attempt_seed(date: NaiveDate, attempt: u32) -> u64 {
  let digest = Sha256::digest(attempt_label(date, attempt).as_bytes());
  let mut bytes = [0u8; 8];
  bytes.copy_from_slice(&digest[..8]);
  u64::from_le_bytes(bytes)
}

/// PCG-XSH-RR 64/32.
#[derive(Debug, Clone)]
pub struct GridRng {
  state: u64,
}

impl GridRng {
  pub fn new(seed: u64) -> Self {
    // Offset so a zero seed does not start at the fixed point of the LCG.
    Self { state: seed.wrapping_add(1) }
  }

  /// The generator for one attempt at one date.
  pub fn for_attempt(date: NaiveDate, attempt: u32) -> Self {
    Self::new(attempt_seed(date, attempt))
  }

  /// A draw reduced modulo `bound`. `bound` must be non-zero.
  pub fn next_index(&mut self, bound: usize) -> usize {
    (self.next_u32() as usize) % bound
  }
}

impl RngCore for GridRng {
  fn next_u32(&mut self) -> u32 {
    self.state = self
      .state
      .wrapping_mul(PCG_MULTIPLIER)
      .wrapping_add(PCG_INCREMENT);
    let xorshifted = (((self.state >> 18) ^ self.state) >> 27) as u32;
    let rot = (self.state >> 59) as u32;
    xorshifted.rotate_right(rot)
  }

  fn next_u64(&mut self) -> u64 {
    impls::next_u64_via_u32(self)
  }

  fn fill_bytes(&mut self, dest: &mut [u8]) {
    impls::fill_bytes_via_next(self, dest)
  }

  fn try_fill_bytes(
    &mut self,
    dest: &mut [u8],
  ) -> Result<(), rand_core::Error> {
    self.fill_bytes(dest);
    Ok(())
  }
}
