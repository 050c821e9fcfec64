//! Shared utilities.
//!
//! Hashing for staged artifacts and test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
