//! Integration test crate for tonegrade.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the library crates to verify the apply and preview
//! paths work together.

#[cfg(test)]
mod pipeline;

#[cfg(test)]
mod cache;

#[cfg(test)]
mod payloads;
