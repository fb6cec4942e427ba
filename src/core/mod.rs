//! Deterministic primitives.
//!
//! Everything in this module is platform-independent and reproducible:
//! the engine's only source of randomness lives here.

pub mod rng;

pub use rng::{DeterministicRng, DiceRoll};
