//! Greeting rotation and generation.
//!
//! # Responsibility
//! - Rotate the quote slot from a fixed pool on a timer.
//! - Refresh it on demand from an external generator with a fixed fallback.
//!
//! # Invariants
//! - The greeting slot always holds some string; service failures never
//!   surface to callers.

pub mod generator;
pub mod pool;
pub mod rotator;
