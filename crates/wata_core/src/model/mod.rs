//! Domain records for the tavern session.
//!
//! # Responsibility
//! - Define the wish and photo records guests create.
//! - Name the fixed theme palette and presets.
//!
//! # Invariants
//! - Every wish and photo is identified by a stable, unique id.
//! - Nothing here is persisted; records live for one session.

pub mod photo;
pub mod theme;
pub mod wish;
