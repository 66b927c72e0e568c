//! Session state and its timer-driven runtime.

pub mod runtime;
pub mod schedule;
pub mod state;
