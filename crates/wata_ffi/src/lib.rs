//! Flutter bindings for the Wata Tavern core.

pub mod api;
