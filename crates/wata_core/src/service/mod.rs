//! Collection use-cases behind the gallery and wish board.
//!
//! # Responsibility
//! - Keep gallery and wish-board invariants inside small owned collections.
//! - Decode local image files into gallery photos.

pub mod photo_carousel;
pub mod photo_import;
pub mod wish_board;
