//! Wish board use-cases.
//!
//! # Invariants
//! - Wishes are ordered newest-first by insertion.
//! - Removing an unknown id is a no-op.

use crate::model::theme::WishColor;
use crate::model::wish::{Wish, WishId, WishValidationError};
use log::debug;
use rand::Rng;

#[derive(Debug, Clone, Default)]
pub struct WishBoard {
    wishes: Vec<Wish>,
}

impl WishBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins a new wish on top of the board with a random paper color.
    pub fn add<R: Rng + ?Sized>(
        &mut self,
        text: impl Into<String>,
        created_at_ms: i64,
        rng: &mut R,
    ) -> Result<WishId, WishValidationError> {
        let wish = Wish::new(text, WishColor::random(rng), created_at_ms)?;
        let id = wish.id;
        debug!(
            "event=wish_added module=wish_board color={} total={}",
            wish.color.as_str(),
            self.wishes.len() + 1
        );
        self.wishes.insert(0, wish);
        Ok(id)
    }

    /// Removes one wish by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: WishId) -> bool {
        let before = self.wishes.len();
        self.wishes.retain(|wish| wish.id != id);
        self.wishes.len() != before
    }

    pub fn clear(&mut self) {
        self.wishes.clear();
    }

    pub fn get(&self, id: WishId) -> Option<&Wish> {
        self.wishes.iter().find(|wish| wish.id == id)
    }

    pub fn wishes(&self) -> &[Wish] {
        &self.wishes
    }

    pub fn len(&self) -> usize {
        self.wishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wishes.is_empty()
    }
}
