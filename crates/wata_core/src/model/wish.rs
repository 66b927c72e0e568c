//! Wish note domain model.
//!
//! # Invariants
//! - `id` is stable and never reused for another wish.
//! - `text` is never blank.

use crate::model::theme::WishColor;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one wish note.
pub type WishId = Uuid;

/// One sticky note pinned to the wish board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wish {
    pub id: WishId,
    /// Note body as typed by the guest.
    pub text: String,
    pub color: WishColor,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
}

/// Validation failures for wish input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishValidationError {
    BlankText,
}

impl Display for WishValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankText => write!(f, "wish text must not be blank"),
        }
    }
}

impl Error for WishValidationError {}

impl Wish {
    /// Creates a wish with a generated id.
    ///
    /// Rejects text that is empty after trimming. The stored text keeps the
    /// guest's original spacing.
    pub fn new(
        text: impl Into<String>,
        color: WishColor,
        created_at_ms: i64,
    ) -> Result<Self, WishValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(WishValidationError::BlankText);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            text,
            color,
            created_at_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Wish, WishValidationError};
    use crate::model::theme::WishColor;

    #[test]
    fn new_rejects_whitespace_only_text() {
        let err = Wish::new(" \n\t", WishColor::Amber, 0).unwrap_err();
        assert_eq!(err, WishValidationError::BlankText);
    }

    #[test]
    fn new_assigns_distinct_ids() {
        let first = Wish::new("more sunsets", WishColor::Slate, 1).unwrap();
        let second = Wish::new("more sunsets", WishColor::Slate, 1).unwrap();
        assert_ne!(first.id, second.id);
        assert!(!first.id.is_nil());
    }
}
