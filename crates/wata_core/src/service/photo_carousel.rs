//! Photo carousel use-cases.
//!
//! # Responsibility
//! - Keep the gallery collection and the displayed index consistent.
//! - Implement autoplay advance and manual next/prev/jump navigation.
//!
//! # Invariants
//! - `0 <= index < len` whenever `len > 0`; `index == 0` when empty.
//! - Autoplay never moves the index while `len <= 1`.
//! - Photo ids are unique within the collection.

use crate::model::photo::Photo;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    DuplicateId(String),
    IndexOutOfRange { index: usize, len: usize },
}

impl Display for GalleryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "photo id already in gallery: {id}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "photo index {index} is out of range (len: {len})")
            }
        }
    }
}

impl Error for GalleryError {}

#[derive(Debug, Clone, Default)]
pub struct PhotoCarousel {
    photos: Vec<Photo>,
    index: usize,
}

impl PhotoCarousel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one decoded photo at the end of the gallery.
    pub fn add(&mut self, photo: Photo) -> Result<(), GalleryError> {
        if self.photos.iter().any(|existing| existing.id == photo.id) {
            return Err(GalleryError::DuplicateId(photo.id));
        }
        self.photos.push(photo);
        Ok(())
    }

    /// Removes one photo by id and clamps the index into range.
    pub fn remove(&mut self, id: &str) -> Option<Photo> {
        let position = self.photos.iter().position(|photo| photo.id == id)?;
        let removed = self.photos.remove(position);
        if self.index >= self.photos.len() {
            self.index = self.photos.len().saturating_sub(1);
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.photos.clear();
        self.index = 0;
    }

    /// Autoplay step. Returns whether the index moved.
    pub fn advance(&mut self) -> bool {
        if self.photos.len() <= 1 {
            return false;
        }
        self.index = (self.index + 1) % self.photos.len();
        true
    }

    pub fn next(&mut self) {
        if self.photos.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.photos.len();
    }

    pub fn prev(&mut self) {
        let len = self.photos.len();
        if len == 0 {
            return;
        }
        self.index = (self.index + len - 1) % len;
    }

    pub fn jump_to(&mut self, index: usize) -> Result<(), GalleryError> {
        if index >= self.photos.len() {
            return Err(GalleryError::IndexOutOfRange {
                index,
                len: self.photos.len(),
            });
        }
        self.index = index;
        Ok(())
    }

    /// Displayed index; meaningless while the gallery is empty.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Photo> {
        self.photos.get(self.index)
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}
