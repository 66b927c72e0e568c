//! Gallery photo domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One photo in the memory salon gallery.
///
/// `data` is an opaque displayable reference (a `data:` URL when produced by
/// the file importer). The core never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub data: String,
    /// Original file name, shown as the slide caption.
    pub label: String,
}

impl Photo {
    /// Creates a photo with a generated id.
    pub fn new(data: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().simple().to_string(), data, label)
    }

    /// Creates a photo with a caller-provided id.
    pub fn with_id(
        id: impl Into<String>,
        data: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
            label: label.into(),
        }
    }

    /// Caption as rendered on the slide overlay.
    pub fn caption(&self) -> String {
        self.label.to_uppercase()
    }
}
