//! File-to-photo decoding.
//!
//! # Responsibility
//! - Read local image files and wrap them as `data:` URL gallery photos.
//!
//! # Invariants
//! - Only known image extensions are accepted; the bytes are not inspected.
//! - The photo label is the original file name.

use crate::model::photo::Photo;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum PhotoImportError {
    UnsupportedExtension(PathBuf),
    Io { path: PathBuf, source: std::io::Error },
}

impl Display for PhotoImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedExtension(path) => {
                write!(f, "not an image file: {}", path.display())
            }
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
        }
    }
}

impl Error for PhotoImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::UnsupportedExtension(_) => None,
        }
    }
}

/// MIME type for an image path, by extension.
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Encodes raw image bytes as a `data:` URL.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Reads one image file into a gallery photo.
pub async fn decode_photo_file(path: impl AsRef<Path>) -> Result<Photo, PhotoImportError> {
    let path = path.as_ref();
    let mime = image_mime_type(path)
        .ok_or_else(|| PhotoImportError::UnsupportedExtension(path.to_path_buf()))?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| PhotoImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Photo::new(to_data_url(mime, &bytes), label))
}

/// Lists image files directly inside `dir`, sorted by name.
///
/// Entries whose metadata cannot be read are skipped.
pub async fn list_image_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if image_mime_type(&path).is_none() {
            continue;
        }
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if is_file {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
