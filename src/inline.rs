//! Asset inlining.
//!
//! Turns a local file into a `data:` URI so the generated page carries its
//! logos and downloadable forms in a single payload. A missing or unreadable
//! file is not an error here: [`inline`] returns `None` and the page renderer
//! substitutes a text placeholder.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Media type of an inlined asset, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
    Gif,
    Svg,
    /// Fallback for any extension not in the table (including none at all).
    Binary,
}

impl MediaType {
    /// Look up the media type for a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => MediaType::Jpeg,
            "png" => MediaType::Png,
            "gif" => MediaType::Gif,
            "svg" => MediaType::Svg,
            _ => MediaType::Binary,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Gif => "image/gif",
            MediaType::Svg => "image/svg+xml",
            MediaType::Binary => "application/octet-stream",
        }
    }
}

/// A file's bytes, base64-encoded and tagged with their media type.
///
/// Only ever constructed from a file that was readable at conversion time;
/// an unavailable file is represented by the absence of this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddableAsset {
    source_path: PathBuf,
    media_type: MediaType,
    encoded_payload: String,
    byte_len: u64,
}

impl EmbeddableAsset {
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Size of the original file in bytes.
    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// Render as `data:<media-type>;base64,<payload>`.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type.as_str(),
            self.encoded_payload
        )
    }
}

/// Why an asset could not be inlined. Only used for the stderr diagnostic;
/// callers of [`inline`] see a plain `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unavailable {
    NotFound,
    NotAFile,
    ReadError,
}

impl Unavailable {
    fn as_str(self) -> &'static str {
        match self {
            Unavailable::NotFound => "not-found",
            Unavailable::NotAFile => "not-a-file",
            Unavailable::ReadError => "read-error",
        }
    }
}

fn try_inline(path: &Path) -> Result<EmbeddableAsset, Unavailable> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Err(Unavailable::NotAFile),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Unavailable::NotFound),
        Err(_) => return Err(Unavailable::ReadError),
    }

    let bytes = fs::read(path).map_err(|_| Unavailable::ReadError)?;

    Ok(EmbeddableAsset {
        source_path: path.to_path_buf(),
        media_type: MediaType::from_path(path),
        encoded_payload: STANDARD.encode(&bytes),
        byte_len: bytes.len() as u64,
    })
}

/// Inline the file at `path`, or return `None` if it is missing, not a
/// regular file, or cannot be read.
pub fn inline(path: impl AsRef<Path>) -> Option<EmbeddableAsset> {
    let path = path.as_ref();
    match try_inline(path) {
        Ok(asset) => {
            eprintln!(
                "[inline] path={} media={} size={}",
                path.display(),
                asset.media_type.as_str(),
                asset.byte_len
            );
            Some(asset)
        }
        Err(reason) => {
            eprintln!(
                "[inline] path={} outcome=absent reason={}",
                path.display(),
                reason.as_str()
            );
            None
        }
    }
}
