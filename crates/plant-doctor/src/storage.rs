/// Local-disk sink for uploaded plant images.
///
/// Files are named after the client-supplied filename, reduced to its final path
/// component with unsafe characters replaced, so a request can never write outside
/// the upload directory. A later upload with the same name overwrites the earlier one.
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::error::AppError;

/// URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/static/uploads";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub path: PathBuf,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create the store, creating `dir` if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredImage, AppError> {
        let name = sanitize_filename(filename)
            .ok_or_else(|| AppError::Upload(format!("unusable image filename '{filename}'")))?;
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "saved upload");
        Ok(StoredImage {
            path,
            url: format!("{PUBLIC_PREFIX}/{name}"),
        })
    }
}

/// Reduce a client filename to a safe single path component.
///
/// Returns `None` when nothing usable remains (empty, or only dots).
fn sanitize_filename(filename: &str) -> Option<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    if cleaned.chars().all(|c| c == '.') {
        return None;
    }
    Some(cleaned.into_owned())
}
