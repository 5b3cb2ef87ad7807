//! Product image storage on the local filesystem.
//!
//! Files live flat under the upload directory as `{base}_{unix-millis}{.ext}`
//! and are referenced by the public path `/uploads/{file}`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only image files are allowed")]
    NotAnImage,
    #[error("Image exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

fn sanitize_base(stem: &str) -> String {
    let base: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .take(64)
        .collect();
    if base.trim_matches('_').is_empty() {
        "image".to_string()
    } else {
        base
    }
}

fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

impl ImageStore {
    /// Create a new image store. Creates the directory if it doesn't exist.
    pub async fn new(dir: impl AsRef<Path>, max_bytes: usize) -> Result<Self, UploadError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir, max_bytes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Stores the image and returns its public path.
    pub async fn save(&self, upload: &ImageUpload) -> Result<String, UploadError> {
        let is_image = upload
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(UploadError::NotAnImage);
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let original = upload.file_name.as_deref().unwrap_or("image");
        let stem = Path::new(original)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let file_name = format!(
            "{}_{}{}",
            sanitize_base(stem),
            Utc::now().timestamp_millis(),
            extension(original)
        );

        fs::write(self.dir.join(&file_name), &upload.bytes).await?;
        debug!(file = %file_name, size = upload.bytes.len(), "Stored image");
        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }

    /// Deletes a previously stored image. Paths outside the upload prefix and
    /// files that are already gone are ignored.
    pub async fn remove(&self, public_path: &str) {
        let Some(file_name) = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains('/') && !name.contains(".."))
        else {
            warn!(path = %public_path, "Refusing to remove image outside the upload directory");
            return;
        };

        match fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => debug!(file = %file_name, "Removed image"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(file = %file_name, error = %e, "Failed to remove image"),
        }
    }
}
