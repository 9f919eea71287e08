use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

/// File extensions accepted on upload, matched case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["mp4", "avi", "mov", "mkv", "webm", "m4v"];

pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "m4v" => "video/x-m4v",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        _ => "video/mp4",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("video file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FileStoreError>;

/// A video persisted under a server-generated identifier. The identifier
/// is `<uuid-v4>.<extension>` and is never derived from client text.
#[derive(Debug, Clone)]
pub struct StoredVideoFile {
    pub identifier: String,
    pub extension: String,
    pub size: u64,
    pub path: PathBuf,
}

/// Owns the mapping from opaque identifiers to video bytes on disk under
/// `<root>/videos/`. Files are written once and never overwritten in
/// place; fresh UUID identifiers plus `create_new` make creation atomic.
pub struct FileStore {
    videos_dir: PathBuf,
}

/// Open download handle: the file plus the response metadata derived from
/// the stored extension.
#[derive(Debug)]
pub struct VideoDownload {
    pub file: File,
    pub len: u64,
    pub content_type: &'static str,
}

// Deletes the partially written file unless the upload ran to completion.
// Dropping the upload future (stream error, client disconnect, timeout)
// therefore cleans up automatically.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %e, "failed to remove partial upload");
            }
        }
    }
}

impl FileStore {
    pub async fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let videos_dir = root.as_ref().join("videos");
        fs::create_dir_all(&videos_dir).await?;
        Ok(Self { videos_dir })
    }

    /// Validate the extension, mint a fresh identifier, and stream the
    /// payload to disk chunk by chunk. The partial file is removed if the
    /// stream errors or the caller is cancelled mid-write.
    pub async fn accept<S>(&self, stream: S, original_filename: &str) -> Result<StoredVideoFile>
    where
        S: Stream<Item = std::io::Result<Bytes>>,
    {
        let extension = allowed_extension(original_filename)?;
        let identifier = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.videos_dir.join(&identifier);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        let mut guard = PartialFile {
            path: path.clone(),
            committed: false,
        };

        let mut size: u64 = 0;
        pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        file.flush().await?;
        guard.committed = true;

        info!(identifier = %identifier, size, "stored video file");
        Ok(StoredVideoFile {
            identifier,
            extension,
            size,
            path,
        })
    }

    /// Map an identifier back to its on-disk path. Identifiers that do not
    /// parse as `<uuid>.<allowed-extension>` are rejected before any
    /// filesystem access, so traversal outside the storage root is
    /// impossible by construction.
    pub fn resolve(&self, identifier: &str) -> Result<PathBuf> {
        let (stem, extension) = identifier
            .split_once('.')
            .ok_or_else(|| FileStoreError::NotFound(identifier.to_string()))?;
        if Uuid::parse_str(stem).is_err() || !ALLOWED_EXTENSIONS.contains(&extension) {
            return Err(FileStoreError::NotFound(identifier.to_string()));
        }
        Ok(self.videos_dir.join(identifier))
    }

    /// Open a stored video for streaming download.
    pub async fn open(&self, identifier: &str) -> Result<VideoDownload> {
        let path = self.resolve(identifier)?;
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FileStoreError::NotFound(identifier.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let len = file.metadata().await?.len();
        let extension = identifier.rsplit('.').next().unwrap_or_default();
        Ok(VideoDownload {
            file,
            len,
            content_type: content_type_for(extension),
        })
    }

    /// Remove an accepted file. Used when metadata validation fails after
    /// file acceptance.
    pub async fn remove(&self, identifier: &str) -> Result<()> {
        let path = self.resolve(identifier)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FileStoreError::NotFound(identifier.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete files no record references. `min_age` protects uploads still
    /// in flight; referenced identifiers are never touched.
    pub async fn sweep_orphans(
        &self,
        referenced: &HashSet<String>,
        min_age: Duration,
    ) -> Result<u64> {
        let mut removed = 0u64;
        let mut entries = fs::read_dir(&self.videos_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if referenced.contains(&name) {
                continue;
            }
            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(_) => continue,
            };
            let old_enough = metadata
                .modified()
                .ok()
                .and_then(|t| t.elapsed().ok())
                .map(|age| age >= min_age)
                .unwrap_or(false);
            if !old_enough {
                continue;
            }
            if let Err(e) = fs::remove_file(entry.path()).await {
                warn!(file = %name, error = %e, "failed to remove orphaned video");
                continue;
            }
            info!(file = %name, "removed orphaned video");
            removed += 1;
        }
        Ok(removed)
    }
}

fn allowed_extension(original_filename: &str) -> Result<String> {
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(FileStoreError::UnsupportedMediaType(format!(
            "{:?} is not an accepted video extension",
            extension
        )))
    }
}
