use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// One of the two directories a meal's files live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Root {
    Photos,
    Thumbnails,
}

impl Root {
    pub const ALL: [Root; 2] = [Root::Photos, Root::Thumbnails];

    /// Path segment of the root in public URLs.
    pub fn segment(self) -> &'static str {
        match self {
            Root::Photos => "photos",
            Root::Thumbnails => "thumbnails",
        }
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("refusing to touch file with unsafe name {0:?}")]
    InvalidFilename(String),
    #[error("no free filename after {0} attempts")]
    NoFreeName(usize),
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Byte storage keyed by (root, filename). Never invents names.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Writes `body` to `{root}/{filename}`, replacing any existing file.
    async fn write(&self, root: Root, filename: &str, body: Bytes) -> Result<(), StorageError>;
    /// Removes `{root}/{filename}`. Removing a missing file is not an error.
    async fn delete(&self, root: Root, filename: &str) -> Result<(), StorageError>;
    async fn exists(&self, root: Root, filename: &str) -> Result<bool, StorageError>;
}

lazy_static! {
    static ref FILENAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+\.jpeg$").unwrap();
}

/// Local filesystem store over two pre-existing directories.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    photos_dir: PathBuf,
    thumbnails_dir: PathBuf,
}

impl LocalFileStore {
    pub fn new(photos_dir: impl Into<PathBuf>, thumbnails_dir: impl Into<PathBuf>) -> Self {
        Self {
            photos_dir: photos_dir.into(),
            thumbnails_dir: thumbnails_dir.into(),
        }
    }

    pub fn dir(&self, root: Root) -> &Path {
        match root {
            Root::Photos => &self.photos_dir,
            Root::Thumbnails => &self.thumbnails_dir,
        }
    }

    pub fn path_for(&self, root: Root, filename: &str) -> Result<PathBuf, StorageError> {
        if !FILENAME_RE.is_match(filename) {
            return Err(StorageError::InvalidFilename(filename.to_string()));
        }
        Ok(self.dir(root).join(filename))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn write(&self, root: Root, filename: &str, body: Bytes) -> Result<(), StorageError> {
        let path = self.path_for(root, filename)?;
        tokio::fs::write(&path, &body)
            .await
            .map_err(|source| StorageError::Io {
                op: "write",
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), bytes = body.len(), "file written");
        Ok(())
    }

    async fn delete(&self, root: Root, filename: &str) -> Result<(), StorageError> {
        let path = self.path_for(root, filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "file deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "file already absent");
                Ok(())
            }
            Err(source) => Err(StorageError::Io {
                op: "delete",
                path,
                source,
            }),
        }
    }

    async fn exists(&self, root: Root, filename: &str) -> Result<bool, StorageError> {
        let path = self.path_for(root, filename)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|source| StorageError::Io {
                op: "stat",
                path,
                source,
            })
    }
}

/// Derives public URLs from a filename: `{base}/{root}/{filename}`.
#[derive(Debug, Clone)]
pub struct PublicUrls {
    base: String,
}

impl PublicUrls {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, root: Root, filename: &str) -> String {
        format!("{}/{}/{}", self.base, root.segment(), filename)
    }

    pub fn photo(&self, filename: &str) -> String {
        self.url(Root::Photos, filename)
    }

    pub fn thumbnail(&self, filename: &str) -> String {
        self.url(Root::Thumbnails, filename)
    }
}
