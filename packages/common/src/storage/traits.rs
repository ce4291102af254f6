use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use crate::naming::{Clock, TokenSource};

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Classification of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Avatar,
    Banner,
    Content,
}

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Banner => "banner",
            Self::Content => "content",
        }
    }

    /// File stem for kinds that have exactly one file per creator.
    pub fn fixed_stem(self) -> Option<&'static str> {
        match self {
            Self::Avatar => Some("avatar"),
            Self::Banner => Some("banner"),
            Self::Content => None,
        }
    }

    /// Directory below the creator folder, if the kind is not stored at its root.
    pub fn subdirectory(self) -> Option<&'static str> {
        match self {
            Self::Content => Some("content"),
            Self::Avatar | Self::Banner => None,
        }
    }

    /// Destination file name for a new asset of this kind.
    ///
    /// Avatars and banners always get the same name so a new upload replaces
    /// the old one. Content items get `<unix-millis>-<8 hex>.<ext>`.
    pub fn file_name(self, extension: &str, clock: &dyn Clock, tokens: &dyn TokenSource) -> String {
        match self.fixed_stem() {
            Some(stem) => format!("{stem}.{extension}"),
            None => format!(
                "{}-{}.{extension}",
                clock.now().timestamp_millis(),
                tokens.hex_token(8)
            ),
        }
    }
}

/// Location of an asset after placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAsset {
    /// Path relative to the storage root, `/`-separated.
    pub relative_path: String,
    /// Public URL under which the asset is served.
    pub url: String,
    pub file_name: String,
    pub size: u64,
}

/// Creator-scoped asset storage.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// A fresh, unused path inside the staging area.
    fn staging_path(&self) -> PathBuf;

    /// Create the creator's folder if it does not exist yet. Idempotent.
    async fn ensure_creator_dir(&self, folder_name: &str) -> Result<PathBuf, StorageError>;

    /// Move a fully written staged file into the creator's folder.
    ///
    /// The move is a rename within one filesystem. Failure is returned, never
    /// swallowed; the staged file is left for the caller to discard.
    async fn place(
        &self,
        staged: &Path,
        folder_name: &str,
        kind: AssetKind,
        file_name: &str,
    ) -> Result<StoredAsset, StorageError>;

    /// Open a placed asset by its relative path, returning the reader and its size.
    async fn open(&self, relative_path: &str) -> Result<(BoxReader, u64), StorageError>;

    /// Read a placed asset fully.
    async fn read(&self, relative_path: &str) -> Result<Vec<u8>, StorageError> {
        let (mut reader, size) = self.open(relative_path).await?;
        let mut buf = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Delete a placed asset by its relative path. Returns `false` if it was
    /// already gone.
    async fn remove(&self, relative_path: &str) -> Result<bool, StorageError>;

    /// Delete a staged file. Returns `false` if it was already gone.
    async fn discard(&self, staged: &Path) -> Result<bool, StorageError>;

    /// Verify the storage root accepts writes.
    async fn check_writable(&self) -> Result<(), StorageError>;
}
