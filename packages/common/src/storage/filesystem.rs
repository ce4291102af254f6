use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::traits::{AssetKind, AssetStore, BoxReader, StoredAsset};
use crate::locks::KeyedLocks;
use crate::slug::is_folder_name;

const STAGING_DIR: &str = "temp";
const CREATORS_DIR: &str = "creators";

/// Local-disk asset store.
///
/// Layout below `root`:
/// `temp/` for in-flight uploads, `creators/{folder}/avatar.{ext}`,
/// `creators/{folder}/banner.{ext}` and `creators/{folder}/content/{name}`.
///
/// Placing an avatar or banner holds a per-creator, per-kind lock across the
/// rename and the sweep of older `{stem}.*` variants, so concurrent uploads
/// always leave exactly one file: the one renamed last.
pub struct FilesystemAssetStore {
    root: PathBuf,
    public_prefix: String,
    fixed_names: KeyedLocks,
}

impl FilesystemAssetStore {
    /// Create the store, making sure the staging and creators trees exist.
    pub async fn new(root: PathBuf, public_prefix: &str) -> Result<Self, StorageError> {
        fs::create_dir_all(root.join(STAGING_DIR)).await?;
        fs::create_dir_all(root.join(CREATORS_DIR)).await?;
        Ok(Self {
            root,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
            fixed_names: KeyedLocks::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn creator_dir(&self, folder_name: &str) -> Result<PathBuf, StorageError> {
        if !is_folder_name(folder_name) {
            return Err(StorageError::InvalidPath(format!(
                "not a creator folder name: {folder_name}"
            )));
        }
        Ok(self.root.join(CREATORS_DIR).join(folder_name))
    }

    /// Map a public relative path onto the creators tree.
    fn resolve(&self, relative_path: &str) -> Result<PathBuf, StorageError> {
        let invalid = || StorageError::InvalidPath(relative_path.to_string());

        let mut segments = relative_path.split('/');
        if segments.next() != Some(CREATORS_DIR) {
            return Err(invalid());
        }

        let mut path = self.root.join(CREATORS_DIR);
        let mut depth = 0;
        for segment in segments {
            if segment.is_empty()
                || segment.starts_with('.')
                || segment.contains('\\')
                || segment.contains('\0')
            {
                return Err(invalid());
            }
            path.push(segment);
            depth += 1;
        }

        if depth < 2 {
            return Err(invalid());
        }
        Ok(path)
    }

    fn url_for(&self, relative_path: &str) -> String {
        format!("{}/{}", self.public_prefix, relative_path)
    }

    /// Delete `{stem}.*` files next to `keep` so a kind keeps a single file.
    async fn remove_stale_variants(&self, dir: &Path, stem: &str, keep: &str) {
        let Ok(mut entries) = fs::read_dir(dir).await else {
            return;
        };
        let prefix = format!("{stem}.");
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&prefix)
                && name != keep
                && let Err(e) = fs::remove_file(entry.path()).await
            {
                tracing::warn!("Failed to remove stale {stem} file {name}: {e}");
            }
        }
    }
}

fn validate_file_name(file_name: &str) -> Result<(), StorageError> {
    if file_name.is_empty()
        || file_name.starts_with('.')
        || file_name.contains(['/', '\\', '\0'])
    {
        return Err(StorageError::InvalidPath(format!(
            "invalid asset file name: {file_name}"
        )));
    }
    Ok(())
}

#[async_trait]
impl AssetStore for FilesystemAssetStore {
    fn staging_path(&self) -> PathBuf {
        self.root
            .join(STAGING_DIR)
            .join(format!("upload-{}", uuid::Uuid::new_v4()))
    }

    async fn ensure_creator_dir(&self, folder_name: &str) -> Result<PathBuf, StorageError> {
        let dir = self.creator_dir(folder_name)?;
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    async fn place(
        &self,
        staged: &Path,
        folder_name: &str,
        kind: AssetKind,
        file_name: &str,
    ) -> Result<StoredAsset, StorageError> {
        validate_file_name(file_name)?;

        let mut dir = self.creator_dir(folder_name)?;
        let mut relative_path = format!("{CREATORS_DIR}/{folder_name}");
        if let Some(sub) = kind.subdirectory() {
            dir.push(sub);
            relative_path.push('/');
            relative_path.push_str(sub);
        }
        fs::create_dir_all(&dir).await?;

        let size = fs::metadata(staged).await?.len();
        let target = dir.join(file_name);
        match kind.fixed_stem() {
            Some(stem) => {
                let _guard = self.fixed_names.lock(&format!("{folder_name}/{stem}")).await;
                fs::rename(staged, &target).await?;
                self.remove_stale_variants(&dir, stem, file_name).await;
            }
            None => fs::rename(staged, &target).await?,
        }

        relative_path.push('/');
        relative_path.push_str(file_name);

        tracing::debug!(
            kind = kind.as_str(),
            path = %relative_path,
            size,
            "Placed asset"
        );

        Ok(StoredAsset {
            url: self.url_for(&relative_path),
            relative_path,
            file_name: file_name.to_string(),
            size,
        })
    }

    async fn open(&self, relative_path: &str) -> Result<(BoxReader, u64), StorageError> {
        let path = self.resolve(relative_path)?;
        match fs::File::open(&path).await {
            Ok(file) => {
                let meta = file.metadata().await?;
                if !meta.is_file() {
                    return Err(StorageError::NotFound(relative_path.to_string()));
                }
                Ok((Box::new(BufReader::new(file)), meta.len()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(relative_path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn discard(&self, staged: &Path) -> Result<bool, StorageError> {
        match fs::remove_file(staged).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, relative_path: &str) -> Result<bool, StorageError> {
        let path = self.resolve(relative_path)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %relative_path, "Removed placed asset");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn check_writable(&self) -> Result<(), StorageError> {
        let marker = self.staging_path();
        fs::write(&marker, b"ok").await?;
        fs::remove_file(&marker).await?;
        Ok(())
    }
}
