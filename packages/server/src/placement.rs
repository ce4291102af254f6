use common::storage::{AssetKind, AssetStore, StorageError};
use common::{Clock, SlugGenerator, TokenSource};
use sea_orm::DatabaseConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::content;
use crate::error::AppError;
use crate::folders::{CreatorStore, resolve_folder_name};
use crate::state::AppState;
use crate::upload::StagedFile;
use crate::utils::filename::extension_of;

/// Where a placed asset ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedUpload {
    /// Public URL of the stored file.
    pub url: String,
    /// The creator's folder name.
    pub folder_name: String,
    /// Path below the storage root, used to take the file back out.
    pub relative_path: String,
}

/// A malformed folder or file name during placement comes from stored data,
/// not from the request, so it is a server error.
fn placement_error(err: StorageError) -> AppError {
    match err {
        StorageError::InvalidPath(detail) => {
            AppError::Internal(format!("Invalid storage path during placement: {detail}"))
        }
        other => other.into(),
    }
}

/// Broad media class of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Image,
    Video,
}

impl MediaClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => content::TYPE_IMAGE,
            Self::Video => content::TYPE_VIDEO,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            content::TYPE_IMAGE => Some(Self::Image),
            content::TYPE_VIDEO => Some(Self::Video),
            _ => None,
        }
    }
}

/// Classify an upload by its declared media type, falling back to the
/// filename when the client sent no specific type.
pub fn classify(content_type: Option<&str>, file_name: Option<&str>) -> Option<MediaClass> {
    let declared = content_type
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

    let essence = match declared {
        Some(ct) => ct,
        None => mime_guess::from_path(file_name?).first()?.essence_str().to_string(),
    };

    match essence.split('/').next() {
        Some("image") => Some(MediaClass::Image),
        Some("video") => Some(MediaClass::Video),
        _ => None,
    }
}

/// Extension for the stored file: the client's, else one implied by the
/// media type, else `bin`.
pub fn file_extension(file_name: Option<&str>, content_type: Option<&str>) -> String {
    if let Some(ext) = file_name.and_then(extension_of) {
        return ext;
    }

    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());
    let preferred = match essence.as_deref() {
        Some("image/jpeg") => Some("jpg"),
        Some("image/png") => Some("png"),
        Some("image/gif") => Some("gif"),
        Some("image/webp") => Some("webp"),
        Some("video/mp4") => Some("mp4"),
        Some("video/webm") => Some("webm"),
        Some("video/quicktime") => Some("mov"),
        _ => None,
    };
    if let Some(ext) = preferred {
        return ext.to_string();
    }

    essence
        .as_deref()
        .and_then(mime_guess::get_mime_extensions_str)
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| "bin".to_string())
}

/// Collaborators needed to place an upload.
pub struct Placement<'a, S: ?Sized> {
    pub store: &'a S,
    pub slugs: &'a SlugGenerator,
    pub assets: &'a dyn AssetStore,
    pub clock: &'a dyn Clock,
    pub tokens: &'a dyn TokenSource,
}

impl<S> Placement<'_, S>
where
    S: CreatorStore + ?Sized,
{
    /// Resolve the creator's folder and make sure its directory exists.
    pub async fn ensure_creator_folder(&self, creator_id: Uuid) -> Result<String, AppError> {
        let folder_name = resolve_folder_name(self.store, self.slugs, creator_id).await?;
        self.assets
            .ensure_creator_dir(&folder_name)
            .await
            .map_err(placement_error)?;
        Ok(folder_name)
    }

    /// Move a staged file into the creator's folder.
    ///
    /// The staged file is not removed on failure; the caller owns it.
    #[instrument(skip(self, staged), fields(kind = kind.as_str(), size = staged.size))]
    pub async fn place_upload(
        &self,
        staged: &StagedFile,
        creator_id: Uuid,
        kind: AssetKind,
    ) -> Result<PlacedUpload, AppError> {
        let folder_name = resolve_folder_name(self.store, self.slugs, creator_id).await?;

        let extension = file_extension(staged.file_name.as_deref(), staged.content_type.as_deref());
        let file_name = kind.file_name(&extension, self.clock, self.tokens);

        let stored = self
            .assets
            .place(&staged.path, &folder_name, kind, &file_name)
            .await
            .map_err(placement_error)?;

        tracing::info!(url = %stored.url, "Placed upload");

        Ok(PlacedUpload {
            url: stored.url,
            folder_name,
            relative_path: stored.relative_path,
        })
    }

    /// Take a placed file back out after the record that would point at it
    /// could not be written. Failures are logged, not returned.
    pub async fn discard_placed(&self, placed: &PlacedUpload) {
        match self.assets.remove(&placed.relative_path).await {
            Ok(_) => tracing::info!(url = %placed.url, "Removed orphaned upload"),
            Err(e) => tracing::warn!(url = %placed.url, "Failed to remove orphaned upload: {e}"),
        }
    }
}

impl AppState {
    pub fn placement(&self) -> Placement<'_, DatabaseConnection> {
        Placement {
            store: &self.db,
            slugs: &self.slugs,
            assets: self.assets.as_ref(),
            clock: self.clock.as_ref(),
            tokens: self.tokens.as_ref(),
        }
    }
}
