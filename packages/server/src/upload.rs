use std::collections::HashMap;
use std::path::PathBuf;

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use common::storage::{AssetStore, StorageError};
use tokio::io::AsyncWriteExt;

use crate::error::AppError;

/// Longest accepted text part, in bytes.
const MAX_TEXT_FIELD_LEN: usize = 16 * 1024;

/// A file part written to the staging area.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub path: PathBuf,
    /// Client-supplied filename.
    pub file_name: Option<String>,
    /// Client-declared media type.
    pub content_type: Option<String>,
    pub size: u64,
}

/// Which multipart parts are files, and their size limits.
#[derive(Debug, Clone, Copy)]
pub struct FileLimit<'a> {
    pub field: &'a str,
    pub max_size: u64,
}

impl<'a> FileLimit<'a> {
    pub const fn new(field: &'a str, max_size: u64) -> Self {
        Self { field, max_size }
    }
}

/// A parsed multipart form whose files live in the staging area.
///
/// Call [`StagedForm::cleanup`] once the request is handled; it removes any
/// staged file that was not moved into a creator folder.
#[derive(Debug, Default)]
pub struct StagedForm {
    files: HashMap<String, StagedFile>,
    fields: HashMap<String, String>,
}

impl StagedForm {
    pub fn file(&self, name: &str) -> Option<&StagedFile> {
        self.files.get(name)
    }

    /// Trimmed text value; blank values count as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First non-blank value among `names`.
    pub fn text_any(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|n| self.text(n))
    }

    pub async fn cleanup(self, assets: &dyn AssetStore) {
        discard_all(assets, self.files.into_values()).await;
    }
}

async fn discard_all(assets: &dyn AssetStore, files: impl IntoIterator<Item = StagedFile>) {
    for file in files {
        match assets.discard(&file.path).await {
            Ok(true) => tracing::debug!(path = %file.path.display(), "Discarded staged file"),
            Ok(false) => {}
            Err(e) => tracing::warn!(path = %file.path.display(), "Failed to discard staged file: {e}"),
        }
    }
}

/// Read every part of `multipart`. Parts named in `limits` are staged on disk;
/// everything else is read as text. On failure nothing stays staged.
pub async fn stage_form(
    multipart: &mut Multipart,
    assets: &dyn AssetStore,
    limits: &[FileLimit<'_>],
) -> Result<StagedForm, AppError> {
    let mut form = StagedForm::default();

    let result = read_parts(multipart, assets, limits, &mut form).await;
    if let Err(e) = result {
        form.cleanup(assets).await;
        return Err(e);
    }
    Ok(form)
}

async fn read_parts(
    multipart: &mut Multipart,
    assets: &dyn AssetStore,
    limits: &[FileLimit<'_>],
    form: &mut StagedForm,
) -> Result<(), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(limit) = limits.iter().find(|l| l.field == name) {
            let staged = stage_field(field, assets, limit.max_size).await?;
            // A repeated part replaces the earlier one.
            if let Some(previous) = form.files.insert(name, staged) {
                discard_all(assets, [previous]).await;
            }
        } else {
            let text = read_text_field(field, &name).await?;
            form.fields.insert(name, text);
        }
    }
    Ok(())
}

/// Read a text part, giving up as soon as it passes [`MAX_TEXT_FIELD_LEN`].
async fn read_text_field(mut field: Field<'_>, name: &str) -> Result<String, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))?
    {
        if buf.len() + chunk.len() > MAX_TEXT_FIELD_LEN {
            return Err(AppError::Validation(format!("Field '{name}' is too long")));
        }
        buf.extend_from_slice(&chunk);
    }
    String::from_utf8(buf)
        .map_err(|_| AppError::Validation(format!("Field '{name}' is not valid UTF-8")))
}

/// Stream one multipart field into a fresh staging file.
///
/// A file of exactly `max_size` bytes is accepted; one byte more is rejected
/// and the partial file removed.
pub async fn stage_field(
    mut field: Field<'_>,
    assets: &dyn AssetStore,
    max_size: u64,
) -> Result<StagedFile, AppError> {
    let path = assets.staging_path();
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);

    let result = async {
        let mut temp_file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| AppError::Io(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::from(StorageError::SizeLimitExceeded {
                    actual: total_size,
                    limit: max_size,
                }));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Io(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Io(format!("Temp file flush failed: {e}")))?;

        Ok(total_size)
    }
    .await;

    match result {
        Ok(size) => Ok(StagedFile {
            path,
            file_name,
            content_type,
            size,
        }),
        Err(e) => {
            // Best effort.
            let _ = assets.discard(&path).await;
            Err(e)
        }
    }
}
