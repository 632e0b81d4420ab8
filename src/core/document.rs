//! Documents as the client sees them: a local file candidate before upload,
//! and the processed document with backend metadata afterwards.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::config::data::{AcceptedType, UploadConfig};
use crate::core::error::ValidationError;

/// A local file the user wants to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    /// Declared MIME type, when the caller knows one.
    pub mime: Option<String>,
}

impl DocumentFile {
    pub fn new(path: impl Into<PathBuf>, size: u64, mime: Option<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            size,
            mime,
        }
    }

    /// Stat a file on disk. The size comes from filesystem metadata so that
    /// oversize files are rejected without reading them.
    pub fn from_path(path: &Path) -> Result<Self, ValidationError> {
        let metadata = std::fs::metadata(path).map_err(|err| ValidationError::UnreadableFile {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        if !metadata.is_file() {
            return Err(ValidationError::UnreadableFile {
                path: path.display().to_string(),
                reason: "not a regular file".to_string(),
            });
        }
        Ok(Self::new(path, metadata.len(), None))
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }
}

/// Check a candidate against the configured upload policy.
///
/// A file is accepted when either its extension or its declared MIME type
/// matches one of the accepted types, and its size is within the limit.
pub fn validate_upload<'a>(
    file: &DocumentFile,
    policy: &'a UploadConfig,
) -> Result<&'a AcceptedType, ValidationError> {
    let extension = file.extension();
    let accepted = policy.accepted.iter().find(|accepted| {
        let ext_match = extension
            .as_deref()
            .is_some_and(|ext| accepted.extension.eq_ignore_ascii_case(ext));
        let mime_match = file
            .mime
            .as_deref()
            .is_some_and(|mime| accepted.mime.eq_ignore_ascii_case(mime));
        ext_match || mime_match
    });

    let Some(accepted) = accepted else {
        return Err(ValidationError::UnsupportedFileType {
            file_name: file.name.clone(),
        });
    };

    if file.size > policy.max_bytes {
        return Err(ValidationError::FileTooLarge {
            file_name: file.name.clone(),
            size: file.size,
            max: policy.max_bytes,
        });
    }

    Ok(accepted)
}

/// Metadata filled in from the backend after a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMetadata {
    pub chunk_count: Option<u64>,
    pub page_count: Option<u64>,
    /// True when the backend served an already processed copy.
    pub from_cache: bool,
    pub processing_time_secs: Option<f64>,
    pub uploaded_at: DateTime<Utc>,
}

/// A processed document. Only exists while its owning session exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub file_name: String,
    pub size: u64,
    pub mime: Option<String>,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn newly_processed(&self) -> bool {
        !self.metadata.from_cache
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / KB)
    } else {
        format!("{:.2} MB", bytes as f64 / MB)
    }
}
