//! Reading files picked for `csv`, `file`, and `image` fields.

use std::path::Path;

use frontand_types::FileHandle;
use thiserror::Error;
use tracing::{debug, warn};

/// Advertised upload limit. Larger files are still read, with a warning.
pub const CSV_SOFT_LIMIT_BYTES: u64 = 10 * 1024 * 1024;

/// File input failures surfaced to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Please upload a CSV file")]
    NotCsv,
    #[error("Failed to read file")]
    ReadFailed,
}

/// Returns true when the file name ends in `.csv` or the content type mentions csv.
pub fn is_csv_file(handle: &FileHandle) -> bool {
    let by_name = handle.name.to_ascii_lowercase().ends_with(".csv");
    let by_type = handle
        .content_type
        .as_deref()
        .is_some_and(|content_type| content_type.to_ascii_lowercase().contains("csv"));
    by_name || by_type
}

/// Build a [`FileHandle`] for a path on disk.
pub async fn file_handle_for(path: &Path) -> Result<FileHandle, InputError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|error| {
        warn!(path = %path.display(), %error, "cannot stat selected file");
        InputError::ReadFailed
    })?;
    if !metadata.is_file() {
        return Err(InputError::ReadFailed);
    }
    Ok(FileHandle::new(path, metadata.len()))
}

/// Read an uploaded CSV file as text.
///
/// Invalid UTF-8 sequences are replaced rather than rejected, matching
/// whole-file text decoding.
pub async fn read_csv_upload(handle: &FileHandle) -> Result<String, InputError> {
    if !is_csv_file(handle) {
        return Err(InputError::NotCsv);
    }
    if handle.size > CSV_SOFT_LIMIT_BYTES {
        warn!(
            file = %handle.name,
            size = handle.size,
            limit = CSV_SOFT_LIMIT_BYTES,
            "CSV upload exceeds the advertised size limit"
        );
    }

    let bytes = tokio::fs::read(&handle.path).await.map_err(|error| {
        warn!(path = %handle.path.display(), %error, "failed to read CSV upload");
        InputError::ReadFailed
    })?;
    debug!(file = %handle.name, bytes = bytes.len(), "read CSV upload");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
