use shared::error::StoreError;
use thiserror::Error;

use crate::formatter::FormatError;

/// Alert shown when the picked receipt is not an accepted image type.
pub const INVALID_FILE_MESSAGE: &str = "Le fichier doit être un .JPG, un .PNG ou un .JPEG.";

#[derive(Debug, Error)]
pub enum BillError {
    #[error("rejected receipt of type '{mime_type}'")]
    InvalidFileType { mime_type: String },
    #[error("attachment upload failed: {0}")]
    Upload(StoreError),
    #[error("bill update failed: {0}")]
    Persist(StoreError),
    #[error("bill list fetch failed: {0}")]
    Fetch(StoreError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl BillError {
    /// Status of the underlying store failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            BillError::Upload(err) | BillError::Persist(err) | BillError::Fetch(err) => {
                Some(err.status)
            }
            BillError::InvalidFileType { .. } | BillError::Format(_) => None,
        }
    }
}
