use serde::{Deserialize, Serialize};

use crate::domain::BillId;

/// Receipt picked in the new-bill file input.
///
/// `path` is the raw input value (`C:\fakepath\receipt.png` in browsers,
/// a filesystem path from the CLI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptFile {
    pub path: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bytes: Vec<u8>,
}

impl ReceiptFile {
    pub fn new(path: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Last segment of `path`, splitting on both separator styles.
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(['\\', '/'])
            .next()
            .unwrap_or(self.path.as_str())
    }
}

/// Multipart-style payload for the attachment upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentUpload {
    pub file: ReceiptFile,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentReceipt {
    pub file_url: String,
    pub key: BillId,
}

/// Raw values of the new-bill form fields, as typed by the employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBillForm {
    pub expense_type: String,
    pub name: String,
    pub amount: String,
    pub date: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_takes_last_segment_of_windows_fake_path() {
        let file = ReceiptFile::new("C:\\fakepath\\facture.png", "image/png", Vec::new());
        assert_eq!(file.file_name(), "facture.png");
    }

    #[test]
    fn file_name_handles_unix_paths_and_bare_names() {
        let file = ReceiptFile::new("/tmp/receipts/taxi.jpg", "image/jpeg", Vec::new());
        assert_eq!(file.file_name(), "taxi.jpg");

        let file = ReceiptFile::new("hotel.jpeg", "image/jpeg", Vec::new());
        assert_eq!(file.file_name(), "hotel.jpeg");
    }

    #[test]
    fn attachment_receipt_uses_camel_case_wire_names() {
        let receipt: AttachmentReceipt =
            serde_json::from_str(r#"{"fileUrl":"https://localhost:3456/images/test.jpg","key":"1234"}"#)
                .expect("receipt");
        assert_eq!(receipt.key, BillId("1234".into()));
        assert_eq!(receipt.file_url, "https://localhost:3456/images/test.jpg");
    }
}
