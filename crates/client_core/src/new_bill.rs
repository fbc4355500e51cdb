//! New-bill form controller: receipt validation, staged upload and submission.

use std::sync::Arc;

use shared::{
    domain::{Bill, BillId, BillStatus, DEFAULT_PCT},
    error::{ErrorCode, StoreError},
    protocol::{AttachmentUpload, NewBillForm, ReceiptFile},
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    error::{BillError, INVALID_FILE_MESSAGE},
    session::{resolve_email, SessionSource},
    view::NewBillSurface,
    Navigator, RemoteBillStore, Route,
};

const ACCEPTED_RECEIPT_SUBTYPES: [&str; 3] = ["jpg", "jpeg", "png"];

pub fn is_accepted_receipt_type(mime_type: &str) -> bool {
    let Some((kind, subtype)) = mime_type.trim().split_once('/') else {
        return false;
    };
    kind.eq_ignore_ascii_case("image")
        && ACCEPTED_RECEIPT_SUBTYPES
            .iter()
            .any(|accepted| subtype.eq_ignore_ascii_case(accepted))
}

/// Leading-integer parse: optional sign then digits, anything after is
/// ignored. `None` when no digit leads the input.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

/// Receipt upload state bridging the file input and the form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSession {
    pub selected_file: Option<ReceiptFile>,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub bill_id: Option<BillId>,
}

#[derive(Debug)]
pub struct SubmittedBill {
    pub bill: Bill,
    /// In-flight store write, `None` when nothing was sent.
    pub persistence: Option<JoinHandle<()>>,
}

pub struct NewBillController {
    surface: Arc<dyn NewBillSurface>,
    navigator: Arc<dyn Navigator>,
    store: Option<Arc<dyn RemoteBillStore>>,
    session: Arc<dyn SessionSource>,
    upload: Arc<Mutex<UploadSession>>,
}

impl NewBillController {
    pub fn new(
        surface: Arc<dyn NewBillSurface>,
        navigator: Arc<dyn Navigator>,
        store: Option<Arc<dyn RemoteBillStore>>,
        session: Arc<dyn SessionSource>,
    ) -> Arc<Self> {
        Arc::new(Self {
            surface,
            navigator,
            store,
            session,
            upload: Arc::new(Mutex::new(UploadSession::default())),
        })
    }

    pub async fn upload_session(&self) -> UploadSession {
        self.upload.lock().await.clone()
    }

    /// Validates the picked receipt and starts its upload.
    ///
    /// The upload runs on its own task; the session is filled in when it
    /// completes. Overlapping uploads each write on completion, so the last
    /// one to finish wins.
    pub fn on_file_selected(&self, file: ReceiptFile) -> Result<JoinHandle<()>, BillError> {
        if !is_accepted_receipt_type(&file.mime_type) {
            info!(
                "new_bill: rejected receipt type={} path={}",
                file.mime_type, file.path
            );
            self.surface.alert(INVALID_FILE_MESSAGE);
            self.surface.clear_file_input();
            return Err(BillError::InvalidFileType {
                mime_type: file.mime_type,
            });
        }

        let Some(store) = self.store.clone() else {
            let err = StoreError::new(ErrorCode::Unavailable, "no bill store configured");
            error!("new_bill: cannot upload receipt: {err}");
            return Err(BillError::Upload(err));
        };

        let file_name = file.file_name().to_string();
        let email = resolve_email(self.session.as_ref());
        let upload = Arc::clone(&self.upload);

        Ok(tokio::spawn(async move {
            let selected = file.clone();
            match store
                .create_bill_attachment(AttachmentUpload { file, email })
                .await
            {
                Ok(receipt) => {
                    debug!(
                        "new_bill: receipt uploaded key={} file={file_name}",
                        receipt.key
                    );
                    let mut session = upload.lock().await;
                    session.selected_file = Some(selected);
                    session.bill_id = Some(receipt.key);
                    session.file_url = Some(receipt.file_url);
                    session.file_name = Some(file_name);
                }
                Err(err) => {
                    error!("new_bill: {}", BillError::Upload(err));
                }
            }
        }))
    }

    /// Builds the bill from the form and the current upload session.
    pub async fn build_bill(&self, form: &NewBillForm) -> Bill {
        let upload = self.upload_session().await;
        self.bill_from(form, &upload)
    }

    fn bill_from(&self, form: &NewBillForm, upload: &UploadSession) -> Bill {
        Bill {
            id: None,
            email: resolve_email(self.session.as_ref()),
            expense_type: form.expense_type.clone(),
            name: form.name.clone(),
            amount: parse_leading_int(&form.amount),
            date: form.date.clone(),
            vat: form.vat.clone(),
            pct: parse_leading_int(&form.pct).unwrap_or(DEFAULT_PCT),
            commentary: form.commentary.clone(),
            file_url: upload.file_url.clone(),
            file_name: upload.file_name.clone(),
            status: BillStatus::Pending.as_str().to_string(),
        }
    }

    /// Submits the form: sends the bill to the store and navigates back to
    /// the list without waiting for the write to settle.
    ///
    /// The bill fields and the record key come from one session snapshot, so
    /// an upload completing mid-submit cannot pair a bill with another
    /// upload's key.
    pub async fn on_form_submit(&self, form: NewBillForm) -> SubmittedBill {
        let upload = self.upload_session().await;
        let bill = self.bill_from(&form, &upload);
        let persistence = self.persist(&bill, upload.bill_id).await;
        self.navigator.navigate(Route::Bills);
        SubmittedBill { bill, persistence }
    }

    /// Starts the store write for `bill`. Failures are logged, never retried.
    pub async fn update_bill(&self, bill: &Bill) -> Option<JoinHandle<()>> {
        let bill_id = self.upload.lock().await.bill_id.clone();
        self.persist(bill, bill_id).await
    }

    async fn persist(&self, bill: &Bill, bill_id: Option<BillId>) -> Option<JoinHandle<()>> {
        let Some(store) = self.store.clone() else {
            debug!("new_bill: no store configured, bill not persisted");
            return None;
        };

        let Some(bill_id) = bill_id else {
            warn!("new_bill: no completed receipt upload, bill not persisted");
            return None;
        };

        let serialized = match serde_json::to_string(bill) {
            Ok(serialized) => serialized,
            Err(err) => {
                error!("new_bill: failed to serialize bill key={bill_id}: {err}");
                return None;
            }
        };

        Some(tokio::spawn(async move {
            match store.update_bill(&bill_id, &serialized).await {
                Ok(()) => debug!("new_bill: bill persisted key={bill_id}"),
                Err(err) => error!("new_bill: key={bill_id} {}", BillError::Persist(err)),
            }
        }))
    }
}

#[cfg(test)]
#[path = "tests/new_bill_tests.rs"]
mod tests;
