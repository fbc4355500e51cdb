//! Bill list page controller.

use std::sync::Arc;

use shared::domain::Bill;
use tracing::{debug, error, warn};

use crate::{
    error::BillError,
    formatter::{format_date, format_status, sort_chronologically, FormattedBill},
    view::{fetch_error_message, BillsPage, ReceiptPreview, ReceiptSurface},
    Navigator, RemoteBillStore, Route,
};

/// Per-row "view receipt" control, carrying the receipt URL attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptIcon {
    pub bill_url: Option<String>,
}

impl ReceiptIcon {
    pub fn new(bill_url: Option<String>) -> Self {
        Self { bill_url }
    }

    pub fn for_bill(bill: &Bill) -> Self {
        Self::new(bill.file_url.clone())
    }

    /// Rendered rows stamp missing URLs as `"null"`; treat those as absent.
    fn receipt_url(&self) -> Option<&str> {
        self.bill_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != "null")
    }
}

pub struct BillListController {
    navigator: Arc<dyn Navigator>,
    store: Option<Arc<dyn RemoteBillStore>>,
    receipt_surface: Arc<dyn ReceiptSurface>,
    receipt_max_width: u32,
}

impl BillListController {
    pub fn new(
        navigator: Arc<dyn Navigator>,
        store: Option<Arc<dyn RemoteBillStore>>,
        receipt_surface: Arc<dyn ReceiptSurface>,
        receipt_max_width: u32,
    ) -> Self {
        Self {
            navigator,
            store,
            receipt_surface,
            receipt_max_width,
        }
    }

    /// Fetches the employee's bills, most recent first, with display labels.
    ///
    /// Without a store this yields an empty list. A record that fails to
    /// format keeps its raw value for that field and stays in the list.
    pub async fn get_bills(&self) -> Result<Vec<FormattedBill>, BillError> {
        let Some(store) = &self.store else {
            debug!("bills: no store configured, returning empty list");
            return Ok(Vec::new());
        };

        let mut bills = store.list_bills().await.map_err(|err| {
            error!("bills: list fetch failed status={} err={err}", err.status);
            BillError::Fetch(err)
        })?;
        sort_chronologically(&mut bills);

        Ok(bills.into_iter().map(format_bill).collect())
    }

    /// Resolves the page content: the table on success, the status message on
    /// a failed fetch.
    pub async fn load_page(&self) -> BillsPage {
        match self.get_bills().await {
            Ok(bills) => BillsPage::Data(bills),
            Err(BillError::Fetch(err)) => BillsPage::Error(fetch_error_message(&err)),
            Err(err) => BillsPage::Error(err.to_string()),
        }
    }

    pub fn handle_click_icon_eye(&self, icon: &ReceiptIcon) -> ReceiptPreview {
        let preview = match icon.receipt_url() {
            Some(url) => ReceiptPreview::Image {
                url: url.to_string(),
                max_width: self.receipt_max_width,
            },
            None => ReceiptPreview::Missing,
        };
        self.receipt_surface.show_receipt(preview.clone());
        preview
    }

    pub fn handle_click_new_bill(&self) {
        self.navigator.navigate(Route::NewBill);
    }
}

fn format_bill(bill: Bill) -> FormattedBill {
    let date = format_date(&bill.date).unwrap_or_else(|err| {
        warn!("bills: keeping raw date for bill={:?}: {err}", bill.id);
        bill.date.clone()
    });
    let status = match format_status(&bill.status) {
        Ok(label) => label.to_string(),
        Err(err) => {
            warn!("bills: keeping raw status for bill={:?}: {err}", bill.id);
            bill.status.clone()
        }
    };
    FormattedBill { bill, date, status }
}

#[cfg(test)]
#[path = "tests/bills_tests.rs"]
mod tests;
