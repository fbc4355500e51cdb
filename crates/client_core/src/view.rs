//! Display surfaces fed by the controllers: the bills table, the receipt
//! modal and the new-bill form's feedback.

use std::sync::{Mutex, MutexGuard};

use comfy_table::{Cell, Color, Table};
use shared::{domain::BillStatus, error::StoreError};

use crate::formatter::{chronological_order, FormattedBill};

pub const LOADING_MESSAGE: &str = "Loading...";
pub const NO_RECEIPT_MESSAGE: &str = "Aucun justificatif joint à cette note de frais.";

/// Default upper bound for the receipt image width, in pixels.
pub const DEFAULT_RECEIPT_MAX_WIDTH: u32 = 500;

/// Message the bills page shows for a failed fetch: `Erreur 404`, `Erreur 500`, ...
pub fn fetch_error_message(err: &StoreError) -> String {
    format!("Erreur {}", err.status)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillsPage {
    Loading,
    Data(Vec<FormattedBill>),
    Error(String),
}

impl BillsPage {
    pub fn render(&self) -> String {
        match self {
            BillsPage::Loading => LOADING_MESSAGE.to_string(),
            BillsPage::Error(message) => message.clone(),
            BillsPage::Data(bills) => render_table(bills),
        }
    }
}

fn render_table(bills: &[FormattedBill]) -> String {
    let mut rows: Vec<&FormattedBill> = bills.iter().collect();
    rows.sort_by(|a, b| chronological_order(&a.bill, &b.bill));

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Type"),
        Cell::new("Nom"),
        Cell::new("Date"),
        Cell::new("Montant"),
        Cell::new("Statut"),
        Cell::new("Justificatif"),
    ]);

    for row in rows {
        let amount = match row.bill.amount {
            Some(amount) => format!("{amount} €"),
            None => "? €".to_string(),
        };
        let status_cell = match row.bill.parsed_status() {
            Ok(BillStatus::Accepted) => {
                Cell::new(&row.status).fg(Color::Rgb { r: 4, g: 120, b: 87 })
            }
            Ok(BillStatus::Refused) => {
                Cell::new(&row.status).fg(Color::Rgb { r: 185, g: 28, b: 28 })
            }
            _ => Cell::new(&row.status),
        };
        let receipt = row
            .bill
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(&row.bill.expense_type),
            Cell::new(&row.bill.name),
            Cell::new(&row.date),
            Cell::new(amount),
            status_cell,
            Cell::new(receipt),
        ]);
    }

    table.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptPreview {
    Image { url: String, max_width: u32 },
    Missing,
}

impl ReceiptPreview {
    pub fn render(&self) -> String {
        match self {
            ReceiptPreview::Image { url, max_width } => {
                format!("Justificatif (largeur max {max_width}px): {url}")
            }
            ReceiptPreview::Missing => NO_RECEIPT_MESSAGE.to_string(),
        }
    }
}

pub trait ReceiptSurface: Send + Sync {
    fn show_receipt(&self, preview: ReceiptPreview);
}

/// Modal holding the receipt currently on display. Showing a new receipt
/// replaces the previous content.
#[derive(Debug, Default)]
pub struct ReceiptModal {
    content: Mutex<Option<ReceiptPreview>>,
}

impl ReceiptModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<ReceiptPreview> {
        lock(&self.content).clone()
    }

    pub fn render(&self) -> Option<String> {
        self.current().map(|preview| preview.render())
    }
}

impl ReceiptSurface for ReceiptModal {
    fn show_receipt(&self, preview: ReceiptPreview) {
        *lock(&self.content) = Some(preview);
    }
}

/// Feedback channel of the new-bill form.
pub trait NewBillSurface: Send + Sync {
    fn alert(&self, message: &str);
    fn clear_file_input(&self);
}

#[derive(Debug, Default)]
pub struct NewBillPage {
    file_input: Mutex<String>,
    alerts: Mutex<Vec<String>>,
}

impl NewBillPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirrors the employee picking a file in the input.
    pub fn select_file(&self, path: impl Into<String>) {
        *lock(&self.file_input) = path.into();
    }

    pub fn file_input(&self) -> String {
        lock(&self.file_input).clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        lock(&self.alerts).clone()
    }
}

impl NewBillSurface for NewBillPage {
    fn alert(&self, message: &str) {
        lock(&self.alerts).push(message.to_string());
    }

    fn clear_file_input(&self) {
        lock(&self.file_input).clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
