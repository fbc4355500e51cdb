use async_trait::async_trait;
use shared::{
    domain::{Bill, BillId},
    error::StoreError,
    protocol::{AttachmentReceipt, AttachmentUpload},
};

pub mod bills;
pub mod error;
pub mod formatter;
pub mod new_bill;
pub mod session;
pub mod view;

pub use bills::{BillListController, ReceiptIcon};
pub use error::BillError;
pub use formatter::{FormatError, FormattedBill};
pub use new_bill::{NewBillController, SubmittedBill, UploadSession};
pub use session::{FixedSession, KeyValueSession, NoSession, SessionSource};

/// Asynchronous record service holding the authoritative bills.
///
/// The core never looks at the transport behind it; every failure comes back
/// as a status-classified [`StoreError`].
#[async_trait]
pub trait RemoteBillStore: Send + Sync {
    async fn list_bills(&self) -> Result<Vec<Bill>, StoreError>;
    async fn create_bill_attachment(
        &self,
        upload: AttachmentUpload,
    ) -> Result<AttachmentReceipt, StoreError>;
    async fn update_bill(&self, bill_id: &BillId, serialized_bill: &str)
        -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Bills,
    NewBill,
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Bills => "#employee/bills",
            Route::NewBill => "#employee/bill/new",
            Route::Dashboard => "#admin/dashboard",
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

impl<F> Navigator for F
where
    F: Fn(Route) + Send + Sync,
{
    fn navigate(&self, route: Route) {
        self(route)
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
