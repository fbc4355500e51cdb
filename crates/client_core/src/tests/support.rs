use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use shared::{
    domain::{Bill, BillId},
    error::StoreError,
    protocol::{AttachmentReceipt, AttachmentUpload},
};
use tokio::sync::Mutex;

use crate::{Navigator, RemoteBillStore, Route};

pub struct TestBillStore {
    bills: Vec<Bill>,
    list_error: Option<StoreError>,
    upload_error: Option<StoreError>,
    update_error: Option<StoreError>,
    upload_delays: HashMap<String, Duration>,
    pub uploads: Arc<Mutex<Vec<AttachmentUpload>>>,
    pub updates: Arc<Mutex<Vec<(BillId, String)>>>,
    next_key: Mutex<u32>,
}

impl TestBillStore {
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            bills,
            list_error: None,
            upload_error: None,
            update_error: None,
            upload_delays: HashMap::new(),
            uploads: Arc::new(Mutex::new(Vec::new())),
            updates: Arc::new(Mutex::new(Vec::new())),
            next_key: Mutex::new(1234),
        }
    }

    pub fn empty() -> Self {
        Self::with_bills(Vec::new())
    }

    pub fn failing_list(status: u16) -> Self {
        let mut store = Self::empty();
        store.list_error = Some(StoreError::with_status(status, format!("Erreur {status}")));
        store
    }

    pub fn failing_upload(mut self, err: StoreError) -> Self {
        self.upload_error = Some(err);
        self
    }

    pub fn failing_update(mut self, err: StoreError) -> Self {
        self.update_error = Some(err);
        self
    }

    /// Delays the upload of the file named `file_name`.
    pub fn with_upload_delay(mut self, file_name: &str, delay: Duration) -> Self {
        self.upload_delays.insert(file_name.to_string(), delay);
        self
    }

    pub async fn upload_count(&self) -> usize {
        self.uploads.lock().await.len()
    }

    pub async fn update_count(&self) -> usize {
        self.updates.lock().await.len()
    }
}

#[async_trait]
impl RemoteBillStore for TestBillStore {
    async fn list_bills(&self) -> Result<Vec<Bill>, StoreError> {
        if let Some(err) = &self.list_error {
            return Err(err.clone());
        }
        Ok(self.bills.clone())
    }

    async fn create_bill_attachment(
        &self,
        upload: AttachmentUpload,
    ) -> Result<AttachmentReceipt, StoreError> {
        let file_name = upload.file.file_name().to_string();
        self.uploads.lock().await.push(upload);

        if let Some(delay) = self.upload_delays.get(&file_name) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(err) = &self.upload_error {
            return Err(err.clone());
        }

        let key = {
            let mut next = self.next_key.lock().await;
            let key = *next;
            *next += 1;
            key
        };
        Ok(AttachmentReceipt {
            file_url: format!("https://localhost:3456/images/{file_name}"),
            key: BillId(key.to_string()),
        })
    }

    async fn update_bill(&self, bill_id: &BillId, serialized_bill: &str) -> Result<(), StoreError> {
        self.updates
            .lock()
            .await
            .push((bill_id.clone(), serialized_bill.to_string()));
        if let Some(err) = &self.update_error {
            return Err(err.clone());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: std::sync::Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().expect("routes").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().expect("routes").push(route);
    }
}
