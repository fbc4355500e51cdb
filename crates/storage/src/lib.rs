use anyhow::{Context, Result};
use async_trait::async_trait;
use client_core::RemoteBillStore;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, warn};
use uuid::Uuid;

use shared::{
    domain::{Bill, BillId, BillStatus},
    error::{ErrorCode, StoreError},
    fixtures::fixture_bills,
    protocol::{AttachmentReceipt, AttachmentUpload},
};

pub const DEFAULT_FILE_BASE_URL: &str = "http://localhost:5678/public";

/// SQLite-backed bill store.
///
/// A bill row is reserved when its receipt is uploaded and completed once,
/// by the following bill submission. Only completed rows are listed.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
    file_base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReceipt {
    pub bill_id: BillId,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    AlreadySubmitted,
    UnknownBill,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        // Every connection to `sqlite::memory:` opens its own empty database.
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            5
        };
        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self {
            pool,
            file_base_url: DEFAULT_FILE_BASE_URL.to_string(),
        })
    }

    pub fn with_file_base_url(mut self, file_base_url: impl Into<String>) -> Self {
        self.file_base_url = file_base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn list_submitted_bills(&self) -> Result<Vec<Bill>> {
        let rows = sqlx::query(
            "SELECT id, status, record_json
             FROM bills
             WHERE record_json IS NOT NULL
             ORDER BY rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut bills = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.get::<String, _>(0);
            let record = row.get::<String, _>(2);
            match serde_json::from_str::<Bill>(&record) {
                Ok(mut bill) => {
                    bill.id = Some(BillId(id));
                    bill.status = row.get::<String, _>(1);
                    bills.push(bill);
                }
                Err(err) => warn!("storage: skipping unreadable bill id={id}: {err}"),
            }
        }
        Ok(bills)
    }

    /// Stores the receipt and reserves the bill row it will belong to.
    pub async fn reserve_attachment(&self, upload: &AttachmentUpload) -> Result<AttachmentReceipt> {
        let key = Uuid::new_v4().to_string();
        let file_name = upload.file.file_name().to_string();
        let file_url = format!("{}/{key}/{file_name}", self.file_base_url);

        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO bills (id, email, file_url, file_name) VALUES (?, ?, ?, ?)")
            .bind(&key)
            .bind(&upload.email)
            .bind(&file_url)
            .bind(&file_name)
            .execute(&mut *tx)
            .await
            .context("failed to reserve bill row")?;
        sqlx::query("INSERT INTO receipts (bill_id, mime_type, bytes) VALUES (?, ?, ?)")
            .bind(&key)
            .bind(&upload.file.mime_type)
            .bind(&upload.file.bytes)
            .execute(&mut *tx)
            .await
            .context("failed to store receipt")?;
        tx.commit().await?;

        debug!("storage: reserved bill id={key} file={file_name}");
        Ok(AttachmentReceipt {
            file_url,
            key: BillId(key),
        })
    }

    /// Completes a reserved bill. A bill is written once; later submissions
    /// for the same id are refused.
    pub async fn submit_bill(&self, bill_id: &BillId, bill: &Bill) -> Result<SubmitOutcome> {
        let record = serde_json::to_string(bill).context("failed to serialize bill")?;
        let updated = sqlx::query(
            "UPDATE bills
             SET record_json = ?, email = ?, submitted_at = CURRENT_TIMESTAMP
             WHERE id = ? AND record_json IS NULL",
        )
        .bind(&record)
        .bind(&bill.email)
        .bind(bill_id.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated > 0 {
            return Ok(SubmitOutcome::Submitted);
        }

        let exists = sqlx::query("SELECT 1 FROM bills WHERE id = ?")
            .bind(bill_id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        Ok(if exists {
            SubmitOutcome::AlreadySubmitted
        } else {
            SubmitOutcome::UnknownBill
        })
    }

    /// Approval decision; the only change a bill accepts after submission.
    pub async fn set_bill_status(&self, bill_id: &BillId, status: BillStatus) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE bills SET status = ? WHERE id = ? AND record_json IS NOT NULL",
        )
        .bind(status.as_str())
        .bind(bill_id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn receipt(&self, bill_id: &BillId) -> Result<Option<StoredReceipt>> {
        let row = sqlx::query("SELECT mime_type, bytes FROM receipts WHERE bill_id = ?")
            .bind(bill_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| StoredReceipt {
            bill_id: bill_id.clone(),
            mime_type: row.get::<String, _>(0),
            bytes: row.get::<Vec<u8>, _>(1),
        }))
    }

    /// Inserts the reference bills, skipping ids already present.
    pub async fn seed_fixture_bills(&self) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for bill in fixture_bills() {
            let Some(id) = bill.id.clone() else {
                continue;
            };
            let record = serde_json::to_string(&bill)?;
            inserted += sqlx::query(
                "INSERT OR IGNORE INTO bills
                     (id, email, status, file_url, file_name, record_json, submitted_at)
                 VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)",
            )
            .bind(id.as_str())
            .bind(&bill.email)
            .bind(&bill.status)
            .bind(&bill.file_url)
            .bind(&bill.file_name)
            .bind(&record)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        tx.commit().await?;
        Ok(inserted)
    }
}

#[async_trait]
impl RemoteBillStore for Storage {
    async fn list_bills(&self) -> Result<Vec<Bill>, StoreError> {
        self.list_submitted_bills().await.map_err(internal)
    }

    async fn create_bill_attachment(
        &self,
        upload: AttachmentUpload,
    ) -> Result<AttachmentReceipt, StoreError> {
        self.reserve_attachment(&upload).await.map_err(internal)
    }

    async fn update_bill(
        &self,
        bill_id: &BillId,
        serialized_bill: &str,
    ) -> Result<(), StoreError> {
        let bill = serde_json::from_str::<Bill>(serialized_bill).map_err(|err| {
            StoreError::new(ErrorCode::Validation, format!("malformed bill record: {err}"))
        })?;

        match self.submit_bill(bill_id, &bill).await.map_err(internal)? {
            SubmitOutcome::Submitted => Ok(()),
            SubmitOutcome::AlreadySubmitted => Err(StoreError::new(
                ErrorCode::Validation,
                format!("bill {bill_id} was already submitted"),
            )),
            SubmitOutcome::UnknownBill => {
                Err(StoreError::not_found(format!("no attachment for bill {bill_id}")))
            }
        }
    }
}

fn internal(err: anyhow::Error) -> StoreError {
    StoreError::internal(format!("{err:#}"))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.contains(":memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
