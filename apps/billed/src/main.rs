use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    view::{NewBillPage, ReceiptModal},
    BillListController, FixedSession, KeyValueSession, Navigator, NewBillController, NoSession,
    ReceiptIcon, RemoteBillStore, Route, SessionSource,
};
use shared::{
    domain::{BillId, BillStatus, UserSession},
    protocol::{NewBillForm, ReceiptFile},
};
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url, Settings, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(about = "Employee expense reports")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Submit as this employee instead of the stored session.
    #[arg(long)]
    email: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List bills, most recent first.
    List,
    /// Upload a receipt then submit a new bill.
    New {
        #[arg(long)]
        receipt: PathBuf,
        /// Receipt MIME type; guessed from the extension when omitted.
        #[arg(long)]
        mime: Option<String>,
        #[arg(long = "type")]
        expense_type: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        vat: String,
        #[arg(long, default_value = "")]
        pct: String,
        #[arg(long, default_value = "")]
        commentary: String,
    },
    /// Show the receipt attached to a bill.
    ShowReceipt { bill_id: String },
    /// Insert the reference bills into the local store.
    Seed,
    /// Record an approval decision for a bill.
    SetStatus { bill_id: String, status: String },
}

struct App {
    settings: Settings,
    storage: Arc<Storage>,
    session: Arc<dyn SessionSource>,
    last_route: Arc<Mutex<Option<Route>>>,
}

impl App {
    fn store(&self) -> Arc<dyn RemoteBillStore> {
        self.storage.clone()
    }

    fn bill_list(&self, modal: Arc<ReceiptModal>) -> BillListController {
        BillListController::new(
            self.navigator(),
            Some(self.store()),
            modal,
            self.settings.receipt_max_width,
        )
    }

    fn navigator(&self) -> Arc<dyn Navigator> {
        let last_route = Arc::clone(&self.last_route);
        Arc::new(move |route: Route| {
            info!("navigate: {}", route.path());
            if let Ok(mut last) = last_route.lock() {
                *last = Some(route);
            }
        })
    }

    async fn print_bills(&self) {
        let page = self
            .bill_list(Arc::new(ReceiptModal::new()))
            .load_page()
            .await;
        println!("{}", page.render());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let settings = load_settings(&args.config)?;
    let database_url = prepare_database_url(&settings.database_url);
    let storage = Storage::new(&database_url)
        .await
        .with_context(|| format!("failed to open bill store at '{database_url}'"))?
        .with_file_base_url(settings.file_base_url.clone());

    let session: Arc<dyn SessionSource> = match (&args.email, &settings.session_file) {
        (Some(email), _) => Arc::new(FixedSession(Some(UserSession::employee(email.clone())))),
        (None, Some(path)) => Arc::new(KeyValueSession::from_json_file(path)?),
        (None, None) => Arc::new(NoSession),
    };

    let app = App {
        settings,
        storage: Arc::new(storage),
        session,
        last_route: Arc::new(Mutex::new(None)),
    };

    match args.command {
        Command::List => app.print_bills().await,
        Command::New {
            receipt,
            mime,
            expense_type,
            name,
            amount,
            date,
            vat,
            pct,
            commentary,
        } => {
            let mime_type = mime.unwrap_or_else(|| {
                mime_guess::from_path(&receipt)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });
            let bytes = tokio::fs::read(&receipt)
                .await
                .with_context(|| format!("failed to read receipt '{}'", receipt.display()))?;

            let page = Arc::new(NewBillPage::new());
            let receipt_path = receipt.to_string_lossy().into_owned();
            page.select_file(receipt_path.clone());

            let controller = NewBillController::new(
                page.clone(),
                app.navigator(),
                Some(app.store()),
                Arc::clone(&app.session),
            );

            match controller.on_file_selected(ReceiptFile::new(receipt_path, mime_type, bytes)) {
                Ok(upload) => upload.await.context("receipt upload task failed")?,
                Err(err) => {
                    for alert in page.alerts() {
                        eprintln!("{alert}");
                    }
                    bail!(err);
                }
            }

            let submitted = controller
                .on_form_submit(NewBillForm {
                    expense_type,
                    name,
                    amount,
                    date,
                    vat,
                    pct,
                    commentary,
                })
                .await;
            if let Some(persistence) = submitted.persistence {
                persistence.await.context("bill persistence task failed")?;
            }

            let navigated = app.last_route.lock().ok().and_then(|route| *route);
            if navigated == Some(Route::Bills) {
                app.print_bills().await;
            }
        }
        Command::ShowReceipt { bill_id } => {
            let modal = Arc::new(ReceiptModal::new());
            let bills = app.bill_list(modal.clone());
            let listed = bills.get_bills().await?;
            let row = listed
                .iter()
                .find(|row| row.bill.id.as_ref().map(BillId::as_str) == Some(bill_id.as_str()))
                .ok_or_else(|| anyhow!("no bill with id '{bill_id}'"))?;

            bills.handle_click_icon_eye(&ReceiptIcon::for_bill(&row.bill));
            if let Some(content) = modal.render() {
                println!("{content}");
            }
        }
        Command::Seed => {
            let inserted = app.storage.seed_fixture_bills().await?;
            println!("Seeded {inserted} bill(s)");
        }
        Command::SetStatus { bill_id, status } => {
            let status = status.parse::<BillStatus>()?;
            if !app
                .storage
                .set_bill_status(&BillId(bill_id.clone()), status)
                .await?
            {
                bail!("no submitted bill with id '{bill_id}'");
            }
            println!("Bill {bill_id} is now {status}");
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
