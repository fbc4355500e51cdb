use super::*;
use crate::{
    test_support::{RecordingNavigator, TestBillStore},
    view::{ReceiptModal, DEFAULT_RECEIPT_MAX_WIDTH},
};
use shared::fixtures::fixture_bills;

fn controller(
    store: Option<TestBillStore>,
) -> (BillListController, Arc<RecordingNavigator>, Arc<ReceiptModal>) {
    let navigator = Arc::new(RecordingNavigator::default());
    let modal = Arc::new(ReceiptModal::new());
    let store = store.map(|store| Arc::new(store) as Arc<dyn RemoteBillStore>);
    (
        BillListController::new(
            navigator.clone(),
            store,
            modal.clone(),
            DEFAULT_RECEIPT_MAX_WIDTH,
        ),
        navigator,
        modal,
    )
}

#[tokio::test]
async fn returns_every_fixture_bill() {
    let (bills, _, _) = controller(Some(TestBillStore::with_bills(fixture_bills())));
    let listed = bills.get_bills().await.expect("bills");
    assert_eq!(listed.len(), 4);
}

#[tokio::test]
async fn orders_bills_from_latest_to_earliest() {
    let (bills, _, _) = controller(Some(TestBillStore::with_bills(fixture_bills())));
    let listed = bills.get_bills().await.expect("bills");
    let raw_dates: Vec<&str> = listed.iter().map(|row| row.bill.date.as_str()).collect();

    let mut sorted = raw_dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(raw_dates, sorted);
    assert!(raw_dates.windows(2).all(|pair| pair[0] > pair[1]));
}

#[tokio::test]
async fn formats_date_and_status_for_display() {
    let (bills, _, _) = controller(Some(TestBillStore::with_bills(fixture_bills())));
    let listed = bills.get_bills().await.expect("bills");
    assert_eq!(listed[0].date, "4 Avr. 04");
    assert_eq!(listed[0].status, "En attente");
    assert_eq!(listed[1].status, "Accepté");
}

#[tokio::test]
async fn malformed_record_keeps_raw_values_without_hiding_others() {
    let mut fixtures = fixture_bills();
    fixtures[1].date = "pas une date".into();
    fixtures[2].status = "archived".into();
    let (bills, _, _) = controller(Some(TestBillStore::with_bills(fixtures)));

    let listed = bills.get_bills().await.expect("bills");
    assert_eq!(listed.len(), 4);
    assert!(listed.iter().any(|row| row.date == "pas une date"));
    assert!(listed.iter().any(|row| row.status == "archived"));
    assert!(listed.iter().any(|row| row.date == "4 Avr. 04"));
}

#[tokio::test]
async fn without_store_lists_nothing() {
    let (bills, _, _) = controller(None);
    assert!(bills.get_bills().await.expect("bills").is_empty());
}

#[tokio::test]
async fn fetch_failure_is_classified_by_status() {
    let (bills, _, _) = controller(Some(TestBillStore::failing_list(404)));
    let err = bills.get_bills().await.expect_err("should fail");
    assert!(matches!(err, BillError::Fetch(_)));
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn not_found_renders_erreur_404() {
    let (bills, _, _) = controller(Some(TestBillStore::failing_list(404)));
    assert_eq!(bills.load_page().await.render(), "Erreur 404");
}

#[tokio::test]
async fn server_failure_renders_erreur_500() {
    let (bills, _, _) = controller(Some(TestBillStore::failing_list(500)));
    assert_eq!(bills.load_page().await.render(), "Erreur 500");
}

#[tokio::test]
async fn successful_fetch_renders_table() {
    let (bills, _, _) = controller(Some(TestBillStore::with_bills(fixture_bills())));
    match bills.load_page().await {
        BillsPage::Data(rows) => assert_eq!(rows.len(), 4),
        other => panic!("unexpected page {other:?}"),
    }
}

#[test]
fn eye_icon_with_url_shows_receipt() {
    let (bills, _, modal) = controller(None);
    let fixtures = fixture_bills();
    let icon = ReceiptIcon::for_bill(&fixtures[0]);

    let preview = bills.handle_click_icon_eye(&icon);
    assert!(matches!(
        preview,
        ReceiptPreview::Image { max_width: DEFAULT_RECEIPT_MAX_WIDTH, .. }
    ));
    assert_eq!(modal.current(), Some(preview));
}

#[test]
fn eye_icon_without_url_shows_placeholder() {
    let (bills, _, modal) = controller(None);
    for icon in [
        ReceiptIcon::new(None),
        ReceiptIcon::new(Some("null".into())),
        ReceiptIcon::new(Some(String::new())),
    ] {
        assert_eq!(bills.handle_click_icon_eye(&icon), ReceiptPreview::Missing);
    }
    assert_eq!(modal.current(), Some(ReceiptPreview::Missing));
}

#[test]
fn clicking_eye_repeatedly_is_idempotent() {
    let (bills, _, modal) = controller(None);
    let icon = ReceiptIcon::new(Some("https://localhost/a.png".into()));
    let first = bills.handle_click_icon_eye(&icon);
    let second = bills.handle_click_icon_eye(&icon);
    assert_eq!(first, second);
    assert_eq!(modal.current(), Some(second));
}

#[test]
fn new_bill_button_navigates_to_form() {
    let (bills, navigator, _) = controller(None);
    bills.handle_click_new_bill();
    assert_eq!(navigator.routes(), vec![Route::NewBill]);
}
