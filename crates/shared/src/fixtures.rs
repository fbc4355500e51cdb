//! Reference bills used to seed local stores and drive tests.

use crate::domain::{Bill, BillId, DEFAULT_PCT};

const FIXTURE_FILE_URL: &str = "https://test.storage.tld/v0/b/billable-677b6.appspot.com/o/justificatifs%2Fpreview-facture-free-201801-pdf-1.jpg?alt=media";

#[allow(clippy::too_many_arguments)]
fn fixture(
    id: &str,
    expense_type: &str,
    name: &str,
    amount: i64,
    date: &str,
    vat: &str,
    commentary: &str,
    file_name: &str,
    status: &str,
) -> Bill {
    Bill {
        id: Some(BillId(id.to_string())),
        email: "a@a".to_string(),
        expense_type: expense_type.to_string(),
        name: name.to_string(),
        amount: Some(amount),
        date: date.to_string(),
        vat: vat.to_string(),
        pct: DEFAULT_PCT,
        commentary: commentary.to_string(),
        file_url: Some(FIXTURE_FILE_URL.to_string()),
        file_name: Some(file_name.to_string()),
        status: status.to_string(),
    }
}

/// Four bills with distinct dates and one of each status.
pub fn fixture_bills() -> Vec<Bill> {
    vec![
        fixture(
            "47qAXb6fIm2zOKkLzMro",
            "Hôtel et logement",
            "encore",
            400,
            "2004-04-04",
            "80",
            "séminaire billed",
            "preview-facture-free-201801-pdf-1.jpg",
            "pending",
        ),
        fixture(
            "BeKy5Mo4jkmdfPGYpTxZ",
            "Transports",
            "test1",
            100,
            "2001-01-01",
            "",
            "plop",
            "1592770761.jpeg",
            "refused",
        ),
        fixture(
            "UIUZtnPQvnbFnB0ozvJh",
            "Services en ligne",
            "test3",
            300,
            "2003-03-03",
            "60",
            "",
            "facture-client-php-exportee-dans-document-pdf-enregistre-sur-disque-dur.png",
            "accepted",
        ),
        fixture(
            "qcCK3SzECmaZAGRrHjaC",
            "Restaurants et bars",
            "test2",
            200,
            "2002-02-02",
            "40",
            "test2",
            "preview-facture-free-201801-pdf-1.jpg",
            "refused",
        ),
    ]
}
