//! Display formatting for bill records.

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use shared::domain::{Bill, BillStatus};
use thiserror::Error;

const SHORT_MONTHS_FR: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid bill date '{0}'")]
    InvalidDate(String),
    #[error("unknown bill status '{0}'")]
    UnknownStatus(String),
}

/// Bill paired with its display-ready date and status labels.
///
/// When a field could not be formatted the raw value is carried instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedBill {
    pub bill: Bill,
    pub date: String,
    pub status: String,
}

/// `2004-04-04` -> `4 Avr. 04`
pub fn format_date(iso_date: &str) -> Result<String, FormatError> {
    let date =
        parse_iso_date(iso_date).ok_or_else(|| FormatError::InvalidDate(iso_date.to_string()))?;
    let month = SHORT_MONTHS_FR[date.month0() as usize];
    Ok(format!(
        "{} {}. {:02}",
        date.day(),
        month,
        date.year().rem_euclid(100)
    ))
}

pub fn format_status(status: &str) -> Result<&'static str, FormatError> {
    let status = status
        .parse::<BillStatus>()
        .map_err(|_| FormatError::UnknownStatus(status.to_string()))?;
    Ok(match status {
        BillStatus::Pending => "En attente",
        BillStatus::Accepted => "Accepté",
        BillStatus::Refused => "Refusé",
    })
}

fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Most recent first. Equal dates compare equal, so callers must sort with a
/// stable sort to keep the store's relative order for ties.
///
/// Dates are compared as calendar days, so `2004-4-4` and `2004-04-04` tie.
/// Unparseable dates sort after every valid one, by their raw text.
pub fn chronological_order(a: &Bill, b: &Bill) -> Ordering {
    match (parse_iso_date(&a.date), parse_iso_date(&b.date)) {
        (Some(a_date), Some(b_date)) => b_date.cmp(&a_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.date.cmp(&a.date),
    }
}

pub fn sort_chronologically(bills: &mut [Bill]) {
    bills.sort_by(chronological_order);
}

#[cfg(test)]
#[path = "tests/formatter_tests.rs"]
mod tests;
