use super::*;
use shared::fixtures::fixture_bills;

#[test]
fn formats_iso_date_as_french_short_date() {
    assert_eq!(format_date("2004-04-04").expect("date"), "4 Avr. 04");
    assert_eq!(format_date("2021-12-31").expect("date"), "31 Déc. 21");
    assert_eq!(format_date("2002-02-02").expect("date"), "2 Fév. 02");
}

#[test]
fn rejects_unparseable_dates() {
    for raw in ["", "04/04/2004", "2004-13-01", "not a date"] {
        assert_eq!(
            format_date(raw),
            Err(FormatError::InvalidDate(raw.to_string())),
            "input {raw:?}"
        );
    }
}

#[test]
fn maps_known_statuses_to_labels() {
    assert_eq!(format_status("pending").expect("status"), "En attente");
    assert_eq!(format_status("accepted").expect("status"), "Accepté");
    assert_eq!(format_status("refused").expect("status"), "Refusé");
}

#[test]
fn unknown_status_is_a_format_error() {
    assert_eq!(
        format_status("archived"),
        Err(FormatError::UnknownStatus("archived".into()))
    );
    assert!(format_status("Pending").is_err());
}

#[test]
fn sorts_most_recent_first() {
    let mut bills = fixture_bills();
    sort_chronologically(&mut bills);
    let dates: Vec<&str> = bills.iter().map(|bill| bill.date.as_str()).collect();
    assert_eq!(
        dates,
        vec!["2004-04-04", "2003-03-03", "2002-02-02", "2001-01-01"]
    );
}

#[test]
fn equal_dates_keep_their_original_relative_order() {
    let mut bills = fixture_bills();
    for bill in bills.iter_mut() {
        bill.date = "2020-05-05".into();
    }
    let before: Vec<String> = bills.iter().map(|bill| bill.name.clone()).collect();
    sort_chronologically(&mut bills);
    let after: Vec<String> = bills.iter().map(|bill| bill.name.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn unpadded_dates_sort_by_calendar_day() {
    let mut bills = fixture_bills();
    bills[0].date = "2004-4-4".into();
    bills[1].date = "2004-12-01".into();
    bills[2].date = "2004-04-04".into();
    bills.truncate(3);
    let names: Vec<String> = bills.iter().map(|bill| bill.name.clone()).collect();

    sort_chronologically(&mut bills);

    let dates: Vec<&str> = bills.iter().map(|bill| bill.date.as_str()).collect();
    assert_eq!(dates, vec!["2004-12-01", "2004-4-4", "2004-04-04"]);
    assert_eq!(bills[1].name, names[0]);
}

#[test]
fn unparseable_dates_sort_after_valid_ones() {
    let mut bills = fixture_bills();
    bills[0].date = "pas une date".into();
    sort_chronologically(&mut bills);
    let dates: Vec<&str> = bills.iter().map(|bill| bill.date.as_str()).collect();
    assert_eq!(
        dates,
        vec!["2003-03-03", "2002-02-02", "2001-01-01", "pas une date"]
    );
}
