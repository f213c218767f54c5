//! CSV export of the filtered subset.

use chrono::{TimeZone, Utc};
use credit_desk_core::{
    config::DeskConfig,
    export::{to_csv, CSV_HEADER},
    filter::FilterUpdate,
    record::RiskLevel,
    Desk,
};

#[test]
fn one_row_per_filtered_record() {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let desk = Desk::new_at(DeskConfig::default_test(), 42, now).unwrap();
    desk.update_filters(FilterUpdate::risk_levels([RiskLevel::Low])).unwrap();

    let subset = desk.filtered_records();
    let csv = to_csv(&subset);
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert_eq!(lines.len(), subset.len() + 1);

    for (line, record) in lines[1..].iter().zip(subset.iter()) {
        let cols: Vec<&str> = line.split(',').collect();
        assert_eq!(cols.len(), 7, "{line}");
        assert_eq!(cols[0], record.id);
        assert_eq!(cols[1], record.applicant_name);
        assert_eq!(cols[2], record.credit_score.to_string());
        assert_eq!(cols[3], "Low");
        assert_eq!(cols[4], record.status.label());
        assert_eq!(cols[5], record.loan_amount.to_string());
        assert_eq!(cols[6], record.application_date.format("%-m/%-d/%Y").to_string());
    }
}

#[test]
fn dates_use_month_day_year() {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let desk = Desk::new_at(DeskConfig::default_test(), 1, now).unwrap();
    let mut records = (*desk.records()).clone();
    records.truncate(1);
    records[0].application_date = Utc.with_ymd_and_hms(2024, 3, 7, 23, 0, 0).unwrap();

    let csv = to_csv(&records);
    assert!(csv.ends_with(",3/7/2024"), "{csv}");
}
