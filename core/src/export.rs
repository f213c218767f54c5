//! CSV export of a record list (normally the filtered subset).

use crate::record::ApplicationRecord;

pub const CSV_HEADER: [&str; 7] = [
    "Application ID",
    "Applicant Name",
    "Credit Score",
    "Risk Level",
    "Status",
    "Loan Amount",
    "Application Date",
];

/// Header plus one row per record, rows joined by `\n` with no trailing
/// newline. Numbers are written raw, dates as `M/D/YYYY`.
pub fn to_csv(records: &[ApplicationRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for r in records {
        let row = [
            escape(&r.id),
            escape(&r.applicant_name),
            r.credit_score.to_string(),
            r.risk_level.label().to_string(),
            r.status.label().to_string(),
            r.loan_amount.to_string(),
            r.application_date.format("%-m/%-d/%Y").to_string(),
        ];
        lines.push(row.join(","));
    }
    lines.join("\n")
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
