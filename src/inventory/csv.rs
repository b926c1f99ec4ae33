//! CSV export of the seal list.

use chrono::Local;

use crate::models::SealRecord;

/// Column headers, in output order.
pub const CSV_HEADER: [&str; 4] = ["Seal ID", "Department", "Status", "Date"];

/// File name offered for download.
pub const CSV_FILE_NAME: &str = "Warehouse_Report.csv";

/// Render `records` as CSV, one line per record after the header.
///
/// Lines are joined with `\n` without a trailing newline. The date column is
/// `created_at` in the local time zone, formatted with `date_format`.
pub fn export_csv(records: &[SealRecord], date_format: &str) -> Vec<u8> {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(join_row(CSV_HEADER.iter().copied()));

    for record in records {
        let department = record.department.to_string();
        let status = record.status.to_string();
        let date = record
            .created_at
            .with_timezone(&Local)
            .format(date_format)
            .to_string();
        lines.push(join_row(
            [
                record.seal_id.as_str(),
                department.as_str(),
                status.as_str(),
                date.as_str(),
            ]
            .into_iter(),
        ));
    }

    lines.join("\n").into_bytes()
}

fn join_row<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields.map(escape_field).collect::<Vec<_>>().join(",")
}

/// Quote a field when it holds a delimiter, quote or line break (RFC 4180).
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
