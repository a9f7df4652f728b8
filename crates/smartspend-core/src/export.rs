//! Spreadsheet export of the receipt history
//!
//! The CSV opens cleanly in Excel: it starts with a UTF-8 byte-order mark and
//! quotes every text column.

use chrono::NaiveDate;

use crate::models::ReceiptRecord;

/// UTF-8 byte-order mark
pub const BOM: char = '\u{FEFF}';

/// Header row (Spanish, matching the app's UI language)
pub const CSV_HEADER: &str = "Fecha,Comercio,Categoría,Total,Descripción";

/// Render records as CSV text, BOM included. Rows are `\n`-separated with no
/// trailing newline.
pub fn export_records_csv(records: &[ReceiptRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for record in records {
        lines.push(format!(
            "{},{},{},{},{}",
            quote_field(&record.date),
            quote_field(&record.merchant),
            quote_field(&record.category),
            record.total,
            quote_field(record.description.as_deref().unwrap_or(""))
        ));
    }

    let mut csv = String::new();
    csv.push(BOM);
    csv.push_str(&lines.join("\n"));
    csv
}

/// `smartspend_export_<YYYY-MM-DD>.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("smartspend_export_{}.csv", date.format("%Y-%m-%d"))
}

/// Always quote, doubling any embedded quotes
fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_field() {
        assert_eq!(quote_field("simple"), "\"simple\"");
        assert_eq!(quote_field("with,comma"), "\"with,comma\"");
        assert_eq!(quote_field("O\"Brien"), "\"O\"\"Brien\"");
        assert_eq!(quote_field(""), "\"\"");
    }

    #[test]
    fn test_export_escapes_quotes_in_merchant() {
        let records = vec![ReceiptRecord::new("O\"Brien", "2024-01-02", 10.0, "Food")];
        let csv = export_records_csv(&records);
        assert!(csv.contains("\"O\"\"Brien\""));
    }

    #[test]
    fn test_export_layout() {
        let records = vec![
            ReceiptRecord::new("Lider", "2024-01-02", 10.0, "Comida").with_description("Pan"),
            ReceiptRecord::new("Copec", "2024-01-03", 25.5, "Transporte"),
        ];
        let csv = export_records_csv(&records);

        assert!(csv.starts_with('\u{FEFF}'));
        let body = csv.trim_start_matches('\u{FEFF}');
        let lines: Vec<_> = body.split('\n').collect();
        assert_eq!(
            lines,
            vec![
                "Fecha,Comercio,Categoría,Total,Descripción",
                "\"2024-01-02\",\"Lider\",\"Comida\",10,\"Pan\"",
                "\"2024-01-03\",\"Copec\",\"Transporte\",25.5,\"\"",
            ]
        );
    }

    #[test]
    fn test_export_empty_is_header_only() {
        let csv = export_records_csv(&[]);
        assert_eq!(csv, format!("{}{}", BOM, CSV_HEADER));
    }

    #[test]
    fn test_export_reads_back_with_csv_reader() {
        let records = vec![ReceiptRecord::new("Bar, \"El\" Sol", "2024-01-02", 3.25, "Ocio")
            .with_description("línea\nnueva")];
        let csv = export_records_csv(&records);
        let body = csv.trim_start_matches('\u{FEFF}');

        let mut reader = csv::Reader::from_reader(body.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "Bar, \"El\" Sol");
        assert_eq!(&rows[0][3], "3.25");
        assert_eq!(&rows[0][4], "línea\nnueva");
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename(date), "smartspend_export_2024-03-09.csv");
    }
}
