//! CSV input and output.
//!
//! Inputs are read schema-free into a [`RawTable`]; column resolution
//! happens in the engine. Output rows are [`BundleRow`]s.

use bundle_engine::{BundleRow, RawTable};
use std::io::{Read, Write};
use std::path::Path;

/// Read a headed CSV into a raw table. Ragged rows are accepted; missing
/// cells read as blank.
pub fn load_table<R: Read>(reader: R) -> Result<RawTable, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| format!("CSV header error: {}", e))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut table = RawTable::new(headers);

    for (line_num, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| format!("CSV parse error at line {}: {}", line_num + 2, e))?;
        table.push_row(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}

pub fn load_table_file(path: impl AsRef<Path>) -> Result<RawTable, String> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| format!("Failed to open '{}': {}", path.display(), e))?;
    load_table(file)
}

pub fn write_bundles_csv<W: Write>(writer: W, rows: &[BundleRow]) -> Result<(), String> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|e| format!("CSV write error: {}", e))?;
    }
    csv_writer.flush().map_err(|e| format!("CSV flush error: {}", e))
}

/// Write rows to `path`. An empty result still gets a header line.
pub fn write_bundles_file(path: impl AsRef<Path>, rows: &[BundleRow]) -> Result<(), String> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .map_err(|e| format!("Failed to create '{}': {}", path.display(), e))?;
    if rows.is_empty() {
        let mut csv_writer = csv::Writer::from_writer(file);
        csv_writer
            .write_record(BUNDLE_COLUMNS)
            .map_err(|e| format!("CSV write error: {}", e))?;
        return csv_writer.flush().map_err(|e| format!("CSV flush error: {}", e));
    }
    write_bundles_csv(file, rows)
}

pub fn read_bundles_csv<R: Read>(reader: R) -> Result<Vec<BundleRow>, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let row: BundleRow =
            result.map_err(|e| format!("CSV parse error at line {}: {}", line_num + 2, e))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_bundles_file(path: impl AsRef<Path>) -> Result<Vec<BundleRow>, String> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| format!("Failed to open '{}': {}", path.display(), e))?;
    read_bundles_csv(file)
}

pub fn bundles_to_json(rows: &[BundleRow]) -> Result<String, String> {
    serde_json::to_string_pretty(rows).map_err(|e| format!("JSON encode error: {}", e))
}

/// Output column order.
pub const BUNDLE_COLUMNS: [&str; 8] = [
    "branch_id",
    "bundle_items",
    "discount_pct",
    "bundle_price",
    "expected_profit",
    "support",
    "lift",
    "reason",
];

#[cfg(test)]
mod tests {
    use super::*;

    const SALES_CSV: &str = "\
Branch ID, Item ID ,Units Sold,Unit Price,Unit Cost
7,COF,\"1,200\",$4.50,1.20
7,MUF,12,3.00,2.10
12,TEA,80,2.00,0.50
";

    #[test]
    fn load_keeps_headers_and_cells() {
        let table = load_table(SALES_CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.headers()[1], "Item ID");
        let first: Vec<String> = table.rows().next().unwrap().to_vec();
        assert_eq!(first[2], "1,200");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_table_file("/definitely/not/here.csv").unwrap_err();
        assert!(err.contains("/definitely/not/here.csv"), "got: {}", err);
    }

    #[test]
    fn ragged_rows_load() {
        let table = load_table("a,b,c\n1,2\n".as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
    }

    fn row() -> BundleRow {
        BundleRow {
            branch_id: "7".into(),
            bundle_items: "COF+MUF".into(),
            discount_pct: 12.5,
            bundle_price: 6.56,
            expected_profit: 3.26,
            support: 0.25,
            lift: 1.6,
            reason: "Boost low-seller using strong anchor".into(),
        }
    }

    #[test]
    fn csv_output_has_header_and_reads_back() {
        let mut buf = Vec::new();
        write_bundles_csv(&mut buf, &[row()]).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with(&BUNDLE_COLUMNS.join(",")), "header: {}", text);
        assert_eq!(read_bundles_csv(buf.as_slice()).unwrap(), vec![row()]);
    }

    #[test]
    fn json_output_is_an_array() {
        let json = bundles_to_json(&[row()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["bundle_items"], "COF+MUF");
    }
}
