use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use log::{debug, error, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::fallback::fallback_payload;
use super::model::{ColumnTable, Value};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a raw TOI table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `{ "toi": [...], "pl_orbper": [...], ... }` or `[{ "toi": ..., ... }, ...]`
/// * `.csv`     – header row of column names, one candidate per line
/// * `.parquet` – one column per feature
///
/// Only recognized feature columns are kept; see [`ColumnTable::from_json_payload`].
pub fn load_file(path: &Path) -> Result<ColumnTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;
    info!(
        "loaded {} columns ({} rows) from {}",
        table.num_columns(),
        table.row_count(),
        path.display()
    );
    Ok(table)
}

/// Load `path` if given, substituting the demonstration payload when there is
/// no path or the source cannot be read.
pub fn load_or_fallback(path: Option<&Path>) -> ColumnTable {
    let Some(path) = path else {
        info!("no input given; using fallback data");
        return fallback_payload();
    };
    match load_file(path) {
        Ok(table) => table,
        Err(err) => {
            error!("Error loading {}; using fallback data: {err:#}", path.display());
            fallback_payload()
        }
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<ColumnTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    table_from_json(&root)
}

/// Decode a JSON payload in either column or record orientation.
///
/// An object with an `"error"` key is how the catalog service reports a failed
/// upstream query; it is surfaced as an error, not as an empty table.
pub fn table_from_json(root: &JsonValue) -> Result<ColumnTable> {
    match root {
        JsonValue::Object(obj) => {
            if let Some(err) = obj.get("error") {
                bail!("data source reported an error: {err}");
            }
            Ok(ColumnTable::from_json_payload(obj))
        }
        JsonValue::Array(records) => records_to_table(records),
        other => bail!("Expected a JSON object of columns or an array of records, got {other}"),
    }
}

/// Transpose `[{ col: value, ... }, ...]` into columns. A key missing from a
/// record becomes `Null` at that row.
fn records_to_table(records: &[JsonValue]) -> Result<ColumnTable> {
    let mut objects = Vec::with_capacity(records.len());
    let mut keys = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        keys.extend(obj.keys().cloned());
        objects.push(obj);
    }

    let columns = keys.into_iter().map(|key| {
        let values: Vec<Value> = objects
            .iter()
            .map(|obj| obj.get(&key).map(Value::from).unwrap_or(Value::Null))
            .collect();
        (key, values)
    });
    Ok(ColumnTable::from_recognized(columns))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one candidate per record.
/// Short records are accepted; their columns simply end early.
fn load_csv(path: &Path) -> Result<ColumnTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (cell, column) in record.iter().zip(columns.iter_mut()) {
            column.push(guess_value_type(cell));
        }
    }

    Ok(ColumnTable::from_recognized(headers.into_iter().zip(columns)))
}

fn guess_value_type(s: &str) -> Value {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return Value::Float(f);
    }
    if trimmed == "true" || trimmed == "false" {
        return Value::Bool(trimmed == "true");
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file, one table column per Parquet column. Batches are
/// concatenated in file order.
fn load_parquet(path: &Path) -> Result<ColumnTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: BTreeMap<String, Vec<Value>> = BTreeMap::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for (col_idx, field) in schema.fields().iter().enumerate() {
            let array = batch.column(col_idx);
            let column = columns.entry(field.name().clone()).or_default();
            column.extend((0..batch.num_rows()).map(|row| extract_value(array, row)));
        }
    }

    Ok(ColumnTable::from_recognized(columns))
}

/// Extract a single cell from an Arrow column at a given row.
///
/// Integers of any width become `Integer` (a `UInt64` beyond `i64::MAX` becomes
/// `Float`). Dates, timestamps and other types keep their Arrow display text.
fn extract_value(col: &ArrayRef, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Value::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => Value::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => Value::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => Value::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => Value::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer)
        }
        DataType::Float32 => Value::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        other => match array_value_to_string(col.as_ref(), row) {
            Ok(text) => Value::String(text),
            Err(err) => {
                debug!("cannot display {other:?} cell at row {row}: {err}");
                Value::Null
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::clean;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{
        Date32Array, Float64Array, Int64Array, Int8Array, StringArray, UInt64Array, UInt8Array,
    };
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn temp_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn json_columns_are_loaded() {
        let file = temp_file(
            ".json",
            r#"{"toi": ["TOI-1", "TOI-2"], "pl_orbper": [0, 5.5], "pl_rade": null}"#,
        );
        let table = load_file(file.path()).unwrap();

        assert_eq!(table.column_names(), vec!["toi", "pl_orbper"]);
        assert_eq!(
            table.column("pl_orbper").unwrap(),
            &[Value::Integer(0), Value::Float(5.5)]
        );
    }

    #[test]
    fn json_records_are_transposed() {
        let table = table_from_json(&json!([
            {"toi": "TOI-1", "pl_orbper": 1.5},
            {"toi": "TOI-2"},
        ]))
        .unwrap();

        assert_eq!(
            table.column("pl_orbper").unwrap(),
            &[Value::Float(1.5), Value::Null]
        );
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn json_error_payload_is_an_error() {
        let err = table_from_json(&json!({"error": "Could not fetch TOI data"})).unwrap_err();
        assert!(err.to_string().contains("Could not fetch TOI data"));
        assert!(table_from_json(&json!(42)).is_err());
        assert!(table_from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn csv_cells_are_typed_and_ragged_rows_tolerated() {
        let file = temp_file(
            ".csv",
            "toi,pl_orbper,pl_temp,notes\nTOI-1,2.5,700,x\nTOI-2,,0,y\nTOI-3,4\n",
        );
        let table = load_file(file.path()).unwrap();

        assert!(!table.contains("notes"));
        assert_eq!(
            table.column("pl_orbper").unwrap(),
            &[Value::Float(2.5), Value::Null, Value::Integer(4)]
        );
        assert_eq!(table.column("pl_temp").unwrap().len(), 2);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn parquet_columns_are_loaded() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("toi", DataType::Utf8, false),
            Field::new("pl_orbper", DataType::Float64, true),
            Field::new("pl_trandep", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["TOI-1", "TOI-2"])),
                Arc::new(Float64Array::from(vec![Some(3.25), None])),
                Arc::new(Int64Array::from(vec![120, 340])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(
            table.column("pl_orbper").unwrap(),
            &[Value::Float(3.25), Value::Null]
        );
        assert_eq!(
            table.column("pl_trandep").unwrap(),
            &[Value::Integer(120), Value::Integer(340)]
        );
        assert_eq!(table.column("toi").unwrap()[1], Value::from("TOI-2"));
    }

    #[test]
    fn parquet_narrow_unsigned_and_date_columns_keep_their_values() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("tid", DataType::UInt64, false),
            Field::new("pl_pnum", DataType::UInt8, false),
            Field::new("pl_orbper", DataType::Int8, false),
            Field::new("toi_created", DataType::Date32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(UInt64Array::from(vec![u64::MAX, 7])),
                Arc::new(UInt8Array::from(vec![0, 2])),
                Arc::new(Int8Array::from(vec![0, 3])),
                Arc::new(Date32Array::from(vec![Some(19_737), Some(19_738)])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(
            table.column("tid").unwrap(),
            &[Value::Float(u64::MAX as f64), Value::Integer(7)]
        );
        assert_eq!(
            table.column("pl_pnum").unwrap(),
            &[Value::Integer(0), Value::Integer(2)]
        );
        assert_eq!(
            table.column("pl_orbper").unwrap(),
            &[Value::Integer(0), Value::Integer(3)]
        );
        assert_eq!(table.column("toi_created").unwrap()[0], Value::from("2024-01-15"));

        // the zero planet count and zero period rule out the first row
        let cleaned = clean(&table);
        assert_eq!(cleaned.row_count(), 1);
        assert_eq!(cleaned.column("toi_created").unwrap(), &[Value::from("2024-01-16")]);
    }

    #[test]
    fn unreadable_sources_fall_back() {
        let fallback = fallback_payload();
        assert_eq!(load_or_fallback(None), fallback);
        assert_eq!(load_or_fallback(Some(Path::new("/no/such/file.json"))), fallback);

        let file = temp_file(".json", r#"{"error": "upstream down"}"#);
        assert_eq!(load_or_fallback(Some(file.path())), fallback);

        assert!(load_file(Path::new("table.xlsx")).is_err());
    }
}
