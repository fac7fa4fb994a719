use log::info;

use super::model::{ColumnTable, Value};

// ---------------------------------------------------------------------------
// Row validation
// ---------------------------------------------------------------------------

/// Whether a single cell holds a usable measurement.
///
/// Rejected:
/// * `Null`
/// * a NaN float
/// * a number equal to zero (the catalog uses 0 for "not measured")
/// * a string that is blank or `"0"` once trimmed
///
/// Everything else passes, including negative numbers and booleans.
pub fn is_valid_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Integer(i) => *i != 0,
        Value::Float(f) => !f.is_nan() && *f != 0.0,
        Value::String(s) => {
            let trimmed = s.trim();
            !trimmed.is_empty() && trimmed != "0"
        }
        Value::Bool(_) => true,
    }
}

/// A row is admissible when every column has a valid cell at `row`.
/// A column too short to reach `row` counts as missing.
pub fn is_admissible_row(table: &ColumnTable, row: usize) -> bool {
    table
        .columns()
        .all(|(_, values)| values.get(row).is_some_and(is_valid_value))
}

// ---------------------------------------------------------------------------
// Table cleaning
// ---------------------------------------------------------------------------

/// Return indices of rows that pass validation in every column, ascending.
///
/// Iteration is bounded by the shortest column. A table without columns has
/// no admissible rows.
pub fn admissible_indices(table: &ColumnTable) -> Vec<usize> {
    (0..table.row_count())
        .filter(|&row| is_admissible_row(table, row))
        .collect()
}

/// Produce a new table holding only admissible rows, every column re-aligned
/// to the same length. The column set is unchanged.
pub fn clean(raw: &ColumnTable) -> ColumnTable {
    let rows = admissible_indices(raw);
    info!(
        "cleaned table: kept {} of {} rows across {} columns",
        rows.len(),
        raw.row_count(),
        raw.num_columns()
    );
    raw.select_rows(&rows)
}
