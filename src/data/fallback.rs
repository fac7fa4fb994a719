//! Demonstration payload shown when the real catalog cannot be loaded.

use super::model::{ColumnTable, Value};

const TOI: [&str; 10] = [
    "TOI-123", "TOI-456", "TOI-789", "TOI-101", "TOI-102",
    "TOI-103", "TOI-104", "TOI-105", "TOI-106", "TOI-107",
];
const PL_ORBPER: [f64; 10] = [1.5, 2.3, 3.1, 4.8, 6.0, 7.2, 8.0, 9.5, 10.1, 11.0];
const PL_TRANMID: [f64; 10] = [
    2457001.5, 2457003.7, 2457005.9, 2457008.1, 2457010.3,
    2457012.5, 2457014.7, 2457016.9, 2457019.1, 2457021.3,
];
const PL_TRANDUR: [f64; 10] = [2.3, 2.8, 3.0, 1.9, 2.5, 3.2, 2.0, 2.7, 2.4, 3.1];
const PL_TRANDEP: [i64; 10] = [150, 200, 175, 180, 210, 190, 160, 205, 195, 185];
const PL_TEMP: [i64; 10] = [500, 600, 550, 700, 650, 800, 750, 850, 900, 950];

/// Ten synthetic candidates covering every default chart role.
pub fn fallback_payload() -> ColumnTable {
    ColumnTable::from_recognized([
        ("toi", TOI.iter().map(|s| Value::from(*s)).collect()),
        ("pl_orbper", floats(&PL_ORBPER)),
        ("pl_tranmid", floats(&PL_TRANMID)),
        ("pl_trandur", floats(&PL_TRANDUR)),
        ("pl_trandep", integers(&PL_TRANDEP)),
        ("pl_temp", integers(&PL_TEMP)),
    ])
}

fn floats(values: &[f64]) -> Vec<Value> {
    values.iter().map(|v| Value::Float(*v)).collect()
}

fn integers(values: &[i64]) -> Vec<Value> {
    values.iter().map(|v| Value::Integer(*v)).collect()
}
