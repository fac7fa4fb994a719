use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::features::{is_recognized, vocabulary_rank};

// ---------------------------------------------------------------------------
// Value – a single cell in a catalog column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring what a TOI payload can carry.
/// Used as a `BTreeMap` key by the categorical colour map, so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "N/A"),
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(val: &JsonValue) -> Self {
        match val {
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::String(n.to_string())
                }
            }
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Null => Value::Null,
            other => Value::String(other.to_string()),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl Value {
    /// Interpret the value as an `f64` (ephemeris inputs, colour scales).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnTable – the raw or cleaned catalog
// ---------------------------------------------------------------------------

/// Column-oriented table: column name → cell values.
///
/// A raw table may hold columns of differing lengths; only the shortest
/// column is authoritative. A table produced by [`crate::data::filter::clean`]
/// is aligned, so index `i` names the same candidate in every column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTable {
    columns: BTreeMap<String, Vec<Value>>,
}

impl ColumnTable {
    /// Build a raw table from a decoded JSON payload object.
    ///
    /// A key becomes a column only when it is a recognized feature name and
    /// its value is an array. Anything else is left absent.
    pub fn from_json_payload(payload: &JsonMap<String, JsonValue>) -> Self {
        let mut columns = BTreeMap::new();
        for (key, val) in payload {
            if !is_recognized(key) {
                debug!("ignoring unrecognized payload key '{key}'");
                continue;
            }
            match val.as_array() {
                Some(items) => {
                    columns.insert(key.clone(), items.iter().map(Value::from).collect());
                }
                None => debug!("payload key '{key}' is not an array; column left absent"),
            }
        }
        ColumnTable { columns }
    }

    /// Build a raw table from already-decoded columns, keeping recognized names only.
    pub fn from_recognized<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let columns = columns
            .into_iter()
            .map(|(name, values)| (name.into(), values))
            .filter(|(name, _): &(String, Vec<Value>)| {
                let keep = is_recognized(name);
                if !keep {
                    debug!("ignoring unrecognized column '{name}'");
                }
                keep
            })
            .collect();
        ColumnTable { columns }
    }

    /// Build a table from arbitrary columns, no vocabulary check.
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        ColumnTable {
            columns: columns
                .into_iter()
                .map(|(name, values)| (name.into(), values))
                .collect(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Cell at `row` of column `name`; `None` when the column is absent or too short.
    pub fn value(&self, name: &str, row: usize) -> Option<&Value> {
        self.columns.get(name).and_then(|col| col.get(row))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Iterate over `(name, values)` pairs in name order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Column names for display: vocabulary order first, then the rest alphabetically.
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.columns.keys().map(String::as_str).collect();
        names.sort_by_key(|name| (vocabulary_rank(name).unwrap_or(usize::MAX), *name));
        names
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Length of the shortest column, `None` when there are no columns.
    pub fn min_len(&self) -> Option<usize> {
        self.columns.values().map(Vec::len).min()
    }

    /// Logical row count: the shortest column bounds every row, no columns means no rows.
    pub fn row_count(&self) -> usize {
        self.min_len().unwrap_or(0)
    }

    /// Whether every column has the same length.
    pub fn is_aligned(&self) -> bool {
        let mut lengths = self.columns.values().map(Vec::len);
        match lengths.next() {
            Some(first) => lengths.all(|len| len == first),
            None => true,
        }
    }

    /// The "no data" state: no rows to display.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Pick the listed rows of every column, in the order given.
    pub(crate) fn select_rows(&self, rows: &[usize]) -> ColumnTable {
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                let picked = rows.iter().filter_map(|&i| values.get(i).cloned()).collect();
                (name.clone(), picked)
            })
            .collect();
        ColumnTable { columns }
    }
}
