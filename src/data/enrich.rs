use chrono::{Local, TimeZone};
use log::{debug, warn};
use serde::Serialize;

use super::model::{ColumnTable, Value};
use crate::color::{to_css, ColorEncoding, ColorScale};
use crate::config::{FeatureRoles, Role};
use crate::ephemeris::{format_julian_date, next_transit, EphemerisError};

// ---------------------------------------------------------------------------
// Enriched records – one chart point per cleaned row
// ---------------------------------------------------------------------------

/// A cleaned row joined with its chart roles and the predicted next transit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    /// Row index in the cleaned table.
    pub row: usize,
    pub label: Value,
    pub x: Value,
    pub y: Value,
    pub size: Value,
    pub color_value: Value,
    pub next_transit_jd: f64,
    pub next_transit_local: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Inputs of an enrichment pass besides the table and roles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichOptions {
    /// Julian date treated as "now" for next-transit prediction.
    pub now_jd: f64,
    /// Whether to attach an encoded colour to each record.
    pub encode_color: bool,
    /// Fixed colour range; observed bounds when `None`.
    pub color_range: Option<ColorScale>,
}

/// Output of an enrichment pass.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub records: Vec<EnrichedRecord>,
    /// Role columns absent from the table. Non-empty means no records.
    pub missing_columns: Vec<String>,
    /// Cleaned rows left out because their epoch or period could not be used.
    pub skipped_rows: Vec<usize>,
    /// Gradient used for the colour column, if one applied.
    pub color_scale: Option<ColorScale>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Enrich every row of a cleaned table, formatting times in the local timezone.
pub fn enrich(
    table: &ColumnTable,
    roles: &FeatureRoles,
    options: &EnrichOptions,
) -> Result<Enrichment, EphemerisError> {
    enrich_in(table, roles, options, &Local)
}

/// Enrich every row of a cleaned table, formatting times in `tz`.
///
/// Rows are excluded rather than half-filled: a missing role column excludes
/// every row, a non-numeric epoch or period excludes that row. A non-positive
/// period means the table was never cleaned and is returned as an error.
pub fn enrich_in<Tz>(
    table: &ColumnTable,
    roles: &FeatureRoles,
    options: &EnrichOptions,
    tz: &Tz,
) -> Result<Enrichment, EphemerisError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let missing_columns: Vec<String> = roles
        .required_columns()
        .into_iter()
        .filter(|name| !table.contains(name))
        .map(str::to_string)
        .collect();
    if !missing_columns.is_empty() {
        warn!(
            "cannot enrich: columns {} are not in the table",
            missing_columns.join(", ")
        );
        return Ok(Enrichment {
            missing_columns,
            ..Enrichment::default()
        });
    }

    let encoding = options.encode_color.then(|| {
        let values = table.column(&roles.color).unwrap_or_default();
        ColorEncoding::for_column(values, options.color_range)
    });

    let cell = |role: Role, row: usize| -> Value {
        table
            .value(roles.get(role), row)
            .cloned()
            .unwrap_or(Value::Null)
    };

    let mut records = Vec::with_capacity(table.row_count());
    let mut skipped_rows = Vec::new();

    for row in 0..table.row_count() {
        let (Some(mid), Some(period)) = (
            cell(Role::MidTransit, row).as_f64(),
            cell(Role::Period, row).as_f64(),
        ) else {
            debug!("row {row}: mid-transit or period is not numeric");
            skipped_rows.push(row);
            continue;
        };

        let timing = next_transit(mid, period, options.now_jd)
            .and_then(|jd| Ok((jd, format_julian_date(jd, tz)?)));
        let (next_transit_jd, next_transit_local) = match timing {
            Ok(timing) => timing,
            Err(err @ EphemerisError::InvalidPeriod { .. }) => return Err(err),
            Err(err) => {
                debug!("row {row}: {err}");
                skipped_rows.push(row);
                continue;
            }
        };

        let color_value = cell(Role::Color, row);
        let color = encoding
            .as_ref()
            .map(|enc| to_css(enc.color_for(&color_value)));

        records.push(EnrichedRecord {
            row,
            label: cell(Role::Label, row),
            x: cell(Role::X, row),
            y: cell(Role::Y, row),
            size: cell(Role::Size, row),
            color_value,
            next_transit_jd,
            next_transit_local,
            color,
        });
    }

    if !skipped_rows.is_empty() {
        warn!("{} rows skipped during enrichment", skipped_rows.len());
    }

    Ok(Enrichment {
        records,
        missing_columns: Vec::new(),
        skipped_rows,
        color_scale: encoding.and_then(|enc| enc.scale()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::clean;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn sample_table() -> ColumnTable {
        ColumnTable::from_columns([
            ("toi", vec![Value::from("TOI-1"), Value::from("TOI-2")]),
            ("pl_orbper", vec![Value::from(2.0), Value::from(4.0)]),
            ("pl_tranmid", vec![Value::from(2_457_001.5), Value::from(2_457_020.0)]),
            ("pl_trandur", vec![Value::from(2.5), Value::from(3.0)]),
            ("pl_trandep", vec![Value::Integer(150), Value::Integer(200)]),
            ("pl_temp", vec![Value::Integer(500), Value::Integer(1000)]),
        ])
    }

    fn options(now_jd: f64) -> EnrichOptions {
        EnrichOptions {
            now_jd,
            encode_color: true,
            color_range: None,
        }
    }

    #[test]
    fn records_carry_roles_and_next_transit() {
        let roles = FeatureRoles::default();
        let enrichment = enrich_in(&sample_table(), &roles, &options(2_457_010.5), &Utc).unwrap();

        assert_eq!(enrichment.records.len(), 2);
        let first = &enrichment.records[0];
        assert_eq!(first.label, Value::from("TOI-1"));
        assert_eq!(first.x, Value::from(2.0));
        assert_eq!(first.y, Value::from(2.5));
        assert_eq!(first.size, Value::Integer(150));
        assert_eq!(first.next_transit_jd, 2_457_011.5);
        assert_eq!(first.next_transit_local, "2014-12-20 00:00:00.000 +00:00");
        assert_eq!(first.color.as_deref(), Some("rgb(0,0,255)"));

        // epoch still ahead of "now"
        let second = &enrichment.records[1];
        assert_eq!(second.next_transit_jd, 2_457_020.0);
        assert_eq!(second.color.as_deref(), Some("rgb(255,0,0)"));
        assert_eq!(enrichment.color_scale, Some(ColorScale::new(500.0, 1000.0)));
    }

    #[test]
    fn missing_role_column_excludes_every_row() {
        let mut roles = FeatureRoles::default();
        roles.set(Role::Size, "pl_rade");

        let enrichment = enrich_in(&sample_table(), &roles, &options(2_457_010.5), &Utc).unwrap();

        assert!(enrichment.is_empty());
        assert_eq!(enrichment.missing_columns, vec!["pl_rade".to_string()]);
    }

    #[test]
    fn non_numeric_epoch_skips_the_row() {
        let table = ColumnTable::from_columns([
            ("toi", vec![Value::from("TOI-1"), Value::from("TOI-2")]),
            ("pl_orbper", vec![Value::from(2.0), Value::from(4.0)]),
            ("pl_tranmid", vec![Value::from("soon"), Value::from(2_457_020.0)]),
            ("pl_trandur", vec![Value::from(2.5), Value::from(3.0)]),
            ("pl_trandep", vec![Value::Integer(150), Value::Integer(200)]),
            ("pl_temp", vec![Value::Integer(700), Value::Integer(700)]),
        ]);

        let enrichment =
            enrich_in(&table, &FeatureRoles::default(), &options(2_457_010.5), &Utc).unwrap();

        assert_eq!(enrichment.skipped_rows, vec![0]);
        assert_eq!(enrichment.records.len(), 1);
        assert_eq!(enrichment.records[0].row, 1);
        // one observed temperature: degenerate scale, neutral colour
        assert_eq!(enrichment.records[0].color.as_deref(), Some("rgb(160,160,160)"));
    }

    #[test]
    fn infinite_period_and_absurd_epoch_skip_only_their_rows() {
        let table = ColumnTable::from_columns([
            ("toi", vec![Value::from("TOI-1"), Value::from("TOI-2"), Value::from("TOI-3")]),
            (
                "pl_orbper",
                vec![Value::from(f64::INFINITY), Value::from(4.0), Value::from(3.0)],
            ),
            (
                "pl_tranmid",
                vec![Value::from(2_457_001.5), Value::from(2_457_020.0), Value::from(1e20)],
            ),
            ("pl_trandur", vec![Value::from(2.5), Value::from(3.0), Value::from(1.0)]),
            ("pl_trandep", vec![Value::Integer(150), Value::Integer(200), Value::Integer(90)]),
            ("pl_temp", vec![Value::Integer(500), Value::Integer(800), Value::Integer(600)]),
        ]);
        let cleaned = clean(&table);
        assert_eq!(cleaned.row_count(), 3, "infinite values survive cleaning");

        let enrichment =
            enrich_in(&cleaned, &FeatureRoles::default(), &options(2_457_010.5), &Utc).unwrap();

        assert_eq!(enrichment.skipped_rows, vec![0, 2]);
        assert_eq!(enrichment.records.len(), 1);
        assert_eq!(enrichment.records[0].label, Value::from("TOI-2"));
        assert_eq!(enrichment.records[0].next_transit_jd, 2_457_020.0);
    }

    #[test]
    fn negative_period_is_an_error() {
        let base = sample_table();
        let table = ColumnTable::from_columns(base.columns().map(|(name, values)| {
            let values = if name == "pl_orbper" {
                vec![Value::from(-2.0), Value::from(4.0)]
            } else {
                values.to_vec()
            };
            (name.to_string(), values)
        }));

        let cleaned = clean(&table);
        assert_eq!(cleaned.row_count(), 2, "negative values survive cleaning");

        let err = enrich_in(&cleaned, &FeatureRoles::default(), &options(2_457_010.5), &Utc)
            .unwrap_err();
        assert_eq!(err, EphemerisError::InvalidPeriod { period: -2.0 });
    }

    #[test]
    fn colour_can_be_left_off() {
        let opts = EnrichOptions {
            encode_color: false,
            ..options(2_457_010.5)
        };
        let enrichment = enrich_in(&sample_table(), &FeatureRoles::default(), &opts, &Utc).unwrap();
        assert!(enrichment.records.iter().all(|r| r.color.is_none()));
        assert_eq!(enrichment.color_scale, None);

        let json = serde_json::to_value(&enrichment.records[0]).unwrap();
        assert!(json.get("color").is_none());
        assert_eq!(json["label"], "TOI-1");
    }

    #[test]
    fn empty_table_yields_no_records() {
        let table = clean(&ColumnTable::from_columns([
            ("toi", vec![Value::Null]),
            ("pl_orbper", vec![Value::from(1.0)]),
            ("pl_tranmid", vec![Value::from(2_457_000.0)]),
            ("pl_trandur", vec![Value::from(1.0)]),
            ("pl_trandep", vec![Value::from(1.0)]),
            ("pl_temp", vec![Value::from(1.0)]),
        ]));
        let enrichment = enrich_in(&table, &FeatureRoles::default(), &options(0.0), &Utc).unwrap();
        assert!(enrichment.is_empty());
        assert!(enrichment.missing_columns.is_empty());
    }
}
