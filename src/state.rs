use chrono::{DateTime, Local, TimeZone, Utc};
use log::info;

use crate::config::{DashboardConfig, Role};
use crate::data::enrich::{enrich_in, EnrichOptions, Enrichment};
use crate::data::filter::clean;
use crate::data::model::ColumnTable;
use crate::ephemeris::{current_julian_date, EphemerisError};
use crate::features::matching_features;

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Everything the presentation layer needs, independent of rendering.
///
/// Selections are plain fields set by the caller; nothing here reads a
/// clock or global state on its own.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Cleaned table of the current payload.
    pub table: ColumnTable,

    /// Role selections, colour range and feature search.
    pub config: DashboardConfig,

    /// Records of the last refresh; `None` when selections changed since.
    pub enrichment: Option<Enrichment>,

    /// Status message for the user ("no data", missing columns, ...).
    pub status_message: Option<String>,
}

impl DashboardState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Ingest a newly loaded raw payload. The previous table is replaced, not merged.
    pub fn set_payload(&mut self, raw: &ColumnTable) {
        self.table = clean(raw);
        self.enrichment = None;
        self.status_message = if self.table.is_empty() {
            Some("No valid data available.".to_string())
        } else {
            None
        };
        info!(
            "dashboard holds {} rows x {} columns",
            self.table.row_count(),
            self.table.num_columns()
        );
    }

    /// Assign a column to a chart role; records are recomputed on the next refresh.
    pub fn set_role(&mut self, role: Role, column: impl Into<String>) {
        self.config.roles.set(role, column);
        self.enrichment = None;
    }

    pub fn set_feature_search(&mut self, search: impl Into<String>) {
        self.config.feature_search = search.into();
    }

    /// Columns of the cleaned table matching the feature search.
    pub fn visible_features(&self) -> Vec<&str> {
        matching_features(self.table.column_names(), &self.config.feature_search)
    }

    /// The cleaned table has no rows to show.
    pub fn no_data(&self) -> bool {
        self.table.is_empty()
    }

    /// Recompute enriched records as of `now`, in the local timezone.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Result<&Enrichment, EphemerisError> {
        self.refresh_in(now, &Local)
    }

    /// Recompute enriched records as of `now`, formatting times in `tz`.
    pub fn refresh_in<Tz>(
        &mut self,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<&Enrichment, EphemerisError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let options = EnrichOptions {
            now_jd: current_julian_date(now),
            encode_color: self.config.encode_color,
            color_range: self.config.color_range,
        };
        let enrichment = enrich_in(&self.table, &self.config.roles, &options, tz)?;

        self.status_message = if self.no_data() {
            Some("No valid data available.".to_string())
        } else if !enrichment.missing_columns.is_empty() {
            Some(format!(
                "Missing columns: {}",
                enrichment.missing_columns.join(", ")
            ))
        } else {
            None
        };

        Ok(self.enrichment.insert(enrichment))
    }
}
