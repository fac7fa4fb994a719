//! Command-line front end: load a payload, clean it, print records or the table.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use log::warn;
use serde::Serialize;

use crate::color::ColorScale;
use crate::config::{DashboardConfig, Role};
use crate::data::enrich::EnrichedRecord;
use crate::data::loader::load_or_fallback;
use crate::features::{axis_label, prettify_key};
use crate::state::DashboardState;

#[derive(Debug, Parser)]
#[command(
    name = "toi-transit",
    version,
    about = "Clean TESS TOI tables and predict upcoming transits"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print chart records (roles, next transit, colour) as JSON.
    Records(RecordsArgs),
    /// Print the cleaned table as CSV.
    Table(TableArgs),
}

/// Where the payload and configuration come from.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Raw payload (.json, .csv or .parquet). The demonstration data is used
    /// when omitted or unreadable.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// JSON configuration file (roles, colour range, feature search).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RecordsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Column used as the point label.
    #[arg(long)]
    pub label: Option<String>,

    /// Column on the x axis.
    #[arg(long)]
    pub x: Option<String>,

    /// Column on the y axis.
    #[arg(long)]
    pub y: Option<String>,

    /// Column driving bubble size.
    #[arg(long)]
    pub size: Option<String>,

    /// Column driving bubble colour.
    #[arg(long)]
    pub color: Option<String>,

    /// Column holding the reference mid-transit Julian date.
    #[arg(long)]
    pub mid_transit: Option<String>,

    /// Column holding the orbital period in days.
    #[arg(long)]
    pub period: Option<String>,

    /// Lower bound of a fixed colour range.
    #[arg(long, requires = "color_max", allow_negative_numbers = true)]
    pub color_min: Option<f64>,

    /// Upper bound of a fixed colour range.
    #[arg(long, requires = "color_min", allow_negative_numbers = true)]
    pub color_max: Option<f64>,

    /// Instant to predict from (RFC 3339); defaults to the current time.
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,

    /// Leave records uncoloured.
    #[arg(long)]
    pub no_color: bool,
}

impl RecordsArgs {
    fn role_overrides(&self) -> Vec<(Role, &str)> {
        [
            (Role::Label, &self.label),
            (Role::X, &self.x),
            (Role::Y, &self.y),
            (Role::Size, &self.size),
            (Role::Color, &self.color),
            (Role::MidTransit, &self.mid_transit),
            (Role::Period, &self.period),
        ]
        .into_iter()
        .filter_map(|(role, column)| column.as_deref().map(|c| (role, c)))
        .collect()
    }
}

#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only include columns whose name contains this text (case-insensitive).
    #[arg(short, long)]
    pub search: Option<String>,

    /// Use prettified column titles in the header row.
    #[arg(long)]
    pub pretty: bool,
}

/// What `records` prints.
#[derive(Debug, Serialize)]
struct RecordsOutput<'a> {
    axes: BTreeMap<&'static str, String>,
    color_scale: Option<ColorScale>,
    skipped_rows: &'a [usize],
    missing_columns: &'a [String],
    records: &'a [EnrichedRecord],
}

/// Entry point for the `toi-transit` binary.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Records(args) => handle_records(&args),
        Command::Table(args) => handle_table(&args),
    }
}

fn handle_records(args: &RecordsArgs) -> Result<()> {
    let mut state = load_state(&args.source)?;
    apply_record_args(&mut state, args);

    let now = args.now.unwrap_or_else(Utc::now);
    state.refresh(now)?;

    println!("{}", render_records(&state)?);
    Ok(())
}

fn handle_table(args: &TableArgs) -> Result<()> {
    let mut state = load_state(&args.source)?;
    if let Some(search) = &args.search {
        state.set_feature_search(search.as_str());
    }
    print!("{}", render_table(&state, args.pretty)?);
    Ok(())
}

fn load_state(source: &SourceArgs) -> Result<DashboardState> {
    let config = match &source.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    let raw = load_or_fallback(source.input.as_deref());

    let mut state = DashboardState::new(config);
    state.set_payload(&raw);
    if let Some(message) = &state.status_message {
        warn!("{message}");
    }
    Ok(state)
}

fn apply_record_args(state: &mut DashboardState, args: &RecordsArgs) {
    for (role, column) in args.role_overrides() {
        state.set_role(role, column);
    }
    if let (Some(min), Some(max)) = (args.color_min, args.color_max) {
        state.config.color_range = Some(ColorScale::new(min, max));
    }
    if args.no_color {
        state.config.encode_color = false;
    }
}

fn render_records(state: &DashboardState) -> Result<String> {
    if let Some(message) = &state.status_message {
        warn!("{message}");
    }

    let roles = &state.config.roles;
    let axes = [Role::X, Role::Y, Role::Size, Role::Color]
        .into_iter()
        .map(|role| (role.name(), axis_label(roles.get(role))))
        .collect();

    let (records, skipped_rows, missing_columns, color_scale) = match &state.enrichment {
        Some(e) => (
            e.records.as_slice(),
            e.skipped_rows.as_slice(),
            e.missing_columns.as_slice(),
            e.color_scale,
        ),
        None => (&[][..], &[][..], &[][..], None),
    };

    let output = RecordsOutput {
        axes,
        color_scale,
        skipped_rows,
        missing_columns,
        records,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn render_table(state: &DashboardState, pretty: bool) -> Result<String> {
    let features = state.visible_features();

    let mut writer = csv::Writer::from_writer(Vec::new());
    if pretty {
        writer.write_record(features.iter().map(|f| prettify_key(f)))?;
    } else {
        writer.write_record(&features)?;
    }
    for row in 0..state.table.row_count() {
        writer.write_record(features.iter().map(|f| {
            state
                .table
                .value(f, row)
                .map(|v| v.to_string())
                .unwrap_or_default()
        }))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
