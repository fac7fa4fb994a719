//! Run configuration: which column plays which chart role, plus display
//! settings. Everything the pipeline would otherwise read from UI state is
//! passed in through these types.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::ColorScale;

/// Logical roles a column can play in the bubble chart and ephemeris.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Label,
    X,
    Y,
    Size,
    Color,
    MidTransit,
    Period,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Label,
        Role::X,
        Role::Y,
        Role::Size,
        Role::Color,
        Role::MidTransit,
        Role::Period,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::Label => "label",
            Role::X => "x",
            Role::Y => "y",
            Role::Size => "size",
            Role::Color => "color",
            Role::MidTransit => "mid_transit",
            Role::Period => "period",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Role::ALL
            .into_iter()
            .find(|role| role.name() == wanted)
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

/// Role → column name mapping. Defaults reproduce the dashboard's initial selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureRoles {
    pub label: String,
    pub x: String,
    pub y: String,
    pub size: String,
    pub color: String,
    pub mid_transit: String,
    pub period: String,
}

impl Default for FeatureRoles {
    fn default() -> Self {
        Self {
            label: "toi".into(),
            x: "pl_orbper".into(),
            y: "pl_trandur".into(),
            size: "pl_trandep".into(),
            color: "pl_temp".into(),
            mid_transit: "pl_tranmid".into(),
            period: "pl_orbper".into(),
        }
    }
}

impl FeatureRoles {
    pub fn get(&self, role: Role) -> &str {
        match role {
            Role::Label => &self.label,
            Role::X => &self.x,
            Role::Y => &self.y,
            Role::Size => &self.size,
            Role::Color => &self.color,
            Role::MidTransit => &self.mid_transit,
            Role::Period => &self.period,
        }
    }

    pub fn set(&mut self, role: Role, column: impl Into<String>) {
        let slot = match role {
            Role::Label => &mut self.label,
            Role::X => &mut self.x,
            Role::Y => &mut self.y,
            Role::Size => &mut self.size,
            Role::Color => &mut self.color,
            Role::MidTransit => &mut self.mid_transit,
            Role::Period => &mut self.period,
        };
        *slot = column.into();
    }

    /// Distinct columns referenced by any role, in role order.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::with_capacity(Role::ALL.len());
        for role in Role::ALL {
            let column = self.get(role);
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }
}

/// Full dashboard configuration, loadable from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub roles: FeatureRoles,
    /// Fixed colour range; observed bounds of the colour column when absent.
    pub color_range: Option<ColorScale>,
    /// Attach an encoded colour to each record.
    pub encode_color: bool,
    /// Search text applied to the feature table.
    pub feature_search: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            roles: FeatureRoles::default(),
            color_range: None,
            encode_color: true,
            feature_search: String::new(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }
}
