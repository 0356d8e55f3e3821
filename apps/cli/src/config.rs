// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.

use std::path::PathBuf;

use topenergy::{AssemblyOptions, BuildingMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Story boundaries. Taken from the cells' lowest points when unset.
    pub floor_levels: Option<Vec<f64>>,
    /// Fraction of each exterior wall to glaze; hosted apertures are used when unset.
    pub glazing_ratio: Option<f64>,
    pub heating_setpoint: f64,
    pub cooling_setpoint: f64,
    pub tolerance: f64,
    pub template: Option<PathBuf>,
    pub weather: Option<PathBuf>,
    pub design_day: Option<PathBuf>,
    pub building_name: String,
    pub building_type: String,
    pub north_axis: f64,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AssemblyOptions::default();
        let number = |key: &str, default: f64| {
            var(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        let path = |key: &str| var(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        Self {
            floor_levels: var("TOPENERGY_FLOOR_LEVELS").and_then(|v| parse_levels(&v)),
            glazing_ratio: var("TOPENERGY_GLAZING_RATIO").and_then(|v| v.trim().parse().ok()),
            heating_setpoint: number("TOPENERGY_HEATING_SETPOINT", defaults.heating_setpoint),
            cooling_setpoint: number("TOPENERGY_COOLING_SETPOINT", defaults.cooling_setpoint),
            tolerance: number("TOPENERGY_TOLERANCE", defaults.tolerance),
            template: path("TOPENERGY_TEMPLATE"),
            weather: path("TOPENERGY_WEATHER"),
            design_day: path("TOPENERGY_DESIGN_DAY"),
            building_name: var("TOPENERGY_BUILDING_NAME").unwrap_or(defaults.building.name),
            building_type: var("TOPENERGY_BUILDING_TYPE").unwrap_or(defaults.building.building_type),
            north_axis: number("TOPENERGY_NORTH_AXIS", defaults.building.north_axis),
            log_format: match var("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }

    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            building: BuildingMetadata {
                name: self.building_name.clone(),
                building_type: self.building_type.clone(),
                north_axis: self.north_axis,
                ..Default::default()
            },
            glazing_ratio: self.glazing_ratio,
            heating_setpoint: self.heating_setpoint,
            cooling_setpoint: self.cooling_setpoint,
            tolerance: self.tolerance,
            ..Default::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Comma-separated elevations; `None` if any entry is not a number.
fn parse_levels(value: &str) -> Option<Vec<f64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect()
}
