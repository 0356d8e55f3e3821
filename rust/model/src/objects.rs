// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model objects and their enumerations.
//!
//! Objects refer to each other by key and to resources (constructions,
//! space types, default sets) by name.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::keys::*;
use crate::planar::{PlanarSurface, Transformation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceType {
    Wall,
    Floor,
    RoofCeiling,
}

impl SurfaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceType::Wall => "Wall",
            SurfaceType::Floor => "Floor",
            SurfaceType::RoofCeiling => "RoofCeiling",
        }
    }
}

/// What lies on the outside of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryCondition {
    /// Another space's surface.
    Surface,
    Outdoors,
    Ground,
}

impl BoundaryCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryCondition::Surface => "Surface",
            BoundaryCondition::Outdoors => "Outdoors",
            BoundaryCondition::Ground => "Ground",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SunExposure {
    SunExposed,
    NoSun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindExposure {
    WindExposed,
    NoWind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubSurfaceType {
    FixedWindow,
    OperableWindow,
    Door,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Building {
    pub name: String,
    pub standards_building_type: Option<String>,
    pub standards_number_of_stories: Option<usize>,
    pub nominal_floor_to_floor_height: Option<f64>,
    /// Degrees clockwise from true north to the model's +y axis.
    pub north_axis: f64,
    pub space_type: Option<String>,
    pub default_construction_set: Option<String>,
    pub default_schedule_set: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingStory {
    pub name: String,
    pub nominal_z: Option<f64>,
    pub default_construction_set: Option<String>,
    pub default_schedule_set: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    pub name: String,
    pub story: Option<StoryKey>,
    pub thermal_zone: Option<ZoneKey>,
    pub space_type: Option<String>,
    pub default_construction_set: Option<String>,
    pub default_schedule_set: Option<String>,
    pub transformation: Transformation,
    /// Surfaces in creation order.
    pub surfaces: Vec<SurfaceKey>,
}

impl Space {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            story: None,
            thermal_zone: None,
            space_type: None,
            default_construction_set: None,
            default_schedule_set: None,
            transformation: Transformation::identity(),
            surfaces: Vec::new(),
        }
    }
}

/// Dual-setpoint thermostat; both schedules hold temperatures in °C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thermostat {
    pub heating_schedule: ScheduleKey,
    pub cooling_schedule: ScheduleKey,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThermalZone {
    pub name: String,
    pub use_ideal_air_loads: bool,
    pub ceiling_height: Option<f64>,
    pub volume: Option<f64>,
    pub thermostat: Option<Thermostat>,
    pub spaces: Vec<SpaceKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConstant {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surface {
    pub name: String,
    pub space: SpaceKey,
    pub vertices: Vec<Point3<f64>>,
    pub surface_type: SurfaceType,
    pub boundary: BoundaryCondition,
    /// Set when `boundary` is [`BoundaryCondition::Surface`] and the partner
    /// has been matched.
    pub adjacent_surface: Option<SurfaceKey>,
    pub sun_exposure: SunExposure,
    pub wind_exposure: WindExposure,
    pub construction: Option<String>,
    pub sub_surfaces: Vec<SubSurfaceKey>,
}

impl Surface {
    /// Marks the outside as another space, which hides it from sun and wind.
    pub fn set_interior(&mut self) {
        self.boundary = BoundaryCondition::Surface;
        self.sun_exposure = SunExposure::NoSun;
        self.wind_exposure = WindExposure::NoWind;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubSurface {
    pub name: String,
    pub surface: SurfaceKey,
    pub vertices: Vec<Point3<f64>>,
    pub sub_surface_type: SubSurfaceType,
    pub construction: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShadingSurfaceGroup {
    pub name: String,
    pub surfaces: Vec<ShadingSurfaceKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadingSurface {
    pub name: String,
    pub group: ShadingGroupKey,
    pub vertices: Vec<Point3<f64>>,
}

impl PlanarSurface for Surface {
    fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }
}

impl PlanarSurface for SubSurface {
    fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }
}

impl PlanarSurface for ShadingSurface {
    fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }
}
