// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building a simulation model from a cell complex.
//!
//! One story per floor-level interval, one space and one thermal zone per
//! cell, one surface per bounding face. Faces go through the classifier and
//! the resolver in the cell's own face order; each new space is then matched
//! against every space built before it so shared partitions become paired
//! interior surfaces.
//!
//! The input arena is cloned and the copy records each cell's space name as
//! its `"Name"` attribute. Any error aborts the whole call.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use topenergy_model::{Model, SpaceKey, StoryKey, Thermostat};
use topenergy_topology::{CellComplexKey, CellKey, FaceKey, TopologyArena};

use crate::classifier::classify;
use crate::error::{Error, Result};
use crate::polygon::{is_underground, Polygon};
use crate::resolver::{
    apply_resolution, check_glazing_ratio, project_apertures, resolve, synthesize_glazing,
    ApertureReport, ConstructionNames,
};

/// Cell attribute holding the generated space name.
pub const NAME_ATTRIBUTE: &str = "Name";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingMetadata {
    pub name: String,
    pub building_type: String,
    /// Degrees clockwise from true north.
    pub north_axis: f64,
    /// Space type given to the building and to every space.
    pub space_type: String,
}

impl Default for BuildingMetadata {
    fn default() -> Self {
        Self {
            name: "Building".into(),
            building_type: "MediumOffice".into(),
            north_axis: 0.0,
            space_type: topenergy_model::template::MEDIUM_OFFICE.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    pub building: BuildingMetadata,
    /// Fraction of each exterior wall to glaze. `None` uses the apertures
    /// hosted by the faces instead.
    pub glazing_ratio: Option<f64>,
    /// Heating setpoint, °C.
    pub heating_setpoint: f64,
    /// Cooling setpoint, °C.
    pub cooling_setpoint: f64,
    /// Surface-matching tolerance.
    pub tolerance: f64,
    pub constructions: ConstructionNames,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            building: BuildingMetadata::default(),
            glazing_ratio: None,
            heating_setpoint: 20.0,
            cooling_setpoint: 24.0,
            tolerance: 1e-4,
            constructions: ConstructionNames::default(),
        }
    }
}

impl AssemblyOptions {
    /// Checks the options against a floor-level list before anything is built.
    pub fn validate(&self, floor_levels: &[f64]) -> Result<()> {
        if floor_levels.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "{} floor levels given, at least 2 required",
                floor_levels.len()
            )));
        }
        if floor_levels.iter().any(|z| !z.is_finite()) {
            return Err(Error::InvalidInput("floor levels must be finite".into()));
        }
        if floor_levels.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::InvalidInput(
                "floor levels must be strictly increasing".into(),
            ));
        }
        if let Some(ratio) = self.glazing_ratio {
            check_glazing_ratio(ratio)?;
        }
        if !(self.tolerance > 0.0) {
            return Err(Error::InvalidInput(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// The result of [`assemble`].
#[derive(Debug, Clone)]
pub struct Assembly {
    pub model: Model,
    /// Copy of the input arena, cells annotated with their space names.
    pub topology: TopologyArena,
    /// Spaces in cell order.
    pub spaces: Vec<SpaceKey>,
    pub report: ApertureReport,
}

/// Index of the half-open interval `[levels[i], levels[i + 1])` holding `z`.
pub fn story_index(z: f64, floor_levels: &[f64]) -> Option<usize> {
    floor_levels
        .windows(2)
        .position(|w| z >= w[0] && z < w[1])
}

/// Converts `complex` into a simulation model built on `template`.
///
/// `shading` faces become plain shading surfaces. Fails with
/// [`Error::InvalidInput`] before touching anything when the options or
/// floor levels are unusable.
pub fn assemble(
    arena: &TopologyArena,
    complex: CellComplexKey,
    shading: &[FaceKey],
    floor_levels: &[f64],
    options: &AssemblyOptions,
    template: Model,
) -> Result<Assembly> {
    options.validate(floor_levels)?;
    if arena.cell_complex(complex).is_none() {
        return Err(Error::Geometry(format!("{complex:?} is not in the arena")));
    }

    let mut builder = Builder {
        topology: arena.clone(),
        model: template,
        complex,
        floor_levels,
        options,
        up: Vector3::z(),
        stories: Vec::new(),
        per_story: vec![0; floor_levels.len() - 1],
        spaces: Vec::new(),
        report: ApertureReport::default(),
    };

    builder.building();
    for cell in arena.complex_cells(complex) {
        builder.space(cell)?;
    }
    builder.shading(shading)?;

    let Builder {
        mut model,
        topology,
        spaces,
        report,
        ..
    } = builder;
    let purged = model.purge_unused_resources();

    tracing::info!(
        spaces = spaces.len(),
        surfaces = model.surfaces().count(),
        sub_surfaces = model.sub_surfaces().count(),
        apertures_total = report.total,
        apertures_applied = report.applied,
        purged,
        "assembled energy model"
    );
    Ok(Assembly {
        model,
        topology,
        spaces,
        report,
    })
}

struct Builder<'a> {
    topology: TopologyArena,
    model: Model,
    complex: CellComplexKey,
    floor_levels: &'a [f64],
    options: &'a AssemblyOptions,
    up: Vector3<f64>,
    stories: Vec<StoryKey>,
    /// Spaces created so far on each story.
    per_story: Vec<usize>,
    spaces: Vec<SpaceKey>,
    report: ApertureReport,
}

impl Builder<'_> {
    fn space_type(&self) -> Option<String> {
        let name = &self.options.building.space_type;
        if self.model.space_type(name).is_some() {
            Some(name.clone())
        } else {
            tracing::warn!(space_type = %name, "space type not found in template");
            None
        }
    }

    fn building(&mut self) {
        let levels = self.floor_levels;
        let count = levels.len() - 1;
        let height = levels.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let construction_set = self.model.first_construction_set().map(|s| s.name.clone());
        let schedule_set = self.model.first_schedule_set().map(|s| s.name.clone());
        let space_type = self.space_type();

        let meta = &self.options.building;
        let b = &mut self.model.building;
        b.name = meta.name.clone();
        b.standards_building_type = Some(meta.building_type.clone());
        b.standards_number_of_stories = Some(count);
        b.nominal_floor_to_floor_height = Some(height / count as f64);
        b.north_axis = meta.north_axis;
        b.space_type = space_type;
        b.default_construction_set = construction_set.clone();
        b.default_schedule_set = schedule_set.clone();

        for (i, &z) in levels[..count].iter().enumerate() {
            let story = self.model.add_story(format!("STORY_{}", i + 1), Some(z));
            if let Some(s) = self.model.story_mut(story) {
                s.default_construction_set = construction_set.clone();
                s.default_schedule_set = schedule_set.clone();
            }
            self.stories.push(story);
        }
    }

    fn space(&mut self, cell: CellKey) -> Result<()> {
        let centroid = self
            .topology
            .cell_centroid(cell)
            .ok_or_else(|| Error::Geometry(format!("{cell:?} has no vertices")))?;
        let index = story_index(centroid.z, self.floor_levels).unwrap_or_else(|| {
            tracing::warn!(?cell, z = centroid.z, "cell outside all floor levels, using story 0");
            0
        });
        self.per_story[index] += 1;

        let story = self.stories[index];
        let story_name = self
            .model
            .story(story)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let name = format!("{story_name}_SPACE_{}", self.per_story[index]);

        let space_type = self.space_type();
        let space = self.model.add_space(name.clone(), Some(story));
        let construction_set = self.model.first_construction_set().map(|s| s.name.clone());
        let schedule_set = self.model.first_schedule_set().map(|s| s.name.clone());
        if let Some(s) = self.model.space_mut(space) {
            s.space_type = space_type;
            s.default_construction_set = construction_set;
            s.default_schedule_set = schedule_set;
        }

        for (i, face) in self.topology.cell_faces(cell).into_iter().enumerate() {
            self.surface(cell, face, space, &format!("{name}_SURFACE_{}", i + 1))?;
        }
        self.thermal_zone(cell, space, &name)?;

        self.topology
            .set_attribute(cell.into(), NAME_ATTRIBUTE, name.as_str());
        for &previous in &self.spaces {
            self.model
                .match_surfaces(space, previous, self.options.tolerance);
        }
        self.spaces.push(space);

        tracing::debug!(space = %name, story = index, "added space");
        Ok(())
    }

    fn surface(&mut self, cell: CellKey, face: FaceKey, space: SpaceKey, name: &str) -> Result<()> {
        let opts = self.options;
        let classification = classify(&self.topology, face, cell, &self.up)?;
        let underground = is_underground(&classification.vertices);
        let surface = Polygon::new(name, classification.vertices)?.into_surface(&mut self.model, space)?;

        let adjacent = self.topology.adjacent_cell_count(face, self.complex);
        let resolution = resolve(classification.face_type, adjacent, underground);
        apply_resolution(
            &mut self.model,
            surface,
            classification.face_type,
            &resolution,
            &opts.constructions,
        )?;

        if resolution.takes_windows(classification.face_type) {
            match opts.glazing_ratio {
                Some(ratio) => {
                    synthesize_glazing(&mut self.model, surface, ratio, &opts.constructions)?;
                }
                None => {
                    project_apertures(
                        &self.topology,
                        face,
                        &mut self.model,
                        surface,
                        &opts.constructions,
                        &mut self.report,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn thermal_zone(&mut self, cell: CellKey, space: SpaceKey, space_name: &str) -> Result<()> {
        let (lo, hi) = self
            .topology
            .cell_bounding_box(cell)
            .ok_or_else(|| Error::Geometry(format!("{cell:?} has no bounds")))?;
        let volume = self
            .topology
            .cell_volume(cell)
            .ok_or_else(|| Error::Geometry(format!("{cell:?} has no volume")))?;

        let zone_name = format!("{space_name}_THERMAL_ZONE");
        let heating = self
            .model
            .add_schedule_constant(format!("{zone_name}_HEATING_SETPOINT"), self.options.heating_setpoint);
        let cooling = self
            .model
            .add_schedule_constant(format!("{zone_name}_COOLING_SETPOINT"), self.options.cooling_setpoint);

        let zone = self.model.add_thermal_zone(zone_name);
        if let Some(z) = self.model.zone_mut(zone) {
            z.use_ideal_air_loads = true;
            z.ceiling_height = Some((hi.z - lo.z).abs());
            z.volume = Some(volume);
            z.thermostat = Some(Thermostat {
                heating_schedule: heating,
                cooling_schedule: cooling,
            });
        }
        self.model.assign_zone(space, zone)?;
        Ok(())
    }

    fn shading(&mut self, faces: &[FaceKey]) -> Result<()> {
        if faces.is_empty() {
            return Ok(());
        }
        let group = self.model.add_shading_group("SHADINGSURFACE_GROUP");
        for (i, &face) in faces.iter().enumerate() {
            let points = self
                .topology
                .face_outer_points(face)
                .ok_or_else(|| Error::Geometry(format!("shading {face:?} is not in the arena")))?;
            Polygon::new(format!("SHADINGSURFACE_{}", i + 1), points)?
                .into_shading_surface(&mut self.model, group)?;
        }
        tracing::debug!(count = faces.len(), "added shading surfaces");
        Ok(())
    }
}
