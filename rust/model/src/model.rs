// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The [`Model`]: one building with its stories, spaces, thermal zones,
//! schedules, surfaces and shading, plus the named resources they use.
//!
//! Object collections are slotmaps, so keys stay valid and iteration follows
//! creation order as long as nothing is removed. Resources live in ordered
//! maps keyed by name.

use std::collections::BTreeMap;
use std::path::PathBuf;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::keys::*;
use crate::objects::*;
use crate::planar::PlanarSurface;
use crate::resources::{Construction, DefaultConstructionSet, DefaultScheduleSet, SpaceType};

/// Surfaces steeper than this tilt (degrees from +z) stop being roofs.
const ROOF_MAX_TILT: f64 = 60.0;
/// Surfaces tilted beyond this are floors.
const FLOOR_MIN_TILT: f64 = 120.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    pub building: Building,
    pub weather_file: Option<PathBuf>,
    pub design_day_file: Option<PathBuf>,

    pub(crate) stories: SlotMap<StoryKey, BuildingStory>,
    pub(crate) spaces: SlotMap<SpaceKey, Space>,
    pub(crate) zones: SlotMap<ZoneKey, ThermalZone>,
    pub(crate) schedules: SlotMap<ScheduleKey, ScheduleConstant>,
    pub(crate) surfaces: SlotMap<SurfaceKey, Surface>,
    pub(crate) sub_surfaces: SlotMap<SubSurfaceKey, SubSurface>,
    pub(crate) shading_groups: SlotMap<ShadingGroupKey, ShadingSurfaceGroup>,
    pub(crate) shading_surfaces: SlotMap<ShadingSurfaceKey, ShadingSurface>,

    pub(crate) constructions: BTreeMap<String, Construction>,
    pub(crate) space_types: BTreeMap<String, SpaceType>,
    pub(crate) construction_sets: BTreeMap<String, DefaultConstructionSet>,
    pub(crate) schedule_sets: BTreeMap<String, DefaultScheduleSet>,
}

fn check_vertices(name: &str, vertices: &[Point3<f64>]) -> Result<()> {
    if vertices.len() < 3 {
        return Err(Error::TooFewVertices {
            name: name.to_string(),
            count: vertices.len(),
        });
    }
    Ok(())
}

/// `true` when `b` walks the points of `a` in reverse, up to a cyclic shift.
fn loops_mirror(a: &[Point3<f64>], b: &[Point3<f64>], tolerance: f64) -> bool {
    if a.len() != b.len() || a.is_empty() {
        return false;
    }
    let n = a.len();
    let Some(start) = b.iter().position(|q| (q - a[0]).norm() <= tolerance) else {
        return false;
    };
    (0..n).all(|i| (b[(start + n - i) % n] - a[i]).norm() <= tolerance)
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- creation -------------------------------------------------------

    pub fn add_story(&mut self, name: impl Into<String>, nominal_z: Option<f64>) -> StoryKey {
        self.stories.insert(BuildingStory {
            name: name.into(),
            nominal_z,
            ..Default::default()
        })
    }

    pub fn add_space(&mut self, name: impl Into<String>, story: Option<StoryKey>) -> SpaceKey {
        let mut space = Space::new(name);
        space.story = story.filter(|k| self.stories.contains_key(*k));
        self.spaces.insert(space)
    }

    pub fn add_schedule_constant(&mut self, name: impl Into<String>, value: f64) -> ScheduleKey {
        self.schedules.insert(ScheduleConstant {
            name: name.into(),
            value,
        })
    }

    pub fn add_thermal_zone(&mut self, name: impl Into<String>) -> ZoneKey {
        self.zones.insert(ThermalZone {
            name: name.into(),
            ..Default::default()
        })
    }

    /// Puts `space` in `zone`, taking it out of any zone it was in.
    pub fn assign_zone(&mut self, space: SpaceKey, zone: ZoneKey) -> Result<()> {
        if !self.zones.contains_key(zone) {
            return Err(Error::unknown("thermal zone"));
        }
        let previous = self
            .spaces
            .get_mut(space)
            .ok_or_else(|| Error::unknown("space"))?
            .thermal_zone
            .replace(zone);

        if let Some(old) = previous.and_then(|k| self.zones.get_mut(k)) {
            old.spaces.retain(|&s| s != space);
        }
        self.zones[zone].spaces.push(space);
        Ok(())
    }

    /// Adds a surface to `space`. Type and boundary start from the tilt of
    /// the loop and are meant to be overwritten by the caller.
    pub fn add_surface(
        &mut self,
        space: SpaceKey,
        name: impl Into<String>,
        vertices: Vec<Point3<f64>>,
    ) -> Result<SurfaceKey> {
        let name = name.into();
        check_vertices(&name, &vertices)?;
        if !self.spaces.contains_key(space) {
            return Err(Error::unknown("space"));
        }

        let mut surface = Surface {
            name,
            space,
            vertices,
            surface_type: SurfaceType::Wall,
            boundary: BoundaryCondition::Outdoors,
            adjacent_surface: None,
            sun_exposure: SunExposure::SunExposed,
            wind_exposure: WindExposure::WindExposed,
            construction: None,
            sub_surfaces: Vec::new(),
        };
        if let Some(n) = surface.outward_normal() {
            let tilt = n.z.clamp(-1.0, 1.0).acos().to_degrees();
            if tilt < ROOF_MAX_TILT {
                surface.surface_type = SurfaceType::RoofCeiling;
            } else if tilt > FLOOR_MIN_TILT {
                surface.surface_type = SurfaceType::Floor;
                surface.boundary = BoundaryCondition::Ground;
                surface.sun_exposure = SunExposure::NoSun;
                surface.wind_exposure = WindExposure::NoWind;
            }
        }

        let key = self.surfaces.insert(surface);
        self.spaces[space].surfaces.push(key);
        Ok(key)
    }

    pub fn add_sub_surface(
        &mut self,
        surface: SurfaceKey,
        name: impl Into<String>,
        vertices: Vec<Point3<f64>>,
        sub_surface_type: SubSurfaceType,
    ) -> Result<SubSurfaceKey> {
        let name = name.into();
        check_vertices(&name, &vertices)?;
        if !self.surfaces.contains_key(surface) {
            return Err(Error::unknown("surface"));
        }
        let key = self.sub_surfaces.insert(SubSurface {
            name,
            surface,
            vertices,
            sub_surface_type,
            construction: None,
        });
        self.surfaces[surface].sub_surfaces.push(key);
        Ok(key)
    }

    pub fn add_shading_group(&mut self, name: impl Into<String>) -> ShadingGroupKey {
        self.shading_groups.insert(ShadingSurfaceGroup {
            name: name.into(),
            surfaces: Vec::new(),
        })
    }

    pub fn add_shading_surface(
        &mut self,
        group: ShadingGroupKey,
        name: impl Into<String>,
        vertices: Vec<Point3<f64>>,
    ) -> Result<ShadingSurfaceKey> {
        let name = name.into();
        check_vertices(&name, &vertices)?;
        if !self.shading_groups.contains_key(group) {
            return Err(Error::unknown("shading surface group"));
        }
        let key = self.shading_surfaces.insert(ShadingSurface {
            name,
            group,
            vertices,
        });
        self.shading_groups[group].surfaces.push(key);
        Ok(key)
    }

    pub fn add_construction(&mut self, construction: Construction) {
        self.constructions
            .insert(construction.name.clone(), construction);
    }

    pub fn add_space_type(&mut self, space_type: SpaceType) {
        self.space_types.insert(space_type.name.clone(), space_type);
    }

    pub fn add_construction_set(&mut self, set: DefaultConstructionSet) {
        self.construction_sets.insert(set.name.clone(), set);
    }

    pub fn add_schedule_set(&mut self, set: DefaultScheduleSet) {
        self.schedule_sets.insert(set.name.clone(), set);
    }

    // ---- access ---------------------------------------------------------

    pub fn story(&self, key: StoryKey) -> Option<&BuildingStory> {
        self.stories.get(key)
    }

    pub fn story_mut(&mut self, key: StoryKey) -> Option<&mut BuildingStory> {
        self.stories.get_mut(key)
    }

    pub fn stories(&self) -> impl Iterator<Item = (StoryKey, &BuildingStory)> {
        self.stories.iter()
    }

    pub fn space(&self, key: SpaceKey) -> Option<&Space> {
        self.spaces.get(key)
    }

    pub fn space_mut(&mut self, key: SpaceKey) -> Option<&mut Space> {
        self.spaces.get_mut(key)
    }

    pub fn spaces(&self) -> impl Iterator<Item = (SpaceKey, &Space)> {
        self.spaces.iter()
    }

    pub fn zone(&self, key: ZoneKey) -> Option<&ThermalZone> {
        self.zones.get(key)
    }

    pub fn zone_mut(&mut self, key: ZoneKey) -> Option<&mut ThermalZone> {
        self.zones.get_mut(key)
    }

    pub fn zones(&self) -> impl Iterator<Item = (ZoneKey, &ThermalZone)> {
        self.zones.iter()
    }

    pub fn schedule(&self, key: ScheduleKey) -> Option<&ScheduleConstant> {
        self.schedules.get(key)
    }

    pub fn schedules(&self) -> impl Iterator<Item = (ScheduleKey, &ScheduleConstant)> {
        self.schedules.iter()
    }

    pub fn surface(&self, key: SurfaceKey) -> Option<&Surface> {
        self.surfaces.get(key)
    }

    pub fn surface_mut(&mut self, key: SurfaceKey) -> Option<&mut Surface> {
        self.surfaces.get_mut(key)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceKey, &Surface)> {
        self.surfaces.iter()
    }

    /// Surfaces of one space, in creation order.
    pub fn space_surfaces(&self, space: SpaceKey) -> Vec<SurfaceKey> {
        self.spaces
            .get(space)
            .map(|s| s.surfaces.clone())
            .unwrap_or_default()
    }

    pub fn sub_surface(&self, key: SubSurfaceKey) -> Option<&SubSurface> {
        self.sub_surfaces.get(key)
    }

    pub fn sub_surface_mut(&mut self, key: SubSurfaceKey) -> Option<&mut SubSurface> {
        self.sub_surfaces.get_mut(key)
    }

    pub fn sub_surfaces(&self) -> impl Iterator<Item = (SubSurfaceKey, &SubSurface)> {
        self.sub_surfaces.iter()
    }

    pub fn shading_group(&self, key: ShadingGroupKey) -> Option<&ShadingSurfaceGroup> {
        self.shading_groups.get(key)
    }

    pub fn shading_groups(&self) -> impl Iterator<Item = (ShadingGroupKey, &ShadingSurfaceGroup)> {
        self.shading_groups.iter()
    }

    pub fn shading_surface(&self, key: ShadingSurfaceKey) -> Option<&ShadingSurface> {
        self.shading_surfaces.get(key)
    }

    pub fn shading_surfaces(&self) -> impl Iterator<Item = (ShadingSurfaceKey, &ShadingSurface)> {
        self.shading_surfaces.iter()
    }

    pub fn construction(&self, name: &str) -> Option<&Construction> {
        self.constructions.get(name)
    }

    pub fn constructions(&self) -> impl Iterator<Item = &Construction> {
        self.constructions.values()
    }

    pub fn space_type(&self, name: &str) -> Option<&SpaceType> {
        self.space_types.get(name)
    }

    pub fn construction_set(&self, name: &str) -> Option<&DefaultConstructionSet> {
        self.construction_sets.get(name)
    }

    /// First construction set by name, the one a fresh building defaults to.
    pub fn first_construction_set(&self) -> Option<&DefaultConstructionSet> {
        self.construction_sets.values().next()
    }

    pub fn first_schedule_set(&self) -> Option<&DefaultScheduleSet> {
        self.schedule_sets.values().next()
    }

    // ---- geometry -------------------------------------------------------

    /// Vertices of a surface in building coordinates.
    pub fn surface_world_vertices(&self, key: SurfaceKey) -> Option<Vec<Point3<f64>>> {
        let surface = self.surfaces.get(key)?;
        let t = self.spaces.get(surface.space)?.transformation;
        Some(surface.vertices.iter().map(|p| t.apply(p)).collect())
    }

    /// Vertices of a sub-surface in building coordinates.
    pub fn sub_surface_world_vertices(&self, key: SubSurfaceKey) -> Option<Vec<Point3<f64>>> {
        let sub = self.sub_surfaces.get(key)?;
        let space = self.surfaces.get(sub.surface)?.space;
        let t = self.spaces.get(space)?.transformation;
        Some(sub.vertices.iter().map(|p| t.apply(p)).collect())
    }

    /// Gross area less the sub-surfaces it hosts.
    pub fn net_area(&self, key: SurfaceKey) -> Option<f64> {
        let surface = self.surfaces.get(key)?;
        let openings: f64 = surface
            .sub_surfaces
            .iter()
            .filter_map(|&k| self.sub_surfaces.get(k))
            .map(PlanarSurface::gross_area)
            .sum();
        Some((surface.gross_area() - openings).max(0.0))
    }

    /// Volume enclosed by the surfaces of a space, by the divergence theorem.
    /// Assumes a closed, outward-wound set of surfaces.
    pub fn space_volume(&self, key: SpaceKey) -> Option<f64> {
        let space = self.spaces.get(key)?;
        let mut volume = 0.0;
        for s in space.surfaces.iter().filter_map(|&k| self.surfaces.get(k)) {
            let Some(n) = s.outward_normal() else {
                continue;
            };
            volume += s.vertices[0].coords.dot(&n) * s.gross_area();
        }
        Some((volume / 3.0).abs())
    }

    /// Gross area of the floors of a space.
    pub fn space_floor_area(&self, key: SpaceKey) -> Option<f64> {
        let space = self.spaces.get(key)?;
        Some(
            space
                .surfaces
                .iter()
                .filter_map(|&k| self.surfaces.get(k))
                .filter(|s| s.surface_type == SurfaceType::Floor)
                .map(PlanarSurface::gross_area)
                .sum(),
        )
    }

    fn unmatched_loops(&self, space: SpaceKey) -> Vec<(SurfaceKey, Vec<Point3<f64>>)> {
        self.space_surfaces(space)
            .into_iter()
            .filter(|&k| self.surfaces.get(k).is_some_and(|s| s.adjacent_surface.is_none()))
            .filter_map(|k| Some((k, self.surface_world_vertices(k)?)))
            .collect()
    }

    /// Pairs surfaces of two spaces whose loops coincide with opposite
    /// winding. Both sides become interior and point at each other. Returns
    /// the number of pairs matched.
    pub fn match_surfaces(&mut self, a: SpaceKey, b: SpaceKey, tolerance: f64) -> usize {
        if a == b {
            return 0;
        }
        let left = self.unmatched_loops(a);
        let mut right: Vec<_> = self.unmatched_loops(b).into_iter().map(Some).collect();

        let mut pairs = Vec::new();
        for (ka, loop_a) in &left {
            let hit = right.iter_mut().find(|slot| {
                slot.as_ref()
                    .is_some_and(|(_, loop_b)| loops_mirror(loop_a, loop_b, tolerance))
            });
            if let Some((kb, _)) = hit.and_then(Option::take) {
                pairs.push((*ka, kb));
            }
        }

        for &(x, y) in &pairs {
            for (this, other) in [(x, y), (y, x)] {
                let s = &mut self.surfaces[this];
                s.set_interior();
                s.adjacent_surface = Some(other);
            }
        }
        tracing::debug!(pairs = pairs.len(), "matched surfaces");
        pairs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use crate::planar::Transformation;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    /// Outward-wound faces of an axis-aligned box.
    fn box_loops(min: [f64; 3], max: [f64; 3]) -> Vec<Vec<Point3<f64>>> {
        let [x0, y0, z0] = min;
        let [x1, y1, z1] = max;
        vec![
            vec![p(x0, y0, z0), p(x0, y1, z0), p(x1, y1, z0), p(x1, y0, z0)],
            vec![p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), p(x0, y1, z1)],
            vec![p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), p(x0, y0, z1)],
            vec![p(x1, y1, z0), p(x0, y1, z0), p(x0, y1, z1), p(x1, y1, z1)],
            vec![p(x0, y1, z0), p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1)],
            vec![p(x1, y0, z0), p(x1, y1, z0), p(x1, y1, z1), p(x1, y0, z1)],
        ]
    }

    fn add_box(model: &mut Model, name: &str, min: [f64; 3], max: [f64; 3]) -> SpaceKey {
        let space = model.add_space(name, None);
        for (i, lp) in box_loops(min, max).into_iter().enumerate() {
            model
                .add_surface(space, format!("{name}_SURFACE_{i}"), lp)
                .unwrap();
        }
        space
    }

    #[test]
    fn surface_needs_three_vertices() {
        let mut model = Model::new();
        let space = model.add_space("S", None);
        let err = model
            .add_surface(space, "bad", vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)])
            .unwrap_err();
        assert!(matches!(err, Error::TooFewVertices { count: 2, .. }));
        assert!(model.space(space).unwrap().surfaces.is_empty());
    }

    #[test]
    fn default_types_follow_tilt() {
        let mut model = Model::new();
        let space = add_box(&mut model, "S", [0.0; 3], [1.0; 3]);
        let types: Vec<_> = model
            .space_surfaces(space)
            .into_iter()
            .map(|k| model.surface(k).unwrap().surface_type)
            .collect();
        assert_eq!(types[0], SurfaceType::Floor);
        assert_eq!(types[1], SurfaceType::RoofCeiling);
        assert!(types[2..].iter().all(|t| *t == SurfaceType::Wall));
    }

    #[test]
    fn volume_of_a_box_space() {
        let mut model = Model::new();
        let space = add_box(&mut model, "S", [1.0, 2.0, 0.0], [4.0, 6.0, 2.5]);
        assert_relative_eq!(model.space_volume(space).unwrap(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(model.space_floor_area(space).unwrap(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn net_area_subtracts_openings() {
        let mut model = Model::new();
        let space = model.add_space("S", None);
        let wall = model
            .add_surface(
                space,
                "W",
                vec![p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(4.0, 0.0, 3.0), p(0.0, 0.0, 3.0)],
            )
            .unwrap();
        model
            .add_sub_surface(
                wall,
                "W_WIN",
                vec![p(1.0, 0.0, 1.0), p(3.0, 0.0, 1.0), p(3.0, 0.0, 2.0), p(1.0, 0.0, 2.0)],
                SubSurfaceType::FixedWindow,
            )
            .unwrap();
        assert_relative_eq!(model.net_area(wall).unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn zone_assignment_moves_space() {
        let mut model = Model::new();
        let space = model.add_space("S", None);
        let a = model.add_thermal_zone("A");
        let b = model.add_thermal_zone("B");

        model.assign_zone(space, a).unwrap();
        model.assign_zone(space, b).unwrap();

        assert!(model.zone(a).unwrap().spaces.is_empty());
        assert_eq!(model.zone(b).unwrap().spaces, vec![space]);
        assert_eq!(model.space(space).unwrap().thermal_zone, Some(b));
    }

    #[test]
    fn matching_pairs_the_shared_wall() {
        let mut model = Model::new();
        let a = add_box(&mut model, "A", [0.0; 3], [3.0, 3.0, 3.0]);
        let b = add_box(&mut model, "B", [3.0, 0.0, 0.0], [6.0, 3.0, 3.0]);

        assert_eq!(model.match_surfaces(a, b, 1e-6), 1);
        assert_eq!(model.match_surfaces(b, a, 1e-6), 0);

        let interior: Vec<_> = model
            .surfaces()
            .filter(|(_, s)| s.boundary == BoundaryCondition::Surface)
            .collect();
        assert_eq!(interior.len(), 2);
        let (ka, sa) = interior[0];
        let (kb, sb) = interior[1];
        assert_eq!(sa.adjacent_surface, Some(kb));
        assert_eq!(sb.adjacent_surface, Some(ka));
        assert_eq!(sa.sun_exposure, SunExposure::NoSun);
    }

    #[test]
    fn matching_uses_space_transformation() {
        let mut model = Model::new();
        let a = add_box(&mut model, "A", [0.0; 3], [3.0, 3.0, 3.0]);
        let b = add_box(&mut model, "B", [0.0; 3], [3.0, 3.0, 3.0]);
        assert_eq!(model.match_surfaces(a, b, 1e-6), 0);

        model.space_mut(b).unwrap().transformation =
            Transformation::from_translation(Vector3::new(3.0, 0.0, 0.0));
        assert_eq!(model.match_surfaces(a, b, 1e-6), 1);
    }
}
