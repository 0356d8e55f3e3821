// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary conditions, constructions and apertures of classified faces.
//!
//! | Face type   | Shared | Underground | Boundary | Exposed | Construction   |
//! |-------------|--------|-------------|----------|---------|----------------|
//! | RoofCeiling | yes    | -           | Surface  | no      | interior ceiling |
//! | RoofCeiling | no     | no          | Outdoors | yes     | exterior roof  |
//! | RoofCeiling | no     | yes         | Ground   | no      | exterior roof  |
//! | Floor       | yes    | -           | Surface  | no      | interior floor |
//! | Floor       | no     | -           | Ground   | no      | exterior wall  |
//! | Wall        | yes    | -           | Surface  | no      | interior wall  |
//! | Wall        | no     | no          | Outdoors | yes     | exterior wall  |
//! | Wall        | no     | yes         | Ground   | no      | exterior wall  |
//!
//! Only exterior walls above grade receive windows: either synthesized from
//! a glazing ratio or projected from the apertures hosted by the face.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use topenergy_model::{
    template, BoundaryCondition, Model, PlanarSurface, SubSurfaceKey, SubSurfaceType,
    SunExposure, SurfaceKey, WindExposure,
};
use topenergy_topology::{FaceKey, TopologyArena};

use crate::classifier::FaceType;
use crate::error::{Error, Result};
use crate::polygon::{fan_triangles, scale_about_centroid, Polygon};

/// Openings at or below this area, in m², are dropped.
pub const MIN_APERTURE_AREA: f64 = 0.1;
/// Area factor applied to each synthesized window triangle so it does not
/// share edges with its host.
pub const WINDOW_SHRINK: f64 = 0.999;

/// Fan triangles at or below this area (m²) are dropped from synthesized
/// glazing. Collinear outline vertices produce them.
pub const MIN_TRIANGLE_AREA: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstructionCategory {
    InteriorCeiling,
    InteriorFloor,
    InteriorWall,
    ExteriorRoof,
    ExteriorWall,
    ExteriorWindow,
    ExteriorDoor,
}

/// Construction names looked up in the template model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionNames {
    pub interior_ceiling: String,
    pub interior_floor: String,
    pub interior_wall: String,
    pub exterior_door: String,
    pub exterior_window: String,
    pub exterior_roof: String,
    pub exterior_wall: String,
}

impl Default for ConstructionNames {
    fn default() -> Self {
        Self {
            interior_ceiling: template::INTERIOR_CEILING.into(),
            interior_floor: template::INTERIOR_FLOOR.into(),
            interior_wall: template::INTERIOR_WALL.into(),
            exterior_door: template::EXTERIOR_DOOR.into(),
            exterior_window: template::EXTERIOR_WINDOW.into(),
            exterior_roof: template::EXTERIOR_ROOF.into(),
            exterior_wall: template::EXTERIOR_WALL.into(),
        }
    }
}

impl ConstructionNames {
    pub fn name(&self, category: ConstructionCategory) -> &str {
        match category {
            ConstructionCategory::InteriorCeiling => &self.interior_ceiling,
            ConstructionCategory::InteriorFloor => &self.interior_floor,
            ConstructionCategory::InteriorWall => &self.interior_wall,
            ConstructionCategory::ExteriorRoof => &self.exterior_roof,
            ConstructionCategory::ExteriorWall => &self.exterior_wall,
            ConstructionCategory::ExteriorWindow => &self.exterior_window,
            ConstructionCategory::ExteriorDoor => &self.exterior_door,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub boundary: BoundaryCondition,
    /// Sun- and wind-exposed.
    pub exposed: bool,
    pub construction: ConstructionCategory,
}

impl Resolution {
    /// Whether windows may be placed on a face resolved this way.
    pub fn takes_windows(&self, face_type: FaceType) -> bool {
        face_type == FaceType::Wall && self.boundary == BoundaryCondition::Outdoors
    }
}

/// Boundary condition, exposure and construction of a face.
///
/// More than one adjacent cell means the face is an interior partition.
pub fn resolve(face_type: FaceType, adjacent_cell_count: usize, underground: bool) -> Resolution {
    use BoundaryCondition::*;
    use ConstructionCategory::*;

    let interior = adjacent_cell_count > 1;
    let (boundary, exposed, construction) = match (face_type, interior, underground) {
        (FaceType::RoofCeiling, true, _) => (Surface, false, InteriorCeiling),
        (FaceType::RoofCeiling, false, false) => (Outdoors, true, ExteriorRoof),
        (FaceType::RoofCeiling, false, true) => (Ground, false, ExteriorRoof),
        (FaceType::Floor, true, _) => (Surface, false, InteriorFloor),
        (FaceType::Floor, false, _) => (Ground, false, ExteriorWall),
        (FaceType::Wall, true, _) => (Surface, false, InteriorWall),
        (FaceType::Wall, false, false) => (Outdoors, true, ExteriorWall),
        (FaceType::Wall, false, true) => (Ground, false, ExteriorWall),
    };
    Resolution {
        boundary,
        exposed,
        construction,
    }
}

/// Writes a resolution onto a surface.
///
/// A construction missing from the model is logged and left unset.
pub fn apply_resolution(
    model: &mut Model,
    surface: SurfaceKey,
    face_type: FaceType,
    resolution: &Resolution,
    names: &ConstructionNames,
) -> Result<()> {
    let construction = construction_in_model(model, names.name(resolution.construction));
    let s = model
        .surface_mut(surface)
        .ok_or_else(|| Error::ExternalLibrary("surface vanished from the model".into()))?;

    s.surface_type = face_type.into();
    s.boundary = resolution.boundary;
    (s.sun_exposure, s.wind_exposure) = if resolution.exposed {
        (SunExposure::SunExposed, WindExposure::WindExposed)
    } else {
        (SunExposure::NoSun, WindExposure::NoWind)
    };
    s.construction = construction;
    Ok(())
}

fn construction_in_model(model: &Model, name: &str) -> Option<String> {
    if model.construction(name).is_some() {
        Some(name.to_string())
    } else {
        tracing::warn!(construction = name, "construction not found in template");
        None
    }
}

/// Opening counts of one conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApertureReport {
    /// Hosted openings large enough to be considered.
    pub total: usize,
    /// Openings that became sub-surfaces.
    pub applied: usize,
}

pub fn check_glazing_ratio(ratio: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(Error::InvalidInput(format!(
            "glazing ratio {ratio} is outside [0, 1]"
        )));
    }
    Ok(())
}

fn host(model: &Model, surface: SurfaceKey) -> Result<(String, Vec<Point3<f64>>, nalgebra::Vector3<f64>)> {
    let s = model
        .surface(surface)
        .ok_or_else(|| Error::ExternalLibrary("host surface missing from the model".into()))?;
    let normal = s
        .outward_normal()
        .ok_or_else(|| Error::Geometry(format!("host '{}' is degenerate", s.name)))?;
    Ok((s.name.clone(), s.vertices.clone(), normal))
}

fn attach_windows(
    model: &mut Model,
    surface: SurfaceKey,
    windows: Vec<Polygon>,
    names: &ConstructionNames,
) -> Result<Vec<SubSurfaceKey>> {
    let construction = construction_in_model(model, &names.exterior_window);
    let mut keys = Vec::with_capacity(windows.len());
    for window in windows {
        let key = window.into_sub_surface(model, surface, SubSurfaceType::FixedWindow)?;
        if let Some(sub) = model.sub_surface_mut(key) {
            sub.construction = construction.clone();
        }
        keys.push(key);
    }
    Ok(keys)
}

/// Covers `ratio` of a wall with triangular windows.
///
/// The reversed wall loop is scaled about its centroid to the target area
/// and fanned from its first vertex; each triangle is shrunk by
/// [`WINDOW_SHRINK`] about its own centroid and turned to face like the
/// wall. Nothing is attached unless every triangle is valid.
pub fn synthesize_glazing(
    model: &mut Model,
    surface: SurfaceKey,
    ratio: f64,
    names: &ConstructionNames,
) -> Result<Vec<SubSurfaceKey>> {
    check_glazing_ratio(ratio)?;
    if ratio == 0.0 {
        return Ok(Vec::new());
    }

    let (host_name, mut outline, host_normal) = host(model, surface)?;
    outline.reverse();
    let scaled = scale_about_centroid(&outline, ratio);

    let windows = fan_triangles(&scaled)
        .into_iter()
        .filter(|t| (t[1] - t[0]).cross(&(t[2] - t[0])).norm() * 0.5 > MIN_TRIANGLE_AREA)
        .enumerate()
        .map(|(i, tri)| {
            let shrunk = scale_about_centroid(&tri, WINDOW_SHRINK);
            Polygon::new(format!("{host_name}_SUBSURFACE_{}", i + 1), shrunk)?
                .oriented_like(&host_normal, &host_name)
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(surface = %host_name, windows = windows.len(), ratio, "synthesized glazing");
    attach_windows(model, surface, windows, names)
}

/// Turns the apertures hosted by `face` into windows on `surface`.
///
/// Openings of [`MIN_APERTURE_AREA`] or less are ignored. The rest count
/// towards `report.total`, are turned to face like the wall, and count
/// towards `report.applied` once attached.
pub fn project_apertures(
    arena: &TopologyArena,
    face: FaceKey,
    model: &mut Model,
    surface: SurfaceKey,
    names: &ConstructionNames,
    report: &mut ApertureReport,
) -> Result<Vec<SubSurfaceKey>> {
    let apertures = arena.apertures(face);
    if apertures.is_empty() {
        return Ok(Vec::new());
    }
    let (host_name, _, host_normal) = host(model, surface)?;

    let mut windows = Vec::new();
    for aperture in apertures {
        let Some(opening) = aperture.face() else {
            tracing::debug!(surface = %host_name, "skipping aperture that is not a face");
            continue;
        };
        let area = arena.face_area(opening).unwrap_or(0.0);
        if area <= MIN_APERTURE_AREA {
            tracing::warn!(surface = %host_name, area, "ignoring tiny aperture");
            continue;
        }
        let points = arena
            .face_outer_points(opening)
            .ok_or_else(|| Error::Geometry(format!("aperture {opening:?} has no outer loop")))?;
        let name = format!("{host_name}_SUBSURFACE_{}", windows.len() + 1);
        let window = Polygon::new(name, points)?.oriented_like(&host_normal, &host_name)?;

        report.total += 1;
        if window.area() > MIN_APERTURE_AREA {
            windows.push(window);
        }
    }

    let keys = attach_windows(model, surface, windows, names)?;
    report.applied += keys.len();
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use topenergy_model::SpaceKey;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    fn wall_model() -> (Model, SpaceKey, SurfaceKey) {
        let mut model = Model::standard_template();
        let space = model.add_space("S", None);
        let wall = model
            .add_surface(
                space,
                "S_SURFACE_3",
                vec![p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(4.0, 0.0, 3.0), p(0.0, 0.0, 3.0)],
            )
            .unwrap();
        (model, space, wall)
    }

    #[test]
    fn boundary_table_is_exhaustive() {
        use BoundaryCondition::*;
        use ConstructionCategory::*;

        let cases = [
            (FaceType::RoofCeiling, 2, false, Surface, false, InteriorCeiling),
            (FaceType::RoofCeiling, 2, true, Surface, false, InteriorCeiling),
            (FaceType::RoofCeiling, 1, false, Outdoors, true, ExteriorRoof),
            (FaceType::RoofCeiling, 1, true, Ground, false, ExteriorRoof),
            (FaceType::Floor, 2, false, Surface, false, InteriorFloor),
            (FaceType::Floor, 2, true, Surface, false, InteriorFloor),
            (FaceType::Floor, 1, false, Ground, false, ExteriorWall),
            (FaceType::Floor, 1, true, Ground, false, ExteriorWall),
            (FaceType::Wall, 2, false, Surface, false, InteriorWall),
            (FaceType::Wall, 2, true, Surface, false, InteriorWall),
            (FaceType::Wall, 1, false, Outdoors, true, ExteriorWall),
            (FaceType::Wall, 1, true, Ground, false, ExteriorWall),
        ];
        for (face_type, count, underground, boundary, exposed, construction) in cases {
            let r = resolve(face_type, count, underground);
            assert_eq!(
                (r.boundary, r.exposed, r.construction),
                (boundary, exposed, construction),
                "{face_type:?} shared by {count}, underground {underground}"
            );
        }
        assert!(resolve(FaceType::Wall, 0, false).takes_windows(FaceType::Wall));
        assert!(!resolve(FaceType::Wall, 1, true).takes_windows(FaceType::Wall));
    }

    #[test]
    fn resolution_is_written_to_surface() {
        let (mut model, _, wall) = wall_model();
        let r = resolve(FaceType::Wall, 2, false);
        apply_resolution(&mut model, wall, FaceType::Wall, &r, &ConstructionNames::default()).unwrap();

        let s = model.surface(wall).unwrap();
        assert_eq!(s.boundary, BoundaryCondition::Surface);
        assert_eq!(s.sun_exposure, SunExposure::NoSun);
        assert_eq!(s.construction.as_deref(), Some(template::INTERIOR_WALL));
    }

    #[test]
    fn unknown_construction_is_left_unset() {
        let mut model = Model::new();
        let space = model.add_space("S", None);
        let wall = model
            .add_surface(space, "W", vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0)])
            .unwrap();
        let r = resolve(FaceType::Wall, 1, false);
        apply_resolution(&mut model, wall, FaceType::Wall, &r, &ConstructionNames::default()).unwrap();
        assert!(model.surface(wall).unwrap().construction.is_none());
    }

    #[test]
    fn glazing_covers_ratio_of_wall() {
        let (mut model, _, wall) = wall_model();
        let keys = synthesize_glazing(&mut model, wall, 0.4, &ConstructionNames::default()).unwrap();

        assert_eq!(keys.len(), 2);
        let host_normal = model.surface(wall).unwrap().outward_normal().unwrap();
        let mut total = 0.0;
        for (i, &k) in keys.iter().enumerate() {
            let sub = model.sub_surface(k).unwrap();
            assert_eq!(sub.name, format!("S_SURFACE_3_SUBSURFACE_{}", i + 1));
            assert_eq!(sub.sub_surface_type, SubSurfaceType::FixedWindow);
            assert_eq!(sub.construction.as_deref(), Some(template::EXTERIOR_WINDOW));
            assert_relative_eq!(sub.outward_normal().unwrap().dot(&host_normal), 1.0, epsilon = 1e-9);
            assert!(sub.vertices.iter().all(|v| v.y.abs() < 1e-12));
            total += sub.gross_area();
        }
        assert_relative_eq!(total, 0.4 * 12.0 * WINDOW_SHRINK, epsilon = 1e-9);
        assert!(model.validate().errors.is_empty());
    }

    #[test]
    fn collinear_outline_vertex_is_skipped() {
        let mut model = Model::standard_template();
        let space = model.add_space("S", None);
        // (2,0,0) sits mid-edge; the fan from the reversed outline's first
        // vertex would turn it into a zero-area window
        let wall = model
            .add_surface(
                space,
                "S_SURFACE_3",
                vec![p(2.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(4.0, 0.0, 3.0), p(0.0, 0.0, 3.0), p(0.0, 0.0, 0.0)],
            )
            .unwrap();

        let keys = synthesize_glazing(&mut model, wall, 0.4, &ConstructionNames::default()).unwrap();

        assert_eq!(keys.len(), 2);
        let mut total = 0.0;
        for (i, &k) in keys.iter().enumerate() {
            let sub = model.sub_surface(k).unwrap();
            assert_eq!(sub.name, format!("S_SURFACE_3_SUBSURFACE_{}", i + 1));
            assert!(sub.outward_normal().is_some());
            total += sub.gross_area();
        }
        assert_relative_eq!(total, 0.4 * 12.0 * WINDOW_SHRINK, epsilon = 1e-9);
    }

    #[test]
    fn zero_ratio_adds_nothing() {
        let (mut model, _, wall) = wall_model();
        let keys = synthesize_glazing(&mut model, wall, 0.0, &ConstructionNames::default()).unwrap();
        assert!(keys.is_empty());
        assert_eq!(model.sub_surfaces().count(), 0);
    }

    #[test]
    fn out_of_range_ratio_changes_nothing() {
        for ratio in [1.5, -0.1] {
            let (mut model, _, wall) = wall_model();
            let err = synthesize_glazing(&mut model, wall, ratio, &ConstructionNames::default());
            assert!(matches!(err, Err(Error::InvalidInput(_))));
            assert_eq!(model.sub_surfaces().count(), 0);
        }
    }

    #[test]
    fn hosted_apertures_become_windows() {
        let mut arena = TopologyArena::new();
        let (_, _, faces) = arena.make_box([0.0; 3], [4.0, 4.0, 3.0]).unwrap();
        let front = faces[2];
        // same winding as the wall, reversed, and one too small to keep
        let same = arena
            .add_face_by_coords(&[[0.5, 0.0, 1.0], [1.5, 0.0, 1.0], [1.5, 0.0, 2.0], [0.5, 0.0, 2.0]])
            .unwrap();
        let flipped = arena
            .add_face_by_coords(&[[2.5, 0.0, 1.0], [2.5, 0.0, 2.0], [3.5, 0.0, 2.0], [3.5, 0.0, 1.0]])
            .unwrap();
        let tiny = arena
            .add_face_by_coords(&[[0.1, 0.0, 0.1], [0.3, 0.0, 0.1], [0.3, 0.0, 0.3]])
            .unwrap();
        for opening in [same, flipped, tiny] {
            arena.add_aperture(front, opening.into()).unwrap();
        }

        let mut model = Model::standard_template();
        let space = model.add_space("S", None);
        let wall = model
            .add_surface(space, "S_SURFACE_3", arena.face_outer_points(front).unwrap())
            .unwrap();
        let mut report = ApertureReport::default();
        let keys = project_apertures(
            &arena,
            front,
            &mut model,
            wall,
            &ConstructionNames::default(),
            &mut report,
        )
        .unwrap();

        assert_eq!(report, ApertureReport { total: 2, applied: 2 });
        assert_eq!(keys.len(), 2);
        let host_normal = model.surface(wall).unwrap().outward_normal().unwrap();
        for k in keys {
            let n = model.sub_surface(k).unwrap().outward_normal().unwrap();
            assert_relative_eq!(n.dot(&host_normal), 1.0, epsilon = 1e-9);
        }
        assert_relative_eq!(model.net_area(wall).unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn tilted_aperture_is_fatal() {
        let mut arena = TopologyArena::new();
        let (_, _, faces) = arena.make_box([0.0; 3], [4.0, 4.0, 3.0]).unwrap();
        let tilted = arena
            .add_face_by_coords(&[[0.5, 0.0, 1.0], [1.5, 1.0, 1.0], [1.5, 1.0, 2.0], [0.5, 0.0, 2.0]])
            .unwrap();
        arena.add_aperture(faces[2], tilted.into()).unwrap();

        let mut model = Model::standard_template();
        let space = model.add_space("S", None);
        let wall = model
            .add_surface(space, "S_SURFACE_3", arena.face_outer_points(faces[2]).unwrap())
            .unwrap();
        let mut report = ApertureReport::default();
        let result = project_apertures(
            &arena,
            faces[2],
            &mut model,
            wall,
            &ConstructionNames::default(),
            &mut report,
        );

        assert!(matches!(result, Err(Error::NonCoplanarAperture { .. })));
        assert_eq!(model.sub_surfaces().count(), 0);
    }
}
