// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use topenergy::{assemble, AssemblyOptions, Error, NAME_ATTRIBUTE};
use topenergy_model::{
    template, BoundaryCondition, Model, PlanarSurface, SunExposure, SurfaceType,
};
use topenergy_topology::builders::box_faces;
use topenergy_topology::{CellComplexKey, TopologyArena};

fn single_box(min: [f64; 3], max: [f64; 3]) -> (TopologyArena, CellComplexKey) {
    let mut arena = TopologyArena::new();
    let (cell, _, _) = arena.make_box(min, max).unwrap();
    let complex = arena.add_cell_complex(&[cell]).unwrap();
    (arena, complex)
}

fn count(model: &Model, ty: SurfaceType, bc: BoundaryCondition) -> usize {
    model
        .surfaces()
        .filter(|(_, s)| s.surface_type == ty && s.boundary == bc)
        .count()
}

fn space_centroid(model: &Model, space: topenergy_model::SpaceKey) -> Point3<f64> {
    let points: Vec<_> = model
        .space_surfaces(space)
        .into_iter()
        .flat_map(|s| model.surface(s).unwrap().vertices.clone())
        .collect();
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

#[test]
fn unit_cube_at_grade() {
    let (arena, complex) = single_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    let assembly = assemble(
        &arena,
        complex,
        &[],
        &[0.0, 1.0],
        &AssemblyOptions::default(),
        Model::standard_template(),
    )
    .unwrap();
    let model = &assembly.model;

    assert_eq!(model.surfaces().count(), 6);
    assert_eq!(count(model, SurfaceType::Wall, BoundaryCondition::Outdoors), 4);
    assert_eq!(count(model, SurfaceType::RoofCeiling, BoundaryCondition::Outdoors), 1);
    assert_eq!(count(model, SurfaceType::Floor, BoundaryCondition::Ground), 1);

    let (_, roof) = model
        .surfaces()
        .find(|(_, s)| s.surface_type == SurfaceType::RoofCeiling)
        .unwrap();
    assert_eq!(roof.sun_exposure, SunExposure::SunExposed);
    assert_eq!(roof.construction.as_deref(), Some(template::EXTERIOR_ROOF));

    let space = assembly.spaces[0];
    assert_eq!(model.space(space).unwrap().name, "STORY_1_SPACE_1");
    let names: Vec<_> = model
        .space_surfaces(space)
        .into_iter()
        .map(|s| model.surface(s).unwrap().name.clone())
        .collect();
    assert_eq!(names[0], "STORY_1_SPACE_1_SURFACE_1");
    assert_eq!(names[5], "STORY_1_SPACE_1_SURFACE_6");

    let (_, zone) = model.zones().next().unwrap();
    assert_eq!(zone.name, "STORY_1_SPACE_1_THERMAL_ZONE");
    assert!(zone.use_ideal_air_loads);
    assert_relative_eq!(zone.volume.unwrap(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(zone.ceiling_height.unwrap(), 1.0, epsilon = 1e-9);
    let thermostat = zone.thermostat.unwrap();
    assert_relative_eq!(model.schedule(thermostat.heating_schedule).unwrap().value, 20.0);
    assert_relative_eq!(model.schedule(thermostat.cooling_schedule).unwrap().value, 24.0);

    let cell = arena.complex_cells(complex)[0];
    let name = assembly.topology.attribute(cell.into(), NAME_ATTRIBUTE);
    assert_eq!(name.and_then(|v| v.as_str()), Some("STORY_1_SPACE_1"));
    assert!(arena.attribute(cell.into(), NAME_ATTRIBUTE).is_none());

    assert!(model.validate().is_ok());
}

#[test]
fn unused_template_resources_are_purged() {
    let (arena, complex) = single_box([0.0, 0.0, 0.0], [4.0, 4.0, 3.0]);
    let assembly = assemble(
        &arena,
        complex,
        &[],
        &[0.0, 3.0],
        &AssemblyOptions::default(),
        Model::standard_template(),
    )
    .unwrap();
    let model = &assembly.model;

    assert!(model.construction(template::EXTERIOR_WALL).is_some());
    assert!(model.construction(template::EXTERIOR_DOOR).is_none());
    assert!(model.construction(template::INTERIOR_WALL).is_none());
    assert!(model.space_type(template::MEDIUM_OFFICE).is_some());
    assert_eq!(
        model.building.default_construction_set.as_deref(),
        Some(template::CONSTRUCTION_SET)
    );
}

#[test]
fn stacked_stories_share_a_matched_slab() {
    let levels = [0.0, 3.0, 6.0];
    let mut arena = TopologyArena::new();
    let complex = arena
        .make_stacked_boxes([0.0, 0.0], [10.0, 8.0], &levels, 1e-6)
        .unwrap();

    let assembly = assemble(
        &arena,
        complex,
        &[],
        &levels,
        &AssemblyOptions::default(),
        Model::standard_template(),
    )
    .unwrap();
    let model = &assembly.model;

    let names: Vec<_> = assembly
        .spaces
        .iter()
        .map(|&s| model.space(s).unwrap().name.clone())
        .collect();
    assert_eq!(names, ["STORY_1_SPACE_1", "STORY_2_SPACE_1"]);
    assert_eq!(model.stories().count(), 2);
    assert_eq!(model.building.standards_number_of_stories, Some(2));
    assert_relative_eq!(model.building.nominal_floor_to_floor_height.unwrap(), 3.0);

    let ceiling = model
        .surfaces()
        .find(|(_, s)| s.surface_type == SurfaceType::RoofCeiling && s.boundary == BoundaryCondition::Surface)
        .map(|(k, _)| k)
        .unwrap();
    let floor = model
        .surfaces()
        .find(|(_, s)| s.surface_type == SurfaceType::Floor && s.boundary == BoundaryCondition::Surface)
        .map(|(k, _)| k)
        .unwrap();
    assert_eq!(model.surface(ceiling).unwrap().adjacent_surface, Some(floor));
    assert_eq!(model.surface(floor).unwrap().adjacent_surface, Some(ceiling));
    assert_eq!(
        model.surface(ceiling).unwrap().construction.as_deref(),
        Some(template::INTERIOR_CEILING)
    );
    assert_eq!(
        model.surface(floor).unwrap().construction.as_deref(),
        Some(template::INTERIOR_FLOOR)
    );

    assert_eq!(count(model, SurfaceType::Floor, BoundaryCondition::Ground), 1);
    assert_eq!(count(model, SurfaceType::RoofCeiling, BoundaryCondition::Outdoors), 1);
    assert_eq!(count(model, SurfaceType::Wall, BoundaryCondition::Outdoors), 8);
    assert!(model.validate().is_ok());
}

#[test]
fn every_surface_faces_out_of_its_space() {
    let mut arena = TopologyArena::new();
    let complex = arena
        .make_adjacent_boxes(
            ([0.0, 0.0, 0.0], [3.0, 3.0, 3.0]),
            ([3.0, 0.0, 0.0], [6.0, 3.0, 3.0]),
            1e-6,
        )
        .unwrap();

    let assembly = assemble(
        &arena,
        complex,
        &[],
        &[0.0, 3.0],
        &AssemblyOptions::default(),
        Model::standard_template(),
    )
    .unwrap();
    let model = &assembly.model;

    for &space in &assembly.spaces {
        let inside = space_centroid(model, space);
        for key in model.space_surfaces(space) {
            let surface = model.surface(key).unwrap();
            let n = surface.outward_normal().unwrap();
            let out = surface.centroid().unwrap() - inside;
            assert!(n.dot(&out) > 0.0, "{} faces inward", surface.name);
        }
    }

    let names: Vec<_> = assembly
        .spaces
        .iter()
        .map(|&s| model.space(s).unwrap().name.clone())
        .collect();
    assert_eq!(names, ["STORY_1_SPACE_1", "STORY_1_SPACE_2"]);
    assert_eq!(count(model, SurfaceType::Wall, BoundaryCondition::Surface), 2);
    assert_eq!(count(model, SurfaceType::Wall, BoundaryCondition::Outdoors), 6);
}

#[test]
fn glazing_ratio_glazes_exterior_walls_only() {
    let mut arena = TopologyArena::new();
    let complex = arena
        .make_adjacent_boxes(
            ([0.0, 0.0, 0.0], [3.0, 3.0, 3.0]),
            ([3.0, 0.0, 0.0], [6.0, 3.0, 3.0]),
            1e-6,
        )
        .unwrap();
    let options = AssemblyOptions {
        glazing_ratio: Some(0.4),
        ..Default::default()
    };

    let assembly = assemble(&arena, complex, &[], &[0.0, 3.0], &options, Model::standard_template())
        .unwrap();
    let model = &assembly.model;

    assert_eq!(model.sub_surfaces().count(), 12);
    let glazed: f64 = model.sub_surfaces().map(|(_, s)| s.gross_area()).sum();
    assert_relative_eq!(glazed, 6.0 * 9.0 * 0.4 * 0.999, epsilon = 1e-9);

    for (_, sub) in model.sub_surfaces() {
        let host = model.surface(sub.surface).unwrap();
        assert_eq!(host.surface_type, SurfaceType::Wall);
        assert_eq!(host.boundary, BoundaryCondition::Outdoors);
        assert!(sub.name.starts_with(&format!("{}_SUBSURFACE_", host.name)));
        assert_eq!(sub.construction.as_deref(), Some(template::EXTERIOR_WINDOW));
    }
    assert_eq!(assembly.report.total, 0);
    assert!(model.validate().is_ok());
}

#[test]
fn wall_with_mid_edge_vertex_is_glazed() {
    let mut arena = TopologyArena::new();
    let mut loops = box_faces([0.0, 0.0, 0.0], [4.0, 5.0, 3.0]);
    loops[0] = vec![[0.0, 0.0, 0.0], [0.0, 5.0, 0.0], [4.0, 5.0, 0.0], [4.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
    loops[2] = vec![[2.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 0.0, 3.0], [0.0, 0.0, 3.0], [0.0, 0.0, 0.0]];
    let cell = arena.add_cell_by_faces(&loops, 1e-6).unwrap();
    let complex = arena.add_cell_complex(&[cell]).unwrap();
    let options = AssemblyOptions {
        glazing_ratio: Some(0.4),
        ..Default::default()
    };

    let assembly = assemble(&arena, complex, &[], &[0.0, 3.0], &options, Model::standard_template())
        .unwrap();
    let model = &assembly.model;

    let (front, _) = model
        .surfaces()
        .find(|(_, s)| s.vertices.len() == 5 && s.surface_type == SurfaceType::Wall)
        .unwrap();
    let front_glazing: f64 = model
        .sub_surfaces()
        .filter(|(_, s)| s.surface == front)
        .map(|(_, s)| s.gross_area())
        .sum();
    assert_relative_eq!(front_glazing, 0.4 * 12.0 * 0.999, epsilon = 1e-9);

    let glazed: f64 = model.sub_surfaces().map(|(_, s)| s.gross_area()).sum();
    assert_relative_eq!(glazed, 0.4 * 0.999 * (12.0 + 15.0 + 12.0 + 15.0), epsilon = 1e-9);
    assert!(model.sub_surfaces().all(|(_, s)| s.gross_area() > 1e-6));
}

#[test]
fn coarse_matching_tolerance_still_orients_slabs() {
    let mut arena = TopologyArena::new();
    let mut loops = box_faces([0.0, 0.0, 0.0], [4.0, 4.0, 3.0]);
    loops[1].reverse();
    let cell = arena.add_cell_by_faces(&loops, 1e-6).unwrap();
    let complex = arena.add_cell_complex(&[cell]).unwrap();
    let options = AssemblyOptions {
        tolerance: 0.01,
        ..Default::default()
    };

    let assembly = assemble(&arena, complex, &[], &[0.0, 3.0], &options, Model::standard_template())
        .unwrap();
    let model = &assembly.model;

    assert_eq!(count(model, SurfaceType::RoofCeiling, BoundaryCondition::Outdoors), 1);
    assert_eq!(count(model, SurfaceType::Floor, BoundaryCondition::Ground), 1);
    let (_, roof) = model
        .surfaces()
        .find(|(_, s)| s.surface_type == SurfaceType::RoofCeiling)
        .unwrap();
    assert!(roof.outward_normal().unwrap().z > 0.99);
}

#[test]
fn basement_is_ground_coupled_and_unglazed() {
    let (arena, complex) = single_box([0.0, 0.0, -3.0], [4.0, 4.0, 0.0]);
    let options = AssemblyOptions {
        glazing_ratio: Some(0.4),
        ..Default::default()
    };

    let assembly = assemble(&arena, complex, &[], &[-3.0, 0.0], &options, Model::standard_template())
        .unwrap();
    let model = &assembly.model;

    assert_eq!(count(model, SurfaceType::Wall, BoundaryCondition::Ground), 4);
    assert_eq!(count(model, SurfaceType::RoofCeiling, BoundaryCondition::Ground), 1);
    assert_eq!(count(model, SurfaceType::Floor, BoundaryCondition::Ground), 1);
    assert!(model.surfaces().all(|(_, s)| s.sun_exposure == SunExposure::NoSun));
    assert_eq!(model.sub_surfaces().count(), 0);
}

#[test]
fn storey_above_basement_is_glazed() {
    let mut arena = TopologyArena::new();
    let complex = arena
        .make_stacked_boxes([0.0, 0.0], [4.0, 4.0], &[-3.0, 0.0, 3.0], 1e-6)
        .unwrap();
    let options = AssemblyOptions {
        glazing_ratio: Some(0.4),
        ..Default::default()
    };

    let assembly = assemble(&arena, complex, &[], &[-3.0, 0.0, 3.0], &options, Model::standard_template())
        .unwrap();
    let model = &assembly.model;

    assert_eq!(count(model, SurfaceType::Wall, BoundaryCondition::Ground), 4);
    assert_eq!(count(model, SurfaceType::Wall, BoundaryCondition::Outdoors), 4);
    assert_eq!(count(model, SurfaceType::RoofCeiling, BoundaryCondition::Outdoors), 1);
    assert_eq!(count(model, SurfaceType::RoofCeiling, BoundaryCondition::Surface), 1);
    assert_eq!(count(model, SurfaceType::Floor, BoundaryCondition::Surface), 1);
    assert_eq!(count(model, SurfaceType::Floor, BoundaryCondition::Ground), 1);

    assert_eq!(model.sub_surfaces().count(), 8);
    for (_, sub) in model.sub_surfaces() {
        let host = model.surface(sub.surface).unwrap();
        assert_eq!(host.boundary, BoundaryCondition::Outdoors);
        assert!(host.vertices.iter().all(|v| v.z >= 0.0));
    }
}

#[test]
fn hosted_apertures_become_windows() {
    let mut arena = TopologyArena::new();
    let (cell, _, faces) = arena.make_box([0.0, 0.0, 0.0], [4.0, 5.0, 3.0]).unwrap();
    let front = faces[2];
    let window = arena
        .add_face_by_coords(&[[1.0, 0.0, 1.0], [2.0, 0.0, 1.0], [2.0, 0.0, 2.0], [1.0, 0.0, 2.0]])
        .unwrap();
    let sliver = arena
        .add_face_by_coords(&[[3.0, 0.0, 1.0], [3.2, 0.0, 1.0], [3.2, 0.0, 1.2], [3.0, 0.0, 1.2]])
        .unwrap();
    arena.add_aperture(front, window.into()).unwrap();
    arena.add_aperture(front, sliver.into()).unwrap();
    let complex = arena.add_cell_complex(&[cell]).unwrap();

    let assembly = assemble(
        &arena,
        complex,
        &[],
        &[0.0, 3.0],
        &AssemblyOptions::default(),
        Model::standard_template(),
    )
    .unwrap();
    let model = &assembly.model;

    assert_eq!(assembly.report.total, 1);
    assert_eq!(assembly.report.applied, 1);
    let (_, sub) = model.sub_surfaces().next().unwrap();
    assert_relative_eq!(sub.gross_area(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(model.net_area(sub.surface).unwrap(), 11.0, epsilon = 1e-9);
    assert!(model.validate().is_ok());
}

#[test]
fn shading_faces_become_one_group() {
    let (mut arena, complex) = single_box([0.0, 0.0, 0.0], [4.0, 4.0, 3.0]);
    let overhang = arena
        .add_face_by_coords(&[[0.0, -1.0, 3.0], [4.0, -1.0, 3.0], [4.0, 0.0, 3.0], [0.0, 0.0, 3.0]])
        .unwrap();

    let assembly = assemble(
        &arena,
        complex,
        &[overhang],
        &[0.0, 3.0],
        &AssemblyOptions::default(),
        Model::standard_template(),
    )
    .unwrap();
    let model = &assembly.model;

    let (_, group) = model.shading_groups().next().unwrap();
    assert_eq!(group.name, "SHADINGSURFACE_GROUP");
    assert_eq!(group.surfaces.len(), 1);
    let (_, shade) = model.shading_surfaces().next().unwrap();
    assert_eq!(shade.name, "SHADINGSURFACE_1");
    assert_eq!(shade.vertices.len(), 4);
}

#[test]
fn cell_outside_levels_lands_on_first_story() {
    let (arena, complex) = single_box([0.0, 0.0, 10.0], [2.0, 2.0, 13.0]);
    let assembly = assemble(
        &arena,
        complex,
        &[],
        &[0.0, 3.0, 6.0],
        &AssemblyOptions::default(),
        Model::standard_template(),
    )
    .unwrap();

    let space = assembly.model.space(assembly.spaces[0]).unwrap();
    assert_eq!(space.name, "STORY_1_SPACE_1");
}

#[test]
fn empty_template_leaves_resources_unset() {
    let (arena, complex) = single_box([0.0, 0.0, 0.0], [2.0, 2.0, 3.0]);
    let assembly = assemble(
        &arena,
        complex,
        &[],
        &[0.0, 3.0],
        &AssemblyOptions::default(),
        Model::new(),
    )
    .unwrap();
    let model = &assembly.model;

    assert!(model.building.space_type.is_none());
    assert!(model.surfaces().all(|(_, s)| s.construction.is_none()));
    let report = model.validate();
    assert!(report.is_ok());
    assert!(!report.warnings.is_empty());
}

#[test]
fn bad_floor_levels_are_rejected() {
    let (arena, complex) = single_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    for levels in [vec![0.0], vec![3.0, 0.0], vec![0.0, f64::NAN]] {
        let err = assemble(
            &arena,
            complex,
            &[],
            &levels,
            &AssemblyOptions::default(),
            Model::standard_template(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "{levels:?}: {err}");
    }
}

#[test]
fn complex_from_another_arena_is_a_geometry_error() {
    let (_, complex) = single_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    let err = assemble(
        &TopologyArena::new(),
        complex,
        &[],
        &[0.0, 1.0],
        &AssemblyOptions::default(),
        Model::standard_template(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Geometry(_)));
}
