// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rebuilding topology from a simulation model.
//!
//! Each space is sewn into a closed cell in its own frame and moved into
//! building coordinates with the space's transformation. Sub-surfaces come
//! back as apertures of the face built from their host surface, shading
//! surfaces as free faces. Several spaces are merged into one cell complex
//! so that matching walls collapse into shared faces.

use nalgebra::Point3;
use topenergy_model::{Model, PlanarSurface, SpaceKey};
use topenergy_topology::{CellComplexKey, CellKey, FaceKey, TopologyArena};

use crate::assembly::NAME_ATTRIBUTE;
use crate::error::{Error, Result};

type Loop = Vec<[f64; 3]>;

#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub arena: TopologyArena,
    /// One cell per space, in model order.
    pub cells: Vec<CellKey>,
    /// Set when more than one cell was merged.
    pub complex: Option<CellComplexKey>,
    pub shading: Vec<FaceKey>,
}

/// One space in building coordinates.
struct SpaceLoops {
    name: String,
    faces: Vec<Loop>,
    /// Sub-surface loops per face.
    openings: Vec<Vec<Loop>>,
}

fn coords(points: &[Point3<f64>]) -> Loop {
    points.iter().map(|p| [p.x, p.y, p.z]).collect()
}

fn space_loops(model: &Model, space: SpaceKey, tolerance: f64) -> Result<SpaceLoops> {
    let s = model
        .space(space)
        .ok_or_else(|| Error::ExternalLibrary("space missing from the model".into()))?;
    let t = s.transformation;

    let mut local = Vec::with_capacity(s.surfaces.len());
    let mut openings = Vec::with_capacity(s.surfaces.len());
    for &key in &s.surfaces {
        let surface = model
            .surface(key)
            .ok_or_else(|| Error::ExternalLibrary(format!("space '{}' lists a missing surface", s.name)))?;
        if surface.vertices().len() < 3 {
            return Err(Error::Geometry(format!(
                "surface '{}' has {} vertices",
                surface.name,
                surface.vertices().len()
            )));
        }
        local.push(coords(&surface.vertices));

        let subs = surface
            .sub_surfaces
            .iter()
            .filter_map(|&k| model.sub_surface_world_vertices(k))
            .map(|world| coords(&world))
            .collect();
        openings.push(subs);
    }

    let mut scratch = TopologyArena::new();
    let cell = scratch
        .add_cell_by_faces(&local, tolerance)
        .map_err(|e| Error::Geometry(format!("space '{}' is not a closed solid: {e}", s.name)))?;
    if !t.is_identity() {
        scratch.transform_affine(cell.into(), &t.rotation, &t.translation);
    }
    let faces = scratch
        .cell_faces(cell)
        .into_iter()
        .map(|f| scratch.face_outer_points(f).map(|p| coords(&p)))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| Error::Geometry(format!("space '{}' lost a face", s.name)))?;

    Ok(SpaceLoops {
        name: s.name.clone(),
        faces,
        openings,
    })
}

/// Rebuilds the cells, apertures and shading faces of `model`.
pub fn reconstruct(model: &Model, tolerance: f64) -> Result<Reconstruction> {
    if !(tolerance > 0.0) {
        return Err(Error::InvalidInput(format!(
            "tolerance must be positive, got {tolerance}"
        )));
    }

    let spaces = model
        .spaces()
        .map(|(key, _)| space_loops(model, key, tolerance))
        .collect::<Result<Vec<_>>>()?;
    if spaces.is_empty() {
        return Err(Error::InvalidInput("model has no spaces".into()));
    }

    let mut arena = TopologyArena::new();
    let (cells, complex) = if let [only] = spaces.as_slice() {
        let cell = arena
            .add_cell_by_faces(&only.faces, tolerance)
            .map_err(|e| Error::Geometry(format!("space '{}': {e}", only.name)))?;
        (vec![cell], None)
    } else {
        let groups: Vec<Vec<Loop>> = spaces.iter().map(|s| s.faces.clone()).collect();
        let complex = arena
            .add_cell_complex_by_cells(&groups, tolerance)
            .map_err(|e| Error::Geometry(format!("spaces do not form a cell complex: {e}")))?;
        (arena.complex_cells(complex), Some(complex))
    };

    let mut applied = 0;
    for (space, &cell) in spaces.iter().zip(&cells) {
        arena.set_attribute(cell.into(), NAME_ATTRIBUTE, space.name.as_str());
        let faces = arena.cell_faces(cell);
        for (host, subs) in faces.iter().zip(&space.openings) {
            for sub in subs {
                let opening = arena.add_face_by_coords(sub)?;
                arena.add_aperture(*host, opening.into())?;
                applied += 1;
            }
        }
    }

    let shading = model
        .shading_surfaces()
        .map(|(_, s)| {
            arena
                .add_face_by_coords(&coords(&s.vertices))
                .map_err(|e| Error::Geometry(format!("shading surface '{}': {e}", s.name)))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        cells = cells.len(),
        apertures = applied,
        shading = shading.len(),
        "reconstructed topology"
    );
    Ok(Reconstruction {
        arena,
        cells,
        complex,
        shading,
    })
}
