// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face classification: the role of a face as seen from one cell it bounds,
//! and the winding its surface must take.
//!
//! The normal of the first triangle decides. A face within 5° of `up` or of
//! `-up` is horizontal; for those the centroid of that triangle is pushed
//! 0.001 along the normal and tested against the cell. Landing strictly
//! inside means the loop faces into the cell, so it is reversed before the
//! face is called a roof/ceiling or a floor. Everything else is a wall and
//! keeps its loop.
//!
//! A face shared by two cells is classified once per cell and can come out
//! oppositely wound for each.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use topenergy_model::SurfaceType;
use topenergy_topology::{CellKey, FaceKey, TopologyArena};

use crate::error::{Error, Result};
use crate::polygon::triangle_normal;

/// Faces closer than this to `up` or `-up`, in degrees, are horizontal.
pub const HORIZONTAL_THRESHOLD_DEG: f64 = 5.0;
/// Distance the containment probe is pushed along the normal.
pub const PROBE_OFFSET: f64 = 0.001;
/// Boundary band of the containment probe. Must stay below [`PROBE_OFFSET`].
pub const PROBE_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceType {
    Wall,
    Floor,
    RoofCeiling,
}

impl From<FaceType> for SurfaceType {
    fn from(face_type: FaceType) -> Self {
        match face_type {
            FaceType::Wall => SurfaceType::Wall,
            FaceType::Floor => SurfaceType::Floor,
            FaceType::RoofCeiling => SurfaceType::RoofCeiling,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Classification {
    pub face_type: FaceType,
    /// Outer loop, wound to face out of the cell.
    pub vertices: Vec<Point3<f64>>,
    /// Unit normal of the first triangle after any reversal.
    pub normal: Vector3<f64>,
    /// `true` when the containment probe reversed the loop.
    pub reversed: bool,
}

/// Classifies `face` relative to `cell`.
///
/// The loop is read as the cell's shell orients it, so a partition shared
/// with an earlier cell starts out facing away from this one.
pub fn classify(
    arena: &TopologyArena,
    face: FaceKey,
    cell: CellKey,
    up: &Vector3<f64>,
) -> Result<Classification> {
    let up = up
        .try_normalize(1e-12)
        .ok_or_else(|| Error::InvalidInput("up axis has zero length".into()))?;

    let triangles = arena.triangulate_face(face)?;
    let Some(&(a, b, c)) = triangles.first() else {
        return Err(Error::Geometry(format!("{face:?} triangulates to nothing")));
    };
    let point = |k| {
        arena
            .vertex_point(k)
            .ok_or_else(|| Error::Geometry(format!("missing vertex {k:?}")))
    };
    let (pa, mut pb, mut pc) = (point(a)?, point(b)?, point(c)?);

    let mut vertices = arena
        .face_outer_points(face)
        .ok_or_else(|| Error::Geometry(format!("{face:?} has no outer loop")))?;
    let seen_from_neighbour = arena
        .face_reversed_in_cell(cell, face)
        .ok_or_else(|| Error::Geometry(format!("{face:?} does not bound {cell:?}")))?;
    if seen_from_neighbour {
        vertices.reverse();
        std::mem::swap(&mut pb, &mut pc);
    }

    let mut normal = triangle_normal(&pa, &pb, &pc)
        .ok_or_else(|| Error::Geometry(format!("{face:?} has a degenerate first triangle")))?;
    let mut angle = normal.angle(&up).to_degrees();
    let horizontal = 180.0 - HORIZONTAL_THRESHOLD_DEG;

    if angle >= HORIZONTAL_THRESHOLD_DEG && angle <= horizontal {
        return Ok(Classification {
            face_type: FaceType::Wall,
            vertices,
            normal,
            reversed: false,
        });
    }

    let centroid = Point3::from((pa.coords + pb.coords + pc.coords) / 3.0);
    let probe = centroid + normal * PROBE_OFFSET;
    let inside = arena
        .cell_contains_exclusive(cell, &probe, PROBE_TOLERANCE)
        .ok_or_else(|| Error::Geometry(format!("{cell:?} cannot be probed")))?;
    if inside {
        vertices.reverse();
        normal = -normal;
        angle = normal.angle(&up).to_degrees();
    }

    let face_type = if angle < HORIZONTAL_THRESHOLD_DEG {
        FaceType::RoofCeiling
    } else {
        FaceType::Floor
    };
    tracing::trace!(?face, ?cell, ?face_type, reversed = inside, "classified face");

    Ok(Classification {
        face_type,
        vertices,
        normal,
        reversed: inside,
    })
}
