// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-place transforms.
//!
//! Only vertex positions change. Everything above a vertex refers to it by
//! key, so moving the vertices of a cell moves its faces, shells and the cell
//! itself. Vertices shared with neighbouring entities move too.

use nalgebra::{Matrix3, Point3, Rotation3, Unit, Vector3};
use rustc_hash::FxHashSet;

use crate::arena::TopologyArena;
use crate::keys::*;

impl TopologyArena {
    pub fn translate(&mut self, key: TopologyKey, dx: f64, dy: f64, dz: f64) {
        let offset = Vector3::new(dx, dy, dz);
        self.map_vertices(key, |p| p + offset);
    }

    /// Rotates by `angle` radians about the line through `origin` along
    /// `axis`. A zero axis leaves the entity untouched.
    pub fn rotate(&mut self, key: TopologyKey, origin: &Point3<f64>, axis: &Vector3<f64>, angle: f64) {
        let Some(axis) = Unit::try_new(*axis, 1e-15) else {
            return;
        };
        let rotation = Rotation3::from_axis_angle(&axis, angle);
        let origin = *origin;
        self.map_vertices(key, |p| origin + rotation * (p - origin));
    }

    /// Uniform scale about `origin`.
    pub fn scale(&mut self, key: TopologyKey, origin: &Point3<f64>, factor: f64) {
        let origin = *origin;
        self.map_vertices(key, |p| origin + (p - origin) * factor);
    }

    /// Applies `p' = matrix * p + translation`.
    pub fn transform_affine(
        &mut self,
        key: TopologyKey,
        matrix: &Matrix3<f64>,
        translation: &Vector3<f64>,
    ) {
        let (matrix, translation) = (*matrix, *translation);
        self.map_vertices(key, |p| Point3::from(matrix * p.coords + translation));
    }

    fn map_vertices(&mut self, key: TopologyKey, f: impl Fn(Point3<f64>) -> Point3<f64>) {
        for vk in self.reachable_vertices(key) {
            if let Some(v) = self.vertices.get_mut(vk) {
                let moved = f(Point3::new(v.x, v.y, v.z));
                v.x = moved.x;
                v.y = moved.y;
                v.z = moved.z;
            }
        }
    }

    /// Distinct vertices below `key`, holes included.
    fn reachable_vertices(&self, key: TopologyKey) -> Vec<VertexKey> {
        let faces: Vec<FaceKey> = match key {
            TopologyKey::Vertex(vk) => return vec![vk],
            TopologyKey::Edge(ek) => {
                return self
                    .edge_vertices(ek)
                    .map(|(a, b)| if a == b { vec![a] } else { vec![a, b] })
                    .unwrap_or_default();
            }
            TopologyKey::Wire(wk) => return self.wire_vertices_ordered(wk).unwrap_or_default(),
            TopologyKey::Face(fk) => vec![fk],
            TopologyKey::Shell(sk) => self.shell_faces(sk).map(<[_]>::to_vec).unwrap_or_default(),
            TopologyKey::Cell(ck) => self.cell_faces(ck),
            TopologyKey::CellComplex(cc) => self.complex_faces(cc),
        };

        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for fk in faces {
            let Some(face) = self.faces.get(fk) else {
                continue;
            };
            for &wire in std::iter::once(&face.outer_wire).chain(&face.inner_wires) {
                for vk in self.wire_vertices_ordered(wire).unwrap_or_default() {
                    if seen.insert(vk) {
                        out.push(vk);
                    }
                }
            }
        }
        out
    }
}
