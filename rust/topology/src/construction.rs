// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key-level construction of topology entities.
//!
//! Every constructor checks that the referenced children exist and registers
//! the upward links. Coordinate-level builders with vertex sewing live in
//! [`crate::builders`].

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

impl TopologyArena {
    /// Creates an edge between two existing vertices.
    pub fn add_edge(&mut self, start: VertexKey, end: VertexKey) -> Result<EdgeKey> {
        for v in [start, end] {
            if !self.vertices.contains_key(v) {
                return Err(Error::VertexNotFound(v));
            }
        }

        let key = self.edges.insert(EdgeData { start, end });
        self.link_vertex_edge(start, key);
        self.link_vertex_edge(end, key);
        Ok(key)
    }

    /// Creates a wire from a chain of edges.
    ///
    /// Edges may be stored in either direction; the walking direction of each
    /// one is inferred from the vertex it shares with its predecessor.
    pub fn add_wire(&mut self, edge_keys: &[EdgeKey]) -> Result<WireKey> {
        if edge_keys.is_empty() {
            return Err(Error::EmptyWire);
        }

        let mut endpoints = Vec::with_capacity(edge_keys.len());
        for &ek in edge_keys {
            let edge = self.edges.get(ek).ok_or(Error::EdgeNotFound(ek))?;
            endpoints.push((edge.start, edge.end));
        }

        let orientations = chain_orientations(&endpoints)?;
        let key = self.wires.insert(WireData {
            edges: edge_keys.to_vec(),
            orientations,
        });

        for &ek in edge_keys {
            self.link_edge_wire(ek, key);
        }

        Ok(key)
    }

    /// Creates a face bounded by `outer_wire`.
    pub fn add_face(&mut self, outer_wire: WireKey) -> Result<FaceKey> {
        self.add_face_with_holes(outer_wire, &[])
    }

    /// Creates a face with inner boundary wires.
    pub fn add_face_with_holes(
        &mut self,
        outer_wire: WireKey,
        inner_wires: &[WireKey],
    ) -> Result<FaceKey> {
        let outer = self
            .wires
            .get(outer_wire)
            .ok_or(Error::WireNotFound(outer_wire))?;
        if outer.edges.len() < 3 {
            return Err(Error::DegenerateFace);
        }
        if let Some(&missing) = inner_wires.iter().find(|w| !self.wires.contains_key(**w)) {
            return Err(Error::WireNotFound(missing));
        }

        let key = self.faces.insert(FaceData {
            outer_wire,
            inner_wires: inner_wires.to_vec(),
        });

        self.link_wire_face(outer_wire, key);
        for &iw in inner_wires {
            self.link_wire_face(iw, key);
        }

        Ok(key)
    }

    /// Creates a shell from faces, keeping their order.
    pub fn add_shell(&mut self, face_keys: &[FaceKey]) -> Result<ShellKey> {
        if face_keys.is_empty() {
            return Err(Error::EmptyShell);
        }
        if let Some(&missing) = face_keys.iter().find(|f| !self.faces.contains_key(**f)) {
            return Err(Error::FaceNotFound(missing));
        }

        let key = self.shells.insert(ShellData {
            faces: face_keys.to_vec(),
        });

        for &fk in face_keys {
            self.link_face_shell(fk, key);
        }

        Ok(key)
    }

    /// Creates a cell bounded by `outer_shell`.
    ///
    /// Closure is not checked here; [`TopologyArena::add_cell_by_faces`]
    /// validates it.
    pub fn add_cell(&mut self, outer_shell: ShellKey) -> Result<CellKey> {
        if !self.shells.contains_key(outer_shell) {
            return Err(Error::ShellNotFound(outer_shell));
        }

        let key = self.cells.insert(CellData { outer_shell });
        self.link_shell_cell(outer_shell, key);
        Ok(key)
    }

    /// Groups existing cells into a complex.
    pub fn add_cell_complex(&mut self, cell_keys: &[CellKey]) -> Result<CellComplexKey> {
        if cell_keys.is_empty() {
            return Err(Error::EmptyCellComplex);
        }
        if let Some(&missing) = cell_keys.iter().find(|c| !self.cells.contains_key(**c)) {
            return Err(Error::CellNotFound(missing));
        }

        let key = self.cell_complexes.insert(CellComplexData {
            cells: cell_keys.to_vec(),
        });

        for &ck in cell_keys {
            self.link_cell_complex(ck, key);
        }

        Ok(key)
    }
}

/// Infers the walking direction of each edge in a chain.
///
/// The first edge is flipped if its start, not its end, touches the second
/// edge. Each following edge must start or end where the previous one ended.
fn chain_orientations(endpoints: &[(VertexKey, VertexKey)]) -> Result<Vec<bool>> {
    let mut orientations = Vec::with_capacity(endpoints.len());

    let first_forward = match endpoints {
        [(_, first_end), (next_start, next_end), ..] => {
            let (first_start, _) = endpoints[0];
            if *first_end == *next_start || *first_end == *next_end {
                true
            } else if first_start == *next_start || first_start == *next_end {
                false
            } else {
                return Err(Error::DisconnectedWire(0, 1));
            }
        }
        _ => true,
    };
    orientations.push(first_forward);

    let mut tail = if first_forward {
        endpoints[0].1
    } else {
        endpoints[0].0
    };

    for (i, &(start, end)) in endpoints.iter().enumerate().skip(1) {
        if tail == start {
            orientations.push(true);
            tail = end;
        } else if tail == end {
            orientations.push(false);
            tail = start;
        } else {
            return Err(Error::DisconnectedWire(i - 1, i));
        }
    }

    Ok(orientations)
}

/// Builds a quadrilateral face from four vertices in winding order.
pub fn make_quad(
    arena: &mut TopologyArena,
    corners: [VertexKey; 4],
) -> Result<(FaceKey, WireKey)> {
    let mut edges = [EdgeKey::default(); 4];
    for i in 0..4 {
        edges[i] = arena.add_edge(corners[i], corners[(i + 1) % 4])?;
    }
    let wire = arena.add_wire(&edges)?;
    let face = arena.add_face(wire)?;
    Ok((face, wire))
}
