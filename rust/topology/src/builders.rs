// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate-level builders.
//!
//! Faces given as coordinate loops are sewn: positions closer than the
//! tolerance become one vertex, and two loops that walk the same vertex pair
//! share one edge. When several cells are built together, a loop whose edge
//! set matches an earlier one reuses that face, which is how a partition
//! between two rooms ends up bounding both.

use rustc_hash::FxHashMap;

use crate::arena::TopologyArena;
use crate::error::{Error, Result};
use crate::keys::*;
use crate::spatial::VertexGrid;

/// Shared state of one sewing pass.
struct Sewing {
    grid: VertexGrid,
    tolerance: f64,
    edges: FxHashMap<(VertexKey, VertexKey), EdgeKey>,
    faces: FxHashMap<Vec<EdgeKey>, FaceKey>,
}

impl Sewing {
    fn new(tolerance: f64) -> Self {
        Self {
            grid: VertexGrid::new(tolerance),
            tolerance,
            edges: FxHashMap::default(),
            faces: FxHashMap::default(),
        }
    }

    /// Welds the loop into edges, skipping zero-length segments.
    fn loop_edges(&mut self, arena: &mut TopologyArena, coords: &[[f64; 3]]) -> Result<Vec<EdgeKey>> {
        if coords.len() < 3 {
            return Err(Error::DegenerateFace);
        }

        let vertices: Vec<VertexKey> = coords
            .iter()
            .map(|&p| arena.weld_vertex(&mut self.grid, p, self.tolerance))
            .collect();

        let mut edges = Vec::with_capacity(vertices.len());
        for (i, &start) in vertices.iter().enumerate() {
            let end = vertices[(i + 1) % vertices.len()];
            if start == end {
                continue;
            }
            let undirected = if start < end { (start, end) } else { (end, start) };
            let edge = match self.edges.get(&undirected) {
                Some(&existing) => existing,
                None => {
                    let created = arena.add_edge(start, end)?;
                    self.edges.insert(undirected, created);
                    created
                }
            };
            edges.push(edge);
        }

        if edges.len() < 3 {
            return Err(Error::DegenerateFace);
        }
        Ok(edges)
    }

    fn face(&mut self, arena: &mut TopologyArena, coords: &[[f64; 3]], share: bool) -> Result<FaceKey> {
        let edges = self.loop_edges(arena, coords)?;

        let mut signature = edges.clone();
        signature.sort();
        if share {
            if let Some(&existing) = self.faces.get(&signature) {
                return Ok(existing);
            }
        }

        let wire = arena.add_wire(&edges)?;
        let face = arena.add_face(wire)?;
        self.faces.insert(signature, face);
        Ok(face)
    }
}

impl TopologyArena {
    /// Creates a closed wire through `vertices`, one new edge per side.
    pub fn add_wire_by_vertices(&mut self, vertices: &[VertexKey]) -> Result<WireKey> {
        let mut edges = Vec::with_capacity(vertices.len());
        for (i, &start) in vertices.iter().enumerate() {
            let end = vertices[(i + 1) % vertices.len()];
            if start != end {
                edges.push(self.add_edge(start, end)?);
            }
        }
        self.add_wire(&edges)
    }

    pub fn add_face_by_vertices(&mut self, vertices: &[VertexKey]) -> Result<FaceKey> {
        if vertices.len() < 3 {
            return Err(Error::DegenerateFace);
        }
        let wire = self.add_wire_by_vertices(vertices)?;
        self.add_face(wire)
    }

    /// Creates a free-standing face with fresh vertices.
    pub fn add_face_by_coords(&mut self, coords: &[[f64; 3]]) -> Result<FaceKey> {
        if coords.len() < 3 {
            return Err(Error::DegenerateFace);
        }
        let vertices: Vec<VertexKey> = coords
            .iter()
            .map(|c| self.add_vertex(c[0], c[1], c[2]))
            .collect();
        self.add_face_by_vertices(&vertices)
    }

    /// Sews coordinate loops into one shell, keeping the input order.
    pub fn sew_faces(
        &mut self,
        face_coords: &[Vec<[f64; 3]>],
        tolerance: f64,
    ) -> Result<(ShellKey, Vec<FaceKey>)> {
        if face_coords.is_empty() {
            return Err(Error::EmptyShell);
        }

        let mut sewing = Sewing::new(tolerance);
        let faces = face_coords
            .iter()
            .map(|coords| sewing.face(self, coords, false))
            .collect::<Result<Vec<_>>>()?;

        let shell = self.add_shell(&faces)?;
        Ok((shell, faces))
    }

    /// Builds a closed cell from coordinate loops.
    ///
    /// Fails with [`Error::OpenShell`] unless every edge of the sewn shell is
    /// used by exactly two faces.
    pub fn add_cell_by_faces(
        &mut self,
        face_coords: &[Vec<[f64; 3]>],
        tolerance: f64,
    ) -> Result<CellKey> {
        let (shell, _) = self.sew_faces(face_coords, tolerance)?;
        self.closed_cell(shell)
    }

    /// Builds a cell complex from one group of coordinate loops per cell.
    ///
    /// Loops are sewn across all groups. A face appearing in two groups is
    /// stored once and bounds both cells; a face appearing in three or more
    /// fails with [`Error::NonManifoldFace`]. Each cell keeps its faces in
    /// input order.
    pub fn add_cell_complex_by_cells(
        &mut self,
        cell_face_coords: &[Vec<Vec<[f64; 3]>>],
        tolerance: f64,
    ) -> Result<CellComplexKey> {
        if cell_face_coords.is_empty() {
            return Err(Error::EmptyCellComplex);
        }

        let mut sewing = Sewing::new(tolerance);
        let mut usage: FxHashMap<FaceKey, usize> = FxHashMap::default();
        let mut cells = Vec::with_capacity(cell_face_coords.len());

        for group in cell_face_coords {
            let mut faces = Vec::with_capacity(group.len());
            for coords in group {
                let face = sewing.face(self, coords, true)?;
                let count = usage.entry(face).or_insert(0);
                *count += 1;
                if *count > 2 {
                    return Err(Error::NonManifoldFace(*count));
                }
                faces.push(face);
            }

            let shell = self.add_shell(&faces)?;
            cells.push(self.closed_cell(shell)?);
        }

        self.add_cell_complex(&cells)
    }

    fn closed_cell(&mut self, shell: ShellKey) -> Result<CellKey> {
        let open = self.shell_boundary_edge_count(shell);
        if open > 0 {
            return Err(Error::OpenShell(open));
        }
        self.add_cell(shell)
    }

    /// Creates an axis-aligned box cell.
    ///
    /// Faces are returned as bottom, top, front (-y), back (+y), left (-x),
    /// right (+x), each wound with its normal pointing out of the box.
    pub fn make_box(
        &mut self,
        min: [f64; 3],
        max: [f64; 3],
    ) -> Result<(CellKey, ShellKey, [FaceKey; 6])> {
        let (shell, faces) = self.sew_faces(&box_faces(min, max), 1e-10)?;
        let cell = self.add_cell(shell)?;
        let faces: [FaceKey; 6] = faces
            .try_into()
            .map_err(|_| Error::DegenerateFace)?;
        Ok((cell, shell, faces))
    }

    /// Two boxes in one complex; a common side becomes a shared face.
    pub fn make_adjacent_boxes(
        &mut self,
        first: ([f64; 3], [f64; 3]),
        second: ([f64; 3], [f64; 3]),
        tolerance: f64,
    ) -> Result<CellComplexKey> {
        self.add_cell_complex_by_cells(
            &[box_faces(first.0, first.1), box_faces(second.0, second.1)],
            tolerance,
        )
    }

    /// A stack of boxes over one footprint, one per interval of `levels`.
    ///
    /// `levels` must be increasing; `n` levels give `n - 1` cells, bottom up.
    pub fn make_stacked_boxes(
        &mut self,
        footprint_min: [f64; 2],
        footprint_max: [f64; 2],
        levels: &[f64],
        tolerance: f64,
    ) -> Result<CellComplexKey> {
        let [x0, y0] = footprint_min;
        let [x1, y1] = footprint_max;
        let groups: Vec<_> = levels
            .windows(2)
            .map(|w| box_faces([x0, y0, w[0]], [x1, y1, w[1]]))
            .collect();
        self.add_cell_complex_by_cells(&groups, tolerance)
    }
}

/// Outward-wound face loops of an axis-aligned box, in [`TopologyArena::make_box`] order.
pub fn box_faces(min: [f64; 3], max: [f64; 3]) -> Vec<Vec<[f64; 3]>> {
    let [x0, y0, z0] = min;
    let [x1, y1, z1] = max;
    vec![
        vec![[x0, y0, z0], [x0, y1, z0], [x1, y1, z0], [x1, y0, z0]],
        vec![[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]],
        vec![[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]],
        vec![[x0, y1, z0], [x0, y1, z1], [x1, y1, z1], [x1, y1, z0]],
        vec![[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]],
        vec![[x1, y0, z0], [x1, y1, z0], [x1, y1, z1], [x1, y0, z1]],
    ]
}
