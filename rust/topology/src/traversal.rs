// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Downward and upward navigation of the topology hierarchy.
//!
//! Downward queries keep storage order: a cell's faces come back in the order
//! its shell was built with, which is the order surfaces are named in.
//! Upward queries read the adjacency maps and return keys sorted, so results
//! do not depend on hash iteration order.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::TopologyArena;
use crate::keys::*;

fn sorted<K: Copy + Ord>(set: Option<&FxHashSet<K>>) -> Vec<K> {
    let mut keys: Vec<K> = set.map(|s| s.iter().copied().collect()).unwrap_or_default();
    keys.sort();
    keys
}

/// Appends keys not yet seen, keeping first-seen order.
fn push_unique<K: Copy + Eq + std::hash::Hash>(
    out: &mut Vec<K>,
    seen: &mut FxHashSet<K>,
    keys: impl IntoIterator<Item = K>,
) {
    for k in keys {
        if seen.insert(k) {
            out.push(k);
        }
    }
}

impl TopologyArena {
    pub fn edge_vertices(&self, key: EdgeKey) -> Option<(VertexKey, VertexKey)> {
        self.edges.get(key).map(|e| (e.start, e.end))
    }

    /// Vertices of a wire in walking order, each edge contributing its
    /// leading vertex.
    pub fn wire_vertices_ordered(&self, key: WireKey) -> Option<Vec<VertexKey>> {
        let wire = self.wires.get(key)?;
        wire.edges
            .iter()
            .zip(&wire.orientations)
            .map(|(&ek, &forward)| {
                let edge = self.edges.get(ek)?;
                Some(if forward { edge.start } else { edge.end })
            })
            .collect()
    }

    /// `true` when the last edge ends where the first one starts.
    pub fn wire_is_closed(&self, key: WireKey) -> bool {
        let Some(wire) = self.wires.get(key) else {
            return false;
        };
        let (Some(&first), Some(&last)) = (wire.edges.first(), wire.edges.last()) else {
            return false;
        };
        let (Some(first_edge), Some(last_edge)) = (self.edges.get(first), self.edges.get(last))
        else {
            return false;
        };

        let head = if wire.orientations[0] {
            first_edge.start
        } else {
            first_edge.end
        };
        let tail = if wire.orientations[wire.edges.len() - 1] {
            last_edge.end
        } else {
            last_edge.start
        };
        head == tail
    }

    pub fn face_outer_wire(&self, key: FaceKey) -> Option<WireKey> {
        self.faces.get(key).map(|f| f.outer_wire)
    }

    /// Outer loop vertices of a face, in loop order.
    pub fn face_vertices(&self, key: FaceKey) -> Option<Vec<VertexKey>> {
        self.wire_vertices_ordered(self.faces.get(key)?.outer_wire)
    }

    /// Edges of the outer loop and of every hole.
    pub fn face_edges(&self, key: FaceKey) -> Option<Vec<EdgeKey>> {
        let face = self.faces.get(key)?;
        let mut edges = Vec::new();
        for wire in std::iter::once(&face.outer_wire).chain(&face.inner_wires) {
            edges.extend_from_slice(&self.wires.get(*wire)?.edges);
        }
        Some(edges)
    }

    pub fn shell_faces(&self, key: ShellKey) -> Option<&[FaceKey]> {
        self.shells.get(key).map(|s| s.faces.as_slice())
    }

    pub fn cell_outer_shell(&self, key: CellKey) -> Option<ShellKey> {
        self.cells.get(key).map(|c| c.outer_shell)
    }

    /// Faces of a cell in shell order; empty for an unknown cell.
    pub fn cell_faces(&self, key: CellKey) -> Vec<FaceKey> {
        self.cells
            .get(key)
            .and_then(|c| self.shell_faces(c.outer_shell))
            .map(<[FaceKey]>::to_vec)
            .unwrap_or_default()
    }

    /// Distinct vertices of a cell, in first-seen order.
    pub fn cell_vertices(&self, key: CellKey) -> Option<Vec<VertexKey>> {
        let cell = self.cells.get(key)?;
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        for &fk in self.shell_faces(cell.outer_shell)? {
            push_unique(&mut out, &mut seen, self.face_vertices(fk)?);
        }
        Some(out)
    }

    /// Cells of a complex in insertion order; empty for an unknown complex.
    pub fn complex_cells(&self, key: CellComplexKey) -> Vec<CellKey> {
        self.cell_complexes
            .get(key)
            .map(|cc| cc.cells.clone())
            .unwrap_or_default()
    }

    /// Distinct faces of a complex; a partition is listed once.
    pub fn complex_faces(&self, key: CellComplexKey) -> Vec<FaceKey> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        for ck in self.complex_cells(key) {
            push_unique(&mut out, &mut seen, self.cell_faces(ck));
        }
        out
    }

    pub fn vertex_edges(&self, key: VertexKey) -> Vec<EdgeKey> {
        sorted(self.vertex_to_edges.get(&key))
    }

    pub fn edge_wires(&self, key: EdgeKey) -> Vec<WireKey> {
        sorted(self.edge_to_wires.get(&key))
    }

    pub fn wire_faces(&self, key: WireKey) -> Vec<FaceKey> {
        sorted(self.wire_to_faces.get(&key))
    }

    pub fn face_shells(&self, key: FaceKey) -> Vec<ShellKey> {
        sorted(self.face_to_shells.get(&key))
    }

    pub fn shell_cells(&self, key: ShellKey) -> Vec<CellKey> {
        sorted(self.shell_to_cells.get(&key))
    }

    pub fn cell_complexes_of(&self, key: CellKey) -> Vec<CellComplexKey> {
        sorted(self.cell_to_complexes.get(&key))
    }

    /// Every cell bounded by a face.
    pub fn face_cells(&self, key: FaceKey) -> Vec<CellKey> {
        let mut cells: Vec<CellKey> = self
            .face_shells(key)
            .into_iter()
            .flat_map(|s| self.shell_cells(s))
            .collect();
        cells.sort();
        cells.dedup();
        cells
    }

    /// Number of cells of `complex` that a face bounds: 1 on the envelope,
    /// 2 for a partition between rooms.
    pub fn adjacent_cell_count(&self, face: FaceKey, complex: CellComplexKey) -> usize {
        self.face_cells(face)
            .into_iter()
            .filter(|&c| {
                self.cell_to_complexes
                    .get(&c)
                    .is_some_and(|set| set.contains(&complex))
            })
            .count()
    }

    /// Faces bounding both cells.
    pub fn shared_faces(&self, a: CellKey, b: CellKey) -> Vec<FaceKey> {
        let other: FxHashSet<FaceKey> = self.cell_faces(b).into_iter().collect();
        self.cell_faces(a)
            .into_iter()
            .filter(|f| other.contains(f))
            .collect()
    }

    /// Number of edges of the shell not used by exactly two of its faces.
    pub fn shell_boundary_edge_count(&self, key: ShellKey) -> usize {
        let Some(faces) = self.shell_faces(key) else {
            return 0;
        };
        let mut uses: FxHashMap<EdgeKey, usize> = FxHashMap::default();
        for &fk in faces {
            for ek in self.face_edges(fk).unwrap_or_default() {
                *uses.entry(ek).or_insert(0) += 1;
            }
        }
        uses.values().filter(|&&n| n != 2).count()
    }

    pub fn shell_is_closed(&self, key: ShellKey) -> bool {
        self.shells.contains_key(key) && self.shell_boundary_edge_count(key) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_vertices_follow_walk_direction() {
        let mut arena = TopologyArena::new();
        let a = arena.add_vertex(0.0, 0.0, 0.0);
        let b = arena.add_vertex(1.0, 0.0, 0.0);
        let c = arena.add_vertex(0.0, 1.0, 0.0);
        let ab = arena.add_edge(a, b).unwrap();
        let cb = arena.add_edge(c, b).unwrap();
        let ac = arena.add_edge(a, c).unwrap();
        let wire = arena.add_wire(&[ab, cb, ac]).unwrap();

        assert_eq!(arena.wire_vertices_ordered(wire).unwrap(), vec![a, b, c]);
        assert!(arena.wire_is_closed(wire));
    }

    #[test]
    fn open_chain_is_not_closed() {
        let mut arena = TopologyArena::new();
        let a = arena.add_vertex(0.0, 0.0, 0.0);
        let b = arena.add_vertex(1.0, 0.0, 0.0);
        let c = arena.add_vertex(2.0, 1.0, 0.0);
        let ab = arena.add_edge(a, b).unwrap();
        let bc = arena.add_edge(b, c).unwrap();
        let wire = arena.add_wire(&[ab, bc]).unwrap();

        assert!(!arena.wire_is_closed(wire));
    }

    #[test]
    fn cell_faces_keep_build_order() {
        let mut arena = TopologyArena::new();
        let (cell, _, faces) = arena.make_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]).unwrap();

        assert_eq!(arena.cell_faces(cell), faces.to_vec());
        assert_eq!(arena.cell_vertices(cell).unwrap().len(), 8);
    }

    #[test]
    fn upward_links_reach_the_cell() {
        let mut arena = TopologyArena::new();
        let (cell, shell, faces) = arena.make_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]).unwrap();

        let wire = arena.face_outer_wire(faces[0]).unwrap();
        assert_eq!(arena.wire_faces(wire), vec![faces[0]]);
        assert_eq!(arena.face_shells(faces[0]), vec![shell]);
        assert_eq!(arena.face_cells(faces[0]), vec![cell]);

        let edge = arena.face_edges(faces[0]).unwrap()[0];
        assert_eq!(arena.edge_wires(edge).len(), 2);
        let (v, _) = arena.edge_vertices(edge).unwrap();
        assert_eq!(arena.vertex_edges(v).len(), 3);
    }

    #[test]
    fn envelope_and_partition_counts() {
        let mut arena = TopologyArena::new();
        let complex = arena
            .make_adjacent_boxes(
                ([0.0, 0.0, 0.0], [3.0, 3.0, 3.0]),
                ([3.0, 0.0, 0.0], [6.0, 3.0, 3.0]),
                1e-6,
            )
            .unwrap();
        let cells = arena.complex_cells(complex);

        let partition = arena.shared_faces(cells[0], cells[1]);
        assert_eq!(partition.len(), 1);
        assert_eq!(arena.adjacent_cell_count(partition[0], complex), 2);

        let envelope: Vec<_> = arena
            .complex_faces(complex)
            .into_iter()
            .filter(|&f| arena.adjacent_cell_count(f, complex) == 1)
            .collect();
        assert_eq!(envelope.len(), 10);
        assert_eq!(arena.cell_complexes_of(cells[0]), vec![complex]);
    }

    #[test]
    fn shell_boundary_counts_free_edges() {
        let mut arena = TopologyArena::new();
        let (shell, _) = arena
            .sew_faces(
                &[
                    vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
                    vec![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0]],
                ],
                1e-6,
            )
            .unwrap();

        assert_eq!(arena.shell_boundary_edge_count(shell), 6);
        assert!(!arena.shell_is_closed(shell));
    }
}
