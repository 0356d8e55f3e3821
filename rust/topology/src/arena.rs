// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The [`TopologyArena`]: owner of every vertex, edge, wire, face, shell,
//! cell and cell complex, plus the indices that make upward queries cheap.
//!
//! Entities reference their children by key. Parents are found through the
//! `*_to_*` maps, which construction keeps in sync. A face that separates two
//! rooms is linked to two shells, and through them to two cells; the energy
//! conversion reads exactly that count to tell interior partitions from the
//! building envelope.
//!
//! The arena is `Clone`. Callers that annotate a model (for example with the
//! generated space name of each cell) work on a copy and leave the input
//! untouched.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::content::Aperture;
use crate::dictionary::Dictionary;
use crate::keys::*;

/// A point in 3D space.
#[derive(Debug, Clone)]
pub struct VertexData {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A segment between two vertices. Direction is `start` → `end`.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub start: VertexKey,
    pub end: VertexKey,
}

/// An ordered chain of edges.
#[derive(Debug, Clone)]
pub struct WireData {
    pub edges: Vec<EdgeKey>,
    /// `true` when `edges[i]` is walked `start` → `end`.
    pub orientations: Vec<bool>,
}

/// A planar polygon. The winding of `outer_wire` defines the face normal
/// (right-hand rule).
#[derive(Debug, Clone)]
pub struct FaceData {
    pub outer_wire: WireKey,
    pub inner_wires: Vec<WireKey>,
}

#[derive(Debug, Clone)]
pub struct ShellData {
    /// Faces in insertion order; this is the native face order of a cell.
    pub faces: Vec<FaceKey>,
}

#[derive(Debug, Clone)]
pub struct CellData {
    pub outer_shell: ShellKey,
}

#[derive(Debug, Clone)]
pub struct CellComplexData {
    pub cells: Vec<CellKey>,
}

/// Arena storage for building topology.
///
/// # Example
///
/// ```
/// use topenergy_topology::TopologyArena;
///
/// let mut arena = TopologyArena::new();
/// let (room, _, _) = arena.make_box([0.0, 0.0, 0.0], [4.0, 5.0, 3.0]).unwrap();
///
/// assert_eq!(arena.face_count(), 6);
/// assert!((arena.cell_volume(room).unwrap() - 60.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct TopologyArena {
    pub(crate) vertices: SlotMap<VertexKey, VertexData>,
    pub(crate) edges: SlotMap<EdgeKey, EdgeData>,
    pub(crate) wires: SlotMap<WireKey, WireData>,
    pub(crate) faces: SlotMap<FaceKey, FaceData>,
    pub(crate) shells: SlotMap<ShellKey, ShellData>,
    pub(crate) cells: SlotMap<CellKey, CellData>,
    pub(crate) cell_complexes: SlotMap<CellComplexKey, CellComplexData>,

    // child -> parents
    pub(crate) vertex_to_edges: FxHashMap<VertexKey, FxHashSet<EdgeKey>>,
    pub(crate) edge_to_wires: FxHashMap<EdgeKey, FxHashSet<WireKey>>,
    pub(crate) wire_to_faces: FxHashMap<WireKey, FxHashSet<FaceKey>>,
    pub(crate) face_to_shells: FxHashMap<FaceKey, FxHashSet<ShellKey>>,
    pub(crate) shell_to_cells: FxHashMap<ShellKey, FxHashSet<CellKey>>,
    pub(crate) cell_to_complexes: FxHashMap<CellKey, FxHashSet<CellComplexKey>>,

    pub(crate) dictionaries: FxHashMap<TopologyKey, Dictionary>,
    pub(crate) apertures: FxHashMap<FaceKey, Vec<Aperture>>,
}

impl TopologyArena {
    pub fn new() -> Self {
        Self {
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            wires: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            shells: SlotMap::with_key(),
            cells: SlotMap::with_key(),
            cell_complexes: SlotMap::with_key(),
            vertex_to_edges: FxHashMap::default(),
            edge_to_wires: FxHashMap::default(),
            wire_to_faces: FxHashMap::default(),
            face_to_shells: FxHashMap::default(),
            shell_to_cells: FxHashMap::default(),
            cell_to_complexes: FxHashMap::default(),
            dictionaries: FxHashMap::default(),
            apertures: FxHashMap::default(),
        }
    }

    /// Adds a free-standing vertex.
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> VertexKey {
        self.vertices.insert(VertexData { x, y, z })
    }

    pub fn vertex(&self, key: VertexKey) -> Option<&VertexData> {
        self.vertices.get(key)
    }

    pub fn vertex_coords(&self, key: VertexKey) -> Option<[f64; 3]> {
        self.vertices.get(key).map(|v| [v.x, v.y, v.z])
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeData> {
        self.edges.get(key)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn wire(&self, key: WireKey) -> Option<&WireData> {
        self.wires.get(key)
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    pub fn face(&self, key: FaceKey) -> Option<&FaceData> {
        self.faces.get(key)
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Iterates over all faces in slot order.
    pub fn face_keys(&self) -> impl Iterator<Item = FaceKey> + '_ {
        self.faces.keys()
    }

    pub fn shell(&self, key: ShellKey) -> Option<&ShellData> {
        self.shells.get(key)
    }

    pub fn shell_count(&self) -> usize {
        self.shells.len()
    }

    pub fn cell(&self, key: CellKey) -> Option<&CellData> {
        self.cells.get(key)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterates over all cells in slot order.
    pub fn cell_keys(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.cells.keys()
    }

    pub fn cell_complex(&self, key: CellComplexKey) -> Option<&CellComplexData> {
        self.cell_complexes.get(key)
    }

    pub fn cell_complex_count(&self) -> usize {
        self.cell_complexes.len()
    }

    /// Iterates over all cell complexes in slot order.
    pub fn cell_complex_keys(&self) -> impl Iterator<Item = CellComplexKey> + '_ {
        self.cell_complexes.keys()
    }

    /// Returns `true` if the key refers to a live entity.
    pub fn contains(&self, key: TopologyKey) -> bool {
        match key {
            TopologyKey::Vertex(k) => self.vertices.contains_key(k),
            TopologyKey::Edge(k) => self.edges.contains_key(k),
            TopologyKey::Wire(k) => self.wires.contains_key(k),
            TopologyKey::Face(k) => self.faces.contains_key(k),
            TopologyKey::Shell(k) => self.shells.contains_key(k),
            TopologyKey::Cell(k) => self.cells.contains_key(k),
            TopologyKey::CellComplex(k) => self.cell_complexes.contains_key(k),
        }
    }

    pub(crate) fn link_vertex_edge(&mut self, vertex: VertexKey, edge: EdgeKey) {
        self.vertex_to_edges.entry(vertex).or_default().insert(edge);
    }

    pub(crate) fn link_edge_wire(&mut self, edge: EdgeKey, wire: WireKey) {
        self.edge_to_wires.entry(edge).or_default().insert(wire);
    }

    pub(crate) fn link_wire_face(&mut self, wire: WireKey, face: FaceKey) {
        self.wire_to_faces.entry(wire).or_default().insert(face);
    }

    pub(crate) fn link_face_shell(&mut self, face: FaceKey, shell: ShellKey) {
        self.face_to_shells.entry(face).or_default().insert(shell);
    }

    pub(crate) fn link_shell_cell(&mut self, shell: ShellKey, cell: CellKey) {
        self.shell_to_cells.entry(shell).or_default().insert(cell);
    }

    pub(crate) fn link_cell_complex(&mut self, cell: CellKey, complex: CellComplexKey) {
        self.cell_to_complexes
            .entry(cell)
            .or_default()
            .insert(complex);
    }
}

impl Default for TopologyArena {
    fn default() -> Self {
        Self::new()
    }
}
