// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON persistence for a [`TopologyArena`].
//!
//! Slot keys are not stable across processes, so every entity is written
//! with a dense index into its own list and references use those indices.
//! Attributes and apertures are written as side tables keyed by
//! `(kind, index)`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::arena::TopologyArena;
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::keys::*;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub vertices: Vec<[f64; 3]>,
    pub edges: Vec<[usize; 2]>,
    pub wires: Vec<WireSnapshot>,
    pub faces: Vec<FaceSnapshot>,
    /// Face indices per shell.
    pub shells: Vec<Vec<usize>>,
    /// Outer shell index per cell.
    pub cells: Vec<usize>,
    /// Cell indices per complex.
    pub cell_complexes: Vec<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apertures: Vec<ApertureSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WireSnapshot {
    pub edges: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FaceSnapshot {
    pub outer_wire: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inner_wires: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: TopologyType,
    pub index: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttributeSnapshot {
    pub entity: EntityRef,
    pub dictionary: Dictionary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApertureSnapshot {
    pub host_face: usize,
    pub opening: EntityRef,
}

/// Dense numbering of the live keys of one slot map.
struct Numbering<K> {
    index: FxHashMap<K, usize>,
}

impl<K: Copy + Eq + std::hash::Hash> Numbering<K> {
    fn new(keys: impl Iterator<Item = K>) -> Self {
        Self {
            index: keys.enumerate().map(|(i, k)| (k, i)).collect(),
        }
    }

    fn of(&self, key: K) -> usize {
        self.index[&key]
    }
}

/// Key lists rebuilt while reading, in snapshot order.
#[derive(Default)]
struct Restored {
    vertices: Vec<VertexKey>,
    edges: Vec<EdgeKey>,
    wires: Vec<WireKey>,
    faces: Vec<FaceKey>,
    shells: Vec<ShellKey>,
    cells: Vec<CellKey>,
    complexes: Vec<CellComplexKey>,
}

fn resolve<K: Copy>(keys: &[K], index: usize, kind: TopologyType) -> Result<K> {
    keys.get(index)
        .copied()
        .ok_or_else(|| Error::Serialization(format!("{kind} index {index} out of range")))
}

fn resolve_all<K: Copy>(keys: &[K], indices: &[usize], kind: TopologyType) -> Result<Vec<K>> {
    indices.iter().map(|&i| resolve(keys, i, kind)).collect()
}

impl Restored {
    fn key(&self, entity: &EntityRef) -> Result<TopologyKey> {
        let i = entity.index;
        Ok(match entity.kind {
            TopologyType::Vertex => resolve(&self.vertices, i, entity.kind)?.into(),
            TopologyType::Edge => resolve(&self.edges, i, entity.kind)?.into(),
            TopologyType::Wire => resolve(&self.wires, i, entity.kind)?.into(),
            TopologyType::Face => resolve(&self.faces, i, entity.kind)?.into(),
            TopologyType::Shell => resolve(&self.shells, i, entity.kind)?.into(),
            TopologyType::Cell => resolve(&self.cells, i, entity.kind)?.into(),
            TopologyType::CellComplex => resolve(&self.complexes, i, entity.kind)?.into(),
        })
    }
}

impl TopologyArena {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_snapshot())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: ArenaSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    pub fn to_snapshot(&self) -> ArenaSnapshot {
        let vertex_ids = Numbering::new(self.vertices.keys());
        let edge_ids = Numbering::new(self.edges.keys());
        let wire_ids = Numbering::new(self.wires.keys());
        let face_ids = Numbering::new(self.faces.keys());
        let shell_ids = Numbering::new(self.shells.keys());
        let cell_ids = Numbering::new(self.cells.keys());
        let complex_ids = Numbering::new(self.cell_complexes.keys());

        let entity = |key: TopologyKey| {
            let index = match key {
                TopologyKey::Vertex(k) => vertex_ids.of(k),
                TopologyKey::Edge(k) => edge_ids.of(k),
                TopologyKey::Wire(k) => wire_ids.of(k),
                TopologyKey::Face(k) => face_ids.of(k),
                TopologyKey::Shell(k) => shell_ids.of(k),
                TopologyKey::Cell(k) => cell_ids.of(k),
                TopologyKey::CellComplex(k) => complex_ids.of(k),
            };
            EntityRef {
                kind: key.topology_type(),
                index,
            }
        };

        // Stable output: sort side tables by entity.
        let mut attributes: Vec<AttributeSnapshot> = self
            .dictionaries
            .iter()
            .filter(|(k, _)| self.contains(**k))
            .map(|(k, d)| AttributeSnapshot {
                entity: entity(*k),
                dictionary: d.clone(),
            })
            .collect();
        attributes.sort_by_key(|a| (a.entity.kind, a.entity.index));

        let mut apertures: Vec<ApertureSnapshot> = self
            .apertures
            .iter()
            .flat_map(|(host, list)| list.iter().map(move |a| (*host, a.topology)))
            .filter(|(_, opening)| self.contains(*opening))
            .map(|(host, opening)| ApertureSnapshot {
                host_face: face_ids.of(host),
                opening: entity(opening),
            })
            .collect();
        apertures.sort_by_key(|a| (a.host_face, a.opening.kind, a.opening.index));

        ArenaSnapshot {
            vertices: self.vertices.values().map(|v| [v.x, v.y, v.z]).collect(),
            edges: self
                .edges
                .values()
                .map(|e| [vertex_ids.of(e.start), vertex_ids.of(e.end)])
                .collect(),
            wires: self
                .wires
                .values()
                .map(|w| WireSnapshot {
                    edges: w.edges.iter().map(|&e| edge_ids.of(e)).collect(),
                })
                .collect(),
            faces: self
                .faces
                .values()
                .map(|f| FaceSnapshot {
                    outer_wire: wire_ids.of(f.outer_wire),
                    inner_wires: f.inner_wires.iter().map(|&w| wire_ids.of(w)).collect(),
                })
                .collect(),
            shells: self
                .shells
                .values()
                .map(|s| s.faces.iter().map(|&f| face_ids.of(f)).collect())
                .collect(),
            cells: self
                .cells
                .values()
                .map(|c| shell_ids.of(c.outer_shell))
                .collect(),
            cell_complexes: self
                .cell_complexes
                .values()
                .map(|cc| cc.cells.iter().map(|&c| cell_ids.of(c)).collect())
                .collect(),
            attributes,
            apertures,
        }
    }

    /// Rebuilds an arena; any dangling index is a serialization error.
    pub fn from_snapshot(snap: &ArenaSnapshot) -> Result<Self> {
        let mut arena = TopologyArena::new();
        let mut keys = Restored::default();

        for &[x, y, z] in &snap.vertices {
            keys.vertices.push(arena.add_vertex(x, y, z));
        }
        for &[a, b] in &snap.edges {
            let start = resolve(&keys.vertices, a, TopologyType::Vertex)?;
            let end = resolve(&keys.vertices, b, TopologyType::Vertex)?;
            keys.edges.push(arena.add_edge(start, end)?);
        }
        for w in &snap.wires {
            let edges = resolve_all(&keys.edges, &w.edges, TopologyType::Edge)?;
            keys.wires.push(arena.add_wire(&edges)?);
        }
        for f in &snap.faces {
            let outer = resolve(&keys.wires, f.outer_wire, TopologyType::Wire)?;
            let inner = resolve_all(&keys.wires, &f.inner_wires, TopologyType::Wire)?;
            keys.faces.push(arena.add_face_with_holes(outer, &inner)?);
        }
        for faces in &snap.shells {
            let faces = resolve_all(&keys.faces, faces, TopologyType::Face)?;
            keys.shells.push(arena.add_shell(&faces)?);
        }
        for &shell in &snap.cells {
            let shell = resolve(&keys.shells, shell, TopologyType::Shell)?;
            keys.cells.push(arena.add_cell(shell)?);
        }
        for cells in &snap.cell_complexes {
            let cells = resolve_all(&keys.cells, cells, TopologyType::Cell)?;
            keys.complexes.push(arena.add_cell_complex(&cells)?);
        }

        for a in &snap.attributes {
            arena.set_dictionary(keys.key(&a.entity)?, a.dictionary.clone());
        }
        for a in &snap.apertures {
            let host = resolve(&keys.faces, a.host_face, TopologyType::Face)?;
            arena.add_aperture(host, keys.key(&a.opening)?)?;
        }

        Ok(arena)
    }
}
