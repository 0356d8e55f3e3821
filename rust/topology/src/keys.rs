// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed keys for arena entities and the tagged [`TopologyKey`] variant.
//!
//! Generic code (apertures, attributes, transforms) passes a `TopologyKey`;
//! code that needs a specific entity narrows it with `TryFrom`, which fails
//! with [`Error::TypeMismatch`] instead of panicking.

use slotmap::new_key_type;

use crate::error::Error;

new_key_type! {
    /// A point in 3D space.
    pub struct VertexKey;

    /// A straight segment between two vertices.
    pub struct EdgeKey;

    /// An ordered, usually closed, chain of edges.
    pub struct WireKey;

    /// A planar polygon: one outer wire, optional inner wires.
    pub struct FaceKey;

    /// A set of faces, closed when it bounds a cell.
    pub struct ShellKey;

    /// A closed volume (one room or space).
    pub struct CellKey;

    /// A partition of a building volume into cells.
    pub struct CellComplexKey;
}

/// Any arena entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyKey {
    Vertex(VertexKey),
    Edge(EdgeKey),
    Wire(WireKey),
    Face(FaceKey),
    Shell(ShellKey),
    Cell(CellKey),
    CellComplex(CellComplexKey),
}

impl TopologyKey {
    /// Returns the entity kind behind this key.
    pub fn topology_type(&self) -> TopologyType {
        match self {
            TopologyKey::Vertex(_) => TopologyType::Vertex,
            TopologyKey::Edge(_) => TopologyType::Edge,
            TopologyKey::Wire(_) => TopologyType::Wire,
            TopologyKey::Face(_) => TopologyType::Face,
            TopologyKey::Shell(_) => TopologyType::Shell,
            TopologyKey::Cell(_) => TopologyType::Cell,
            TopologyKey::CellComplex(_) => TopologyType::CellComplex,
        }
    }
}

/// Entity kinds, ordered by dimension and nesting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum TopologyType {
    Vertex = 0,
    Edge = 1,
    Wire = 2,
    Face = 3,
    Shell = 4,
    Cell = 5,
    CellComplex = 6,
}

impl TopologyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyType::Vertex => "Vertex",
            TopologyType::Edge => "Edge",
            TopologyType::Wire => "Wire",
            TopologyType::Face => "Face",
            TopologyType::Shell => "Shell",
            TopologyType::Cell => "Cell",
            TopologyType::CellComplex => "CellComplex",
        }
    }
}

impl std::fmt::Display for TopologyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wires a specific key type into `TopologyKey` in both directions.
macro_rules! impl_key_conversions {
    ($($key:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$key> for TopologyKey {
                fn from(k: $key) -> Self {
                    TopologyKey::$variant(k)
                }
            }

            impl TryFrom<TopologyKey> for $key {
                type Error = Error;

                fn try_from(key: TopologyKey) -> Result<Self, Error> {
                    match key {
                        TopologyKey::$variant(k) => Ok(k),
                        other => Err(Error::TypeMismatch {
                            expected: TopologyType::$variant,
                            found: other.topology_type(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_key_conversions! {
    VertexKey => Vertex,
    EdgeKey => Edge,
    WireKey => Wire,
    FaceKey => Face,
    ShellKey => Shell,
    CellKey => Cell,
    CellComplexKey => CellComplex,
}
