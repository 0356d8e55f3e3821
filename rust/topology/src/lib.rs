// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # topenergy topology
//!
//! Geometric-topology kernel for building volumes.
//!
//! A building is described as a cell complex: every room is a closed [cell]
//! bounded by planar faces, and a face between two rooms is stored once and
//! referenced by both cells. The arena keeps the upward adjacency (face →
//! shells → cells) so the number of cells sharing a face is a cheap query,
//! which is what separates interior partitions from the building envelope.
//!
//! Besides construction and traversal, the kernel provides the geometric
//! services the energy conversion relies on: triangulation, point-in-cell
//! classification with a boundary tolerance, areas, volumes, centroids,
//! rigid transforms, aperture attachment and string-keyed attributes.
//!
//! [cell]: keys::CellKey

pub mod arena;
pub mod builders;
pub mod construction;
pub mod content;
pub mod dictionary;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod serialization;
pub mod spatial;
pub mod transform;
pub mod traversal;

pub use arena::TopologyArena;
pub use content::Aperture;
pub use dictionary::{DictValue, Dictionary};
pub use error::{Error, Result};
pub use geometry::PointClass;
pub use keys::{
    CellComplexKey, CellKey, EdgeKey, FaceKey, ShellKey, TopologyKey, TopologyType, VertexKey,
    WireKey,
};
