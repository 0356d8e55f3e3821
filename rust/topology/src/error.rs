// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the topology kernel.

use crate::keys::{CellKey, EdgeKey, FaceKey, ShellKey, TopologyType, VertexKey, WireKey};

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or querying topology.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Consecutive edges of a wire do not share a vertex.
    #[error("wire edges {0} and {1} are not connected")]
    DisconnectedWire(usize, usize),

    #[error("wire must have at least one edge")]
    EmptyWire,

    /// Outer boundary has fewer than three distinct edges.
    #[error("face needs at least 3 distinct vertices")]
    DegenerateFace,

    #[error("shell must have at least one face")]
    EmptyShell,

    /// Faces do not enclose a volume; the count is the number of edges not
    /// used by exactly two faces.
    #[error("shell is not closed: {0} edges are not shared by exactly two faces")]
    OpenShell(usize),

    #[error("cell complex must have at least one cell")]
    EmptyCellComplex,

    /// A face would bound more than two cells of the same complex.
    #[error("face is shared by {0} cells, at most 2 allowed")]
    NonManifoldFace(usize),

    /// A generic key was narrowed to the wrong entity kind.
    #[error("expected a {expected}, found a {found}")]
    TypeMismatch {
        expected: TopologyType,
        found: TopologyType,
    },

    /// A generic key refers to nothing in this arena.
    #[error("{0} not found")]
    MissingEntity(TopologyType),

    #[error("vertex not found: {0:?}")]
    VertexNotFound(VertexKey),

    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeKey),

    #[error("wire not found: {0:?}")]
    WireNotFound(WireKey),

    #[error("face not found: {0:?}")]
    FaceNotFound(FaceKey),

    #[error("shell not found: {0:?}")]
    ShellNotFound(ShellKey),

    #[error("cell not found: {0:?}")]
    CellNotFound(CellKey),

    /// Triangulation of the face produced no triangles.
    #[error("face could not be triangulated")]
    Triangulation(FaceKey),

    #[error("serialization error: {0}")]
    Serialization(String),
}
