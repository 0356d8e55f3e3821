// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the simulation model.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A planar object needs at least three vertices.
    #[error("{name}: {count} vertices, at least 3 required")]
    TooFewVertices { name: String, count: usize },

    /// A key does not refer to a live object of the expected kind.
    #[error("unknown {kind}")]
    UnknownObject { kind: &'static str },

    /// A named resource is missing from the model.
    #[error("no {kind} named '{name}'")]
    UnknownResource { kind: &'static str, name: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn unknown(kind: &'static str) -> Self {
        Error::UnknownObject { kind }
    }
}
