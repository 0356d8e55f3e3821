// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the energy conversion.
//!
//! Every failure aborts the call in progress; nothing is retried and no
//! partially built model is handed back.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Out-of-range or missing argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Degenerate face, failed cell assembly or a topology of the wrong kind.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// An aperture is not parallel to the wall hosting it.
    #[error("aperture on '{surface}' is not coplanar with its host (normal dot {dot:.4})")]
    NonCoplanarAperture { surface: String, dot: f64 },

    /// The simulation model rejected an operation or failed translation.
    #[error("simulation model error: {0}")]
    ExternalLibrary(String),

    #[error("{kind} file not found: {}", path.display())]
    FileNotFound { kind: &'static str, path: PathBuf },
}

impl From<topenergy_topology::Error> for Error {
    fn from(err: topenergy_topology::Error) -> Self {
        Error::Geometry(err.to_string())
    }
}

impl From<topenergy_model::Error> for Error {
    fn from(err: topenergy_model::Error) -> Self {
        Error::ExternalLibrary(err.to_string())
    }
}
