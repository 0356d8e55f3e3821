// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Apertures: openings such as windows and doors hosted by a face.
//!
//! An aperture is usually its own free-standing face lying in the plane of
//! the host. It does not take part in the host's boundary, so the cells and
//! shells are unaffected by adding one.

use rustc_hash::FxHashSet;

use crate::arena::TopologyArena;
use crate::error::{Error, Result};
use crate::keys::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Aperture {
    /// Geometry of the opening.
    pub topology: TopologyKey,
    pub host_face: FaceKey,
}

impl Aperture {
    /// The opening as a face, if it is one.
    pub fn face(&self) -> Option<FaceKey> {
        FaceKey::try_from(self.topology).ok()
    }
}

impl TopologyArena {
    /// Attaches `opening` to `host_face`. Both must exist.
    pub fn add_aperture(&mut self, host_face: FaceKey, opening: TopologyKey) -> Result<()> {
        if !self.faces.contains_key(host_face) {
            return Err(Error::FaceNotFound(host_face));
        }
        if !self.contains(opening) {
            return Err(Error::MissingEntity(opening.topology_type()));
        }

        self.apertures.entry(host_face).or_default().push(Aperture {
            topology: opening,
            host_face,
        });
        Ok(())
    }

    pub fn apertures(&self, face: FaceKey) -> &[Aperture] {
        self.apertures.get(&face).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apertures of all faces of a cell, grouped by face in shell order.
    pub fn cell_apertures(&self, cell: CellKey) -> Vec<&Aperture> {
        self.cell_faces(cell)
            .into_iter()
            .flat_map(|f| self.apertures(f))
            .collect()
    }

    /// Faces that bound no shell and open no other face, in slot order.
    /// These are loose geometry such as shading.
    pub fn free_faces(&self) -> Vec<FaceKey> {
        let openings: FxHashSet<FaceKey> = self
            .apertures
            .values()
            .flatten()
            .filter_map(Aperture::face)
            .collect();
        self.face_keys()
            .filter(|f| self.face_shells(*f).is_empty() && !openings.contains(f))
            .collect()
    }
}
