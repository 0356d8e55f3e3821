// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # topenergy-model
//!
//! An in-memory building energy model: one [`Building`] with stories,
//! spaces, thermal zones, constant schedules, surfaces, sub-surfaces and
//! shading, plus the named constructions and default sets they refer to.
//!
//! ```
//! use nalgebra::Point3;
//! use topenergy_model::{Model, SurfaceType};
//!
//! let mut model = Model::new();
//! let space = model.add_space("ROOM", None);
//! let floor = model
//!     .add_surface(
//!         space,
//!         "ROOM_SURFACE_1",
//!         vec![
//!             Point3::new(0.0, 0.0, 0.0),
//!             Point3::new(0.0, 1.0, 0.0),
//!             Point3::new(1.0, 1.0, 0.0),
//!             Point3::new(1.0, 0.0, 0.0),
//!         ],
//!     )
//!     .unwrap();
//! assert_eq!(model.surface(floor).unwrap().surface_type, SurfaceType::Floor);
//! ```

pub mod error;
pub mod keys;
pub mod model;
pub mod objects;
pub mod persist;
pub mod planar;
pub mod resources;
pub mod validate;

pub use error::{Error, Result};
pub use keys::*;
pub use model::Model;
pub use objects::*;
pub use planar::{newell_vector, PlanarSurface, Transformation};
pub use resources::{template, Construction, DefaultConstructionSet, DefaultScheduleSet, SpaceType};
pub use validate::TranslationReport;
