// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # topenergy
//!
//! Conversion between a building's cell complex and its energy simulation
//! model, in both directions.
//!
//! [`assemble`] walks the cells of a complex and turns each into a space with
//! a thermal zone and one surface per face. Every face is [classified] as a
//! wall, floor or roof relative to its cell and then [resolved] into a
//! boundary condition and construction from the number of cells sharing it
//! and whether it sits below grade. Exterior walls are glazed either from an
//! area ratio or from the apertures hosted by their face.
//!
//! [`reconstruct`] reads a model back into a cell complex: world-space
//! surface loops become cells, sub-surfaces become apertures and shading
//! surfaces become free faces.
//!
//! ```
//! use topenergy::{assemble, AssemblyOptions};
//! use topenergy_model::Model;
//! use topenergy_topology::TopologyArena;
//!
//! let mut arena = TopologyArena::new();
//! let complex = arena
//!     .make_stacked_boxes([0.0, 0.0], [10.0, 8.0], &[0.0, 3.0, 6.0], 1e-6)
//!     .unwrap();
//!
//! let assembly = assemble(
//!     &arena,
//!     complex,
//!     &[],
//!     &[0.0, 3.0, 6.0],
//!     &AssemblyOptions::default(),
//!     Model::standard_template(),
//! )
//! .unwrap();
//! assert_eq!(assembly.spaces.len(), 2);
//! assert_eq!(assembly.model.building.standards_number_of_stories, Some(2));
//! ```
//!
//! [classified]: classifier::classify
//! [resolved]: resolver::resolve

pub mod assembly;
pub mod classifier;
pub mod error;
pub mod export;
pub mod files;
pub mod importer;
pub mod polygon;
pub mod resolver;

pub use assembly::{assemble, story_index, Assembly, AssemblyOptions, BuildingMetadata, NAME_ATTRIBUTE};
pub use classifier::{classify, Classification, FaceType};
pub use error::{Error, Result};
pub use export::{export, ExportedFiles, Workflow};
pub use files::SimulationFiles;
pub use importer::{reconstruct, Reconstruction};
pub use polygon::Polygon;
pub use resolver::{resolve, ApertureReport, ConstructionCategory, ConstructionNames, Resolution};
