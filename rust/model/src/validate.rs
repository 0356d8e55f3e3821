// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pre-simulation checks.
//!
//! Errors are problems a simulation engine would reject. Warnings are gaps
//! it would fill with its own defaults.

use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::objects::BoundaryCondition;
use crate::planar::PlanarSurface;

const MIN_AREA: f64 = 1e-9;
/// Largest out-of-plane offset tolerated for a sub-surface, in metres.
const COPLANAR_TOLERANCE: f64 = 0.01;
/// Smallest normal dot product between a sub-surface and its host.
const COPLANAR_MIN_DOT: f64 = 0.99;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl TranslationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Model {
    pub fn validate(&self) -> TranslationReport {
        let mut report = TranslationReport::default();

        if self.weather_file.is_none() {
            report.warnings.push("no weather file".to_string());
        }

        for (_, space) in self.spaces.iter() {
            if space.thermal_zone.is_none() {
                report
                    .warnings
                    .push(format!("space '{}' has no thermal zone", space.name));
            }
        }

        for (_, surface) in self.surfaces.iter() {
            let name = &surface.name;
            if surface.vertices.len() < 3 {
                report.errors.push(format!("surface '{name}' has fewer than 3 vertices"));
                continue;
            }
            if surface.outward_normal().is_none() || surface.gross_area() < MIN_AREA {
                report.errors.push(format!("surface '{name}' is degenerate"));
            }
            if !self.spaces.contains_key(surface.space) {
                report.errors.push(format!("surface '{name}' has no space"));
            }
            match (surface.boundary, surface.adjacent_surface) {
                (BoundaryCondition::Surface, None) => report
                    .errors
                    .push(format!("surface '{name}' has a Surface boundary but no partner")),
                (_, Some(k)) if !self.surfaces.contains_key(k) => report
                    .errors
                    .push(format!("surface '{name}' points at a missing partner")),
                _ => {}
            }
            match &surface.construction {
                None => report
                    .warnings
                    .push(format!("surface '{name}' has no construction")),
                Some(c) if !self.constructions.contains_key(c) => report
                    .errors
                    .push(format!("surface '{name}' uses unknown construction '{c}'")),
                _ => {}
            }
        }

        for (_, sub) in self.sub_surfaces.iter() {
            let name = &sub.name;
            let Some(host) = self.surfaces.get(sub.surface) else {
                report.errors.push(format!("sub-surface '{name}' has no host"));
                continue;
            };
            let (Some(n), Some(hn)) = (sub.outward_normal(), host.outward_normal()) else {
                report.errors.push(format!("sub-surface '{name}' is degenerate"));
                continue;
            };
            let offset = sub
                .vertices
                .iter()
                .map(|p| (p - host.vertices[0]).dot(&hn).abs())
                .fold(0.0, f64::max);
            if n.dot(&hn) < COPLANAR_MIN_DOT || offset > COPLANAR_TOLERANCE {
                report
                    .errors
                    .push(format!("sub-surface '{name}' is not coplanar with '{}'", host.name));
            }
            if sub.construction.is_none() {
                report
                    .warnings
                    .push(format!("sub-surface '{name}' has no construction"));
            }
        }

        tracing::debug!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validated model"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::SubSurfaceType;
    use nalgebra::Point3;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    fn wall() -> Vec<Point3<f64>> {
        vec![p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(4.0, 0.0, 3.0), p(0.0, 0.0, 3.0)]
    }

    #[test]
    fn bare_surface_only_warns() {
        let mut model = Model::new();
        let space = model.add_space("S", None);
        model.add_surface(space, "W", wall()).unwrap();

        let report = model.validate();
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 3);
    }

    #[test]
    fn unmatched_interior_surface_is_an_error() {
        let mut model = Model::new();
        let space = model.add_space("S", None);
        let w = model.add_surface(space, "W", wall()).unwrap();
        model.surface_mut(w).unwrap().set_interior();

        let report = model.validate();
        assert!(!report.is_ok());
        assert!(report.errors[0].contains("no partner"));
    }

    #[test]
    fn reversed_window_is_not_coplanar() {
        let mut model = Model::new();
        let space = model.add_space("S", None);
        let w = model.add_surface(space, "W", wall()).unwrap();
        model
            .add_sub_surface(
                w,
                "W_WIN",
                vec![p(1.0, 0.0, 1.0), p(1.0, 0.0, 2.0), p(3.0, 0.0, 2.0), p(3.0, 0.0, 1.0)],
                SubSurfaceType::FixedWindow,
            )
            .unwrap();

        let report = model.validate();
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("not coplanar"));
    }
}
