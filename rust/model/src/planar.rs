// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar-polygon behaviour shared by surfaces, sub-surfaces and shading
//! surfaces, and the rigid frame a space stores its geometry in.
//!
//! Vertices follow the right-hand rule: looking at the polygon from the side
//! its outward normal points to, they run counter-clockwise.

use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Newell vector of a loop; half its length is the enclosed area.
pub fn newell_vector(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut n = Vector3::zeros();
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n
}

pub trait PlanarSurface {
    fn vertices(&self) -> &[Point3<f64>];

    /// Unit outward normal, `None` for a degenerate loop.
    fn outward_normal(&self) -> Option<Vector3<f64>> {
        if self.vertices().len() < 3 {
            return None;
        }
        newell_vector(self.vertices()).try_normalize(1e-12)
    }

    fn gross_area(&self) -> f64 {
        newell_vector(self.vertices()).norm() / 2.0
    }

    fn centroid(&self) -> Option<Point3<f64>> {
        let v = self.vertices();
        if v.is_empty() {
            return None;
        }
        let sum = v.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Some(Point3::from(sum / v.len() as f64))
    }

    /// Largest distance of any vertex from the plane through the first vertex
    /// with the outward normal.
    fn planarity_deviation(&self) -> Option<f64> {
        let n = self.outward_normal()?;
        let origin = self.vertices()[0];
        Some(
            self.vertices()
                .iter()
                .map(|p| (p - origin).dot(&n).abs())
                .fold(0.0, f64::max),
        )
    }
}

/// Local-to-building frame of a space: `p_building = rotation * p_local + translation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl Transformation {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation,
        }
    }

    /// Rotation about +z by `angle` radians, then `translation`.
    pub fn from_z_rotation(angle: f64, translation: Vector3<f64>) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            rotation: Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0),
            translation,
        }
    }

    pub fn apply(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * p.coords + self.translation)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Loop(Vec<Point3<f64>>);

    impl PlanarSurface for Loop {
        fn vertices(&self) -> &[Point3<f64>] {
            &self.0
        }
    }

    fn wall() -> Loop {
        Loop(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 3.0),
            Point3::new(0.0, 0.0, 3.0),
        ])
    }

    #[test]
    fn wall_faces_minus_y() {
        let n = wall().outward_normal().unwrap();
        assert_relative_eq!(n, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(wall().gross_area(), 12.0, epsilon = 1e-12);
        assert_relative_eq!(wall().planarity_deviation().unwrap(), 0.0);
    }

    #[test]
    fn two_points_have_no_normal() {
        let line = Loop(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        assert!(line.outward_normal().is_none());
    }

    #[test]
    fn rotation_then_translation() {
        let t = Transformation::from_z_rotation(std::f64::consts::FRAC_PI_2, Vector3::new(10.0, 0.0, 0.0));
        let p = t.apply(&Point3::new(1.0, 0.0, 2.0));
        assert_relative_eq!(p, Point3::new(10.0, 1.0, 2.0), epsilon = 1e-12);
        assert!(Transformation::default().is_identity());
    }
}
