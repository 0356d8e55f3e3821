// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-loop helpers and the [`Polygon`] builder.
//!
//! Every surface and every sub-surface the conversion creates goes through
//! [`Polygon`], so both paths check vertex count and degeneracy the same way
//! and orient openings against their host by the same rule.

use nalgebra::{Point3, Vector3};
use topenergy_model::{
    newell_vector, Model, ShadingGroupKey, ShadingSurfaceKey, SpaceKey, SubSurfaceKey,
    SubSurfaceType, SurfaceKey,
};

use crate::error::{Error, Result};

/// Opening normals at least this anti-parallel to the host are reversed.
pub const FLIPPED_DOT: f64 = -0.99;
/// Opening normals at least this parallel to the host are kept.
pub const ALIGNED_DOT: f64 = 0.99;

/// Vertex mean of a loop.
pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Scales a loop about its vertex centroid so that its area changes by
/// `area_factor`; each point moves by `sqrt(area_factor)`.
pub fn scale_about_centroid(points: &[Point3<f64>], area_factor: f64) -> Vec<Point3<f64>> {
    let Some(c) = centroid(points) else {
        return Vec::new();
    };
    let k = area_factor.sqrt();
    points.iter().map(|p| c + (p - c) * k).collect()
}

/// Triangle fan from the first vertex: `(p0, p[i+1], p[i+2])`.
pub fn fan_triangles(points: &[Point3<f64>]) -> Vec<[Point3<f64>; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }
    (0..points.len() - 2)
        .map(|i| [points[0], points[i + 1], points[i + 2]])
        .collect()
}

/// Unit normal of `abc` by the right-hand rule.
pub fn triangle_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Vector3<f64>> {
    (b - a).cross(&(c - a)).try_normalize(1e-15)
}

/// `true` when every point is at or below elevation zero.
pub fn is_underground(points: &[Point3<f64>]) -> bool {
    !points.is_empty() && points.iter().all(|p| p.z <= 0.0)
}

/// A validated planar loop about to become a model object.
#[derive(Debug, Clone)]
pub struct Polygon {
    name: String,
    vertices: Vec<Point3<f64>>,
    normal: Vector3<f64>,
}

impl Polygon {
    /// Fails with [`Error::Geometry`] for fewer than three vertices or a
    /// loop without a defined normal.
    pub fn new(name: impl Into<String>, vertices: Vec<Point3<f64>>) -> Result<Self> {
        let name = name.into();
        if vertices.len() < 3 {
            return Err(Error::Geometry(format!(
                "'{name}' has {} vertices, at least 3 required",
                vertices.len()
            )));
        }
        let normal = newell_vector(&vertices)
            .try_normalize(1e-12)
            .ok_or_else(|| Error::Geometry(format!("'{name}' is degenerate")))?;
        Ok(Self {
            name,
            vertices,
            normal,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    pub fn area(&self) -> f64 {
        newell_vector(&self.vertices).norm() / 2.0
    }

    pub fn reverse(&mut self) {
        self.vertices.reverse();
        self.normal = -self.normal;
    }

    /// Orients an opening like its host.
    ///
    /// A normal anti-parallel to `host_normal` (dot below -0.99) is reversed;
    /// one that is neither parallel nor anti-parallel fails with
    /// [`Error::NonCoplanarAperture`].
    pub fn oriented_like(mut self, host_normal: &Vector3<f64>, host_name: &str) -> Result<Self> {
        let dot = self.normal.dot(host_normal);
        if dot < FLIPPED_DOT {
            self.reverse();
        } else if dot > FLIPPED_DOT && dot < ALIGNED_DOT {
            return Err(Error::NonCoplanarAperture {
                surface: host_name.to_string(),
                dot,
            });
        }
        Ok(self)
    }

    /// Creates a surface in `space`.
    pub fn into_surface(self, model: &mut Model, space: SpaceKey) -> Result<SurfaceKey> {
        Ok(model.add_surface(space, self.name, self.vertices)?)
    }

    /// Creates a sub-surface on `surface`.
    pub fn into_sub_surface(
        self,
        model: &mut Model,
        surface: SurfaceKey,
        sub_surface_type: SubSurfaceType,
    ) -> Result<SubSurfaceKey> {
        Ok(model.add_sub_surface(surface, self.name, self.vertices, sub_surface_type)?)
    }

    pub fn into_shading_surface(
        self,
        model: &mut Model,
        group: ShadingGroupKey,
    ) -> Result<ShadingSurfaceKey> {
        Ok(model.add_shading_surface(group, self.name, self.vertices)?)
    }
}
