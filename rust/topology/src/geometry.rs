// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric queries: normals, areas, centroids, volumes, triangulation and
//! point classification against a cell.

use nalgebra::{Point3, Vector3};

use crate::arena::TopologyArena;
use crate::error::{Error, Result};
use crate::keys::*;

/// Where a point lies relative to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClass {
    Inside,
    Outside,
    /// Within the boundary tolerance of one of the cell's faces.
    OnBoundary,
}

/// Triangle as three vertex keys, wound like its face.
pub type Triangle = (VertexKey, VertexKey, VertexKey);

impl TopologyArena {
    pub fn vertex_point(&self, key: VertexKey) -> Option<Point3<f64>> {
        self.vertices.get(key).map(|v| Point3::new(v.x, v.y, v.z))
    }

    /// Outer boundary positions of a face, in loop order.
    pub fn face_outer_points(&self, key: FaceKey) -> Option<Vec<Point3<f64>>> {
        let face = self.faces.get(key)?;
        self.wire_points(face.outer_wire)
    }

    fn wire_points(&self, wire: WireKey) -> Option<Vec<Point3<f64>>> {
        self.wire_vertices_ordered(wire)?
            .into_iter()
            .map(|vk| self.vertex_point(vk))
            .collect()
    }

    /// Unit normal by Newell's method; follows the outer loop winding.
    pub fn face_normal(&self, key: FaceKey) -> Option<Vector3<f64>> {
        let points = self.face_outer_points(key)?;
        newell(&points).try_normalize(1e-15)
    }

    /// Area of the outer loop minus the areas of the holes.
    pub fn face_area(&self, key: FaceKey) -> Option<f64> {
        let face = self.faces.get(key)?;
        let mut area = newell(&self.wire_points(face.outer_wire)?).norm() / 2.0;
        for &hole in &face.inner_wires {
            area -= newell(&self.wire_points(hole)?).norm() / 2.0;
        }
        Some(area.max(0.0))
    }

    /// Mean of the outer loop vertices.
    pub fn face_centroid(&self, key: FaceKey) -> Option<Point3<f64>> {
        mean(&self.face_outer_points(key)?)
    }

    /// Splits a face into triangles.
    ///
    /// The face is projected onto the plane of its dominant normal axis and
    /// ear-clipped. Every triangle is wound so its normal agrees with the
    /// face normal, whatever winding the projection produced.
    pub fn triangulate_face(&self, key: FaceKey) -> Result<Vec<Triangle>> {
        let face = self.faces.get(key).ok_or(Error::FaceNotFound(key))?;
        let normal = self.face_normal(key).ok_or(Error::Triangulation(key))?;

        let (u, v) = projection_axes(&normal);
        let mut flat = Vec::new();
        let mut order = Vec::new();
        let mut holes = Vec::with_capacity(face.inner_wires.len());

        let loops = std::iter::once(face.outer_wire).chain(face.inner_wires.iter().copied());
        for (i, wire) in loops.enumerate() {
            if i > 0 {
                holes.push(order.len());
            }
            for vk in self.wire_vertices_ordered(wire).ok_or(Error::WireNotFound(wire))? {
                let p = self.vertex_point(vk).ok_or(Error::VertexNotFound(vk))?;
                flat.push(p[u]);
                flat.push(p[v]);
                order.push(vk);
            }
        }

        let indices = earcutr::earcut(&flat, &holes, 2).map_err(|_| Error::Triangulation(key))?;

        let mut triangles = Vec::with_capacity(indices.len() / 3);
        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (order[tri[0]], order[tri[1]], order[tri[2]]);
            let pa = self.vertex_point(a).ok_or(Error::VertexNotFound(a))?;
            let pb = self.vertex_point(b).ok_or(Error::VertexNotFound(b))?;
            let pc = self.vertex_point(c).ok_or(Error::VertexNotFound(c))?;
            if (pb - pa).cross(&(pc - pa)).dot(&normal) < 0.0 {
                triangles.push((a, c, b));
            } else {
                triangles.push((a, b, c));
            }
        }

        Ok(triangles)
    }

    fn triangle_points(&self, tri: Triangle) -> Option<[Point3<f64>; 3]> {
        Some([
            self.vertex_point(tri.0)?,
            self.vertex_point(tri.1)?,
            self.vertex_point(tri.2)?,
        ])
    }

    /// Triangles of every face of a cell, as points.
    fn cell_triangles(&self, key: CellKey) -> Option<Vec<(usize, [Point3<f64>; 3])>> {
        let faces = self.cell_faces(key);
        if faces.is_empty() {
            return None;
        }
        let mut out = Vec::new();
        for (i, &fk) in faces.iter().enumerate() {
            for tri in self.triangulate_face(fk).ok()? {
                out.push((i, self.triangle_points(tri)?));
            }
        }
        Some(out)
    }

    /// Six times the signed volume of a cell read with the given face flips.
    fn signed_six_volume(&self, key: CellKey, flips: &[bool]) -> Option<f64> {
        let mut six_v = 0.0;
        for (i, [a, b, c]) in self.cell_triangles(key)? {
            let signed = a.coords.dot(&b.coords.cross(&c.coords));
            six_v += if flips[i] { -signed } else { signed };
        }
        Some(six_v)
    }

    /// Enclosed volume of a closed cell.
    ///
    /// Faces shared with a neighbouring cell may be wound for that neighbour,
    /// so the shell is first made consistently oriented by walking shared
    /// edges; the signed tetrahedron sum is then taken in absolute value.
    pub fn cell_volume(&self, key: CellKey) -> Option<f64> {
        let cell = self.cells.get(key)?;
        let flips = self.shell_orientation(cell.outer_shell)?;
        Some((self.signed_six_volume(key, &flips)? / 6.0).abs())
    }

    /// Per face of the cell, in shell order: `true` where the stored loop
    /// must be read reversed to face out of this cell.
    pub fn cell_face_reversals(&self, key: CellKey) -> Option<Vec<bool>> {
        let cell = self.cells.get(key)?;
        let mut flips = self.shell_orientation(cell.outer_shell)?;
        if self.signed_six_volume(key, &flips)? < 0.0 {
            flips.iter_mut().for_each(|f| *f = !*f);
        }
        Some(flips)
    }

    /// Whether `face` is stored wound into `cell`. `None` when the face does
    /// not bound the cell.
    pub fn face_reversed_in_cell(&self, cell: CellKey, face: FaceKey) -> Option<bool> {
        let index = self.cell_faces(cell).iter().position(|&f| f == face)?;
        self.cell_face_reversals(cell)?.get(index).copied()
    }

    /// Mean of the distinct cell vertices.
    pub fn cell_centroid(&self, key: CellKey) -> Option<Point3<f64>> {
        let points: Option<Vec<_>> = self
            .cell_vertices(key)?
            .into_iter()
            .map(|vk| self.vertex_point(vk))
            .collect();
        mean(&points?)
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn cell_bounding_box(&self, key: CellKey) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut vertices = self.cell_vertices(key)?.into_iter();
        let first = self.vertex_point(vertices.next()?)?;
        let (mut lo, mut hi) = (first, first);
        for vk in vertices {
            let p = self.vertex_point(vk)?;
            lo = lo.inf(&p);
            hi = hi.sup(&p);
        }
        Some((lo, hi))
    }

    /// Classifies `point` against a closed cell.
    ///
    /// A point within `tolerance` of any face is [`PointClass::OnBoundary`];
    /// otherwise a ray cast decides by crossing parity.
    pub fn classify_point(
        &self,
        key: CellKey,
        point: &Point3<f64>,
        tolerance: f64,
    ) -> Option<PointClass> {
        let triangles = self.cell_triangles(key)?;

        if triangles
            .iter()
            .any(|(_, [a, b, c])| point_triangle_distance(point, a, b, c) <= tolerance)
        {
            return Some(PointClass::OnBoundary);
        }

        // Skewed so the ray does not graze axis-aligned edges.
        let dir = Vector3::new(1.0, 1e-7, 1e-8);
        let crossings = triangles
            .iter()
            .filter(|(_, [a, b, c])| ray_hits_triangle(point, &dir, a, b, c))
            .count();

        Some(if crossings % 2 == 1 {
            PointClass::Inside
        } else {
            PointClass::Outside
        })
    }

    /// Plain ray-parity containment, no boundary band.
    pub fn cell_contains(&self, key: CellKey, point: &Point3<f64>) -> Option<bool> {
        Some(self.classify_point(key, point, 0.0)? != PointClass::Outside)
    }

    /// `true` only for points strictly inside, boundary band excluded.
    pub fn cell_contains_exclusive(
        &self,
        key: CellKey,
        point: &Point3<f64>,
        tolerance: f64,
    ) -> Option<bool> {
        Some(self.classify_point(key, point, tolerance)? == PointClass::Inside)
    }

    /// Orientation fix per shell face: `true` where the face must be read
    /// reversed to agree with the first face.
    ///
    /// Two faces meeting at an edge agree when they walk it in opposite
    /// directions.
    pub fn shell_orientation(&self, key: ShellKey) -> Option<Vec<bool>> {
        let faces = self.shell_faces(key)?;
        let loops: Vec<Vec<VertexKey>> = faces
            .iter()
            .map(|&fk| self.face_vertices(fk))
            .collect::<Option<_>>()?;

        let mut uses: rustc_hash::FxHashMap<(VertexKey, VertexKey), Vec<(usize, bool)>> =
            rustc_hash::FxHashMap::default();
        for (i, lp) in loops.iter().enumerate() {
            for (a, b) in directed_edges(lp) {
                let forward = a < b;
                let undirected = if forward { (a, b) } else { (b, a) };
                uses.entry(undirected).or_default().push((i, forward));
            }
        }

        let mut flips: Vec<Option<bool>> = vec![None; loops.len()];
        for seed in 0..loops.len() {
            if flips[seed].is_some() {
                continue;
            }
            flips[seed] = Some(false);
            let mut stack = vec![seed];
            while let Some(i) = stack.pop() {
                let flip_i = flips[i].unwrap_or(false);
                for (a, b) in directed_edges(&loops[i]) {
                    let forward = a < b;
                    let undirected = if forward { (a, b) } else { (b, a) };
                    for &(j, forward_j) in uses.get(&undirected).into_iter().flatten() {
                        if flips[j].is_none() {
                            flips[j] = Some(if forward_j == forward { !flip_i } else { flip_i });
                            stack.push(j);
                        }
                    }
                }
            }
        }

        Some(flips.into_iter().map(|f| f.unwrap_or(false)).collect())
    }
}

fn directed_edges(lp: &[VertexKey]) -> impl Iterator<Item = (VertexKey, VertexKey)> + '_ {
    (0..lp.len()).map(move |i| (lp[i], lp[(i + 1) % lp.len()]))
}

/// Unnormalized Newell vector; its length is twice the polygon area.
pub fn newell(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut n = Vector3::zeros();
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n
}

fn mean(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Drops the coordinate in which the normal is largest.
fn projection_axes(normal: &Vector3<f64>) -> (usize, usize) {
    let (x, y, z) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    if z >= x && z >= y {
        (0, 1)
    } else if y >= x {
        (0, 2)
    } else {
        (1, 2)
    }
}

/// Möller–Trumbore, counting only hits in front of the origin.
fn ray_hits_triangle(
    origin: &Point3<f64>,
    dir: &Vector3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> bool {
    let e1 = b - a;
    let e2 = c - a;
    let h = dir.cross(&e2);
    let det = e1.dot(&h);
    if det.abs() < 1e-12 {
        return false;
    }

    let inv = 1.0 / det;
    let s = origin - a;
    let u = inv * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return false;
    }

    let q = s.cross(&e1);
    let v = inv * dir.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return false;
    }

    inv * e2.dot(&q) > 1e-12
}

/// Distance from `p` to the closest point of triangle `abc`.
fn point_triangle_distance(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return ap.norm();
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return bp.norm();
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let t = d1 / (d1 - d3);
        return (p - (a + ab * t)).norm();
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return cp.norm();
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let t = d2 / (d2 - d6);
        return (p - (a + ac * t)).norm();
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (p - (b + (c - b) * t)).norm();
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    (p - (a + ab * v + ac * w)).norm()
}
