// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hash grid used to weld coincident vertices while sewing faces.

use rustc_hash::FxHashMap;

use crate::arena::TopologyArena;
use crate::keys::VertexKey;

type GridCell = (i64, i64, i64);

/// Buckets vertex keys by a uniform cubic grid.
///
/// Lookups scan every bucket within `ceil(tolerance / cell_size)` steps of the
/// query point, so a tolerance larger than the cell size still finds all
/// candidates.
#[derive(Debug)]
pub struct VertexGrid {
    cell_size: f64,
    buckets: FxHashMap<GridCell, Vec<VertexKey>>,
}

impl VertexGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(1e-10),
            buckets: FxHashMap::default(),
        }
    }

    /// Indexes every live vertex of `arena`.
    pub fn from_arena(arena: &TopologyArena, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (key, v) in arena.vertices.iter() {
            grid.insert(key, [v.x, v.y, v.z]);
        }
        grid
    }

    pub fn insert(&mut self, key: VertexKey, p: [f64; 3]) {
        let cell = self.cell_of(p);
        self.buckets.entry(cell).or_default().push(key);
    }

    /// Returns the closest indexed vertex within `tolerance` of `p`.
    pub fn nearest(&self, arena: &TopologyArena, p: [f64; 3], tolerance: f64) -> Option<VertexKey> {
        let reach = (tolerance / self.cell_size).ceil().max(1.0) as i64;
        let (cx, cy, cz) = self.cell_of(p);
        let tol_sq = tolerance * tolerance;

        let mut best: Option<(VertexKey, f64)> = None;
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                for dz in -reach..=reach {
                    let Some(keys) = self.buckets.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &vk in keys {
                        let Some(q) = arena.vertex_coords(vk) else {
                            continue;
                        };
                        let d = dist_sq(p, q);
                        if d <= tol_sq && best.map_or(true, |(_, b)| d < b) {
                            best = Some((vk, d));
                        }
                    }
                }
            }
        }

        best.map(|(k, _)| k)
    }

    fn cell_of(&self, p: [f64; 3]) -> GridCell {
        (
            (p[0] / self.cell_size).floor() as i64,
            (p[1] / self.cell_size).floor() as i64,
            (p[2] / self.cell_size).floor() as i64,
        )
    }
}

fn dist_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

impl TopologyArena {
    /// Reuses a vertex within `tolerance` of `p` or creates one.
    pub fn weld_vertex(&mut self, grid: &mut VertexGrid, p: [f64; 3], tolerance: f64) -> VertexKey {
        if let Some(existing) = grid.nearest(self, p, tolerance) {
            return existing;
        }

        let key = self.add_vertex(p[0], p[1], p[2]);
        grid.insert(key, p);
        key
    }
}
