//! Triangle-mesh data structures.
//!
//! The generator's fundamental cell is the Delaunay triangle. All
//! references between triangles are `usize` indices into flat arrays
//! (Arena pattern, no `Rc<RefCell<T>>`); `NONE` marks a missing
//! neighbor across a boundary edge.

use crate::geometry::Point;

/// Sentinel value for "no reference".
pub const NONE: usize = usize::MAX;

/// An irregular triangular mesh with per-triangle adjacency.
#[derive(Debug, Clone, Default)]
pub struct TriMesh {
    /// Centroid of each triangle (mean of its three vertices).
    pub centroids: Vec<Point>,
    /// Neighbor triangle across each of the three edges, or `NONE`.
    pub neighbors: Vec<[usize; 3]>,
    /// True iff any edge of the triangle has no opposite triangle.
    pub boundary: Vec<bool>,
}

impl TriMesh {
    /// Number of triangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    #[inline]
    pub fn centroid(&self, t: usize) -> Point {
        self.centroids[t]
    }

    #[inline]
    pub fn is_boundary(&self, t: usize) -> bool {
        self.boundary[t]
    }

    /// Iterate the valid (non-`NONE`) neighbors of a triangle.
    pub fn neighbors_of(&self, t: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors[t].into_iter().filter(|&u| u != NONE)
    }

    /// Validate index ranges and neighbor symmetry.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.len();
        if self.neighbors.len() != n || self.boundary.len() != n {
            return Err(format!(
                "field length mismatch: {} centroids, {} neighbor rows, {} boundary flags",
                n,
                self.neighbors.len(),
                self.boundary.len()
            ));
        }

        for t in 0..n {
            let mut has_open_edge = false;
            for &u in &self.neighbors[t] {
                if u == NONE {
                    has_open_edge = true;
                    continue;
                }
                if u >= n {
                    return Err(format!("triangle {} has invalid neighbor index {}", t, u));
                }
                if !self.neighbors[u].contains(&t) {
                    return Err(format!("neighbor symmetry broken between {} and {}", t, u));
                }
            }
            if has_open_edge != self.boundary[t] {
                return Err(format!(
                    "triangle {} boundary flag {} disagrees with its edges",
                    t, self.boundary[t]
                ));
            }
        }

        Ok(())
    }
}
