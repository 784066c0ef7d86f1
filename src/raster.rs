//! Projection of per-triangle fields onto the pixel grid.
//!
//! Every pixel copies the value of the triangle with the nearest
//! centroid, found through a uniform spatial hash over 20-pixel cells.
//! Scalar grids are filled row-parallel (each row is independent, so
//! the output matches a sequential traversal bit for bit); river
//! painting blends overlapping stamps with `max` and stays sequential.

use rayon::prelude::*;

use crate::biomes::Biome;
use crate::geometry::Point;
use crate::hydrology::RiverPath;
use crate::mesh::TriMesh;

/// Side length of a spatial-hash cell in pixels.
const HASH_CELL: f64 = 20.0;

/// Configuration for rasterization.
#[derive(Debug, Clone)]
pub struct RasterConfig {
    pub width: u32,
    pub height: u32,
    /// Painted river width multiplier.
    pub river_width: f64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self { width: 512, height: 512, river_width: 1.0 }
    }
}

/// Per-triangle fields to project.
#[derive(Debug, Clone, Copy)]
pub struct RasterFields<'a> {
    pub elevation: &'a [f64],
    pub moisture: &'a [f64],
    pub temperature: &'a [f64],
    pub biomes: &'a [Biome],
}

/// The finished map: dense row-major grids, indexed `y * width + x`.
#[derive(Debug, Clone)]
pub struct MapData {
    pub width: u32,
    pub height: u32,
    /// Elevation per pixel, in [0, 1].
    pub elevation: Vec<f64>,
    /// Moisture per pixel, in [0, 1].
    pub moisture: Vec<f64>,
    /// Temperature per pixel, in [0, 1].
    pub temperature: Vec<f64>,
    /// Biome class per pixel.
    pub biomes: Vec<Biome>,
    /// River intensity per pixel, 0 where no river is painted.
    pub rivers: Vec<f64>,
}

impl MapData {
    /// Row-major index of pixel `(x, y)`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }
}

/// Project the per-triangle fields and paint the rivers.
pub fn rasterize(
    mesh: &TriMesh,
    fields: &RasterFields<'_>,
    river_paths: &[RiverPath],
    config: &RasterConfig,
) -> MapData {
    let (w, h) = (config.width as usize, config.height as usize);
    let hash = CentroidHash::build(mesh, config.width, config.height);

    let mut tri_map = vec![0usize; w * h];
    tri_map
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, slot) in row.iter_mut().enumerate() {
                let px = x as f64 + 0.5;
                let py = y as f64 + 0.5;
                *slot = hash.nearest(mesh, px, py);
            }
        });

    let elevation = tri_map.iter().map(|&t| fields.elevation[t]).collect();
    let moisture = tri_map.iter().map(|&t| fields.moisture[t]).collect();
    let temperature = tri_map.iter().map(|&t| fields.temperature[t]).collect();
    let biomes = tri_map.iter().map(|&t| fields.biomes[t]).collect();

    let mut rivers = vec![0.0; w * h];
    for path in river_paths {
        paint_river(&mut rivers, config, mesh, path);
    }

    MapData {
        width: config.width,
        height: config.height,
        elevation,
        moisture,
        temperature,
        biomes,
        rivers,
    }
}

/// Stamp a soft disk at each path triangle; the disk widens from source
/// to mouth and scales with the path's source flow.
fn paint_river(grid: &mut [f64], config: &RasterConfig, mesh: &TriMesh, path: &RiverPath) {
    let len = path.triangles.len() as f64;
    for (i, &t) in path.triangles.iter().enumerate() {
        let along = i as f64 / len;
        let radius = ((1.0 + 10.0 * path.flow * (0.2 + 0.8 * along)).ln()
            * config.river_width
            * 5.0)
            .max(1.0);
        stamp_disk(grid, config.width, config.height, mesh.centroid(t), radius);
    }
}

fn stamp_disk(grid: &mut [f64], width: u32, height: u32, center: Point, radius: f64) {
    let x0 = (center.x - radius).floor().max(0.0) as u32;
    let y0 = (center.y - radius).floor().max(0.0) as u32;
    let x1 = ((center.x + radius).ceil() as u32).min(width.saturating_sub(1));
    let y1 = ((center.y + radius).ceil() as u32).min(height.saturating_sub(1));

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 + 0.5 - center.x;
            let dy = y as f64 + 0.5 - center.y;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < radius {
                let value = (1.0 - dist / radius).powf(0.8) * radius;
                let idx = (y * width + x) as usize;
                if value > grid[idx] {
                    grid[idx] = value;
                }
            }
        }
    }
}

/// Uniform spatial hash of triangle centroids over 20-pixel cells.
struct CentroidHash {
    cols: i64,
    rows: i64,
    buckets: Vec<Vec<u32>>,
}

impl CentroidHash {
    fn build(mesh: &TriMesh, width: u32, height: u32) -> Self {
        let cols = ((width as f64 / HASH_CELL).ceil() as i64).max(1);
        let rows = ((height as f64 / HASH_CELL).ceil() as i64).max(1);
        let mut buckets = vec![Vec::new(); (cols * rows) as usize];

        for t in 0..mesh.len() {
            let c = mesh.centroid(t);
            let cx = ((c.x / HASH_CELL) as i64).clamp(0, cols - 1);
            let cy = ((c.y / HASH_CELL) as i64).clamp(0, rows - 1);
            buckets[(cy * cols + cx) as usize].push(t as u32);
        }

        Self { cols, rows, buckets }
    }

    /// Triangle with the nearest centroid: the pixel's cell and its 8
    /// neighbors first, widening the ring only when all were empty.
    fn nearest(&self, mesh: &TriMesh, x: f64, y: f64) -> usize {
        let cx = ((x / HASH_CELL) as i64).clamp(0, self.cols - 1);
        let cy = ((y / HASH_CELL) as i64).clamp(0, self.rows - 1);

        let max_radius = self.cols.max(self.rows);
        let mut radius = 1;
        loop {
            let mut best = usize::MAX;
            let mut best_d = f64::INFINITY;
            for by in (cy - radius).max(0)..=(cy + radius).min(self.rows - 1) {
                for bx in (cx - radius).max(0)..=(cx + radius).min(self.cols - 1) {
                    for &t in &self.buckets[(by * self.cols + bx) as usize] {
                        let d = mesh.centroid(t as usize).distance_sq(&Point::new(x, y));
                        if d < best_d {
                            best_d = d;
                            best = t as usize;
                        }
                    }
                }
            }
            if best != usize::MAX || radius >= max_radius {
                return best;
            }
            radius += 1;
        }
    }
}
