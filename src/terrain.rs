//! Per-triangle elevation.
//!
//! Elevation layers four contributions:
//! 1. Continent mask (radial falloff from continent/island centers,
//!    irregularized by coastline noise)
//! 2. Mountain distance field (shortest-path spread from noise-selected
//!    peaks with jagged edge weights)
//! 3. Multi-octave terrain roughness
//! 4. Large-scale water noise that forces deep-ocean basins
//!
//! The result is rescaled so the minimum maps to exactly 0 and the
//! maximum to exactly 1.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;
use rand::Rng;

use crate::geometry::{BoundingBox, Point};
use crate::mesh::TriMesh;
use crate::noisefield::{EdgeNoise, NoiseField, TerrainNoise};
use crate::rng::Xorshift32;

/// Configuration for elevation generation.
#[derive(Debug, Clone)]
pub struct TerrainConfig {
    pub width: f64,
    pub height: f64,
    /// Continent-mask values at or below this become open ocean.
    pub ocean_ratio: f64,
    /// Number of minor islands per 0.1 step.
    pub island_frequency: f64,
    /// Probability scale for peak selection.
    pub mountain_frequency: f64,
    /// Peak height contribution.
    pub mountain_height: f64,
    /// Anisotropy of the mountain distance field.
    pub jaggedness: f64,
    pub seed: String,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 512.0,
            height: 512.0,
            ocean_ratio: 0.3,
            island_frequency: 1.0,
            mountain_frequency: 0.5,
            mountain_height: 0.7,
            jaggedness: 0.5,
            seed: "fantasy".to_string(),
        }
    }
}

/// Compute the normalized per-triangle elevation field.
pub fn generate_elevation(mesh: &TriMesh, config: &TerrainConfig) -> Vec<f64> {
    let peaks = select_peaks(mesh, config);
    let mut jitter_rng = Xorshift32::stream(&config.seed, "-ridges");
    let mountain_dist = mountain_distance(mesh, &peaks, config.jaggedness, &mut jitter_rng);
    let mask = continent_mask(mesh, config);

    let terrain_noise = TerrainNoise::new(&config.seed, "-terrain", 0.003);
    let water_noise = NoiseField::new(&config.seed, "-water", 0.002);

    let mut elevation = Vec::with_capacity(mesh.len());
    for t in 0..mesh.len() {
        if mesh.is_boundary(t) {
            elevation.push(0.0);
            continue;
        }
        let c = mesh.centroid(t);
        let mountains = (1.0 - mountain_dist[t]).powi(2) * config.mountain_height * 0.5;
        let roughness = terrain_noise.sample01(c.x, c.y) * 0.3;
        let mut e = mask[t] * 0.6 + mountains + roughness;

        let wn = water_noise.sample01(c.x, c.y);
        if wn < 0.3 {
            e *= wn * 3.0;
        }
        elevation.push(e);
    }

    normalize(&mut elevation);
    debug!("terrain: {} peaks over {} triangles", peaks.len(), mesh.len());
    elevation
}

/// Select mountain peak triangles: ridge-noise product over 0.7,
/// bounded by a seeded draw against `mountain_frequency * 0.1`.
fn select_peaks(mesh: &TriMesh, config: &TerrainConfig) -> Vec<usize> {
    let ridge_a = NoiseField::with_amplitude(&config.seed, "-peaks-a", 0.01, 2.0);
    let ridge_b = NoiseField::with_amplitude(&config.seed, "-peaks-b", 0.013, 2.0);
    let mut rng = Xorshift32::stream(&config.seed, "-peaks");

    let mut peaks = Vec::new();
    for t in 0..mesh.len() {
        if mesh.is_boundary(t) {
            continue;
        }
        let c = mesh.centroid(t);
        let ridge = ridge_a.sample01(c.x, c.y) * ridge_b.sample01(c.x, c.y);
        if ridge > 0.7 && rng.next_f64() < config.mountain_frequency * 0.1 {
            peaks.push(t);
        }
    }
    peaks
}

#[derive(Clone, Copy, Debug)]
struct HeapItem {
    dist: f64,
    tri: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist && self.tri == other.tri
    }
}

impl Eq for HeapItem {}

// Min-heap by distance via reversed ordering; ties break on the lower
// triangle index so traversal order is reproducible.
impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.tri.cmp(&self.tri))
    }
}

/// Multi-source shortest-path distance from the peak set, normalized to
/// [0, 1]. Unreachable triangles (or all of them, when no peaks exist)
/// take distance 1.0.
fn mountain_distance(
    mesh: &TriMesh,
    peaks: &[usize],
    jaggedness: f64,
    rng: &mut Xorshift32,
) -> Vec<f64> {
    let n = mesh.len();
    if peaks.is_empty() {
        return vec![1.0; n];
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut heap = BinaryHeap::new();
    for &p in peaks {
        dist[p] = 0.0;
        heap.push(HeapItem { dist: 0.0, tri: p });
    }

    while let Some(HeapItem { dist: d, tri: t }) = heap.pop() {
        if d > dist[t] {
            continue;
        }
        for u in mesh.neighbors_of(t) {
            let step = mesh.centroid(t).distance(&mesh.centroid(u));
            let eps = (rng.next_f64() - 0.5) * jaggedness * 0.2;
            let next = d + step * (1.0 + eps);
            if next < dist[u] {
                dist[u] = next;
                heap.push(HeapItem { dist: next, tri: u });
            }
        }
    }

    let max = dist
        .iter()
        .copied()
        .filter(|d| d.is_finite())
        .fold(0.0f64, f64::max);

    dist.into_iter()
        .map(|d| {
            if !d.is_finite() {
                1.0
            } else if max > 0.0 {
                d / max
            } else {
                0.0
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct LandMass {
    center: Point,
    size: f64,
}

/// Continent mask in [0, 1]: radial falloff from a handful of continent
/// centers plus minor islands, with coastline noise; values at or below
/// `ocean_ratio` are clamped to open ocean.
fn continent_mask(mesh: &TriMesh, config: &TerrainConfig) -> Vec<f64> {
    let (w, h) = (config.width, config.height);
    let mut rng = Xorshift32::stream(&config.seed, "-continents");

    let num_continents = (((w * h).sqrt() / 300.0).floor() as usize).clamp(1, 3);
    let inset = BoundingBox::new(0.0, 0.0, w, h).inset(0.15);

    let mut masses = Vec::new();
    for _ in 0..num_continents {
        masses.push(LandMass {
            center: Point::new(
                rng.gen_range(inset.min.x..inset.max.x),
                rng.gen_range(inset.min.y..inset.max.y),
            ),
            size: rng.gen_range(0.5..1.0),
        });
    }
    let num_islands = (config.island_frequency * 10.0).floor() as usize;
    for _ in 0..num_islands {
        masses.push(LandMass {
            center: Point::new(rng.gen_range(0.0..w), rng.gen_range(0.0..h)),
            size: rng.gen_range(0.1..0.3),
        });
    }

    let stretch = NoiseField::new(&config.seed, "-continent-shape", 0.004);
    let edge = EdgeNoise::new(&config.seed, "-coastline", 0.008);

    let mut mask = Vec::with_capacity(mesh.len());
    for t in 0..mesh.len() {
        let c = mesh.centroid(t);
        let mut dmin = f64::INFINITY;
        for m in &masses {
            let dx = (c.x - m.center.x) / (m.size * w * 0.5);
            let dy = (c.y - m.center.y) / (m.size * h * 0.5);
            dmin = dmin.min((dx * dx + dy * dy).sqrt());
        }
        // Stretch factor stays positive: noise is in [-1, 1].
        dmin *= 1.0 + 0.25 * stretch.sample(c.x, c.y);

        let v = (1.0 - dmin + edge.sample(c.x, c.y)).max(0.0).powf(1.5);
        mask.push(if v <= config.ocean_ratio { 0.0 } else { v });
    }
    mask
}

/// Rescale so the minimum maps to 0 and the maximum to 1.
fn normalize(elevation: &mut [f64]) {
    let min = elevation.iter().copied().fold(f64::INFINITY, f64::min);
    let max = elevation.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range > 0.0 {
        for e in elevation.iter_mut() {
            *e = (*e - min) / range;
        }
    } else {
        elevation.fill(0.0);
    }
}
