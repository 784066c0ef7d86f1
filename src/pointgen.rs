//! Point sampling for the mesh.
//!
//! The rectangle is covered by boundary points along the four edges and
//! a jittered interior grid. Interior points whose local noise marks
//! them as ridge territory are also recorded as mountain candidates.

use log::debug;
use rand::Rng;

use crate::geometry::Point;
use crate::noisefield::NoiseField;
use crate::rng::Xorshift32;

/// Configuration for point generation.
#[derive(Debug, Clone)]
pub struct PointGeneratorConfig {
    /// Map width in pixels.
    pub width: f64,
    /// Map height in pixels.
    pub height: f64,
    /// Point density multiplier; higher means smaller cells.
    pub biome_density: f64,
    /// Jitter as a fraction of the cell size, in [0, 0.5].
    pub point_deviation: f64,
    /// Probability that a ridge-territory point becomes a candidate.
    pub mountain_frequency: f64,
    /// Seed string for the jitter and candidate streams.
    pub seed: String,
}

impl Default for PointGeneratorConfig {
    fn default() -> Self {
        Self {
            width: 512.0,
            height: 512.0,
            biome_density: 1.0,
            point_deviation: 0.3,
            mountain_frequency: 0.5,
            seed: "fantasy".to_string(),
        }
    }
}

/// Sampled points plus the mountain-candidate subset.
#[derive(Debug, Clone)]
pub struct PointSet {
    pub points: Vec<Point>,
    pub mountain_candidates: Vec<Point>,
}

/// Grid spacing derived from the density multiplier, clamped so a huge
/// density cannot explode the triangle count.
pub fn cell_size(biome_density: f64) -> f64 {
    (30.0 / biome_density).sqrt().max(2.0)
}

/// Generate boundary and jittered interior points.
pub fn generate_points(config: &PointGeneratorConfig) -> PointSet {
    let (w, h) = (config.width, config.height);
    let cell = cell_size(config.biome_density);

    let mut points = Vec::new();
    push_boundary_points(&mut points, w, h, cell / 2.0);
    let num_boundary = points.len();

    let mut jitter_rng = Xorshift32::stream(&config.seed, "-points");
    let mut candidate_rng = Xorshift32::stream(&config.seed, "-mtn");
    let ridge_a = NoiseField::with_amplitude(&config.seed, "-mtn-a", 0.01, 2.0);
    let ridge_b = NoiseField::with_amplitude(&config.seed, "-mtn-b", 0.013, 2.0);

    let mut mountain_candidates = Vec::new();
    let max_jitter = cell * config.point_deviation;
    let half = cell / 2.0;

    let mut y = cell;
    while y < h - half {
        let mut x = cell;
        while x < w - half {
            let jx = if max_jitter > 0.0 { jitter_rng.gen_range(-max_jitter..max_jitter) } else { 0.0 };
            let jy = if max_jitter > 0.0 { jitter_rng.gen_range(-max_jitter..max_jitter) } else { 0.0 };
            let p = Point::new(
                (x + jx).clamp(half, w - half),
                (y + jy).clamp(half, h - half),
            );
            points.push(p);

            let ridge = ridge_a.sample01(p.x, p.y) * ridge_b.sample01(p.x, p.y);
            if ridge > 0.7 && candidate_rng.next_f64() < config.mountain_frequency {
                mountain_candidates.push(p);
            }

            x += cell;
        }
        y += cell;
    }

    debug!(
        "sampled {} points ({} boundary, {} interior), {} mountain candidates",
        points.len(),
        num_boundary,
        points.len() - num_boundary,
        mountain_candidates.len()
    );

    PointSet { points, mountain_candidates }
}

/// Emit boundary points along the four edges at the given spacing,
/// traversing bottom, right, top, left.
fn push_boundary_points(points: &mut Vec<Point>, w: f64, h: f64, spacing: f64) {
    let mut x = 0.0;
    while x < w {
        points.push(Point::new(x, 0.0));
        x += spacing;
    }
    let mut y = 0.0;
    while y < h {
        points.push(Point::new(w, y));
        y += spacing;
    }
    let mut x = w;
    while x > 0.0 {
        points.push(Point::new(x, h));
        x -= spacing;
    }
    let mut y = h;
    while y > 0.0 {
        points.push(Point::new(0.0, y));
        y -= spacing;
    }
}
