//! Per-triangle temperature, moisture and orographic rainfall.
//!
//! Temperature falls off with latitude and altitude. Moisture starts
//! saturated over water and is carried inland by a sweep in wind order:
//! each triangle takes a share of its upwind neighbors' moisture, rains
//! some of it out when the air rises, and loses the rest to rain shadow
//! behind steep slopes. The sweep is strictly sequential; its causal
//! order is the projection of centroids onto the wind vector.

use log::debug;

use crate::geometry::Point;
use crate::mesh::TriMesh;
use crate::noisefield::NoiseField;

/// Configuration for the climate stage.
#[derive(Debug, Clone)]
pub struct ClimateConfig {
    /// Map height in pixels, for the latitude mapping.
    pub height: f64,
    pub sea_level: f64,
    /// Prevailing wind direction in degrees.
    pub wind_angle_deg: f64,
    pub raininess: f64,
    pub rain_shadow: f64,
    pub evaporation: f64,
    pub seed: String,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            height: 512.0,
            sea_level: 0.4,
            wind_angle_deg: 225.0,
            raininess: 1.0,
            rain_shadow: 1.0,
            evaporation: 1.0,
            seed: "fantasy".to_string(),
        }
    }
}

/// Per-triangle climate fields, each in [0, 1].
#[derive(Debug, Clone)]
pub struct Climate {
    pub temperature: Vec<f64>,
    pub moisture: Vec<f64>,
    pub rainfall: Vec<f64>,
}

/// Compute temperature, moisture and rainfall for every triangle.
pub fn generate_climate(mesh: &TriMesh, elevation: &[f64], config: &ClimateConfig) -> Climate {
    let temperature = compute_temperature(mesh, elevation, config);
    let (moisture, rainfall) = propagate_moisture(mesh, elevation, config);
    Climate { temperature, moisture, rainfall }
}

/// Latitude gradient with altitude lapse; oceans are tempered toward 0.2.
fn compute_temperature(mesh: &TriMesh, elevation: &[f64], config: &ClimateConfig) -> Vec<f64> {
    let perturb = NoiseField::new(&config.seed, "-temperature", 0.01);

    let mut temperature = Vec::with_capacity(mesh.len());
    for t in 0..mesh.len() {
        let c = mesh.centroid(t);
        let ny = c.y / config.height;
        let latitude = (ny - 0.5).abs() * 2.0;

        let mut temp = 1.0 - latitude.powf(1.2);
        temp -= 0.6 * (elevation[t] - config.sea_level).max(0.0);
        if elevation[t] < config.sea_level {
            temp = 0.8 * temp + 0.2;
        }
        temp += perturb.sample(c.x, c.y) * 0.05;
        temperature.push(temp.clamp(0.0, 1.0));
    }
    temperature
}

/// Triangle indices sorted upwind-first: ascending projection of the
/// centroid onto the wind vector, ties broken by index.
pub fn wind_order(mesh: &TriMesh, wind_angle_deg: f64) -> Vec<usize> {
    let theta = wind_angle_deg.to_radians();
    let wind = Point::new(theta.cos(), theta.sin());

    let mut order: Vec<usize> = (0..mesh.len()).collect();
    order.sort_by(|&a, &b| {
        let ka = mesh.centroid(a).dot(&wind);
        let kb = mesh.centroid(b).dot(&wind);
        ka.partial_cmp(&kb)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });
    order
}

fn propagate_moisture(
    mesh: &TriMesh,
    elevation: &[f64],
    config: &ClimateConfig,
) -> (Vec<f64>, Vec<f64>) {
    let theta = config.wind_angle_deg.to_radians();
    let wind = Point::new(theta.cos(), theta.sin());
    let turb_x = NoiseField::new(&config.seed, "-wind-x", 0.005);
    let turb_y = NoiseField::new(&config.seed, "-wind-y", 0.005);

    let mut moisture: Vec<f64> = elevation
        .iter()
        .map(|&e| if e < config.sea_level { 1.0 } else { 0.1 })
        .collect();
    let mut rainfall = vec![0.0; mesh.len()];

    let order = wind_order(mesh, config.wind_angle_deg);
    for &t in &order {
        // Deep ocean and the map rim neither gain nor lose moisture.
        if mesh.is_boundary(t) || elevation[t] < config.sea_level - 0.1 {
            continue;
        }
        let c = mesh.centroid(t);

        // Locally turbulent wind, renormalized to a unit vector.
        let local = (wind
            + Point::new(turb_x.sample(c.x, c.y) * 0.2, turb_y.sample(c.x, c.y) * 0.2))
        .normalize();
        let local = if local == Point::ZERO { wind } else { local };

        for u in mesh.neighbors_of(t) {
            let upwind = (c - mesh.centroid(u)).dot(&local) > 0.0;
            if !upwind {
                continue;
            }
            moisture[t] += 0.2 * moisture[u];

            let dh = elevation[t] - elevation[u];
            if dh > 0.0 {
                // Rising air rains out over land, less over shallows.
                let surface = if elevation[t] >= config.sea_level { 1.0 } else { 0.3 };
                rainfall[t] += moisture[u] * config.raininess * (5.0 * dh).min(1.0) * surface;
                if dh > 0.1 {
                    moisture[t] -= moisture[u] * (config.rain_shadow * 2.0 * dh).min(0.9);
                }
            }
        }
        moisture[t] = moisture[t].clamp(0.0, 1.0);

        if elevation[t] < config.sea_level {
            moisture[t] = 1.0;
        } else {
            moisture[t] = (moisture[t] + rainfall[t] * config.evaporation * 0.3).min(1.0);
        }
    }

    // Normalize rainfall so the wettest triangle reads 1.0.
    let max = rainfall.iter().copied().fold(0.0f64, f64::max);
    if max > 0.0 {
        for r in rainfall.iter_mut() {
            *r /= max;
        }
    }

    debug!(
        "climate: rainfall max {:.3}, mean moisture {:.3}",
        max,
        moisture.iter().sum::<f64>() / moisture.len().max(1) as f64
    );

    (moisture, rainfall)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_tri_mesh;
    use crate::pointgen::{generate_points, PointGeneratorConfig};
    use crate::terrain::{generate_elevation, TerrainConfig};

    fn test_world(seed: &str) -> (TriMesh, Vec<f64>, ClimateConfig) {
        let (w, h) = (300.0, 200.0);
        let points = generate_points(&PointGeneratorConfig {
            width: w,
            height: h,
            seed: seed.to_string(),
            ..Default::default()
        });
        let mesh = build_tri_mesh(&points.points).unwrap();
        let elevation = generate_elevation(
            &mesh,
            &TerrainConfig {
                width: w,
                height: h,
                seed: seed.to_string(),
                ..Default::default()
            },
        );
        let config = ClimateConfig {
            height: h,
            seed: seed.to_string(),
            ..Default::default()
        };
        (mesh, elevation, config)
    }

    #[test]
    fn test_fields_in_range() {
        let (mesh, elevation, config) = test_world("alpha");
        let climate = generate_climate(&mesh, &elevation, &config);
        assert_eq!(climate.temperature.len(), mesh.len());
        for t in 0..mesh.len() {
            assert!((0.0..=1.0).contains(&climate.temperature[t]));
            assert!((0.0..=1.0).contains(&climate.moisture[t]));
            assert!((0.0..=1.0).contains(&climate.rainfall[t]));
        }
    }

    #[test]
    fn test_rainfall_normalized() {
        let (mesh, elevation, config) = test_world("alpha");
        let climate = generate_climate(&mesh, &elevation, &config);
        let max = climate.rainfall.iter().copied().fold(0.0f64, f64::max);
        assert!(max == 0.0 || max == 1.0, "rainfall max should be 0 or 1, got {max}");
    }

    #[test]
    fn test_water_stays_saturated() {
        let (mesh, elevation, config) = test_world("alpha");
        let climate = generate_climate(&mesh, &elevation, &config);
        for t in 0..mesh.len() {
            if elevation[t] < config.sea_level {
                assert_eq!(climate.moisture[t], 1.0);
            }
        }
    }

    #[test]
    fn test_equator_warmer_than_poles() {
        let (mesh, elevation, config) = test_world("alpha");
        let climate = generate_climate(&mesh, &elevation, &config);

        let mid = config.height / 2.0;
        let equator = (0..mesh.len())
            .min_by(|&a, &b| {
                let da = (mesh.centroid(a).y - mid).abs();
                let db = (mesh.centroid(b).y - mid).abs();
                da.partial_cmp(&db).unwrap()
            })
            .unwrap();
        let pole = (0..mesh.len())
            .min_by(|&a, &b| {
                mesh.centroid(a).y.partial_cmp(&mesh.centroid(b).y).unwrap()
            })
            .unwrap();
        assert!(climate.temperature[equator] > climate.temperature[pole]);
    }

    #[test]
    fn test_wind_order_is_sorted_projection() {
        let (mesh, _, _) = test_world("alpha");
        let order = wind_order(&mesh, 90.0);
        assert_eq!(order.len(), mesh.len());
        for pair in order.windows(2) {
            assert!(mesh.centroid(pair[0]).y <= mesh.centroid(pair[1]).y);
        }
    }

    #[test]
    fn test_deterministic_climate() {
        let (mesh, elevation, config) = test_world("alpha");
        let a = generate_climate(&mesh, &elevation, &config);
        let b = generate_climate(&mesh, &elevation, &config);
        assert_eq!(a.temperature, b.temperature);
        assert_eq!(a.moisture, b.moisture);
        assert_eq!(a.rainfall, b.rainfall);
    }
}
