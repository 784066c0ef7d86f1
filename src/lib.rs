//! Procedural fantasy world map generator.
//!
//! A seed string and a handful of numeric parameters are turned into
//! dense 2-D fields (elevation, moisture, temperature, biome, river
//! intensity) ready for visualization. Generation runs on an irregular
//! triangular mesh from a Delaunay triangulation of jittered points:
//!
//! 1. Point sampling (boundary ring + jittered interior grid)
//! 2. Mesh construction (per-triangle neighbors, centroids, boundary)
//! 3. Terrain (continent mask, mountain distance field, noise)
//! 4. Climate (temperature, wind-ordered moisture, orographic rain)
//! 5. Hydrology (downslope drainage, flow accumulation, river paths)
//! 6. Biome classification and rasterization onto the pixel grid
//!
//! This implementation uses:
//! - Arena-based data structures (no `Rc<RefCell<T>>`), flat arrays
//!   indexed by triangle id or pixel
//! - Seeded randomness throughout, so equal configs yield
//!   bit-identical maps

pub mod biomes;
pub mod climate;
pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod hydrology;
pub mod mesh;
pub mod noisefield;
pub mod pointgen;
pub mod raster;
pub mod rng;
pub mod terrain;

use std::collections::HashMap;

use log::debug;

use crate::climate::ClimateConfig;
use crate::hydrology::HydrologyConfig;
use crate::pointgen::PointGeneratorConfig;
use crate::raster::{RasterConfig, RasterFields};
use crate::terrain::TerrainConfig;

pub use biomes::{biome_color, biome_name, Biome};
pub use config::MapConfig;
pub use error::GenError;
pub use raster::MapData;

/// Generate a complete map from the given configuration.
pub fn generate(config: &MapConfig) -> Result<MapData, GenError> {
    config.validate()?;
    let (w, h) = (config.width as f64, config.height as f64);

    // Stage 1: sample points.
    let points = pointgen::generate_points(&PointGeneratorConfig {
        width: w,
        height: h,
        biome_density: config.biome_density,
        point_deviation: config.point_deviation,
        mountain_frequency: config.mountain_frequency,
        seed: config.seed.clone(),
    });

    // Stage 2: build the triangle mesh.
    let mesh = graph::build_tri_mesh(&points.points)?;

    // Stage 3: terrain.
    let elevation = terrain::generate_elevation(
        &mesh,
        &TerrainConfig {
            width: w,
            height: h,
            ocean_ratio: config.ocean_ratio,
            island_frequency: config.island_frequency,
            mountain_frequency: config.mountain_frequency,
            mountain_height: config.mountain_height,
            jaggedness: config.jaggedness,
            seed: config.seed.clone(),
        },
    );

    // Stage 4: climate.
    let climate = climate::generate_climate(
        &mesh,
        &elevation,
        &ClimateConfig {
            height: h,
            sea_level: config.sea_level,
            wind_angle_deg: config.wind_angle_deg,
            raininess: config.raininess,
            rain_shadow: config.rain_shadow,
            evaporation: config.evaporation,
            seed: config.seed.clone(),
        },
    );

    // Stage 5: hydrology.
    let hydrology = hydrology::generate_hydrology(
        &mesh,
        &elevation,
        &climate.rainfall,
        &HydrologyConfig {
            sea_level: config.sea_level,
            rivers: config.rivers,
            river_min_flow: config.river_min_flow,
        },
    );

    // Stage 6: classify and rasterize.
    let biome_field = biomes::classify_biomes(&mesh, &elevation, &climate, config.sea_level);
    let map = raster::rasterize(
        &mesh,
        &RasterFields {
            elevation: &elevation,
            moisture: &climate.moisture,
            temperature: &climate.temperature,
            biomes: &biome_field,
        },
        &hydrology.rivers,
        &RasterConfig {
            width: config.width,
            height: config.height,
            river_width: config.river_width,
        },
    );

    debug!(
        "generated {}x{} map from seed {:?} ({} triangles)",
        config.width,
        config.height,
        config.seed,
        mesh.len()
    );

    Ok(map)
}

/// Statistics report for a generated map.
#[derive(Debug, Clone)]
pub struct MapStats {
    pub total_pixels: usize,
    pub water_pixels: usize,
    pub water_percentage: f64,
    pub river_pixels: usize,
    pub biome_counts: HashMap<Biome, usize>,
    pub elevation_stats: ElevationStats,
}

#[derive(Debug, Clone)]
pub struct ElevationStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub lowlands_percentage: f64,  // elevation < 0.3
    pub hills_percentage: f64,     // 0.3 <= elevation < 0.6
    pub mountains_percentage: f64, // elevation >= 0.6
}

/// Generate a statistics report for a map.
pub fn generate_map_stats(map: &MapData) -> MapStats {
    let total_pixels = map.elevation.len();
    let water_pixels = map.biomes.iter().filter(|b| b.is_water()).count();
    let river_pixels = map.rivers.iter().filter(|&&r| r > 0.0).count();

    let mut biome_counts: HashMap<Biome, usize> = HashMap::new();
    for &b in &map.biomes {
        *biome_counts.entry(b).or_insert(0) += 1;
    }

    let min = map.elevation.iter().copied().fold(f64::INFINITY, f64::min);
    let max = map.elevation.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = map.elevation.iter().sum::<f64>() / total_pixels.max(1) as f64;

    let lowlands = map.elevation.iter().filter(|&&e| e < 0.3).count();
    let hills = map.elevation.iter().filter(|&&e| (0.3..0.6).contains(&e)).count();
    let mountains = map.elevation.iter().filter(|&&e| e >= 0.6).count();
    let total = total_pixels.max(1) as f64;

    MapStats {
        total_pixels,
        water_pixels,
        water_percentage: (water_pixels as f64 / total) * 100.0,
        river_pixels,
        biome_counts,
        elevation_stats: ElevationStats {
            min,
            max,
            mean,
            lowlands_percentage: (lowlands as f64 / total) * 100.0,
            hills_percentage: (hills as f64 / total) * 100.0,
            mountains_percentage: (mountains as f64 / total) * 100.0,
        },
    }
}

/// Print a map statistics report.
pub fn print_map_report(stats: &MapStats) {
    println!("\n=== Map Generation Report ===");
    println!("Pixels: {} total", stats.total_pixels);
    println!("  - Water: {} ({:.1}%)", stats.water_pixels, stats.water_percentage);
    println!("  - River: {}", stats.river_pixels);

    println!("\nElevation Distribution:");
    println!(
        "  - Range: {:.3} to {:.3} (mean: {:.3})",
        stats.elevation_stats.min, stats.elevation_stats.max, stats.elevation_stats.mean
    );
    println!("  - Lowlands (<0.3): {:.1}%", stats.elevation_stats.lowlands_percentage);
    println!("  - Hills (0.3-0.6): {:.1}%", stats.elevation_stats.hills_percentage);
    println!("  - Mountains (>0.6): {:.1}%", stats.elevation_stats.mountains_percentage);

    println!("\nBiome Distribution:");
    let mut biomes: Vec<_> = stats.biome_counts.iter().collect();
    biomes.sort_by(|a, b| b.1.cmp(a.1));
    for (biome, count) in biomes {
        let pct = (*count as f64 / stats.total_pixels.max(1) as f64) * 100.0;
        println!("  - {}: {} ({:.1}%)", biome_name(*biome), count, pct);
    }
    println!("=============================\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: &str) -> MapConfig {
        MapConfig {
            seed: seed.to_string(),
            width: 64,
            height: 48,
            sea_level: 0.4,
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_small_map() {
        let map = generate(&small_config("alpha")).unwrap();
        assert_eq!(map.width, 64);
        assert_eq!(map.height, 48);

        let stats = generate_map_stats(&map);
        let water_fraction = stats.water_pixels as f64 / stats.total_pixels as f64;
        assert!(
            (0.1..=0.9).contains(&water_fraction),
            "water fraction {water_fraction} out of expected band"
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = small_config("alpha");
        let a = generate(&config).unwrap();
        let b = generate(&config).unwrap();
        assert_eq!(a.elevation, b.elevation);
        assert_eq!(a.moisture, b.moisture);
        assert_eq!(a.temperature, b.temperature);
        assert_eq!(a.biomes, b.biomes);
        assert_eq!(a.rivers, b.rivers);
    }

    #[test]
    fn test_output_ranges() {
        let map = generate(&small_config("alpha")).unwrap();
        for i in 0..map.elevation.len() {
            assert!((0.0..=1.0).contains(&map.elevation[i]));
            assert!((0.0..=1.0).contains(&map.moisture[i]));
            assert!((0.0..=1.0).contains(&map.temperature[i]));
            assert!(map.rivers[i] >= 0.0);
        }
    }

    #[test]
    fn test_higher_sea_level_means_more_water() {
        let low = generate(&small_config("alpha")).unwrap();
        let high = generate(&MapConfig {
            sea_level: 0.7,
            ..small_config("alpha")
        })
        .unwrap();

        let count = |map: &MapData| map.biomes.iter().filter(|b| b.is_water()).count();
        assert!(count(&high) > count(&low));
    }

    #[test]
    fn test_zero_river_scale_leaves_grid_empty() {
        let map = generate(&MapConfig {
            rivers: 0.0,
            ..small_config("alpha")
        })
        .unwrap();
        assert!(map.rivers.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_mountain_height_raises_mean_elevation() {
        let flat = generate(&MapConfig {
            seed: "alpha".to_string(),
            mountain_height: 0.1,
            ..Default::default()
        })
        .unwrap();
        let tall = generate(&MapConfig {
            seed: "alpha".to_string(),
            mountain_height: 1.0,
            ..Default::default()
        })
        .unwrap();

        let mean = |map: &MapData| map.elevation.iter().sum::<f64>() / map.elevation.len() as f64;
        assert!(mean(&tall) > mean(&flat));
    }

    #[test]
    fn test_wind_direction_shapes_moisture() {
        let east = generate(&MapConfig {
            wind_angle_deg: 0.0,
            ..small_config("alpha")
        })
        .unwrap();
        let west = generate(&MapConfig {
            wind_angle_deg: 180.0,
            ..small_config("alpha")
        })
        .unwrap();

        // Terrain ignores wind, so the elevation grids agree and land
        // pixels can be compared one-to-one.
        assert_eq!(east.elevation, west.elevation);

        let mut land = 0usize;
        let mut changed = 0usize;
        for i in 0..east.moisture.len() {
            if east.elevation[i] >= 0.4 {
                land += 1;
                if east.moisture[i] != west.moisture[i] {
                    changed += 1;
                }
            }
        }
        assert!(land > 0);
        assert!(
            changed * 2 > land,
            "only {changed} of {land} land pixels changed with reversed wind"
        );
    }

    #[test]
    fn test_seed_changes_biomes() {
        let a = generate(&MapConfig { width: 128, height: 96, ..MapConfig::with_seed("alpha") })
            .unwrap();
        let b = generate(&MapConfig { width: 128, height: 96, ..MapConfig::with_seed("beta") })
            .unwrap();
        assert_ne!(a.biomes, b.biomes);
    }

    #[test]
    fn test_invalid_config_is_typed_error() {
        let config = MapConfig { sea_level: 0.9, ..Default::default() };
        match generate(&config) {
            Err(GenError::InvalidConfig { field, .. }) => assert_eq!(field, "sea_level"),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_stats_report_consistency() {
        let map = generate(&small_config("alpha")).unwrap();
        let stats = generate_map_stats(&map);
        assert_eq!(stats.total_pixels, (64 * 48) as usize);
        assert_eq!(stats.biome_counts.values().sum::<usize>(), stats.total_pixels);
        assert!(stats.elevation_stats.min >= 0.0);
        assert!(stats.elevation_stats.max <= 1.0);
        print_map_report(&stats);
    }
}
