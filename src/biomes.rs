//! Biome classification from elevation, moisture and temperature.
//!
//! Water is split by depth below sea level; land follows a
//! Whittaker-style cascade over height bands, with a coastal sand
//! override next to the sea.

use serde::{Deserialize, Serialize};

use crate::climate::Climate;
use crate::mesh::TriMesh;

/// Discrete climate-plus-terrain classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Biome {
    #[default]
    Ocean,
    DeepOcean,
    ShallowOcean,
    ShallowWater,
    Beach,
    Snow,
    Tundra,
    Mountain,
    Taiga,
    Shrubland,
    TemperateDesert,
    DeciduousForest,
    RainForest,
    Desert,
    Grassland,
    SubtropicalDesert,
    TropicalSeasonalForest,
    TropicalRainForest,
}

impl Biome {
    /// True for the open-water classes (beaches are land).
    pub fn is_water(&self) -> bool {
        matches!(
            self,
            Biome::Ocean | Biome::DeepOcean | Biome::ShallowOcean | Biome::ShallowWater
        )
    }
}

/// Classify every triangle.
pub fn classify_biomes(
    mesh: &TriMesh,
    elevation: &[f64],
    climate: &Climate,
    sea_level: f64,
) -> Vec<Biome> {
    let mut biomes = Vec::with_capacity(mesh.len());
    for t in 0..mesh.len() {
        if mesh.is_boundary(t) {
            biomes.push(Biome::Ocean);
            continue;
        }
        let e = elevation[t];
        if e < sea_level {
            biomes.push(water_biome(e, sea_level));
            continue;
        }

        let h = e - sea_level;
        let mut biome = land_biome(h, climate.moisture[t], climate.temperature[t]);

        // Coastal sand: low land touching the sea.
        if h < 0.05 {
            let coastal = mesh.neighbors_of(t).any(|u| elevation[u] < sea_level);
            if coastal {
                biome = Biome::Beach;
            }
        }
        biomes.push(biome);
    }
    biomes
}

/// Split water by relative depth below sea level.
fn water_biome(elevation: f64, sea_level: f64) -> Biome {
    let depth = (sea_level - elevation) / sea_level;
    if depth < 0.1 {
        Biome::ShallowWater
    } else if depth < 0.3 {
        Biome::ShallowOcean
    } else if depth < 0.7 {
        Biome::Ocean
    } else {
        Biome::DeepOcean
    }
}

/// Whittaker-style cascade over height above sea level `h`,
/// moisture `m` and temperature `t`.
fn land_biome(h: f64, m: f64, t: f64) -> Biome {
    if h > 0.7 {
        return if t < 0.2 {
            Biome::Snow
        } else if t < 0.4 {
            Biome::Tundra
        } else {
            Biome::Mountain
        };
    }

    if h > 0.4 {
        return if t < 0.2 {
            Biome::Tundra
        } else if t < 0.5 {
            if m < 0.4 { Biome::Shrubland } else { Biome::Taiga }
        } else if m < 0.4 {
            Biome::TemperateDesert
        } else if m < 0.7 {
            Biome::DeciduousForest
        } else {
            Biome::RainForest
        };
    }

    if t < 0.2 {
        if m < 0.4 { Biome::Tundra } else { Biome::Taiga }
    } else if t < 0.6 {
        if m < 0.3 {
            Biome::Desert
        } else if m < 0.5 {
            Biome::Grassland
        } else if m < 0.7 {
            Biome::DeciduousForest
        } else {
            Biome::RainForest
        }
    } else if m < 0.3 {
        Biome::SubtropicalDesert
    } else if m < 0.5 {
        Biome::Grassland
    } else if m < 0.7 {
        Biome::TropicalSeasonalForest
    } else {
        Biome::TropicalRainForest
    }
}

/// Display color for a biome (RGB).
pub fn biome_color(biome: Biome) -> (u8, u8, u8) {
    match biome {
        Biome::DeepOcean => (38, 48, 92),
        Biome::Ocean => (52, 65, 115),
        Biome::ShallowOcean => (68, 85, 136),
        Biome::ShallowWater => (94, 120, 160),
        Biome::Beach => (194, 178, 128),
        Biome::Snow => (248, 248, 248),
        Biome::Tundra => (187, 187, 170),
        Biome::Mountain => (136, 136, 136),
        Biome::Taiga => (153, 170, 119),
        Biome::Shrubland => (136, 153, 119),
        Biome::TemperateDesert => (201, 210, 155),
        Biome::DeciduousForest => (103, 148, 89),
        Biome::RainForest => (68, 136, 85),
        Biome::Desert => (210, 195, 150),
        Biome::Grassland => (136, 170, 85),
        Biome::SubtropicalDesert => (210, 185, 139),
        Biome::TropicalSeasonalForest => (85, 153, 68),
        Biome::TropicalRainForest => (51, 119, 85),
    }
}

/// Display name for a biome.
pub fn biome_name(biome: Biome) -> &'static str {
    match biome {
        Biome::DeepOcean => "Deep Ocean",
        Biome::Ocean => "Ocean",
        Biome::ShallowOcean => "Shallow Ocean",
        Biome::ShallowWater => "Shallow Water",
        Biome::Beach => "Beach",
        Biome::Snow => "Snow",
        Biome::Tundra => "Tundra",
        Biome::Mountain => "Mountain",
        Biome::Taiga => "Taiga",
        Biome::Shrubland => "Shrubland",
        Biome::TemperateDesert => "Temperate Desert",
        Biome::DeciduousForest => "Deciduous Forest",
        Biome::RainForest => "Rain Forest",
        Biome::Desert => "Desert",
        Biome::Grassland => "Grassland",
        Biome::SubtropicalDesert => "Subtropical Desert",
        Biome::TropicalSeasonalForest => "Tropical Seasonal Forest",
        Biome::TropicalRainForest => "Tropical Rain Forest",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::{generate_climate, ClimateConfig};
    use crate::graph::build_tri_mesh;
    use crate::pointgen::{generate_points, PointGeneratorConfig};
    use crate::terrain::{generate_elevation, TerrainConfig};

    #[test]
    fn test_water_split_by_depth() {
        let s = 0.4;
        assert_eq!(water_biome(0.39, s), Biome::ShallowWater);
        assert_eq!(water_biome(0.33, s), Biome::ShallowOcean);
        assert_eq!(water_biome(0.2, s), Biome::Ocean);
        assert_eq!(water_biome(0.0, s), Biome::DeepOcean);
    }

    #[test]
    fn test_land_cascade_extremes() {
        // Peaks.
        assert_eq!(land_biome(0.8, 0.5, 0.1), Biome::Snow);
        assert_eq!(land_biome(0.8, 0.5, 0.3), Biome::Tundra);
        assert_eq!(land_biome(0.8, 0.5, 0.9), Biome::Mountain);
        // Hills.
        assert_eq!(land_biome(0.5, 0.2, 0.3), Biome::Shrubland);
        assert_eq!(land_biome(0.5, 0.8, 0.3), Biome::Taiga);
        assert_eq!(land_biome(0.5, 0.8, 0.8), Biome::RainForest);
        // Lowlands.
        assert_eq!(land_biome(0.1, 0.1, 0.4), Biome::Desert);
        assert_eq!(land_biome(0.1, 0.4, 0.4), Biome::Grassland);
        assert_eq!(land_biome(0.1, 0.9, 0.9), Biome::TropicalRainForest);
        assert_eq!(land_biome(0.1, 0.1, 0.9), Biome::SubtropicalDesert);
        assert_eq!(land_biome(0.1, 0.2, 0.1), Biome::Tundra);
        assert_eq!(land_biome(0.1, 0.8, 0.1), Biome::Taiga);
    }

    #[test]
    fn test_classification_covers_mesh() {
        let (w, h) = (300.0, 200.0);
        let points = generate_points(&PointGeneratorConfig {
            width: w,
            height: h,
            seed: "alpha".to_string(),
            ..Default::default()
        });
        let mesh = build_tri_mesh(&points.points).unwrap();
        let elevation = generate_elevation(
            &mesh,
            &TerrainConfig {
                width: w,
                height: h,
                seed: "alpha".to_string(),
                ..Default::default()
            },
        );
        let climate = generate_climate(
            &mesh,
            &elevation,
            &ClimateConfig {
                height: h,
                seed: "alpha".to_string(),
                ..Default::default()
            },
        );
        let biomes = classify_biomes(&mesh, &elevation, &climate, 0.4);
        assert_eq!(biomes.len(), mesh.len());

        for t in 0..mesh.len() {
            if mesh.is_boundary(t) {
                assert_eq!(biomes[t], Biome::Ocean);
            }
            if elevation[t] < 0.4 {
                assert!(biomes[t].is_water(), "below-sea triangle got {:?}", biomes[t]);
            }
        }
    }

    #[test]
    fn test_color_and_name_tables_cover_all_biomes() {
        let biomes = [
            Biome::Ocean, Biome::DeepOcean, Biome::ShallowOcean, Biome::ShallowWater,
            Biome::Beach, Biome::Snow, Biome::Tundra, Biome::Mountain, Biome::Taiga,
            Biome::Shrubland, Biome::TemperateDesert, Biome::DeciduousForest,
            Biome::RainForest, Biome::Desert, Biome::Grassland, Biome::SubtropicalDesert,
            Biome::TropicalSeasonalForest, Biome::TropicalRainForest,
        ];
        for biome in biomes {
            let (_r, _g, _b) = biome_color(biome);
            assert!(!biome_name(biome).is_empty());
        }
    }

    #[test]
    fn test_beach_requires_sea_neighbor() {
        let (w, h) = (300.0, 200.0);
        let points = generate_points(&PointGeneratorConfig {
            width: w,
            height: h,
            seed: "alpha".to_string(),
            ..Default::default()
        });
        let mesh = build_tri_mesh(&points.points).unwrap();
        let elevation = generate_elevation(
            &mesh,
            &TerrainConfig {
                width: w,
                height: h,
                seed: "alpha".to_string(),
                ..Default::default()
            },
        );
        let climate = generate_climate(
            &mesh,
            &elevation,
            &ClimateConfig {
                height: h,
                seed: "alpha".to_string(),
                ..Default::default()
            },
        );
        let biomes = classify_biomes(&mesh, &elevation, &climate, 0.4);
        for t in 0..mesh.len() {
            if biomes[t] == Biome::Beach {
                assert!(elevation[t] >= 0.4 && elevation[t] - 0.4 < 0.05);
                assert!(mesh.neighbors_of(t).any(|u| elevation[u] < 0.4));
            }
        }
    }
}
