//! Unified configuration for map generation.
//!
//! All tunable parameters across all pipeline stages are centralized
//! here; `generate` validates the record up front and derives the
//! per-stage configs from it.

use serde::{Deserialize, Serialize};

use crate::error::GenError;

/// Complete configuration for one `generate` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    // ===== Identity =====
    /// Seed string; all randomness derives from it.
    pub seed: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,

    // ===== Sea and continent shape =====
    /// Elevation below which a cell is water, in [0.1, 0.7].
    pub sea_level: f64,
    /// Continent-mask values at or below this become open ocean, in [0, 1].
    pub ocean_ratio: f64,
    /// Number of minor islands per 0.1 step (>= 0).
    pub island_frequency: f64,

    // ===== Terrain =====
    /// Point density multiplier (> 0); higher means smaller cells.
    pub biome_density: f64,
    /// Probability scale for mountain placement, in [0, 1].
    pub mountain_frequency: f64,
    /// Peak height contribution, in [0.1, 1].
    pub mountain_height: f64,
    /// Anisotropy of mountain contours, in [0, 1].
    pub jaggedness: f64,
    /// Grid jitter as a fraction of the cell size, in [0, 0.5].
    pub point_deviation: f64,

    // ===== Climate =====
    /// Prevailing wind direction in degrees, [0, 360).
    pub wind_angle_deg: f64,
    /// Orographic rainfall scale, in [0, 2].
    pub raininess: f64,
    /// Downwind moisture depletion scale, in [0, 2].
    pub rain_shadow: f64,
    /// Moisture recovered from fallen rain, in [0, 2].
    pub evaporation: f64,

    // ===== Rivers =====
    /// Global flow scale; 0 disables rivers entirely.
    pub rivers: f64,
    /// Minimum accumulated flow for a river source.
    pub river_min_flow: f64,
    /// Painted river width multiplier.
    pub river_width: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            seed: "fantasy".to_string(),
            width: 512,
            height: 512,

            sea_level: 0.4,
            ocean_ratio: 0.3,
            island_frequency: 1.0,

            biome_density: 1.0,
            mountain_frequency: 0.5,
            mountain_height: 0.7,
            jaggedness: 0.5,
            point_deviation: 0.3,

            wind_angle_deg: 225.0,
            raininess: 1.0,
            rain_shadow: 1.0,
            evaporation: 1.0,

            rivers: 1.0,
            river_min_flow: 0.1,
            river_width: 1.0,
        }
    }
}

impl MapConfig {
    /// Create a config with a custom seed and defaults elsewhere.
    pub fn with_seed(seed: &str) -> Self {
        Self { seed: seed.to_string(), ..Default::default() }
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), GenError> {
        fn bad(field: &'static str, value: impl ToString, expected: &'static str) -> GenError {
            GenError::InvalidConfig { field, value: value.to_string(), expected }
        }

        if self.seed.is_empty() {
            return Err(bad("seed", "\"\"", "non-empty string"));
        }
        if self.width == 0 {
            return Err(bad("width", self.width, "positive"));
        }
        if self.height == 0 {
            return Err(bad("height", self.height, "positive"));
        }
        if !(0.1..=0.7).contains(&self.sea_level) {
            return Err(bad("sea_level", self.sea_level, "in [0.1, 0.7]"));
        }
        if !(0.0..=1.0).contains(&self.ocean_ratio) {
            return Err(bad("ocean_ratio", self.ocean_ratio, "in [0, 1]"));
        }
        if !self.island_frequency.is_finite() || self.island_frequency < 0.0 {
            return Err(bad("island_frequency", self.island_frequency, ">= 0"));
        }
        if !self.biome_density.is_finite() || self.biome_density <= 0.0 {
            return Err(bad("biome_density", self.biome_density, "> 0"));
        }
        if !(0.0..=1.0).contains(&self.mountain_frequency) {
            return Err(bad("mountain_frequency", self.mountain_frequency, "in [0, 1]"));
        }
        if !(0.1..=1.0).contains(&self.mountain_height) {
            return Err(bad("mountain_height", self.mountain_height, "in [0.1, 1]"));
        }
        if !(0.0..=1.0).contains(&self.jaggedness) {
            return Err(bad("jaggedness", self.jaggedness, "in [0, 1]"));
        }
        if !(0.0..=0.5).contains(&self.point_deviation) {
            return Err(bad("point_deviation", self.point_deviation, "in [0, 0.5]"));
        }
        if !(0.0..360.0).contains(&self.wind_angle_deg) {
            return Err(bad("wind_angle_deg", self.wind_angle_deg, "in [0, 360)"));
        }
        if !(0.0..=2.0).contains(&self.raininess) {
            return Err(bad("raininess", self.raininess, "in [0, 2]"));
        }
        if !(0.0..=2.0).contains(&self.rain_shadow) {
            return Err(bad("rain_shadow", self.rain_shadow, "in [0, 2]"));
        }
        if !(0.0..=2.0).contains(&self.evaporation) {
            return Err(bad("evaporation", self.evaporation, "in [0, 2]"));
        }
        if !self.rivers.is_finite() || self.rivers < 0.0 {
            return Err(bad("rivers", self.rivers, ">= 0"));
        }
        if !self.river_min_flow.is_finite() || self.river_min_flow < 0.0 {
            return Err(bad("river_min_flow", self.river_min_flow, ">= 0"));
        }
        if !self.river_width.is_finite() || self.river_width < 0.0 {
            return Err(bad("river_width", self.river_width, ">= 0"));
        }
        Ok(())
    }
}

/// Presets for common map styles.
pub mod presets {
    use super::MapConfig;

    /// Many small islands, little high ground.
    pub fn archipelago(seed: &str) -> MapConfig {
        MapConfig {
            seed: seed.to_string(),
            island_frequency: 3.0,
            ocean_ratio: 0.45,
            mountain_frequency: 0.2,
            mountain_height: 0.4,
            ..Default::default()
        }
    }

    /// Tall jagged ranges with strong rain shadow.
    pub fn alpine(seed: &str) -> MapConfig {
        MapConfig {
            seed: seed.to_string(),
            mountain_frequency: 0.9,
            mountain_height: 1.0,
            jaggedness: 0.8,
            rain_shadow: 1.6,
            ..Default::default()
        }
    }

    /// Dry continent with few, weak rivers.
    pub fn arid(seed: &str) -> MapConfig {
        MapConfig {
            seed: seed.to_string(),
            raininess: 0.3,
            evaporation: 0.4,
            rivers: 0.5,
            river_min_flow: 0.2,
            ..Default::default()
        }
    }
}
