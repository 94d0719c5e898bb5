//! Map generation configuration
//!
//! `MapConfig` gathers every tunable of the pipeline. It can be built from a
//! preset, loaded from a JSON file, or adjusted field by field; missing JSON
//! fields fall back to the defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::erosion::ErosionParams;
use crate::error::{MapError, Result};
use crate::geometry::Extent;
use crate::heightmap::HeightParams;
use crate::sampling::DEFAULT_RELAX_ITERATIONS;

/// Highest terrain height
pub const MAX_HEIGHT: f64 = 1000.0;
/// Lowest terrain height (symmetric with `MAX_HEIGHT`)
pub const MIN_HEIGHT: f64 = -1000.0;

// =============================================================================
// HEIGHT RANGE
// =============================================================================

/// Inclusive range every cell height and erosion value is clamped into
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightRange {
    pub min: f64,
    pub max: f64,
}

impl Default for HeightRange {
    fn default() -> Self {
        Self {
            min: MIN_HEIGHT,
            max: MAX_HEIGHT,
        }
    }
}

impl HeightRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// The range must be non-empty and contain zero, the starting value of
    /// every height and erosion accumulator.
    pub fn validate(&self) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min >= self.max {
            return Err(MapError::invalid(format!(
                "height range [{}, {}] must be finite with min < max",
                self.min, self.max
            )));
        }
        if self.min > 0.0 || self.max < 0.0 {
            return Err(MapError::invalid(format!(
                "height range [{}, {}] must contain 0",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

// =============================================================================
// PRESETS
// =============================================================================

/// Terrain style preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MapPreset {
    /// Mixed land and sea
    #[default]
    Standard,
    /// Many small, steep islands
    Archipelago,
    /// Broad landmasses with few gaps
    Continent,
}

impl MapPreset {
    pub fn all() -> &'static [Self] {
        &[Self::Standard, Self::Archipelago, Self::Continent]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Standard => "Mixed land and sea",
            Self::Archipelago => "Scattered small islands",
            Self::Continent => "Large connected landmasses",
        }
    }

    pub fn config(&self) -> MapConfig {
        let base = MapConfig::default();
        match self {
            Self::Standard => base,
            Self::Archipelago => MapConfig {
                heights: HeightParams {
                    bumps: 120,
                    min_radius: 30.0,
                    max_radius: 200.0,
                    ..base.heights
                },
                height_threshold: 150.0,
                ..base
            },
            Self::Continent => MapConfig {
                heights: HeightParams {
                    bumps: 30,
                    min_radius: 300.0,
                    max_radius: 800.0,
                    ..base.heights
                },
                height_threshold: -100.0,
                ..base
            },
        }
    }
}

impl std::fmt::Display for MapPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Archipelago => write!(f, "archipelago"),
            Self::Continent => write!(f, "continent"),
        }
    }
}

// =============================================================================
// MAP CONFIG
// =============================================================================

/// Complete set of parameters for one map generation run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Width of the generation area (map units)
    pub width: f64,
    /// Height of the generation area (map units)
    pub height: f64,
    /// Number of seed points, i.e. cells in the mesh
    pub point_count: usize,
    /// Lloyd relaxation passes applied to the seed points
    pub relax_iterations: usize,
    /// Height field synthesis
    pub heights: HeightParams,
    /// Erosion pass settings
    pub erosion: ErosionParams,
    /// Whether to run the erosion pass
    pub erode: bool,
    /// Cells with effective height above this are inside the extracted region
    pub height_threshold: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            point_count: 1000,
            relax_iterations: DEFAULT_RELAX_ITERATIONS,
            heights: HeightParams::default(),
            erosion: ErosionParams::default(),
            erode: true,
            height_threshold: 0.0,
        }
    }
}

impl MapConfig {
    /// Load a config from a JSON file. Absent fields take their default.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: MapConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }

    /// Check every numeric constraint of the pipeline.
    ///
    /// A zero-area extent or zero point count is valid and produces an empty map.
    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(MapError::invalid(format!(
                "extent dimensions must be finite, got {}x{}",
                self.width, self.height
            )));
        }
        if self.height_threshold.is_nan() {
            return Err(MapError::invalid("height threshold must not be NaN"));
        }
        self.heights.validate()?;
        self.erosion.validate()?;
        Ok(())
    }
}
