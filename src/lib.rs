//! Voronoi terrain generation library
//!
//! Builds a relaxed Voronoi cell mesh over a rectangle, raises a random
//! height field on it, erodes it, and extracts the outline of the region
//! above a height threshold. Re-exports modules for use by binaries and tools.

pub mod boundary;
pub mod color;
pub mod config;
pub mod erosion;
pub mod error;
pub mod export;
pub mod geometry;
pub mod heightmap;
pub mod map;
pub mod mesh;
pub mod sampling;
pub mod seeds;
pub mod voronoi;

pub use config::{MapConfig, MapPreset};
pub use error::{MapError, Result};
pub use map::{generate_map, MapData};
pub use seeds::MapSeeds;
