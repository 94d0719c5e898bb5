//! Map generation pipeline
//!
//! Runs the stages in order (points, mesh, heights, erosion, boundaries) and
//! bundles the results. The mesh is owned by exactly one stage at a time.

use std::time::Instant;

use crate::boundary::{extract_boundary_paths, BoundaryPath};
use crate::config::MapConfig;
use crate::erosion::{apply_erosion, ErosionStats};
use crate::error::Result;
use crate::heightmap::{generate_heightmap, HeightmapStats};
use crate::mesh::{build_mesh, Mesh};
use crate::sampling::generate_points;
use crate::seeds::MapSeeds;

/// Everything one generation run produced
#[derive(Clone, Debug)]
pub struct MapData {
    /// Configuration the map was generated with
    pub config: MapConfig,
    /// Seeds used for generation (allows recreation)
    pub seeds: MapSeeds,
    /// Cell mesh with final heights and erosion
    pub mesh: Mesh,
    /// Outline of the region above `config.height_threshold`
    pub paths: Vec<BoundaryPath>,
    pub height_stats: HeightmapStats,
    /// `None` when erosion was disabled
    pub erosion_stats: Option<ErosionStats>,
}

impl MapData {
    /// Convenience accessor for master seed
    pub fn seed(&self) -> u64 {
        self.seeds.master
    }

    /// Re-extract boundary paths at another threshold without regenerating.
    pub fn paths_at(&self, threshold: f64) -> Vec<BoundaryPath> {
        extract_boundary_paths(&self.mesh, threshold)
    }

    /// Fraction of the extent covered by cells above the threshold.
    pub fn land_fraction(&self) -> f64 {
        let total = self.config.extent().area();
        if total <= 0.0 {
            return 0.0;
        }
        let land: f64 = self
            .mesh
            .cells()
            .iter()
            .filter(|c| c.effective_height() > self.config.height_threshold)
            .map(|c| c.area())
            .sum();
        land / total
    }
}

/// Generate a complete map.
pub fn generate_map(config: &MapConfig, seeds: &MapSeeds) -> Result<MapData> {
    config.validate()?;
    let extent = config.extent();
    let start = Instant::now();

    let mut rng = seeds.points_rng();
    let points = generate_points(config.point_count, extent, config.relax_iterations, &mut rng)?;
    log::info!(
        "Sampled {} points ({} relaxation passes)",
        points.len(),
        config.relax_iterations
    );

    let mut mesh = build_mesh(&points, extent)?;
    log::info!("Built mesh: {} cells", mesh.len());

    let mut rng = seeds.heightmap_rng();
    let height_stats = generate_heightmap(&mut mesh, &config.heights, &mut rng)?;

    let erosion_stats = if config.erode {
        Some(apply_erosion(&mut mesh, &config.erosion, &config.heights.range)?)
    } else {
        None
    };

    let paths = extract_boundary_paths(&mesh, config.height_threshold);
    log::info!("Map generated in {:.2?}", start.elapsed());

    Ok(MapData {
        config: config.clone(),
        seeds: seeds.clone(),
        mesh,
        paths,
        height_stats,
        erosion_stats,
    })
}
