//! Seed management for map generation
//!
//! Each randomized stage gets its own seed, derived from a master seed by
//! default, so one stage can be varied while the others stay fixed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeds for the randomized generation stages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Seed point sampling
    pub points: u64,
    /// Bump targets, radii and magnitudes
    pub heightmap: u64,
}

impl MapSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            points: derive_seed(master, "points"),
            heightmap: derive_seed(master, "heightmap"),
        }
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: u64) -> MapSeedsBuilder {
        MapSeedsBuilder::new(master)
    }

    pub fn points_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.points)
    }

    pub fn heightmap_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.heightmap)
    }
}

impl Default for MapSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Builder for overriding individual seeds while deriving the rest from master
pub struct MapSeedsBuilder {
    seeds: MapSeeds,
}

impl MapSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: MapSeeds::from_master(master),
        }
    }

    /// Override the point sampling seed
    pub fn points(mut self, seed: u64) -> Self {
        self.seeds.points = seed;
        self
    }

    /// Override the heightmap seed
    pub fn heightmap(mut self, seed: u64) -> Self {
        self.seeds.heightmap = seed;
        self
    }

    pub fn build(self) -> MapSeeds {
        self.seeds
    }
}

/// Derive a sub-seed from a master seed and a stage name.
fn derive_seed(master: u64, stage: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    stage.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for MapSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MapSeeds {{ master: {}, points: {}, heightmap: {} }}",
            self.master, self.points, self.heightmap
        )
    }
}
