//! Seed point sampling and Lloyd relaxation
//!
//! Points are drawn uniformly over the extent, then pulled towards the
//! centroids of their Voronoi cells to even out the spacing.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::Result;
use crate::geometry::{polygon_centroid, Extent, Point};
use crate::voronoi::voronoi_cells;

/// Default number of Lloyd relaxation passes
pub const DEFAULT_RELAX_ITERATIONS: usize = 2;

/// Draw `n` uniformly distributed points within the extent.
///
/// A degenerate extent gives no points.
pub fn sample_points(n: usize, extent: Extent, rng: &mut ChaCha8Rng) -> Vec<Point> {
    if extent.is_degenerate() {
        return Vec::new();
    }

    (0..n)
        .map(|_| Point::new(rng.gen::<f64>() * extent.width, rng.gen::<f64>() * extent.height))
        .collect()
}

/// Lloyd relaxation: move every point to the area-weighted centroid of its
/// clipped Voronoi cell, `iterations` times.
///
/// Cells with (near) zero area have no usable centroid; their point keeps its
/// previous position for that pass.
pub fn relax_points(points: &[Point], extent: Extent, iterations: usize) -> Result<Vec<Point>> {
    if extent.is_degenerate() {
        return Ok(Vec::new());
    }

    let mut current = points.to_vec();
    for pass in 0..iterations {
        let cells = voronoi_cells(&current, extent)?;

        let relaxed: Vec<Option<Point>> = cells.par_iter().map(|cell| polygon_centroid(cell)).collect();

        let mut kept = 0;
        for (point, centroid) in current.iter_mut().zip(relaxed) {
            match centroid {
                Some(c) => *point = c,
                None => kept += 1,
            }
        }

        if kept > 0 {
            log::debug!("Relaxation pass {}: {} degenerate cells kept their position", pass, kept);
        }
    }

    Ok(current)
}

/// Sample `n` points and relax them; the standard way seed points are made.
pub fn generate_points(
    n: usize,
    extent: Extent,
    iterations: usize,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<Point>> {
    let points = sample_points(n, extent, rng);
    relax_points(&points, extent, iterations)
}
