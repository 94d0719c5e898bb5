//! Erosion simulation module
//!
//! Diffuses height differences between nearby cells into an erosion
//! accumulator: every cell lower than a neighbor within the erosion radius
//! collects a fraction of the difference, as if material settled downhill.
//! Heights themselves are never changed; erosion only lowers the effective
//! height used when extracting regions.
//!
//! Parallelization: per-cell transfers are computed with rayon. Heights are
//! read-only during the pass and every transfer is non-negative, so summing
//! the transfers and clamping once gives the same accumulator as clamping
//! after each individual transfer.

pub mod params;

pub use params::ErosionParams;

use rayon::prelude::*;

use crate::config::HeightRange;
use crate::error::Result;
use crate::mesh::Mesh;

/// Statistics from one erosion pass
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ErosionStats {
    /// Cells that received any erosion
    pub cells_eroded: usize,
    /// Total erosion added over all cells (after clamping)
    pub total_erosion: f64,
    /// Largest erosion accumulator after the pass
    pub max_erosion: f64,
}

/// Run one erosion pass over the mesh.
///
/// For each cell `c` and each neighbor `m` within `params.radius` with
/// `m.height < c.height`, `m.erosion` grows by `(c.height - m.height) * rate`,
/// clamped into `range`. Repeated passes accumulate; use
/// `Mesh::clear_erosion` to start over.
pub fn apply_erosion(mesh: &mut Mesh, params: &ErosionParams, range: &HeightRange) -> Result<ErosionStats> {
    params.validate()?;
    range.validate()?;

    if mesh.is_empty() {
        return Ok(ErosionStats::default());
    }

    let heights: Vec<f64> = mesh.cells().iter().map(|c| c.height()).collect();

    let transfers: Vec<f64> = {
        let mesh = &*mesh;
        (0..mesh.len())
            .into_par_iter()
            .map(|lower| {
                let h = heights[lower];
                mesh.cells_within(lower, params.radius)
                    .into_iter()
                    .filter(|&(higher, _)| heights[higher] > h)
                    .map(|(higher, _)| (heights[higher] - h) * params.rate)
                    .sum::<f64>()
            })
            .collect()
    };

    let mut stats = ErosionStats::default();
    for (cell, transfer) in mesh.cells_mut().iter_mut().zip(transfers) {
        if transfer > 0.0 {
            let before = cell.erosion;
            cell.erosion = range.clamp(cell.erosion + transfer);
            stats.cells_eroded += 1;
            stats.total_erosion += cell.erosion - before;
        }
        stats.max_erosion = stats.max_erosion.max(cell.erosion);
    }

    log::info!(
        "Erosion pass: {} of {} cells eroded, total {:.1}, max {:.1}",
        stats.cells_eroded,
        mesh.len(),
        stats.total_erosion,
        stats.max_erosion
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use crate::geometry::{Extent, Point};
    use crate::heightmap::{generate_heightmap, HeightParams};
    use crate::mesh::{build_mesh, Cell};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn row_mesh(heights: &[f64], spacing: f64) -> Mesh {
        let points: Vec<Point> = (0..heights.len())
            .map(|i| Point::new((i as f64 + 0.5) * spacing, spacing * 0.5))
            .collect();
        let extent = Extent::new(heights.len() as f64 * spacing, spacing);
        let base = build_mesh(&points, extent).unwrap();
        let cells = base
            .cells()
            .iter()
            .zip(heights)
            .map(|(c, &h)| Cell::new(c.centroid(), c.boundary().to_vec()).with_height(h))
            .collect();
        Mesh::from_cells(extent, cells)
    }

    #[test]
    fn test_uniform_heights_do_not_erode() {
        let mut mesh = row_mesh(&[250.0; 10], 50.0);
        let stats = apply_erosion(&mut mesh, &ErosionParams::default(), &HeightRange::default()).unwrap();
        assert_eq!(stats.cells_eroded, 0);
        assert!(mesh.cells().iter().all(|c| c.erosion() == 0.0));
    }

    #[test]
    fn test_lower_neighbor_collects_difference() {
        // Spacing 100 with radius 150: only direct neighbors interact
        let mut mesh = row_mesh(&[500.0, 100.0, 300.0], 100.0);
        apply_erosion(&mut mesh, &ErosionParams::default(), &HeightRange::default()).unwrap();

        let erosion: Vec<f64> = mesh.cells().iter().map(Cell::erosion).collect();
        assert_eq!(erosion[0], 0.0);
        assert!((erosion[1] - (40.0 + 20.0)).abs() < 1e-9);
        assert_eq!(erosion[2], 0.0);

        // Heights are left alone
        assert_eq!(mesh.cells()[1].height(), 100.0);
        assert!((mesh.cells()[1].effective_height() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_erosion_accumulates_and_clears() {
        let mut mesh = row_mesh(&[500.0, 100.0], 100.0);
        let params = ErosionParams::default();
        let range = HeightRange::default();
        apply_erosion(&mut mesh, &params, &range).unwrap();
        apply_erosion(&mut mesh, &params, &range).unwrap();
        assert!((mesh.cells()[1].erosion() - 80.0).abs() < 1e-9);

        mesh.clear_erosion();
        assert!(mesh.cells().iter().all(|c| c.erosion() == 0.0));
    }

    #[test]
    fn test_erosion_clamped_to_range() {
        let range = HeightRange::new(-1000.0, 1000.0).unwrap();
        let mut mesh = row_mesh(&[1000.0, -1000.0, 1000.0], 100.0);
        let params = ErosionParams { radius: 150.0, rate: 1.0 };
        apply_erosion(&mut mesh, &params, &range).unwrap();
        assert_eq!(mesh.cells()[1].erosion(), range.max);
    }

    #[test]
    fn test_matches_sequential_formulation() {
        let extent = Extent::new(1000.0, 1000.0);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let points = crate::sampling::generate_points(120, extent, 2, &mut rng).unwrap();
        let mut mesh = build_mesh(&points, extent).unwrap();
        generate_heightmap(&mut mesh, &HeightParams::default(), &mut rng).unwrap();

        let params = ErosionParams::default();
        let range = HeightRange::default();

        // Reference: one transfer at a time, clamping after each
        let mut expected = vec![0.0f64; mesh.len()];
        for c in 0..mesh.len() {
            let hc = mesh.cells()[c].height();
            for (m, _) in mesh.cells_within(c, params.radius) {
                let hm = mesh.cells()[m].height();
                if hm < hc {
                    expected[m] = range.clamp(expected[m] + (hc - hm) * params.rate);
                }
            }
        }

        apply_erosion(&mut mesh, &params, &range).unwrap();
        for (cell, e) in mesh.cells().iter().zip(&expected) {
            assert!((cell.erosion() - e).abs() < 1e-6);
            assert!(range.contains(cell.erosion()));
        }
    }

    #[test]
    fn test_rejects_bad_radius() {
        let mut mesh = row_mesh(&[1.0, 2.0], 10.0);
        let params = ErosionParams { radius: 0.0, rate: 0.1 };
        let result = apply_erosion(&mut mesh, &params, &HeightRange::default());
        assert!(matches!(result, Err(MapError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_mesh() {
        let mut mesh = Mesh::empty(Extent::new(10.0, 10.0));
        let stats = apply_erosion(&mut mesh, &ErosionParams::default(), &HeightRange::default()).unwrap();
        assert_eq!(stats, ErosionStats::default());
    }
}
