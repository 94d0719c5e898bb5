use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::HeightRange;
use crate::error::{MapError, Result};
use crate::mesh::Mesh;

// =============================================================================
// HEIGHT PARAMETERS
// =============================================================================

/// Logistic falloff midpoint, in tenths of the bump radius
const FALLOFF_MIDPOINT: f64 = 5.0;

/// Parameters for bump-based height synthesis
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightParams {
    /// Number of bumps applied, in order
    pub bumps: usize,
    /// Smallest bump radius (map units)
    pub min_radius: f64,
    /// Largest bump radius (map units)
    pub max_radius: f64,
    /// Clamp range for heights; bump magnitudes are drawn from it too
    pub range: HeightRange,
}

impl Default for HeightParams {
    fn default() -> Self {
        Self {
            bumps: 50,
            min_radius: 50.0,
            max_radius: 600.0,
            range: HeightRange::default(),
        }
    }
}

impl HeightParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_radius > 0.0) || !self.max_radius.is_finite() || self.min_radius > self.max_radius {
            return Err(MapError::invalid(format!(
                "bump radius range [{}, {}] must satisfy 0 < min <= max",
                self.min_radius, self.max_radius
            )));
        }
        self.range.validate()
    }
}

/// What a single bump did
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BumpReport {
    /// Index of the cell the bump was centred on
    pub target: usize,
    pub radius: f64,
    /// Magnitude actually applied (negated when the target was saturated)
    pub magnitude: f64,
    /// Number of neighboring cells that received falloff
    pub affected: usize,
}

/// Summary of a height map generation run
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeightmapStats {
    pub bumps_applied: usize,
    pub min_height: f64,
    pub max_height: f64,
    pub cells_above_sea_level: usize,
}

// =============================================================================
// BUMPS
// =============================================================================

/// Logistic falloff of a bump at `distance` from its centre.
///
/// `1 / (1 + e^-(5 - d / (0.1 * radius)))`: close to 1 at the centre, close to
/// 0 at `radius`, with the transition around half the radius.
pub fn bump_falloff(distance: f64, radius: f64) -> Result<f64> {
    if !(radius > 0.0) {
        return Err(MapError::invalid(format!("bump radius must be positive, got {}", radius)));
    }
    let x = FALLOFF_MIDPOINT - distance / (radius * 0.1);
    Ok(1.0 / (1.0 + (-x).exp()))
}

/// Raise (or lower) a random cell and its surroundings.
///
/// The target is chosen uniformly from all cells. When it already sits at the
/// range maximum the magnitude is negated so plateaus don't saturate. Cells
/// within `radius` of the target's centroid get the magnitude scaled by
/// `bump_falloff`. Every updated height is clamped into `range`.
///
/// Returns `None` for an empty mesh.
pub fn apply_bump(
    mesh: &mut Mesh,
    radius: f64,
    magnitude: f64,
    range: &HeightRange,
    rng: &mut ChaCha8Rng,
) -> Result<Option<BumpReport>> {
    if !(radius > 0.0) {
        return Err(MapError::invalid(format!("bump radius must be positive, got {}", radius)));
    }
    if !magnitude.is_finite() {
        return Err(MapError::invalid(format!("bump magnitude must be finite, got {}", magnitude)));
    }
    if mesh.is_empty() {
        return Ok(None);
    }

    let target = rng.gen_range(0..mesh.len());
    let neighbors = mesh.cells_within(target, radius);
    let cells = mesh.cells_mut();

    let magnitude = if cells[target].height == range.max {
        -magnitude
    } else {
        magnitude
    };
    cells[target].height = range.clamp(cells[target].height + magnitude);

    for &(index, distance) in &neighbors {
        let falloff = bump_falloff(distance, radius)?;
        let cell = &mut cells[index];
        cell.height = range.clamp(cell.height + falloff * magnitude);
    }

    Ok(Some(BumpReport {
        target,
        radius,
        magnitude,
        affected: neighbors.len(),
    }))
}

/// Build a height field by applying `params.bumps` random bumps in sequence.
///
/// Each bump reads the heights left by the previous ones, so the order of
/// application is part of the result.
pub fn generate_heightmap(mesh: &mut Mesh, params: &HeightParams, rng: &mut ChaCha8Rng) -> Result<HeightmapStats> {
    params.validate()?;

    let mut applied = 0;
    for i in 0..params.bumps {
        let radius = rng.gen_range(params.min_radius..=params.max_radius);
        let magnitude = rng.gen_range(params.range.min..=params.range.max);

        if let Some(report) = apply_bump(mesh, radius, magnitude, &params.range, rng)? {
            log::debug!(
                "Bump {}: cell {} r={:.1} m={:.1} ({} neighbors)",
                i,
                report.target,
                report.radius,
                report.magnitude,
                report.affected
            );
            applied += 1;
        }
    }

    let (min_height, max_height) = mesh.height_bounds().unwrap_or((0.0, 0.0));
    let stats = HeightmapStats {
        bumps_applied: applied,
        min_height,
        max_height,
        cells_above_sea_level: mesh.cells().iter().filter(|c| c.height() > 0.0).count(),
    };

    log::info!(
        "Applied {} bumps: heights {:.1} to {:.1}, {} of {} cells above sea level",
        stats.bumps_applied,
        stats.min_height,
        stats.max_height,
        stats.cells_above_sea_level,
        mesh.len()
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Extent, Point};
    use crate::mesh::{build_mesh, Cell};
    use rand::SeedableRng;

    fn grid_mesh(cols: usize, rows: usize, spacing: f64) -> Mesh {
        let mut points = Vec::new();
        for y in 0..rows {
            for x in 0..cols {
                points.push(Point::new((x as f64 + 0.5) * spacing, (y as f64 + 0.5) * spacing));
            }
        }
        let extent = Extent::new(cols as f64 * spacing, rows as f64 * spacing);
        build_mesh(&points, extent).unwrap()
    }

    fn single_cell(height: f64) -> Mesh {
        let extent = Extent::new(10.0, 10.0);
        let cell = Cell::new(Point::new(5.0, 5.0), extent.to_polygon()).with_height(height);
        Mesh::from_cells(extent, vec![cell])
    }

    #[test]
    fn test_falloff_bounds() {
        let radius = 200.0;
        assert!(bump_falloff(0.0, radius).unwrap() > 0.99);
        assert!(bump_falloff(radius, radius).unwrap() < 0.01);
        assert!((bump_falloff(radius * 0.5, radius).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_falloff_monotonic() {
        let radius = 150.0;
        let mut previous = bump_falloff(0.0, radius).unwrap();
        for step in 1..=60 {
            let s = bump_falloff(step as f64 * 5.0, radius).unwrap();
            assert!(s < previous);
            previous = s;
        }
    }

    #[test]
    fn test_falloff_rejects_bad_radius() {
        assert!(matches!(bump_falloff(1.0, 0.0), Err(MapError::InvalidArgument(_))));
        assert!(matches!(bump_falloff(1.0, -3.0), Err(MapError::InvalidArgument(_))));
        assert!(matches!(bump_falloff(1.0, f64::NAN), Err(MapError::InvalidArgument(_))));
    }

    #[test]
    fn test_bump_on_empty_mesh() {
        let mut mesh = Mesh::empty(Extent::new(10.0, 10.0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let report = apply_bump(&mut mesh, 10.0, 100.0, &HeightRange::default(), &mut rng).unwrap();
        assert!(report.is_none());
    }

    #[test]
    fn test_bump_rejects_bad_radius() {
        let mut mesh = single_cell(0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = apply_bump(&mut mesh, 0.0, 100.0, &HeightRange::default(), &mut rng);
        assert!(matches!(result, Err(MapError::InvalidArgument(_))));
    }

    #[test]
    fn test_saturated_target_is_lowered() {
        let range = HeightRange::default();
        let mut mesh = single_cell(range.max);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let report = apply_bump(&mut mesh, 10.0, 300.0, &range, &mut rng).unwrap().unwrap();
        assert_eq!(report.magnitude, -300.0);
        assert_eq!(mesh.cells()[0].height(), range.max - 300.0);
    }

    #[test]
    fn test_bump_clamps_target() {
        let range = HeightRange::default();
        let mut mesh = single_cell(900.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        apply_bump(&mut mesh, 10.0, 500.0, &range, &mut rng).unwrap();
        assert_eq!(mesh.cells()[0].height(), range.max);
    }

    #[test]
    fn test_bump_falls_off_with_distance() {
        let range = HeightRange::default();
        let mut mesh = grid_mesh(20, 1, 10.0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let report = apply_bump(&mut mesh, 100.0, 500.0, &range, &mut rng).unwrap().unwrap();

        let target = report.target;
        assert_eq!(mesh.cells()[target].height(), 500.0);

        // Heights decrease moving away from the target along the row
        let heights: Vec<f64> = mesh.cells().iter().map(Cell::height).collect();
        for i in target..heights.len() - 1 {
            assert!(heights[i + 1] <= heights[i]);
        }
        for i in (1..=target).rev() {
            assert!(heights[i - 1] <= heights[i]);
        }
        // Cells beyond the radius are untouched
        for (i, h) in heights.iter().enumerate() {
            if (i as i64 - target as i64).unsigned_abs() * 10 > 100 {
                assert_eq!(*h, 0.0);
            }
        }
    }

    #[test]
    fn test_heights_stay_in_range() {
        let params = HeightParams {
            bumps: 300,
            min_radius: 20.0,
            max_radius: 400.0,
            range: HeightRange::new(-500.0, 1000.0).unwrap(),
        };
        let mut mesh = grid_mesh(12, 12, 50.0);
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let stats = generate_heightmap(&mut mesh, &params, &mut rng).unwrap();

        assert_eq!(stats.bumps_applied, 300);
        assert!(mesh.cells().iter().all(|c| params.range.contains(c.height())));
        assert!(stats.min_height >= -500.0 && stats.max_height <= 1000.0);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let params = HeightParams::default();
        let mut a = grid_mesh(8, 8, 100.0);
        let mut b = grid_mesh(8, 8, 100.0);
        generate_heightmap(&mut a, &params, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        generate_heightmap(&mut b, &params, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        let ha: Vec<f64> = a.cells().iter().map(Cell::height).collect();
        let hb: Vec<f64> = b.cells().iter().map(Cell::height).collect();
        assert_eq!(ha, hb);
    }

    #[test]
    fn test_invalid_params() {
        let mut mesh = grid_mesh(2, 2, 10.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let params = HeightParams {
            min_radius: 100.0,
            max_radius: 50.0,
            ..HeightParams::default()
        };
        assert!(generate_heightmap(&mut mesh, &params, &mut rng).is_err());
    }
}
