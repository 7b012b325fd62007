/// Parameter sweeps over the shape generator
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::shapegen::ShapeParams;

/// Largest seed drawn for a sweep
pub const MAX_SWEEP_SEED: u64 = 10_000;

/// Cartesian sweep over extrusion counts, extrusion ranges, rotation ranges
/// and seeds. Shapes with few extrusions only sweep the smallest rotation
/// ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    pub extrusion_counts: Vec<u32>,
    pub extrusion_ranges: Vec<f32>,
    /// Degrees, ascending
    pub rotation_ranges: Vec<f32>,
    pub seeds: Vec<u64>,
}

impl ParameterGrid {
    /// The standard sweep with `seed_count` seeds drawn from `master_seed`
    pub fn standard(master_seed: u64, seed_count: usize) -> Self {
        Self {
            extrusion_counts: vec![1, 2, 3, 4, 5, 6, 8, 10],
            extrusion_ranges: vec![0.05, 0.1, 0.15, 0.2, 0.3, 0.4],
            rotation_ranges: vec![30.0, 45.0, 90.0, 180.0, 360.0],
            seeds: draw_seeds(master_seed, seed_count),
        }
    }

    /// Rotation ranges swept for shapes with `num_extrusions` extrusions
    pub fn rotation_ranges_for(&self, num_extrusions: u32) -> &[f32] {
        let limit = match num_extrusions {
            0..=2 => 2,
            3..=4 => 3,
            _ => self.rotation_ranges.len(),
        };
        &self.rotation_ranges[..limit.min(self.rotation_ranges.len())]
    }

    /// Every combination in sweep order, numbered from zero
    pub fn combinations(&self) -> Vec<ShapeParams> {
        let mut out = Vec::new();
        for &count in &self.extrusion_counts {
            for &extrusion_range in &self.extrusion_ranges {
                for &rotation_range in self.rotation_ranges_for(count) {
                    for &seed in &self.seeds {
                        let level = out.len() as u32;
                        out.push(
                            ShapeParams::new(seed, count, extrusion_range, rotation_range)
                                .with_complexity_level(level),
                        );
                    }
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.extrusion_counts
            .iter()
            .map(|&n| {
                self.extrusion_ranges.len() * self.rotation_ranges_for(n).len() * self.seeds.len()
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `count` seeds in `0..=MAX_SWEEP_SEED`, reproducible from `master_seed`
pub fn draw_seeds(master_seed: u64, count: usize) -> Vec<u64> {
    let mut rng = Pcg32::seed_from_u64(master_seed);
    (0..count)
        .map(|_| rng.random_range(0..=MAX_SWEEP_SEED))
        .collect()
}

/// `count` shapes sharing one parameter set, with seeds drawn from
/// `master_seed`
pub fn series(
    master_seed: u64,
    count: usize,
    num_extrusions: u32,
    extrusion_range: f32,
    rotation_range: f32,
) -> Vec<ShapeParams> {
    draw_seeds(master_seed, count)
        .into_iter()
        .enumerate()
        .map(|(level, seed)| {
            ShapeParams::new(seed, num_extrusions, extrusion_range, rotation_range)
                .with_complexity_level(level as u32)
        })
        .collect()
}

/// Fresh master seed from the thread RNG, for runs that did not pin one
pub fn random_seed() -> u64 {
    rand::rng().random_range(0..=MAX_SWEEP_SEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_grid_size() {
        let grid = ParameterGrid::standard(7, 3);
        // 2 counts x 6 x 2 + 2 x 6 x 3 + 4 x 6 x 5, times 3 seeds
        assert_eq!(grid.len(), 540);
        assert_eq!(grid.combinations().len(), 540);
    }

    #[test]
    fn test_rotation_restriction() {
        let grid = ParameterGrid::standard(7, 3);
        assert_eq!(grid.rotation_ranges_for(1), &[30.0_f32, 45.0]);
        assert_eq!(grid.rotation_ranges_for(2), &[30.0_f32, 45.0]);
        assert_eq!(grid.rotation_ranges_for(4), &[30.0_f32, 45.0, 90.0]);
        assert_eq!(grid.rotation_ranges_for(5).len(), 5);

        for params in grid.combinations() {
            if params.num_extrusions <= 2 {
                assert!(params.rotation_range <= 45.0);
            }
        }
    }

    #[test]
    fn test_complexity_levels_are_sequential() {
        let combos = ParameterGrid::standard(1, 2).combinations();
        for (i, params) in combos.iter().enumerate() {
            assert_eq!(params.complexity_level, i as u32);
        }
        assert_eq!(combos[0].num_extrusions, 1);
        assert_eq!(combos[0].extrusion_range, 0.05);
        assert_eq!(combos[0].rotation_range, 30.0);
    }

    #[test]
    fn test_seeds_reproducible() {
        let a = draw_seeds(99, 3);
        assert_eq!(a, draw_seeds(99, 3));
        assert_eq!(a.len(), 3);
        assert!(a.iter().all(|&s| s <= MAX_SWEEP_SEED));
    }

    #[test]
    fn test_series() {
        let shapes = series(5, 4, 3, 0.2, 180.0);
        assert_eq!(shapes.len(), 4);
        assert!(shapes.iter().all(|p| p.num_extrusions == 3));
        assert_eq!(shapes[3].complexity_level, 3);
    }
}
