//! Seed points and the three ways of producing them.

use rand::Rng;

use crate::density::{DensityMap, GaussianParams};
use crate::{MosaicError, Result};

/// Dimensions of the pixel grid being tessellated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    pub height: u32,
    pub width: u32,
}

impl GridDims {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Total number of grid cells.
    pub fn len(&self) -> usize {
        self.height as usize * self.width as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.height == 0 || self.width == 0 {
            return Err(MosaicError::InvalidDimensions {
                height: self.height,
                width: self.width,
            });
        }
        Ok(())
    }
}

/// A tessellation seed point.
///
/// `x` runs along the image height (rows) and `y` along the width
/// (columns); `id` is the label written into the output grid for pixels
/// this seed owns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

impl Seed {
    pub fn new(id: u32, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    /// Squared Euclidean distance from this seed to pixel `(row, col)`.
    #[inline]
    pub fn dist_sq(&self, row: f64, col: f64) -> f64 {
        let dx = row - self.x;
        let dy = col - self.y;
        dx * dx + dy * dy
    }
}

/// Where density-weighted seeding gets its density from.
#[derive(Debug, Clone)]
pub enum DensitySource {
    /// A tabulated map matching the grid dimensions.
    Map(DensityMap),
    /// A closed-form Gaussian evaluated over the grid.
    Gaussian(GaussianParams),
}

/// How the seed set is produced.
#[derive(Debug, Clone)]
pub enum SeedMode {
    /// Literal `(x, y)` pairs; ids follow list order and any requested
    /// count is ignored.
    Explicit(Vec<(f64, f64)>),
    /// `count` independent draws, `x` uniform in `[0, height)` and `y`
    /// uniform in `[0, width)`.
    Uniform { count: usize },
    /// `count` draws from a spatial probability density.
    Weighted { density: DensitySource, count: usize },
}

/// Produce the ordered seed sequence used for tessellation.
///
/// Ids are dense, 0-based, and assigned in generation order. The call
/// holds no state across runs; the same rng state reproduces the same
/// seeds.
pub fn generate_seeds<R: Rng>(mode: &SeedMode, dims: GridDims, rng: &mut R) -> Result<Vec<Seed>> {
    dims.validate()?;
    let coords = match mode {
        SeedMode::Explicit(pairs) => pairs.clone(),
        SeedMode::Uniform { count } => {
            if *count == 0 {
                return Err(MosaicError::InvalidSeedCount);
            }
            let h = dims.height as f64;
            let w = dims.width as f64;
            (0..*count)
                .map(|_| (rng.gen::<f64>() * h, rng.gen::<f64>() * w))
                .collect()
        }
        SeedMode::Weighted { density, count } => match density {
            DensitySource::Map(map) => map.sample(*count, rng)?,
            DensitySource::Gaussian(params) => params.sample(dims, *count, rng)?,
        },
    };
    Ok(coords
        .into_iter()
        .enumerate()
        .map(|(id, (x, y))| Seed::new(id as u32, x, y))
        .collect())
}

/// Parse an explicit seed table: one record per line, whitespace or tab
/// delimited, at least two fields per record (extras ignored), no header.
pub fn parse_seed_table(text: &str) -> Result<Vec<(f64, f64)>> {
    let mut pairs = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let x = fields.next().and_then(|f| f.parse::<f64>().ok());
        let y = fields.next().and_then(|f| f.parse::<f64>().ok());
        match (x, y) {
            (Some(x), Some(y)) => pairs.push((x, y)),
            _ => return Err(MosaicError::MalformedExplicitSeeds { line: idx + 1 }),
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn explicit_mode_keeps_list_order_and_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mode = SeedMode::Explicit(vec![(1.0, 2.0), (3.5, 0.5), (0.0, 0.0)]);
        let seeds = generate_seeds(&mode, GridDims::new(10, 10), &mut rng).unwrap();

        assert_eq!(seeds.len(), 3);
        assert_eq!(seeds[0], Seed::new(0, 1.0, 2.0));
        assert_eq!(seeds[1], Seed::new(1, 3.5, 0.5));
        assert_eq!(seeds[2], Seed::new(2, 0.0, 0.0));
    }

    #[test]
    fn uniform_mode_draws_count_seeds_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let dims = GridDims::new(30, 50);
        let seeds = generate_seeds(&SeedMode::Uniform { count: 200 }, dims, &mut rng).unwrap();

        assert_eq!(seeds.len(), 200);
        for (i, seed) in seeds.iter().enumerate() {
            assert_eq!(seed.id, i as u32);
            assert!(seed.x >= 0.0 && seed.x < 30.0);
            assert!(seed.y >= 0.0 && seed.y < 50.0);
        }
    }

    #[test]
    fn uniform_mode_is_reproducible() {
        let dims = GridDims::new(20, 20);
        let mode = SeedMode::Uniform { count: 40 };

        let mut rng_a = ChaCha8Rng::seed_from_u64(99);
        let mut rng_b = ChaCha8Rng::seed_from_u64(99);
        let a = generate_seeds(&mode, dims, &mut rng_a).unwrap();
        let b = generate_seeds(&mode, dims, &mut rng_b).unwrap();
        assert_eq!(a, b);

        let mut rng_c = ChaCha8Rng::seed_from_u64(100);
        let c = generate_seeds(&mode, dims, &mut rng_c).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn weighted_mode_delegates_to_the_density() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let dims = GridDims::new(4, 4);
        // All mass on cell (2, 1): every seed must land there.
        let mut values = vec![0.0; 16];
        values[2 * 4 + 1] = 1.0;
        let mode = SeedMode::Weighted {
            density: DensitySource::Map(DensityMap::new(4, 4, values).unwrap()),
            count: 10,
        };

        let seeds = generate_seeds(&mode, dims, &mut rng).unwrap();
        assert_eq!(seeds.len(), 10);
        for seed in &seeds {
            assert_eq!((seed.x, seed.y), (2.0, 1.0));
        }
    }

    #[test]
    fn zero_count_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = generate_seeds(
            &SeedMode::Uniform { count: 0 },
            GridDims::new(10, 10),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, MosaicError::InvalidSeedCount));
    }

    #[test]
    fn zero_dims_are_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = generate_seeds(
            &SeedMode::Uniform { count: 5 },
            GridDims::new(0, 10),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, MosaicError::InvalidDimensions { .. }));
    }

    #[test]
    fn seed_table_accepts_tabs_and_extra_fields() {
        let text = "1.5\t2.5\n3.0 4.0 99 ignored\n\n0 0\n";
        let pairs = parse_seed_table(text).unwrap();
        assert_eq!(pairs, vec![(1.5, 2.5), (3.0, 4.0), (0.0, 0.0)]);
    }

    #[test]
    fn seed_table_reports_malformed_line() {
        let err = parse_seed_table("1.0 2.0\n3.0 oops\n").unwrap_err();
        assert!(matches!(err, MosaicError::MalformedExplicitSeeds { line: 2 }));

        let err = parse_seed_table("5.0\n").unwrap_err();
        assert!(matches!(err, MosaicError::MalformedExplicitSeeds { line: 1 }));
    }
}
