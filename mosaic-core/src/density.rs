//! Density maps and inverse-transform sampling.

use rand::Rng;

use crate::seed::GridDims;
use crate::{MosaicError, Result};

/// A tabulated 2D density over the grid: relative sampling likelihood
/// per cell, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMap {
    height: u32,
    width: u32,
    values: Vec<f64>,
}

impl DensityMap {
    /// Build from row-major values. Length must equal `height * width`.
    pub fn new(height: u32, width: u32, values: Vec<f64>) -> Result<Self> {
        let dims = GridDims::new(height, width);
        dims.validate()?;
        if values.len() != dims.len() {
            return Err(MosaicError::InvalidDimensions { height, width });
        }
        Ok(Self {
            height,
            width,
            values,
        })
    }

    /// Evaluate `f(row, col)` at every cell.
    pub fn from_fn(height: u32, width: u32, mut f: impl FnMut(u32, u32) -> f64) -> Result<Self> {
        let dims = GridDims::new(height, width);
        dims.validate()?;
        let mut values = Vec::with_capacity(dims.len());
        for r in 0..height {
            for c in 0..width {
                values.push(f(r, c));
            }
        }
        Ok(Self {
            height,
            width,
            values,
        })
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Draw `n` coordinate samples distributed according to this map.
    ///
    /// Inverse-transform sampling: a uniform draw is mapped through the
    /// normalized cumulative mass of the flattened cells, so the cost per
    /// sample is one binary search. Sampled cells come back as raw
    /// `(row, col)` coordinates; duplicates are permitted.
    pub fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Result<Vec<(f64, f64)>> {
        if n == 0 {
            return Err(MosaicError::InvalidSeedCount);
        }
        let cum = Cumulative::build(&self.values)?;
        let width = self.width as usize;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let idx = cum.draw(rng);
            out.push(((idx / width) as f64, (idx % width) as f64));
        }
        Ok(out)
    }
}

/// Parameters of a correlated bivariate Gaussian density over the grid.
///
/// `mean_x`/`mean_y` are fractions of the grid extent along the row and
/// column axes. `spacing` coarsens the evaluation grid to bound cost on
/// very large images; `None` (or 1) evaluates every native cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianParams {
    pub mean_x: f64,
    pub mean_y: f64,
    pub sigma_x: f64,
    pub sigma_y: f64,
    pub rho: f64,
    pub spacing: Option<u32>,
}

impl Default for GaussianParams {
    fn default() -> Self {
        Self {
            mean_x: 0.5,
            mean_y: 0.5,
            sigma_x: 100.0,
            sigma_y: 100.0,
            rho: 0.0,
            spacing: None,
        }
    }
}

impl GaussianParams {
    /// Density at `(row, col)` for a grid of the given extent.
    fn eval(&self, dims: GridDims, row: f64, col: f64) -> f64 {
        let mx = self.mean_x * dims.height as f64;
        let my = self.mean_y * dims.width as f64;
        let dx = (row - mx) / self.sigma_x;
        let dy = (col - my) / self.sigma_y;
        let r2 = 1.0 - self.rho * self.rho;
        (-(dx * dx - 2.0 * self.rho * dx * dy + dy * dy) / (2.0 * r2)).exp()
    }

    /// Rasterize over the native grid.
    pub fn rasterize(&self, dims: GridDims) -> Result<DensityMap> {
        DensityMap::from_fn(dims.height, dims.width, |r, c| {
            self.eval(dims, r as f64, c as f64)
        })
    }

    /// Draw `n` samples from the rasterized density.
    ///
    /// With `spacing > 1` the density is evaluated once per `spacing`-cell
    /// block and a sampled block maps back to its center in native pixel
    /// coordinates, deterministically (no jitter within the block).
    pub fn sample<R: Rng>(&self, dims: GridDims, n: usize, rng: &mut R) -> Result<Vec<(f64, f64)>> {
        dims.validate()?;
        let spacing = self.spacing.unwrap_or(1).max(1);
        if spacing == 1 {
            return self.rasterize(dims)?.sample(n, rng);
        }
        if n == 0 {
            return Err(MosaicError::InvalidSeedCount);
        }

        let coarse_h = dims.height.div_ceil(spacing);
        let coarse_w = dims.width.div_ceil(spacing) as usize;
        let s = spacing as f64;
        let center = |cell: usize| cell as f64 * s + s / 2.0;

        let mut values = Vec::with_capacity(coarse_h as usize * coarse_w);
        for i in 0..coarse_h as usize {
            for j in 0..coarse_w {
                values.push(self.eval(dims, center(i), center(j)));
            }
        }
        let cum = Cumulative::build(&values)?;

        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let idx = cum.draw(rng);
            out.push((center(idx / coarse_w), center(idx % coarse_w)));
        }
        Ok(out)
    }
}

/// Normalized cumulative distribution over flattened grid cells.
///
/// Built once per sampling call, then discarded.
struct Cumulative {
    sums: Vec<f64>,
}

impl Cumulative {
    fn build(values: &[f64]) -> Result<Self> {
        if values.iter().any(|&v| !(v >= 0.0) || v.is_infinite()) {
            return Err(MosaicError::DegenerateDensity(
                "contains negative or non-finite values",
            ));
        }
        let mut sums = Vec::with_capacity(values.len());
        let mut total = 0.0;
        for &v in values {
            total += v;
            sums.push(total);
        }
        if total <= 0.0 {
            return Err(MosaicError::DegenerateDensity("sums to zero"));
        }
        for s in &mut sums {
            *s /= total;
        }
        Ok(Self { sums })
    }

    /// First cell whose cumulative mass reaches a uniform draw in [0, 1).
    fn draw<R: Rng>(&self, rng: &mut R) -> usize {
        let u = rng.gen::<f64>();
        self.sums
            .partition_point(|&s| s < u)
            .min(self.sums.len() - 1)
    }
}
