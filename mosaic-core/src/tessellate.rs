//! Tessellation contract shared by both strategies.

use std::str::FromStr;

use crate::seed::{GridDims, Seed};
use crate::{FastTessellator, LowMemoryTessellator, MosaicError, Result};

/// Border classification: a pixel whose second-nearest seed is within
/// `threshold` pixels of its nearest is labeled with the border sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderConfig {
    pub threshold: f64,
}

impl BorderConfig {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

/// Caller-selected tessellation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One vectorized pass per seed over full-grid accumulators.
    Fast,
    /// Bounded row-chunked traversal; peak working set independent of
    /// grid size.
    LowMemory,
}

impl FromStr for Strategy {
    type Err = MosaicError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fast" => Ok(Strategy::Fast),
            "low_mem" | "low-mem" => Ok(Strategy::LowMemory),
            other => Err(MosaicError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Per-pixel region assignment produced by tessellation.
///
/// Row-major; every cell holds a region id in `[0, num_regions)` or,
/// when border detection ran, possibly the sentinel `num_regions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGrid {
    height: u32,
    width: u32,
    num_regions: u32,
    border_label: Option<u32>,
    labels: Vec<u32>,
}

impl LabelGrid {
    pub(crate) fn new(
        dims: GridDims,
        num_regions: u32,
        border_label: Option<u32>,
        labels: Vec<u32>,
    ) -> Self {
        debug_assert_eq!(labels.len(), dims.len());
        Self {
            height: dims.height,
            width: dims.width,
            num_regions,
            border_label,
            labels,
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of regions; region ids are the contiguous range `0..num_regions`.
    pub fn num_regions(&self) -> u32 {
        self.num_regions
    }

    /// The sentinel value marking border pixels, when border detection ran.
    pub fn border_label(&self) -> Option<u32> {
        self.border_label
    }

    pub fn label(&self, row: u32, col: u32) -> u32 {
        self.labels[row as usize * self.width as usize + col as usize]
    }

    pub fn is_border(&self, row: u32, col: u32) -> bool {
        self.border_label == Some(self.label(row, col))
    }

    /// Row-major labels, one per pixel.
    pub fn as_slice(&self) -> &[u32] {
        &self.labels
    }
}

/// The single interface both strategies implement.
pub trait Tessellator {
    /// Compute the label grid for `seeds` over `dims`.
    fn tessellate(
        &self,
        seeds: &[Seed],
        dims: GridDims,
        border: Option<BorderConfig>,
    ) -> Result<LabelGrid>;
}

/// Nearest/second-nearest tracker folded over the seeds for one pixel.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NearestPair {
    pub(crate) best_id: u32,
    pub(crate) best_d2: f64,
    pub(crate) second_d2: f64,
}

impl NearestPair {
    pub(crate) const START: NearestPair = NearestPair {
        best_id: 0,
        best_d2: f64::INFINITY,
        second_d2: f64::INFINITY,
    };

    /// Fold in one seed's squared distance. Seeds must be visited in id
    /// order; only a strictly smaller distance displaces the current
    /// winner, so the smallest id keeps exact ties.
    #[inline]
    pub(crate) fn update(&mut self, id: u32, d2: f64) {
        if d2 < self.best_d2 {
            self.second_d2 = self.best_d2;
            self.best_d2 = d2;
            self.best_id = id;
        } else if d2 < self.second_d2 {
            self.second_d2 = d2;
        }
    }

    /// Final label for this pixel: the owning seed's id, or the border
    /// sentinel when the gap to the runner-up is within the threshold.
    #[inline]
    pub(crate) fn label(&self, border: Option<BorderConfig>, sentinel: u32) -> u32 {
        if let Some(cfg) = border {
            if self.second_d2.sqrt() - self.best_d2.sqrt() <= cfg.threshold {
                return sentinel;
            }
        }
        self.best_id
    }
}

pub(crate) fn validate_inputs(seeds: &[Seed], dims: GridDims) -> Result<()> {
    dims.validate()?;
    if seeds.is_empty() {
        return Err(MosaicError::InvalidSeedCount);
    }
    Ok(())
}

/// Tessellate `dims` by the nearest-seed rule under the chosen strategy.
///
/// Both strategies produce byte-identical grids; the choice trades peak
/// memory against throughput and is a caller policy, never data-driven.
pub fn tessellate(
    seeds: &[Seed],
    dims: GridDims,
    strategy: Strategy,
    border: Option<BorderConfig>,
) -> Result<LabelGrid> {
    match strategy {
        Strategy::Fast => FastTessellator.tessellate(seeds, dims, border),
        Strategy::LowMemory => LowMemoryTessellator::default().tessellate(seeds, dims, border),
    }
}
