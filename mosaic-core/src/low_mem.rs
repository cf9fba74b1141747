//! LowMemory strategy: bounded row-chunked traversal.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::seed::{GridDims, Seed};
use crate::tessellate::{validate_inputs, BorderConfig, LabelGrid, NearestPair, Tessellator};
use crate::Result;

/// Rows per chunk; keeps the per-chunk working set cache-sized on
/// typical image widths.
const DEFAULT_CHUNK_ROWS: usize = 64;

/// Tessellator with bounded peak memory: the grid is walked in row
/// chunks and each pixel folds over the seeds with three scalars of
/// state, written straight into the output buffer. Same asymptotic cost
/// as [`FastTessellator`](crate::FastTessellator), smaller resident
/// footprint on very large grids.
#[derive(Debug, Clone, Copy)]
pub struct LowMemoryTessellator {
    pub chunk_rows: usize,
}

impl Default for LowMemoryTessellator {
    fn default() -> Self {
        Self {
            chunk_rows: DEFAULT_CHUNK_ROWS,
        }
    }
}

impl LowMemoryTessellator {
    pub fn with_chunk_rows(chunk_rows: usize) -> Self {
        Self {
            chunk_rows: chunk_rows.max(1),
        }
    }
}

impl Tessellator for LowMemoryTessellator {
    fn tessellate(
        &self,
        seeds: &[Seed],
        dims: GridDims,
        border: Option<BorderConfig>,
    ) -> Result<LabelGrid> {
        validate_inputs(seeds, dims)?;
        let width = dims.width as usize;
        let chunk_rows = self.chunk_rows.max(1);
        let sentinel = seeds.len() as u32;

        let mut labels = vec![0u32; dims.len()];
        fill_chunks(
            &mut labels,
            chunk_rows,
            width,
            seeds,
            border,
            sentinel,
        );

        Ok(LabelGrid::new(
            dims,
            sentinel,
            border.map(|_| sentinel),
            labels,
        ))
    }
}

#[cfg(feature = "parallel")]
fn fill_chunks(
    labels: &mut [u32],
    chunk_rows: usize,
    width: usize,
    seeds: &[Seed],
    border: Option<BorderConfig>,
    sentinel: u32,
) {
    labels
        .par_chunks_mut(chunk_rows * width)
        .enumerate()
        .for_each(|(i, chunk)| {
            fill_chunk(chunk, i * chunk_rows, width, seeds, border, sentinel);
        });
}

#[cfg(not(feature = "parallel"))]
fn fill_chunks(
    labels: &mut [u32],
    chunk_rows: usize,
    width: usize,
    seeds: &[Seed],
    border: Option<BorderConfig>,
    sentinel: u32,
) {
    for (i, chunk) in labels.chunks_mut(chunk_rows * width).enumerate() {
        fill_chunk(chunk, i * chunk_rows, width, seeds, border, sentinel);
    }
}

/// Label one chunk of rows starting at `first_row`. The accumulator per
/// pixel is three scalars; nothing else outlives the pixel.
fn fill_chunk(
    chunk: &mut [u32],
    first_row: usize,
    width: usize,
    seeds: &[Seed],
    border: Option<BorderConfig>,
    sentinel: u32,
) {
    for (offset, label) in chunk.iter_mut().enumerate() {
        let row = (first_row + offset / width) as f64;
        let col = (offset % width) as f64;
        let mut pair = NearestPair::START;
        for seed in seeds {
            pair.update(seed.id, seed.dist_sq(row, col));
        }
        *label = pair.label(border, sentinel);
    }
}
