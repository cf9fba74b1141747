//! Fast strategy: one vectorized pass per seed over full-grid accumulators.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::seed::{GridDims, Seed};
use crate::tessellate::{validate_inputs, BorderConfig, LabelGrid, NearestPair, Tessellator};
use crate::Result;

/// Tessellator optimized for throughput: each seed is folded into
/// per-pixel nearest/second-nearest accumulators with a single pass over
/// the grid, so the inner loop is one reduction per seed rather than one
/// scan of the seed list per pixel. Peak memory is a small constant per
/// pixel, independent of the seed count.
#[derive(Debug, Default, Clone, Copy)]
pub struct FastTessellator;

impl Tessellator for FastTessellator {
    fn tessellate(
        &self,
        seeds: &[Seed],
        dims: GridDims,
        border: Option<BorderConfig>,
    ) -> Result<LabelGrid> {
        validate_inputs(seeds, dims)?;
        let width = dims.width as usize;
        let mut acc = vec![NearestPair::START; dims.len()];

        for seed in seeds {
            // Column offsets are shared by every row of this seed's pass.
            let col_d2: Vec<f64> = (0..width)
                .map(|c| {
                    let dy = c as f64 - seed.y;
                    dy * dy
                })
                .collect();
            fold_seed_rows(&mut acc, width, seed, &col_d2);
        }

        let sentinel = seeds.len() as u32;
        let labels = finish_labels(&acc, border, sentinel);
        Ok(LabelGrid::new(
            dims,
            sentinel,
            border.map(|_| sentinel),
            labels,
        ))
    }
}

#[cfg(feature = "parallel")]
fn fold_seed_rows(acc: &mut [NearestPair], width: usize, seed: &Seed, col_d2: &[f64]) {
    acc.par_chunks_mut(width)
        .enumerate()
        .for_each(|(r, row)| fold_seed_row(row, r, seed, col_d2));
}

#[cfg(not(feature = "parallel"))]
fn fold_seed_rows(acc: &mut [NearestPair], width: usize, seed: &Seed, col_d2: &[f64]) {
    for (r, row) in acc.chunks_mut(width).enumerate() {
        fold_seed_row(row, r, seed, col_d2);
    }
}

#[inline]
fn fold_seed_row(row: &mut [NearestPair], r: usize, seed: &Seed, col_d2: &[f64]) {
    let dx = r as f64 - seed.x;
    let row_d2 = dx * dx;
    for (pair, &cd2) in row.iter_mut().zip(col_d2) {
        pair.update(seed.id, row_d2 + cd2);
    }
}

#[cfg(feature = "parallel")]
fn finish_labels(acc: &[NearestPair], border: Option<BorderConfig>, sentinel: u32) -> Vec<u32> {
    acc.par_iter().map(|p| p.label(border, sentinel)).collect()
}

#[cfg(not(feature = "parallel"))]
fn finish_labels(acc: &[NearestPair], border: Option<BorderConfig>, sentinel: u32) -> Vec<u32> {
    acc.iter().map(|p| p.label(border, sentinel)).collect()
}
