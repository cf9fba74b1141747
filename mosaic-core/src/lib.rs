//! Core Voronoi stylization library.
//!
//! Generates seed points (explicit, uniform random, or drawn from a 2D
//! probability density via inverse-transform sampling) and partitions a
//! pixel grid into nearest-seed regions, with optional border detection.
//! Two interchangeable strategies compute the same label grid with
//! different memory/throughput trade-offs.

mod density;
mod seed;
mod tessellate;

mod fast;
mod low_mem;

pub use density::{DensityMap, GaussianParams};
pub use fast::FastTessellator;
pub use low_mem::LowMemoryTessellator;
pub use seed::{generate_seeds, parse_seed_table, DensitySource, GridDims, Seed, SeedMode};
pub use tessellate::{tessellate, BorderConfig, LabelGrid, Strategy, Tessellator};

/// Error type for seed generation and tessellation
#[derive(Debug, thiserror::Error)]
pub enum MosaicError {
    #[error("invalid grid dimensions {height}x{width}")]
    InvalidDimensions { height: u32, width: u32 },

    #[error("seed count must be positive")]
    InvalidSeedCount,

    #[error("degenerate density map: {0}")]
    DegenerateDensity(&'static str),

    #[error("malformed seed record on line {line}")]
    MalformedExplicitSeeds { line: usize },

    #[error("unknown tessellation strategy '{0}' (expected 'fast' or 'low_mem')")]
    UnknownStrategy(String),
}

pub type Result<T> = std::result::Result<T, MosaicError>;
