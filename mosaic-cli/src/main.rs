//! Voronoi image stylization CLI
//!
//! Partitions the input image into nearest-seed regions, flattens the
//! color inside each region, and optionally paints region borders black.
//!
//! Seeds come from one of three sources, in precedence order: a
//! cluster-map file (`--clusmap`, tab-separated coordinates), a
//! probability map (`--probmap gaussian` with `--gaussian-vars`, or a
//! tabulated map file), or uniform random placement.
//!
//! Run with: `mosaic -i photo.jpg -o out.png -n 400 --border`

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use image::RgbImage;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use mosaic_core::{
    generate_seeds, parse_seed_table, tessellate, BorderConfig, DensityMap, DensitySource,
    GaussianParams, GridDims, LabelGrid, SeedMode, Strategy,
};

#[derive(Parser, Debug)]
#[command(name = "mosaic")]
#[command(about = "Voronoi-stylize an image", long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Input image path
    #[arg(short, long)]
    input: PathBuf,

    /// Output image path
    #[arg(short, long)]
    output: PathBuf,

    /// Number of regions (0 = 10% of the mean image extent)
    #[arg(short = 'n', long, default_value = "0")]
    clusters: usize,

    /// Downscale factor applied before tessellation
    #[arg(long, default_value = "1.0")]
    rescale: f64,

    /// Detect region borders and paint them black
    #[arg(long)]
    border: bool,

    /// Border threshold: max distance gap to the second-nearest seed
    #[arg(long, default_value = "200.0")]
    threshold: f64,

    /// Tessellation method: fast | low_mem
    #[arg(long, default_value = "low_mem")]
    method: String,

    /// Tab-separated file of explicit seed coordinates
    #[arg(long)]
    clusmap: Option<PathBuf>,

    /// Probability map for seed placement: 'gaussian' or a map file
    #[arg(long)]
    probmap: Option<String>,

    /// Gaussian probmap parameters: mx my sigma_x sigma_y [rho] [spacing]
    #[arg(long = "gaussian-vars", num_args = 0.., value_name = "VAL")]
    gaussian_vars: Vec<f64>,

    /// Flatten or swap only specific channels per region
    #[arg(long, value_parser = ["r", "g", "b", "rand", "rb", "rg", "gb", "randdual"])]
    channel: Option<String>,

    /// Seed for the random stream (omit for entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress progress output
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    if !args.quiet {
        println!("Loading image: {:?}", args.input);
    }
    let mut img = image::open(&args.input)
        .with_context(|| format!("failed to open {:?}", args.input))?
        .to_rgb8();

    if args.rescale > 1.0 {
        let (w, h) = img.dimensions();
        let rw = ((w as f64 / args.rescale) as u32).max(1);
        let rh = ((h as f64 / args.rescale) as u32).max(1);
        if !args.quiet {
            println!("Resizing {}x{} -> {}x{}", w, h, rw, rh);
        }
        img = image::imageops::resize(&img, rw, rh, image::imageops::FilterType::Lanczos3);
    }

    let (w, h) = img.dimensions();
    let dims = GridDims::new(h, w);
    let clusters = resolve_cluster_count(args.clusters, dims);

    if !args.quiet {
        println!("Making clusters.");
    }
    let mode = seed_mode(&args, dims, clusters)?;
    let seeds = generate_seeds(&mode, dims, &mut rng)?;

    let strategy: Strategy = args.method.parse()?;
    let border = args.border.then(|| BorderConfig::new(args.threshold));

    if !args.quiet {
        println!(
            "Tessellating {}x{} with {} seeds ({:?})...",
            h,
            w,
            seeds.len(),
            strategy
        );
    }
    let grid = tessellate(&seeds, dims, strategy, border)?;

    if !args.quiet {
        println!("Averaging over regions.");
    }
    let actions = region_actions(
        channel_mode(args.channel.as_deref()),
        grid.num_regions() as usize,
        &mut rng,
    );
    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(grid.height() as u64 * 2)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );
    flatten_regions(&mut img, &grid, &actions, &progress);
    progress.finish_and_clear();

    img.save(&args.output)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    if !args.quiet {
        println!("Output saved to: {:?}", args.output);
    }
    Ok(())
}

/// 0 regions means "pick from the image size": 10% of the mean extent,
/// never less than one.
fn resolve_cluster_count(requested: usize, dims: GridDims) -> usize {
    if requested > 0 {
        requested
    } else {
        let mean = (dims.height as f64 + dims.width as f64) / 2.0;
        ((mean * 0.1) as usize).max(1)
    }
}

/// Resolve the seed source: cluster map, then probability map, then
/// uniform random.
fn seed_mode(args: &Args, dims: GridDims, clusters: usize) -> anyhow::Result<SeedMode> {
    if let Some(path) = &args.clusmap {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read cluster map {:?}", path))?;
        return Ok(SeedMode::Explicit(parse_seed_table(&text)?));
    }
    if let Some(probmap) = &args.probmap {
        let density = if probmap == "gaussian" {
            DensitySource::Gaussian(gaussian_params(&args.gaussian_vars))
        } else {
            DensitySource::Map(load_density_map(Path::new(probmap), dims)?)
        };
        return Ok(SeedMode::Weighted {
            density,
            count: clusters,
        });
    }
    Ok(SeedMode::Uniform { count: clusters })
}

/// Backfill missing trailing Gaussian parameters with their defaults.
fn gaussian_params(vars: &[f64]) -> GaussianParams {
    let defaults = GaussianParams::default();
    GaussianParams {
        mean_x: vars.first().copied().unwrap_or(defaults.mean_x),
        mean_y: vars.get(1).copied().unwrap_or(defaults.mean_y),
        sigma_x: vars.get(2).copied().unwrap_or(defaults.sigma_x),
        sigma_y: vars.get(3).copied().unwrap_or(defaults.sigma_y),
        rho: vars.get(4).copied().unwrap_or(defaults.rho),
        spacing: vars.get(5).map(|&s| s as u32).filter(|&s| s > 1),
    }
}

/// Load a whitespace-delimited probability map and check it against the
/// image dimensions.
fn load_density_map(path: &Path, dims: GridDims) -> anyhow::Result<DensityMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read probability map {:?}", path))?;
    let mut values = Vec::with_capacity(dims.len());
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        for field in line.split_whitespace() {
            let v: f64 = field
                .parse()
                .with_context(|| format!("bad probability value on line {}", idx + 1))?;
            values.push(v);
        }
    }
    DensityMap::new(dims.height, dims.width, values)
        .context("probability map does not match the image dimensions")
}

/// Per-region channel treatment.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ChannelMode {
    /// Flatten all three channels (the default).
    All,
    /// Flatten one fixed channel.
    Single(usize),
    /// Flatten one random channel per region.
    RandomSingle,
    /// Swap a fixed channel pair per region, half the time.
    SwapPair(usize, usize),
    /// Swap two random channels per region.
    RandomSwap,
}

fn channel_mode(arg: Option<&str>) -> ChannelMode {
    match arg {
        Some("r") => ChannelMode::Single(0),
        Some("g") => ChannelMode::Single(1),
        Some("b") => ChannelMode::Single(2),
        Some("rand") => ChannelMode::RandomSingle,
        Some("rb") => ChannelMode::SwapPair(0, 2),
        Some("rg") => ChannelMode::SwapPair(0, 1),
        Some("gb") => ChannelMode::SwapPair(1, 2),
        Some("randdual") => ChannelMode::RandomSwap,
        _ => ChannelMode::All,
    }
}

/// What happens to one region's pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RegionAction {
    /// Replace the masked channels with the region mean.
    Flatten([bool; 3]),
    /// Exchange two channels.
    Swap(usize, usize),
    /// Leave the region untouched.
    Keep,
}

/// Fix every region's treatment up front, consuming the random stream in
/// region-id order so runs are reproducible for a given seed.
fn region_actions<R: Rng>(mode: ChannelMode, regions: usize, rng: &mut R) -> Vec<RegionAction> {
    (0..regions)
        .map(|_| match mode {
            ChannelMode::All => RegionAction::Flatten([true, true, true]),
            ChannelMode::Single(c) => {
                let mut mask = [false; 3];
                mask[c] = true;
                RegionAction::Flatten(mask)
            }
            ChannelMode::RandomSingle => {
                let mut mask = [false; 3];
                mask[rng.gen_range(0..3)] = true;
                RegionAction::Flatten(mask)
            }
            ChannelMode::SwapPair(a, b) => {
                if rng.gen_bool(0.5) {
                    RegionAction::Swap(a, b)
                } else {
                    RegionAction::Keep
                }
            }
            ChannelMode::RandomSwap => {
                let a = rng.gen_range(0..3);
                let b = rng.gen_range(0..3);
                if a == b {
                    RegionAction::Keep
                } else {
                    RegionAction::Swap(a, b)
                }
            }
        })
        .collect()
}

/// Apply the per-region actions: accumulate channel sums per region,
/// then rewrite each pixel from its region's mean (or swap/keep), with
/// border pixels painted black. The progress bar advances once per row
/// per pass.
fn flatten_regions(
    img: &mut RgbImage,
    grid: &LabelGrid,
    actions: &[RegionAction],
    progress: &ProgressBar,
) {
    let regions = grid.num_regions() as usize;
    let labels = grid.as_slice();
    let width = grid.width() as usize;

    let mut sums = vec![[0u64; 3]; regions];
    let mut counts = vec![0u64; regions];
    for (i, pixel) in img.pixels().enumerate() {
        let label = labels[i] as usize;
        if label < regions {
            for c in 0..3 {
                sums[label][c] += pixel[c] as u64;
            }
            counts[label] += 1;
        }
        if (i + 1) % width == 0 {
            progress.inc(1);
        }
    }

    let means: Vec<[u8; 3]> = sums
        .iter()
        .zip(&counts)
        .map(|(sum, &count)| {
            if count == 0 {
                [0; 3]
            } else {
                [
                    (sum[0] / count) as u8,
                    (sum[1] / count) as u8,
                    (sum[2] / count) as u8,
                ]
            }
        })
        .collect();

    let border = grid.border_label();
    for (i, pixel) in img.pixels_mut().enumerate() {
        let label = labels[i];
        if Some(label) == border {
            *pixel = image::Rgb([0, 0, 0]);
        } else {
            match actions[label as usize] {
                RegionAction::Flatten(mask) => {
                    for c in 0..3 {
                        if mask[c] {
                            pixel[c] = means[label as usize][c];
                        }
                    }
                }
                RegionAction::Swap(a, b) => pixel.0.swap(a, b),
                RegionAction::Keep => {}
            }
        }
        if (i + 1) % width == 0 {
            progress.inc(1);
        }
    }
}
