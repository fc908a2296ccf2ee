/// Minimum pixel count (h*w) to use row-level Rayon parallelism in the
/// dense mask median filter.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// MAD -> Gaussian sigma normalization factor.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// 3x3 Gaussian smoothing kernel weights over the background grid
/// (sigma ~= 0.5), keyed by tap position.
pub const GAUSSIAN3_CENTER: f32 = 0.468592;
pub const GAUSSIAN3_EDGE: f32 = 0.107973;
pub const GAUSSIAN3_CORNER: f32 = 0.024879;

/// Squared pixel-distance threshold below which a projected candidate star
/// is considered matched to a reference star during alignment refinement
/// (8px threshold, per spec ss4.5 step 6).
pub const ALIGN_MATCH_DIST_SQ: f64 = 64.0;

/// Residual at or below which `Aligner::align` early-exits its search over
/// candidate matches.
pub const ALIGN_EARLY_EXIT_RESIDUAL: f64 = 0.01;

/// Maximum Nelder-Mead iterations for transform refinement.
pub const SIMPLEX_MAX_ITERATIONS: usize = 200;

/// Maximum center-of-mass refinement iterations per candidate star.
pub const CENTROID_MAX_ITERATIONS: usize = 10;

/// Squared shift (pixels^2) below which centroid refinement has converged.
pub const CENTROID_CONVERGENCE_SQ: f64 = 1e-4;

/// Side length, in pixels, of one overlap-filter spatial grid cell.
pub const OVERLAP_GRID_CELL_SIZE: usize = 256;

/// Chunk size new per-cell index `Vec`s are rounded up to, mirroring the
/// reference implementation's pre-chunked linked-list node allocator.
pub const OVERLAP_ARENA_CHUNK: usize = 1024;

/// Fraction of pixels sampled when estimating bad-pixel deviation
/// statistics without a cached `DiffStats`.
pub const BAD_PIXEL_SAMPLE_FRACTION: f64 = 0.01;
