mod bad_pixel;
mod bright;
mod centroid;
mod hfr;
mod overlap;

use ndarray::Array2;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::filters::mask::create_mask;
use crate::frame::{FrameStats, Star};

pub use bad_pixel::{bad_pixel_map, passes_bad_pixel_test, DiffStats};

/// Result of [`find_stars`]: the compacted, plausibility-filtered star
/// list plus two diagnostics.
#[derive(Clone, Debug)]
pub struct DetectionResult {
    pub stars: Vec<Star>,
    /// Sum of Euclidean per-iteration shifts accumulated across all
    /// centroid refinements (a diagnostic, not a per-star value).
    pub sum_of_shifts: f64,
    pub avg_hfr: f64,
}

/// Detects stars in `data` (spec ss4.4): bright-pixel scan, bad-pixel
/// rejection, grid-binned overlap filter, iterative center-of-mass
/// refinement, a second overlap pass (refinement can move two previously
/// separated stars into collision), then HFR + plausibility filtering.
///
/// `data` must be background-unsubtracted (raw flux) so HFR plausibility
/// reflects true star compactness — see spec ss5 ordering guarantees.
#[allow(clippy::too_many_arguments)]
pub fn find_stars(
    data: &Array2<f32>,
    stats: &FrameStats,
    sigma_d: f32,
    sigma_b: f32,
    tau: f32,
    radius: usize,
    diff_stats: Option<&DiffStats>,
) -> Result<DetectionResult> {
    let (h, w) = data.dim();
    if w == 0 || h == 0 {
        return Err(CoreError::MissingPrecondition("empty frame".into()));
    }

    let candidates = bright::scan_bright_pixels(data, stats, sigma_d, radius);

    let flat: Vec<f32> = {
        let mut v = Vec::with_capacity(w * h);
        for row in 0..h {
            for col in 0..w {
                v.push(data[[row, col]]);
            }
        }
        v
    };
    let bad_pixel_mask = create_mask(w, 1.5);
    let diff_stats_owned;
    let diff_stats = match diff_stats {
        Some(s) => s,
        None => {
            diff_stats_owned = bad_pixel::estimate_diff_stats(&flat, w);
            &diff_stats_owned
        }
    };

    let candidates: Vec<Star> = candidates
        .into_iter()
        .filter(|s| bad_pixel::passes_bad_pixel_test(&flat, s.index, &bad_pixel_mask, diff_stats, sigma_b))
        .collect();

    let candidates = overlap::overlap_filter(candidates, w, h, radius as f64);

    let threshold = stats.location + stats.scale * sigma_d as f64;
    let mut sum_of_shifts = 0.0f64;
    let refined: Vec<Star> = candidates
        .iter()
        .map(|s| {
            let (refined, shift) = centroid::refine_centroid(data, s, threshold, radius);
            sum_of_shifts += shift;
            refined
        })
        .collect();

    let refined = overlap::overlap_filter(refined, w, h, radius as f64);

    let mut accepted = Vec::with_capacity(refined.len());
    for star in &refined {
        if let Some(s) = hfr::measure_hfr_and_test_plausibility(data, star, stats.location, radius, tau) {
            accepted.push(s);
        }
    }

    let avg_hfr = if accepted.is_empty() {
        0.0
    } else {
        accepted.iter().map(|s| s.hfr).sum::<f64>() / accepted.len() as f64
    };

    debug!(candidates = refined.len(), accepted = accepted.len(), avg_hfr, "star detection complete");

    Ok(DetectionResult {
        stars: accepted,
        sum_of_shifts,
        avg_hfr,
    })
}
