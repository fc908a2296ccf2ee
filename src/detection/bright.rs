use ndarray::Array2;

use crate::frame::{FrameStats, Star};

/// Emits one candidate per pixel above `stats.location + stats.scale *
/// sigma_d`, with a cheap row-local overlap pre-filter: if the previous
/// emitted candidate is on the same row and within `radius` pixels, keep
/// whichever has the larger value (in place) rather than appending a new
/// one. The full grid-binned overlap filter still runs afterward.
pub fn scan_bright_pixels(data: &Array2<f32>, stats: &FrameStats, sigma_d: f32, radius: usize) -> Vec<Star> {
    let (h, w) = data.dim();
    let threshold = stats.location + stats.scale * sigma_d as f64;

    let mut candidates: Vec<Star> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let v = data[[y, x]];
            if (v as f64) <= threshold {
                continue;
            }
            let index = y * w + x;
            let candidate = Star {
                index,
                value: v,
                x: x as f64,
                y: y as f64,
                mass: v as f64,
                hfr: 1.0,
            };

            if let Some(last) = candidates.last_mut() {
                let last_y = last.index / w;
                let last_x = last.index % w;
                if last_y == y && x.abs_diff(last_x) <= radius {
                    if candidate.value > last.value {
                        *last = candidate;
                    }
                    continue;
                }
            }
            candidates.push(candidate);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_nothing_below_threshold() {
        let data = Array2::from_elem((10, 10), 1.0f32);
        let stats = FrameStats { location: 1.0, scale: 0.0, min: 1.0, max: 1.0 };
        let stars = scan_bright_pixels(&data, &stats, 3.0, 2);
        assert!(stars.is_empty());
    }

    #[test]
    fn merges_adjacent_row_candidates_keeping_brightest() {
        let mut data = Array2::from_elem((5, 10), 0.0f32);
        data[[2, 4]] = 10.0;
        data[[2, 5]] = 20.0;
        let stats = FrameStats { location: 0.0, scale: 1.0, min: 0.0, max: 20.0 };
        let stars = scan_bright_pixels(&data, &stats, 3.0, 2);
        assert_eq!(stars.len(), 1);
        assert_eq!(stars[0].value, 20.0);
    }

    #[test]
    fn separate_peaks_beyond_radius_both_kept() {
        let mut data = Array2::from_elem((5, 10), 0.0f32);
        data[[2, 1]] = 10.0;
        data[[2, 8]] = 10.0;
        let stats = FrameStats { location: 0.0, scale: 1.0, min: 0.0, max: 10.0 };
        let stars = scan_bright_pixels(&data, &stats, 3.0, 2);
        assert_eq!(stars.len(), 2);
    }
}
