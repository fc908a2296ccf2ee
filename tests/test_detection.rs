use ndarray::Array2;

use starfield_core::detection::{bad_pixel_map, find_stars, DiffStats};
use starfield_core::FrameStats;

/// A generously large cached `DiffStats`, used by the full-pipeline tests
/// below to bypass the randomized sampling pass: these tests exercise
/// thresholding/overlap/centroid/HFR on noiseless synthetic frames, where a
/// freshly estimated stddev would be ~0 and would reject every star as a
/// false "bad pixel" (a smooth star's own curvature is a larger deviation
/// from its local median than a truly flat background's). The bad-pixel
/// sampling path itself is covered separately by
/// `bad_pixel_map_flags_exactly_the_planted_pixel`.
const PERMISSIVE_DIFF_STATS: DiffStats = DiffStats { mean: 0.0, stddev: 1000.0 };

#[test]
fn bad_pixel_map_flags_exactly_the_planted_pixel() {
    // spec.md ss8 scenario 2.
    let w = 13;
    let h = 11;
    let mut data = Array2::<f32>::zeros((h, w));
    for i in 0..w * h {
        data[[i / w, i % w]] = 100.0 + (i & 3) as f32;
    }
    data[[2, 2]] = 500.0;

    let (flagged, _) = bad_pixel_map(&data, 3.0, 5.0, None);
    assert_eq!(flagged, vec![2 * w + 2]);
}

#[test]
fn multiple_well_separated_stars_are_all_detected() {
    let size = 201usize;
    let mut data = Array2::from_elem((size, size), 20.0f32);

    let centers = [(40, 40), (160, 40), (40, 160), (160, 160), (100, 100)];
    for &(cx, cy) in &centers {
        for dy in -3..=3i32 {
            for dx in -3..=3i32 {
                let dist2 = (dx * dx + dy * dy) as f64;
                let v = 800.0 * (-dist2 / 6.0).exp();
                data[[(cy + dy) as usize, (cx + dx) as usize]] += v as f32;
            }
        }
    }

    let stats = FrameStats { location: 20.0, scale: 1.0, min: 20.0, max: 820.0 };
    let result = find_stars(&data, &stats, 3.0, 5.0, 1.2, 6, Some(&PERMISSIVE_DIFF_STATS)).unwrap();

    assert_eq!(result.stars.len(), centers.len());
    for &(cx, cy) in &centers {
        let found = result
            .stars
            .iter()
            .any(|s| (s.x - cx as f64).abs() < 1.0 && (s.y - cy as f64).abs() < 1.0);
        assert!(found, "no detected star near ({cx}, {cy})");
    }
}

#[test]
fn detected_stars_satisfy_hfr_and_plausibility_invariants() {
    let size = 101usize;
    let mut data = Array2::from_elem((size, size), 15.0f32);
    for dy in -4..=4i32 {
        for dx in -4..=4i32 {
            let dist2 = (dx * dx + dy * dy) as f64;
            let v = 600.0 * (-dist2 / 10.0).exp();
            data[[(50 + dy) as usize, (50 + dx) as usize]] += v as f32;
        }
    }

    let stats = FrameStats { location: 15.0, scale: 1.0, min: 15.0, max: 615.0 };
    let radius = 8usize;
    let result = find_stars(&data, &stats, 3.0, 5.0, 1.2, radius, Some(&PERMISSIVE_DIFF_STATS)).unwrap();

    assert!(!result.stars.is_empty());
    for star in &result.stars {
        assert!(star.hfr <= radius as f64);
    }
}
