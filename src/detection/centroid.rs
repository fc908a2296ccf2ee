use ndarray::Array2;

use crate::consts::{CENTROID_CONVERGENCE_SQ, CENTROID_MAX_ITERATIONS};
use crate::frame::Star;

/// Iteratively refines a candidate's sub-pixel center by computing first
/// moments of `(value - threshold / 2).max(0)` over a `(2*radius+1)^2` box
/// centered on its current integer index. Returns the refined star plus the
/// Euclidean shift accumulated across iterations (a diagnostic, not stored
/// per-star — see [`super::DetectionResult::sum_of_shifts`]).
pub fn refine_centroid(data: &Array2<f32>, star: &Star, threshold: f64, radius: usize) -> (Star, f64) {
    let (h, w) = data.dim();
    let half_t = threshold / 2.0;

    let mut cx = star.x;
    let mut cy = star.y;
    let mut shift_sum = 0.0f64;

    for _ in 0..CENTROID_MAX_ITERATIONS {
        let ix = cx.round() as i64;
        let iy = cy.round() as i64;

        let mut sum_dx = 0.0f64;
        let mut sum_dy = 0.0f64;
        let mut sum_w = 0.0f64;

        for dy in -(radius as i64)..=(radius as i64) {
            let py = iy + dy;
            if py < 0 || py as usize >= h {
                continue;
            }
            for dx in -(radius as i64)..=(radius as i64) {
                let px = ix + dx;
                if px < 0 || px as usize >= w {
                    continue;
                }
                let v = data[[py as usize, px as usize]] as f64 - half_t;
                if v <= 0.0 {
                    continue;
                }
                sum_dx += dx as f64 * v;
                sum_dy += dy as f64 * v;
                sum_w += v;
            }
        }

        if sum_w <= 0.0 {
            break;
        }

        let new_cx = cx + sum_dx / sum_w;
        let new_cy = cy + sum_dy / sum_w;
        let shift_sq = (new_cx - cx).powi(2) + (new_cy - cy).powi(2);
        shift_sum += shift_sq.sqrt();

        cx = new_cx;
        cy = new_cy;

        if shift_sq < CENTROID_CONVERGENCE_SQ {
            break;
        }
    }

    let final_ix = (cx.round() as i64).clamp(0, w as i64 - 1) as usize;
    let final_iy = (cy.round() as i64).clamp(0, h as i64 - 1) as usize;
    let index = final_iy * w + final_ix;
    let value = data[[final_iy, final_ix]];

    let mut mass = 0.0f64;
    for dy in -(radius as i64)..=(radius as i64) {
        let py = final_iy as i64 + dy;
        if py < 0 || py as usize >= h {
            continue;
        }
        for dx in -(radius as i64)..=(radius as i64) {
            let px = final_ix as i64 + dx;
            if px < 0 || px as usize >= w {
                continue;
            }
            let v = data[[py as usize, px as usize]] as f64 - half_t;
            if v > 0.0 {
                mass += v;
            }
        }
    }

    (
        Star {
            index,
            value,
            x: cx,
            y: cy,
            mass,
            hfr: star.hfr,
        },
        shift_sum,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_blob_stays_put() {
        let mut data = Array2::from_elem((21, 21), 0.0f32);
        for dy in -2..=2i32 {
            for dx in -2..=2i32 {
                data[[(10 + dy) as usize, (10 + dx) as usize]] = 100.0;
            }
        }
        let star = Star { index: 10 * 21 + 10, value: 100.0, x: 10.0, y: 10.0, mass: 100.0, hfr: 1.0 };
        let (refined, _shift) = refine_centroid(&data, &star, 0.0, 5);
        assert!((refined.x - 10.0).abs() < 1e-6);
        assert!((refined.y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn off_center_blob_is_pulled_toward_true_center() {
        let mut data = Array2::from_elem((21, 21), 0.0f32);
        for dy in -2..=2i32 {
            for dx in -2..=2i32 {
                data[[(11 + dy) as usize, (11 + dx) as usize]] = 100.0;
            }
        }
        // Seed slightly off from the true center at (11, 11).
        let star = Star { index: 10 * 21 + 10, value: 100.0, x: 10.0, y: 10.0, mass: 100.0, hfr: 1.0 };
        let (refined, shift) = refine_centroid(&data, &star, 0.0, 5);
        assert!((refined.x - 11.0).abs() < 1e-3);
        assert!((refined.y - 11.0).abs() < 1e-3);
        assert!(shift > 0.0);
    }
}
