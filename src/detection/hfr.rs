use ndarray::Array2;

use crate::frame::Star;

/// Computes HFR and the inner/outer plausibility test for one star,
/// returning `Some(refined_star)` if it passes, `None` otherwise (spec
/// ss4.4 "HFR and plausibility").
pub fn measure_hfr_and_test_plausibility(data: &Array2<f32>, star: &Star, location: f64, radius: usize, tau: f32) -> Option<Star> {
    let (h, w) = data.dim();
    let cx = star.x;
    let cy = star.y;
    let r = radius as f64;

    let mut moment = 0.0f64;
    let mut mass = 0.0f64;
    for dy in -(radius as i64)..=(radius as i64) {
        for dx in -(radius as i64)..=(radius as i64) {
            let dist = ((dx * dx + dy * dy) as f64).sqrt();
            if dist > r {
                continue;
            }
            let px = cx.round() as i64 + dx;
            let py = cy.round() as i64 + dy;
            if px < 0 || py < 0 || px as usize >= w || py as usize >= h {
                continue;
            }
            let flux = (data[[py as usize, px as usize]] as f64 - location).max(0.0);
            moment += dist * flux;
            mass += flux;
        }
    }

    if mass <= 0.0 {
        return None;
    }
    let hfr = moment / mass;
    if hfr > r {
        return None;
    }

    let mut inner_mass = 0.0f64;
    let mut inner_pixels = 0u64;
    let mut disk_pixels = 0u64;
    for dy in -(radius as i64)..=(radius as i64) {
        for dx in -(radius as i64)..=(radius as i64) {
            let dist = ((dx * dx + dy * dy) as f64).sqrt();
            if dist > r {
                continue;
            }
            disk_pixels += 1;
            let px = cx.round() as i64 + dx;
            let py = cy.round() as i64 + dy;
            if px < 0 || py < 0 || px as usize >= w || py as usize >= h {
                continue;
            }
            if dist <= hfr {
                inner_pixels += 1;
                let flux = (data[[py as usize, px as usize]] as f64 - location).max(0.0);
                inner_mass += flux;
            }
        }
    }

    let outer_mass = mass - inner_mass;
    let outer_pixels = disk_pixels.saturating_sub(inner_pixels);

    let plausible = if outer_pixels == 0 || outer_mass <= 0.0 {
        true
    } else {
        inner_mass * outer_pixels as f64 > tau as f64 * outer_mass * inner_pixels as f64
    };

    if !plausible {
        return None;
    }

    Some(Star { hfr, ..*star })
}
