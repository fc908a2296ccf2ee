use ndarray::Array2;

use crate::consts::MAD_TO_SIGMA;
use crate::frame::Star;
use crate::numeric::qselect::qselect_median;

/// Fits one background grid cell: gathers non-star-excluded pixel values in
/// `[x_start, x_end) x [y_start, y_end)`, computes a sigma-clipped trimmed
/// median. See spec ss4.3 "Per-cell fit".
#[allow(clippy::too_many_arguments)]
pub fn fit_cell(
    src: &Array2<f32>,
    x_start: usize,
    x_end: usize,
    y_start: usize,
    y_end: usize,
    bound_stars: &[Star],
    sigma: f32,
    hfr_factor: f32,
    med_buf: &mut Vec<f32>,
    mad_buf: &mut Vec<f32>,
) -> f32 {
    med_buf.clear();
    for y in y_start..y_end {
        for x in x_start..x_end {
            let px = x as f64 + 0.5;
            let py = y as f64 + 0.5;
            let excluded = bound_stars.iter().any(|star| {
                let r = star.hfr * hfr_factor as f64;
                let dx = px - star.x;
                let dy = py - star.y;
                dx * dx + dy * dy <= r * r
            });
            if !excluded {
                med_buf.push(src[[y, x]]);
            }
        }
    }

    if med_buf.is_empty() {
        return 0.0;
    }

    let mut scratch = med_buf.clone();
    let median = qselect_median(&mut scratch) as f64;

    mad_buf.clear();
    mad_buf.extend(med_buf.iter().map(|&v| (v as f64 - median).abs() as f32));
    let mad = qselect_median(mad_buf) as f64;
    let std_dev = mad * MAD_TO_SIGMA;
    let upper = median + sigma as f64 * std_dev;

    let mut trimmed: Vec<f32> = med_buf.iter().copied().filter(|&v| (v as f64) < upper).collect();
    if trimmed.is_empty() {
        return median as f32;
    }
    qselect_median(&mut trimmed)
}
