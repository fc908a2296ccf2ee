use crate::numeric::qselect::qselect;

/// Marks the top `clip` cell values as outliers and replaces them with a
/// neighborhood-median interpolation. Returns the outlier count.
///
/// Outlier status is tracked with a parallel `is_outlier` mask rather than
/// an in-band NaN sentinel — `cells` is documented NaN-free once
/// [`super::Background`] construction completes, so missingness during the
/// build is a local concern, not a property of the public field.
pub fn clip_and_interpolate(
    cells: &mut [f32],
    cells_x: usize,
    cells_y: usize,
    clip: usize,
    fallback: f32,
) -> usize {
    let total = cells.len();
    if total == 0 {
        return 0;
    }

    let mut is_outlier = vec![false; total];
    let mut outlier_count = 0usize;

    if clip > 0 && clip <= total {
        let mut scratch = cells.to_vec();
        let k = total - clip;
        let threshold = qselect(&mut scratch, k);
        for (i, &v) in cells.iter().enumerate() {
            if v >= threshold {
                is_outlier[i] = true;
                outlier_count += 1;
            }
        }
    }

    interpolate(cells, &mut is_outlier, cells_x, cells_y, fallback);
    outlier_count
}

/// Iteratively fills outlier cells from their non-outlier neighbors.
///
/// For `neighbors` descending from 8 to 0, repeatedly replaces each outlier
/// cell whose in-range non-outlier 8-neighbor count is `>= neighbors` with
/// the median of those neighbor values, until a pass changes nothing, then
/// drops to the next `neighbors` threshold. Terminates because at
/// `neighbors = 0` every remaining outlier cell is satisfied unconditionally
/// by whatever non-outlier cells exist (or, on an all-outlier grid, by the
/// caller-supplied `fallback`).
fn interpolate(cells: &mut [f32], is_outlier: &mut [bool], cells_x: usize, cells_y: usize, fallback: f32) {
    if cells_x == 0 || cells_y == 0 {
        return;
    }

    for neighbors in (0..=8).rev() {
        loop {
            let mut changed = false;
            for cy in 0..cells_y {
                for cx in 0..cells_x {
                    let idx = cy * cells_x + cx;
                    if !is_outlier[idx] {
                        continue;
                    }

                    let mut gathered = Vec::with_capacity(8);
                    for dy in -1..=1i32 {
                        for dx in -1..=1i32 {
                            if dx == 0 && dy == 0 {
                                continue;
                            }
                            let nx = cx as i32 + dx;
                            let ny = cy as i32 + dy;
                            if nx < 0 || ny < 0 || nx as usize >= cells_x || ny as usize >= cells_y {
                                continue;
                            }
                            let nidx = ny as usize * cells_x + nx as usize;
                            if !is_outlier[nidx] {
                                gathered.push(cells[nidx]);
                            }
                        }
                    }

                    if !gathered.is_empty() && gathered.len() >= neighbors {
                        let mut buf = gathered;
                        cells[idx] = crate::numeric::qselect::qselect_median(&mut buf);
                        is_outlier[idx] = false;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    for (idx, flag) in is_outlier.iter().enumerate() {
        if *flag {
            cells[idx] = fallback;
        }
    }
}
