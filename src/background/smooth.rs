use crate::consts::{GAUSSIAN3_CENTER, GAUSSIAN3_CORNER, GAUSSIAN3_EDGE};

/// One pass of a fixed 3x3 Gaussian (sigma ~= 0.5) over the cell grid.
///
/// Out-of-range taps are omitted and the weight sum renormalized per output
/// cell, so edge/corner cells are a true weighted average of whatever taps
/// exist rather than being implicitly zero-padded.
pub fn smooth_grid(cells: &[f32], cells_x: usize, cells_y: usize) -> Vec<f32> {
    if cells_x == 0 || cells_y == 0 {
        return cells.to_vec();
    }

    let weight_at = |dx: i32, dy: i32| -> f32 {
        match (dx.abs(), dy.abs()) {
            (0, 0) => GAUSSIAN3_CENTER,
            (1, 0) | (0, 1) => GAUSSIAN3_EDGE,
            _ => GAUSSIAN3_CORNER,
        }
    };

    let mut out = vec![0.0f32; cells.len()];
    for cy in 0..cells_y {
        for cx in 0..cells_x {
            let mut acc = 0.0f32;
            let mut weight_sum = 0.0f32;
            for dy in -1..=1i32 {
                for dx in -1..=1i32 {
                    let nx = cx as i32 + dx;
                    let ny = cy as i32 + dy;
                    if nx < 0 || ny < 0 || nx as usize >= cells_x || ny as usize >= cells_y {
                        continue;
                    }
                    let w = weight_at(dx, dy);
                    acc += w * cells[ny as usize * cells_x + nx as usize];
                    weight_sum += w;
                }
            }
            out[cy * cells_x + cx] = if weight_sum > 0.0 { acc / weight_sum } else { cells[cy * cells_x + cx] };
        }
    }
    out
}
