use ndarray::Array2;

use super::Background;
use crate::error::{CoreError, Result};

/// Precomputed per-axis bracket of source-cell indices and the destination
/// pixel range they cover, swept once per row/column rather than
/// recomputed per pixel. See spec ss4.3 "Render & Subtract".
struct AxisBrackets {
    /// For each destination pixel, the low/high source-cell index bracket.
    lo: Vec<usize>,
    hi: Vec<usize>,
    /// Fractional position within the bracket; outside `[0, 1]` at the
    /// image borders, where the bracket extrapolates past the outermost
    /// cell center instead of clamping.
    frac: Vec<f64>,
}

fn axis_brackets(dest_len: usize, grid_cells: usize, grid_spacing: f64) -> AxisBrackets {
    let mut lo = Vec::with_capacity(dest_len);
    let mut hi = Vec::with_capacity(dest_len);
    let mut frac = Vec::with_capacity(dest_len);

    for d in 0..dest_len {
        // Cell centers sit at (c + 0.5) * grid_spacing; invert to find the
        // fractional cell-space coordinate of this destination pixel.
        let src = (d as f64 + 0.5) / grid_spacing - 0.5;
        let src_lo = src.floor();
        let mut bracket_lo = src_lo as isize;
        let mut bracket_hi = bracket_lo + 1;

        // Keep the bracket one cell wide even past the grid's edge, so the
        // fractional coordinate extrapolates beyond the outermost cell
        // centers instead of both ends collapsing onto the same cell
        // (which would flatten the half-cell at each border). `f` is
        // recomputed against the (possibly shifted) `bracket_lo` so it
        // carries the extrapolation outside `[0, 1]` rather than reusing
        // the in-bracket fraction from before the shift.
        let max_idx = grid_cells as isize - 1;
        if max_idx <= 0 {
            bracket_lo = 0;
            bracket_hi = 0;
        } else if bracket_lo < 0 {
            bracket_lo = 0;
            bracket_hi = 1;
        } else if bracket_hi > max_idx {
            bracket_hi = max_idx;
            bracket_lo = max_idx - 1;
        }
        let f = src - bracket_lo as f64;

        lo.push(bracket_lo as usize);
        hi.push(bracket_hi as usize);
        frac.push(f);
    }

    AxisBrackets { lo, hi, frac }
}

impl Background {
    /// Renders the fitted background model as a standalone `(height, width)`
    /// image via bilinear interpolation over the cell grid.
    pub fn render(&self) -> Array2<f32> {
        let mut out = Array2::<f32>::zeros((self.height, self.width));
        self.bilinear_apply(|row, col, v| out[[row, col]] = v);
        out
    }

    /// Subtracts the rendered background from `dest` in place.
    ///
    /// Returns [`CoreError::DimensionMismatch`] when `dest`'s shape doesn't
    /// match `(self.height, self.width)`.
    pub fn subtract(&self, dest: &mut Array2<f32>) -> Result<()> {
        let (h, w) = dest.dim();
        if h != self.height || w != self.width {
            return Err(CoreError::DimensionMismatch {
                expected: self.width * self.height,
                actual: w * h,
            });
        }
        self.bilinear_apply(|row, col, v| dest[[row, col]] -= v);
        Ok(())
    }

    fn bilinear_apply(&self, mut write: impl FnMut(usize, usize, f32)) {
        let x_brackets = axis_brackets(self.width, self.grid_cells_x, self.grid_spacing_x);
        let y_brackets = axis_brackets(self.height, self.grid_cells_y, self.grid_spacing_y);

        for row in 0..self.height {
            let y_lo = y_brackets.lo[row];
            let y_hi = y_brackets.hi[row];
            let fy = y_brackets.frac[row];

            for col in 0..self.width {
                let x_lo = x_brackets.lo[col];
                let x_hi = x_brackets.hi[col];
                let fx = x_brackets.frac[col];

                let c00 = self.cells[y_lo * self.grid_cells_x + x_lo] as f64;
                let c10 = self.cells[y_lo * self.grid_cells_x + x_hi] as f64;
                let c01 = self.cells[y_hi * self.grid_cells_x + x_lo] as f64;
                let c11 = self.cells[y_hi * self.grid_cells_x + x_hi] as f64;

                let top = c00 + (c10 - c00) * fx;
                let bottom = c01 + (c11 - c01) * fx;
                let value = top + (bottom - top) * fy;

                write(row, col, value as f32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Star;

    #[test]
    fn constant_background_renders_to_the_constant() {
        let src = Array2::from_elem((256, 256), 42.0f32);
        let bg = Background::new(&src, 64.0, 3.0, 0, &[] as &[Star], 1.5);
        let rendered = bg.render();
        for &v in rendered.iter() {
            assert!((v - 42.0).abs() < 1e-3, "{v}");
        }
    }

    #[test]
    fn subtract_zeroes_out_a_constant_frame() {
        let src = Array2::from_elem((256, 256), 100.0f32);
        let bg = Background::new(&src, 64.0, 3.0, 0, &[] as &[Star], 1.5);
        let mut dest = src.clone();
        bg.subtract(&mut dest).unwrap();
        for &v in dest.iter() {
            assert!(v.abs() < 1e-3, "{v}");
        }
    }

    #[test]
    fn render_then_subtract_matches_subtract_directly() {
        let src = Array2::from_shape_fn((256, 256), |(r, c)| 10.0 + 0.1 * r as f32 + 0.05 * c as f32);
        let bg = Background::new(&src, 64.0, 3.0, 0, &[] as &[Star], 1.5);

        let rendered = bg.render();
        let mut via_manual_subtract = src.clone();
        for (d, &r) in via_manual_subtract.iter_mut().zip(rendered.iter()) {
            *d -= r;
        }

        let mut via_subtract = src.clone();
        bg.subtract(&mut via_subtract).unwrap();

        for (a, b) in via_manual_subtract.iter().zip(via_subtract.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn subtract_rejects_dimension_mismatch() {
        let src = Array2::from_elem((64, 64), 1.0f32);
        let bg = Background::new(&src, 32.0, 3.0, 0, &[] as &[Star], 1.5);
        let mut wrong = Array2::from_elem((32, 32), 1.0f32);
        let err = bg.subtract(&mut wrong).unwrap_err();
        assert_eq!(
            err,
            CoreError::DimensionMismatch {
                expected: 64 * 64,
                actual: 32 * 32
            }
        );
    }

    #[test]
    fn linear_ramp_background_is_close_to_ramp_at_cell_centers() {
        let a = 0.02f32;
        let b = 0.03f32;
        let c = 5.0f32;
        let src = Array2::from_shape_fn((256, 256), |(r, col)| a * col as f32 + b * r as f32 + c);
        let bg = Background::new(&src, 64.0, 3.0, 0, &[] as &[Star], 1.5);

        let range = {
            let max = src.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let min = src.iter().cloned().fold(f32::INFINITY, f32::min);
            max - min
        };
        let mut dest = src.clone();
        bg.subtract(&mut dest).unwrap();
        let residual = dest.iter().cloned().fold(0.0f32, |acc, v| acc.max(v.abs()));
        assert!(residual < 0.01 * range, "residual {residual} vs range {range}");
    }
}
