use crate::error::{CoreError, Result};

/// A 2D affine transform: `(x, y) -> (a*x + b*y + c, d*x + e*y + f)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D { a: 1.0, b: 0.0, c: 0.0, d: 0.0, e: 1.0, f: 0.0 };

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.b * y + self.c, self.d * x + self.e * y + self.f)
    }

    /// The six parameters as a flat array, for simplex refinement.
    pub fn to_params(self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    pub fn from_params(p: [f64; 6]) -> Self {
        Transform2D { a: p[0], b: p[1], c: p[2], d: p[3], e: p[4], f: p[5] }
    }

    /// Derives the affine transform mapping `p1 -> q1`, `p2 -> q2`, `p3 ->
    /// q3` by solving, via Cramer's rule, the shared `3x3` design-matrix
    /// system `[x y 1] * (a b c)^T = x'` (and likewise for `d e f` against
    /// `y'`). Fails with [`CoreError::NumericallySingular`] when `p1, p2,
    /// p3` are collinear (design matrix determinant ~= 0).
    pub fn derive_affine(p1: (f64, f64), p2: (f64, f64), p3: (f64, f64), q1: (f64, f64), q2: (f64, f64), q3: (f64, f64)) -> Result<Self> {
        let (x1, y1) = p1;
        let (x2, y2) = p2;
        let (x3, y3) = p3;

        // det of [[x1 y1 1] [x2 y2 1] [x3 y3 1]]
        let det = x1 * (y2 - y3) - y1 * (x2 - x3) + (x2 * y3 - x3 * y2);
        let scale = (x1.abs() + x2.abs() + x3.abs() + y1.abs() + y2.abs() + y3.abs() + 1.0).max(1.0);
        if det.abs() < f64::EPSILON * scale * scale {
            return Err(CoreError::NumericallySingular);
        }

        let (a, b, c) = solve_row(x1, y1, x2, y2, x3, y3, q1.0, q2.0, q3.0, det);
        let (d, e, f) = solve_row(x1, y1, x2, y2, x3, y3, q1.1, q2.1, q3.1, det);

        Ok(Transform2D { a, b, c, d, e, f })
    }
}

/// Solves `a*xi + b*yi + c = vi` for `i in {1,2,3}` via Cramer's rule given
/// a precomputed shared determinant `det` of the `(x, y, 1)` design matrix.
#[allow(clippy::too_many_arguments)]
fn solve_row(x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64, v1: f64, v2: f64, v3: f64, det: f64) -> (f64, f64, f64) {
    let det_a = v1 * (y2 - y3) - y1 * (v2 - v3) + (v2 * y3 - v3 * y2);
    let det_b = x1 * (v2 - v3) - v1 * (x2 - x3) + (x2 * v3 - x3 * v2);
    let det_c = x1 * (y2 * v3 - y3 * v2) - y1 * (x2 * v3 - x3 * v2) + v1 * (x2 * y3 - x3 * y2);

    (det_a / det, det_b / det, det_c / det)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_round_trips_three_points() {
        let t = Transform2D::derive_affine((0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0), (10.0, 0.0), (0.0, 10.0)).unwrap();
        for &(x, y) in &[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (5.0, 5.0)] {
            let (ox, oy) = t.apply(x, y);
            assert!((ox - x).abs() < 1e-9);
            assert!((oy - y).abs() < 1e-9);
        }
    }

    #[test]
    fn rotation_and_translation_are_recovered() {
        let theta = 5.0f64.to_radians();
        let (sin, cos) = theta.sin_cos();
        let (tx, ty) = (3.0, 7.0);
        let rotate_shift = |x: f64, y: f64| (cos * x - sin * y + tx, sin * x + cos * y + ty);

        let p1 = (0.0, 0.0);
        let p2 = (10.0, 0.0);
        let p3 = (0.0, 10.0);
        let q1 = rotate_shift(p1.0, p1.1);
        let q2 = rotate_shift(p2.0, p2.1);
        let q3 = rotate_shift(p3.0, p3.1);

        let t = Transform2D::derive_affine(p1, p2, p3, q1, q2, q3).unwrap();
        for &(x, y) in &[p1, p2, p3, (4.0, 6.0)] {
            let expected = rotate_shift(x, y);
            let got = t.apply(x, y);
            assert!((got.0 - expected.0).abs() < 1e-4);
            assert!((got.1 - expected.1).abs() < 1e-4);
        }
    }

    #[test]
    fn collinear_points_are_singular() {
        let err = Transform2D::derive_affine((0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 0.0), (1.0, 0.0), (2.0, 0.0)).unwrap_err();
        assert_eq!(err, CoreError::NumericallySingular);
    }
}
