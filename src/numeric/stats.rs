use crate::consts::MAD_TO_SIGMA;

use super::qselect::qselect_median;

/// Robust location/scale estimate (L, S in the glossary): the median and
/// `1.4826 * MAD` (median absolute deviation), the robust analogs of mean
/// and standard deviation used throughout this crate.
///
/// `data` is consumed by value (a caller-owned scratch copy) since the
/// underlying `qselect` reorders it.
pub fn robust_location_scale(mut data: Vec<f32>) -> (f64, f64) {
    if data.is_empty() {
        return (0.0, 0.0);
    }
    let location = qselect_median(&mut data) as f64;

    let mut deviations: Vec<f32> = data.iter().map(|&v| (v as f64 - location).abs() as f32).collect();
    let mad = qselect_median(&mut deviations) as f64;
    let scale = mad * MAD_TO_SIGMA;

    (location, scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_data_has_zero_scale() {
        let data = vec![5.0f32; 100];
        let (loc, scale) = robust_location_scale(data);
        assert_eq!(loc, 5.0);
        assert_eq!(scale, 0.0);
    }

    #[test]
    fn outlier_does_not_dominate_location() {
        let mut data = vec![10.0f32; 99];
        data.push(10_000.0);
        let (loc, _) = robust_location_scale(data);
        assert_eq!(loc, 10.0);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(robust_location_scale(Vec::new()), (0.0, 0.0));
    }
}
