use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::constants::{FULL_TURN, LON_WRAP};

/// Change longitudes so that they lie between -180 and 180.
/// Only values above 180 are shifted, values at or below -180 are left as they are.
pub fn normalize_longitudes(lon: &mut Array1<f64>) {
    lon.mapv_inplace(|l| if l > LON_WRAP { l - FULL_TURN } else { l });
}

/// Exponential decay of the weight with the time distance from the reference time.
/// `time`, `timemid` and `timescale` are all expressed in days.
pub fn time_weight(time: f64, timemid: f64, timescale: f64) -> f64 {
    f64::exp(-(time - timemid).abs() / timescale)
}

/// Element-wise [`time_weight`]; an empty time sequence gives an empty result
pub fn time_weights(time: &Array1<f64>, timemid: f64, timescale: f64) -> Array1<f64> {
    time.mapv(|t| time_weight(t, timemid, timescale))
}

/// Discrete derivative along one axis, with unit spacing.
/// Central differences in the interior, one-sided differences at the edges.
/// Axes with a single point have a null derivative.
fn gradient_along(field: &ArrayView2<f64>, axis: Axis) -> Array2<f64> {
    let mut gradient = Array2::<f64>::zeros(field.raw_dim());
    let n = field.len_of(axis);
    if n < 2 {
        return gradient;
    }

    for (mut out, lane) in gradient
        .lanes_mut(axis)
        .into_iter()
        .zip(field.lanes(axis))
    {
        out[0] = lane[1] - lane[0];
        out[n - 1] = lane[n - 1] - lane[n - 2];
        for i in 1..n - 1 {
            out[i] = (lane[i + 1] - lane[i - 1]) / 2.0;
        }
    }
    gradient
}

/// Gradient of a 2D field indexed [row, column], returned as
/// (derivative along the rows axis, derivative along the columns axis)
pub fn gradient(field: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
    let view = field.view();
    (
        gradient_along(&view, Axis(0)),
        gradient_along(&view, Axis(1)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};

    #[test]
    fn longitudes_above_180_are_shifted() {
        let mut lon = array![0.0, 90.0, 180.0, 180.5, 270.0, 359.875];
        normalize_longitudes(&mut lon);
        assert_eq!(lon, array![0.0, 90.0, 180.0, -179.5, -90.0, -0.125]);
        assert!(lon.iter().all(|l| *l <= 180.0));
    }

    #[test]
    fn longitudes_below_minus_180_are_untouched() {
        let mut lon = array![-190.0, -180.0, -5.5625];
        normalize_longitudes(&mut lon);
        assert_eq!(lon, array![-190.0, -180.0, -5.5625]);
    }

    #[test]
    fn weight_is_one_at_reference_time() {
        for timescale in [0.5, 1.0, 5.0, 100.0] {
            assert_eq!(time_weight(23520.0, 23520.0, timescale), 1.0);
        }
    }

    #[test]
    fn weight_decreases_with_time_distance() {
        let timemid = 23376.69;
        let time = array![23376.69, 23377.69, 23375.19, 23380.0, 23400.0, 24376.69];
        let weights = time_weights(&time, timemid, 5.0);

        assert_abs_diff_eq!(weights[1], f64::exp(-0.2), epsilon = 1e-12);
        let mut previous = f64::INFINITY;
        for w in weights.iter() {
            assert!(*w > 0.0 && *w <= 1.0);
            assert!(*w <= previous);
            previous = *w;
        }
    }

    #[test]
    fn weight_is_symmetric() {
        assert_eq!(time_weight(10.0, 12.0, 5.0), time_weight(14.0, 12.0, 5.0));
    }

    #[test]
    fn far_times_give_tiny_finite_weights() {
        let w = time_weight(1.0e6, 0.0, 5.0);
        assert!(w >= 0.0);
        assert!(w < 1.0e-12);
        assert!(!w.is_nan());
    }

    #[test]
    fn empty_times_give_empty_weights() {
        let time: Array1<f64> = Array1::zeros(0);
        assert!(time_weights(&time, 23520.0, 5.0).is_empty());
    }

    #[test]
    fn gradient_matches_central_and_one_sided_differences() {
        // f(i, j) = i^2 + 3 j
        let field = Array::from_shape_fn((4, 3), |(i, j)| (i * i) as f64 + 3.0 * j as f64);
        let (d_rows, d_cols) = gradient(&field);

        assert_eq!(d_rows.shape(), field.shape());
        assert_eq!(d_cols.shape(), field.shape());
        for j in 0..3 {
            assert_abs_diff_eq!(d_rows[[0, j]], 1.0);
            assert_abs_diff_eq!(d_rows[[1, j]], 2.0);
            assert_abs_diff_eq!(d_rows[[2, j]], 4.0);
            assert_abs_diff_eq!(d_rows[[3, j]], 5.0);
        }
        assert!(d_cols.iter().all(|d| (*d - 3.0).abs() < 1e-12));
    }

    #[test]
    fn gradient_of_single_column_is_null_along_columns() {
        let field = array![[1.0], [2.0], [4.0]];
        let (d_rows, d_cols) = gradient(&field);
        assert_eq!(d_rows, array![[1.0], [1.5], [2.0]]);
        assert_eq!(d_cols, array![[0.0], [0.0], [0.0]]);
    }

    #[test]
    fn gradient_does_not_touch_the_field() {
        let field = array![[1.0, 2.0], [3.0, 5.0]];
        let copy = field.clone();
        let _ = gradient(&field);
        assert_eq!(field, copy);
    }
}
