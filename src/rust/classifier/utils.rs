use ndarray::ArrayView1;

use super::sparse::FeatureVector;

/// Scales a row to unit L2 norm in place. Rows with a (near) zero norm are
/// left untouched.
pub(crate) fn normalize_vector(vec: &mut FeatureVector) {
    let norm: f64 = vec.iter().map(|(_, x)| x * x).sum::<f64>().sqrt();
    if norm > 1e-12 {
        for value in vec.values_mut() {
            *value /= norm;
        }
    }
}

/// Numerically stable `ln(Σ exp(x))`.
pub(crate) fn log_sum_exp(values: ArrayView1<f64>) -> f64 {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = values.iter().map(|&x| (x - max).exp()).sum();
    max + sum.ln()
}
