//! Elementwise helpers over plain `f64` vectors.

/// A dense numeric vector.
pub type Vector = Vec<f64>;

/// Dot product of two vectors of equal length.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "dot of vectors with different lengths");
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Elementwise `a + b`.
pub fn add(a: &[f64], b: &[f64]) -> Vector {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

/// Elementwise `a - b`.
pub fn sub(a: &[f64], b: &[f64]) -> Vector {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// Every element of `a` multiplied by `s`.
pub fn scale(a: &[f64], s: f64) -> Vector {
    a.iter().map(|x| x * s).collect()
}

/// Elementwise `a += b`.
pub fn add_assign(a: &mut [f64], b: &[f64]) {
    for (x, y) in a.iter_mut().zip(b) {
        *x += y;
    }
}

/// Check that two vectors have the same length and every pair of elements
/// differs by at most `tol`.
pub fn equal_with_abs_tol(a: &[f64], b: &[f64], tol: f64) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            if x.is_nan() || y.is_nan() {
                x.is_nan() && y.is_nan()
            } else {
                (x - y).abs() <= tol
            }
        })
}
