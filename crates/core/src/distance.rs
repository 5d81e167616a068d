//! Squared Euclidean (L2²) distance and embedding sanity checks.
//!
//! Ranking uses the squared distance throughout: `sqrt` is monotonic, so the
//! order is the same and the reported distance of an exact match is exactly 0.
//! Components are widened to `f64` before subtracting, so any pair of finite
//! `f32` vectors of supported dimension has a finite distance.

/// Squared Euclidean distance between two equal-length slices.
///
/// Accumulates in 8 independent `f64` lanes so the compiler can vectorize the loop.
#[inline]
pub fn euclidean_sq(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "dimension mismatch in euclidean_sq");

    let mut lanes = [0.0f64; 8];
    let chunks_a = a.chunks_exact(8);
    let chunks_b = b.chunks_exact(8);
    let tail_a = chunks_a.remainder();
    let tail_b = chunks_b.remainder();

    for (ca, cb) in chunks_a.zip(chunks_b) {
        for i in 0..8 {
            let d = f64::from(ca[i]) - f64::from(cb[i]);
            lanes[i] += d * d;
        }
    }

    let mut sum: f64 = lanes.iter().sum();
    for (x, y) in tail_a.iter().zip(tail_b) {
        let d = f64::from(*x) - f64::from(*y);
        sum += d * d;
    }
    sum
}

/// Returns the index of the first NaN or infinite component, if any.
pub fn first_non_finite(vector: &[f32]) -> Option<usize> {
    vector.iter().position(|v| !v.is_finite())
}
