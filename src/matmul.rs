//! Dense matrix product kernel.
//!
//! A plain triple loop over contiguous row-major buffers. Correctness over speed: inputs here are
//! a single image vector, so there is nothing to gain from blocking or a BLAS backend.

/// Computes `c = a * b` for row-major `a: (m, k)`, `b: (k, n)` and `c: (m, n)`.
///
/// `c` is overwritten. Callers validate shapes.
#[inline]
pub(crate) fn gemm_f32(m: usize, n: usize, k: usize, a: &[f32], b: &[f32], c: &mut [f32]) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(c.len(), m * n);

    for i in 0..m {
        let a_row = &a[i * k..(i + 1) * k];
        for j in 0..n {
            let mut acc = 0.0_f32;
            for (p, &av) in a_row.iter().enumerate() {
                acc = av.mul_add(b[p * n + j], acc);
            }
            c[i * n + j] = acc;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_by_three_times_three_by_one() {
        let a = [1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [1.0_f32, 0.0, -1.0];
        let mut c = [f32::NAN; 2];
        gemm_f32(2, 1, 3, &a, &b, &mut c);
        assert_eq!(c, [-2.0, -2.0]);
    }
}
