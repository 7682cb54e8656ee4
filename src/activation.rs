//! Activation functions.
//!
//! A dense layer computes `z = W x + b` and then `y = activation(z)`. ReLU acts element-wise;
//! softmax normalises the whole vector into a probability distribution.

use log::warn;

use crate::Matrix;
use crate::matrix::Dims;

/// Shape softmax expects by default: the 10 digit classes as a column vector.
pub const SOFTMAX_DIMS: Dims = Dims::new(10, 1);

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationType {
    #[cfg_attr(feature = "serde", serde(alias = "ReLU"))]
    Relu,
    Softmax,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Activation {
    kind: ActivationType,
    /// Shape a softmax input is checked against. A mismatch is only reported.
    expected: Dims,
}

impl Activation {
    pub fn new(kind: ActivationType) -> Self {
        Self {
            kind,
            expected: SOFTMAX_DIMS,
        }
    }

    /// Softmax checking its input against `expected` instead of [`SOFTMAX_DIMS`].
    pub fn with_expected_dims(kind: ActivationType, expected: Dims) -> Self {
        Self { kind, expected }
    }

    #[inline]
    pub fn kind(&self) -> ActivationType {
        self.kind
    }

    /// Apply to a copy of `input`. `input` itself is never modified.
    pub fn apply(&self, input: &Matrix) -> Matrix {
        let mut out = input.clone();
        self.apply_in_place(&mut out);
        out
    }

    pub(crate) fn apply_in_place(&self, m: &mut Matrix) {
        match self.kind {
            ActivationType::Relu => relu(m.as_mut_slice()),
            ActivationType::Softmax => {
                if m.dims() != self.expected {
                    warn!(
                        "softmax input has shape {}, expected {}",
                        m.dims(),
                        self.expected
                    );
                }
                softmax(m.as_mut_slice());
            }
        }
    }
}

#[inline]
fn relu(xs: &mut [f32]) {
    for x in xs {
        if *x < 0.0 {
            *x = 0.0;
        }
    }
}

/// Numerically stable softmax: the max is subtracted before exponentiating.
fn softmax(xs: &mut [f32]) {
    let max = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0_f32;
    for x in xs.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }
    let inv = 1.0 / sum;
    for x in xs {
        *x *= inv;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn column(values: &[f32]) -> Matrix {
        Matrix::from_vec(values.len(), 1, values.to_vec()).unwrap()
    }

    #[test]
    fn relu_zeroes_only_negatives() {
        let input = Matrix::from_rows(&[&[-1.5, 0.0], &[2.0, -0.0001]]).unwrap();
        let out = Activation::new(ActivationType::Relu).apply(&input);
        assert_eq!(out.as_slice(), &[0.0, 0.0, 2.0, 0.0]);
        // Input untouched.
        assert_eq!(input.as_slice(), &[-1.5, 0.0, 2.0, -0.0001]);
    }

    #[test]
    fn softmax_sums_to_one() {
        let input = column(&[1.0, -2.0, 0.5, 3.0, 0.0, -1.0, 2.5, 0.1, 0.2, -0.3]);
        let out = Activation::new(ActivationType::Softmax).apply(&input);
        assert!(out.as_slice().iter().all(|&p| p >= 0.0));
        let total: f32 = out.as_slice().iter().sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-5);
        assert_eq!(out.argmax().0, 3);
        assert_eq!(input.as_slice()[0], 1.0);
    }

    #[test]
    fn softmax_of_equal_values_is_uniform() {
        let out = Activation::new(ActivationType::Softmax).apply(&column(&[4.2; 10]));
        for &p in out.as_slice() {
            assert_abs_diff_eq!(p, 0.1, epsilon = 1e-6);
        }
    }

    #[test]
    fn softmax_survives_large_inputs() {
        let mut values = [0.0_f32; 10];
        values[7] = 1000.0;
        let out = Activation::new(ActivationType::Softmax).apply(&column(&values));
        assert!(out.as_slice().iter().all(|p| p.is_finite()));
        assert_abs_diff_eq!(out[7], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn softmax_shape_mismatch_still_computes() {
        let out = Activation::new(ActivationType::Softmax).apply(&column(&[0.0, 0.0]));
        assert_eq!(out.as_slice(), &[0.5, 0.5]);

        let act = Activation::with_expected_dims(ActivationType::Softmax, Dims::new(2, 1));
        assert_eq!(act.apply(&column(&[0.0, 0.0])), out);
    }
}
