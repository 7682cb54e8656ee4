use crate::{Activation, ActivationType, Matrix, Result};

/// A fully connected layer: `activation(weights * input + bias)`.
///
/// Owns its parameters. Per-layer shapes are validated by the network, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    /// Shape (out_dim, in_dim).
    weights: Matrix,
    /// Shape (out_dim, 1).
    bias: Matrix,
    activation: Activation,
}

impl Dense {
    pub fn new(weights: Matrix, bias: Matrix, activation: ActivationType) -> Self {
        Self::with_activation(weights, bias, Activation::new(activation))
    }

    pub fn with_activation(weights: Matrix, bias: Matrix, activation: Activation) -> Self {
        Self {
            weights,
            bias,
            activation,
        }
    }

    #[inline]
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    #[inline]
    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Forward pass for a single input vector.
    ///
    /// Shape contract:
    /// - `input.rows() == self.weights().cols()`
    /// - `self.bias().dims()` equals the product's dims
    ///
    /// Returns a new matrix; `input` is not modified.
    pub fn apply(&self, input: &Matrix) -> Result<Matrix> {
        let mut z = self.weights.matmul(input)?;
        z.try_add_assign(&self.bias)?;
        self.activation.apply_in_place(&mut z);
        Ok(z)
    }
}
