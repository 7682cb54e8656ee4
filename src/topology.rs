//! Network layout: the per-layer parameter shapes and activations.
//!
//! A [`Topology`] is plain data handed to [`crate::MlpNetwork`] at construction time. The
//! network checks every supplied weight/bias matrix against it. [`Topology::digits`] is the
//! 784 -> 128 -> 64 -> 20 -> 10 digit classifier.
//!
//! With the `serde` feature a topology can also be read from a JSON config file:
//!
//! ```json
//! {
//!   "input": { "rows": 28, "cols": 28 },
//!   "layers": [
//!     { "weights": { "rows": 16, "cols": 784 }, "bias": { "rows": 16, "cols": 1 }, "activation": "relu" },
//!     { "weights": { "rows": 10, "cols": 16 },  "bias": { "rows": 10, "cols": 1 }, "activation": "softmax" }
//!   ]
//! }
//! ```

use crate::matrix::Dims;
use crate::{ActivationType, Error, Result};

/// Side length of the square grayscale input image.
pub const IMAGE_SIDE: usize = 28;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSpec {
    pub weights: Dims,
    pub bias: Dims,
    pub activation: ActivationType,
}

impl LayerSpec {
    /// Layer with `out_dim x in_dim` weights and an `out_dim x 1` bias.
    pub const fn dense(in_dim: usize, out_dim: usize, activation: ActivationType) -> Self {
        Self {
            weights: Dims::new(out_dim, in_dim),
            bias: Dims::new(out_dim, 1),
            activation,
        }
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.weights.cols
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.weights.rows
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    /// Shape of the raw input before it is vectorised.
    pub input: Dims,
    pub layers: Vec<LayerSpec>,
}

impl Topology {
    /// Validated topology.
    pub fn new(input: Dims, layers: Vec<LayerSpec>) -> Result<Self> {
        let t = Self { input, layers };
        t.validate()?;
        Ok(t)
    }

    /// The fixed digit classifier layout.
    pub fn digits() -> Self {
        use ActivationType::{Relu, Softmax};

        Self {
            input: Dims::new(IMAGE_SIDE, IMAGE_SIDE),
            layers: vec![
                LayerSpec::dense(784, 128, Relu),
                LayerSpec::dense(128, 64, Relu),
                LayerSpec::dense(64, 20, Relu),
                LayerSpec::dense(20, 10, Softmax),
            ],
        }
    }

    /// Shape of the vectorised input, `(input.rows * input.cols) x 1`.
    #[inline]
    pub fn input_vector_dims(&self) -> Dims {
        Dims::new(self.input.rows.saturating_mul(self.input.cols), 1)
    }

    /// Shape of the final layer output.
    pub fn output_dims(&self) -> Option<Dims> {
        self.layers.last().map(|l| l.bias)
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "input dims must be > 0, got {}",
                self.input
            )));
        }
        if self.layers.is_empty() {
            return Err(Error::InvalidConfig(
                "topology must have at least one layer".to_owned(),
            ));
        }

        let mut in_dim = self.input.checked_len().ok_or_else(|| {
            Error::InvalidConfig(format!("input dims {} overflow usize", self.input))
        })?;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.weights.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "layer {i} weights dims must be > 0, got {}",
                    layer.weights
                )));
            }
            if layer.weights.checked_len().is_none() {
                return Err(Error::InvalidConfig(format!(
                    "layer {i} weights dims {} overflow usize",
                    layer.weights
                )));
            }
            if layer.in_dim() != in_dim {
                return Err(Error::InvalidConfig(format!(
                    "layer {i} weights have {} cols, previous output has {in_dim} rows",
                    layer.in_dim()
                )));
            }
            let expected_bias = Dims::new(layer.out_dim(), 1);
            if layer.bias != expected_bias {
                return Err(Error::InvalidConfig(format!(
                    "layer {i} bias must be {expected_bias}, got {}",
                    layer.bias
                )));
            }
            in_dim = layer.out_dim();
        }

        Ok(())
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::digits()
    }
}

#[cfg(feature = "serde")]
impl Topology {
    /// Parse and validate a topology from JSON.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let t: Topology = serde_json::from_str(s)
            .map_err(|e| Error::InvalidConfig(format!("failed to parse topology json: {e}")))?;
        t.validate()?;
        Ok(t)
    }

    /// Load a topology from a JSON config file.
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p).map_err(|e| {
            Error::InvalidConfig(format!("failed to read {}: {e}", p.display()))
        })?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_table() {
        let t = Topology::digits();
        t.validate().unwrap();
        let weights: Vec<_> = t.layers.iter().map(|l| (l.weights.rows, l.weights.cols)).collect();
        assert_eq!(weights, [(128, 784), (64, 128), (20, 64), (10, 20)]);
        let biases: Vec<_> = t.layers.iter().map(|l| l.bias).collect();
        assert_eq!(
            biases,
            [
                Dims::new(128, 1),
                Dims::new(64, 1),
                Dims::new(20, 1),
                Dims::new(10, 1)
            ]
        );
        let acts: Vec<_> = t.layers.iter().map(|l| l.activation).collect();
        use ActivationType::*;
        assert_eq!(acts, [Relu, Relu, Relu, Softmax]);
        assert_eq!(t.input_vector_dims(), Dims::new(784, 1));
        assert_eq!(t.output_dims(), Some(Dims::new(10, 1)));
    }

    #[test]
    fn rejects_broken_chaining() {
        let err = Topology::new(
            Dims::new(4, 1),
            vec![
                LayerSpec::dense(4, 3, ActivationType::Relu),
                LayerSpec::dense(2, 1, ActivationType::Softmax),
            ],
        )
        .unwrap_err();
        assert!(format!("{err}").contains("layer 1"));
    }

    #[test]
    fn rejects_bad_bias_and_empty() {
        let mut spec = LayerSpec::dense(4, 3, ActivationType::Relu);
        spec.bias = Dims::new(3, 2);
        assert!(Topology::new(Dims::new(4, 1), vec![spec]).is_err());
        assert!(Topology::new(Dims::new(4, 1), vec![]).is_err());
        assert!(Topology::new(Dims::new(0, 1), vec![]).is_err());
    }

    #[test]
    fn overflowing_dims_are_rejected() {
        let huge = Topology {
            input: Dims::new(usize::MAX, 2),
            layers: vec![LayerSpec::dense(4, 3, ActivationType::Relu)],
        };
        assert!(matches!(huge.validate(), Err(Error::InvalidConfig(_))));

        let mut spec = LayerSpec::dense(4, usize::MAX, ActivationType::Relu);
        spec.weights = Dims::new(usize::MAX, 4);
        let wide = Topology {
            input: Dims::new(4, 1),
            layers: vec![spec],
        };
        assert!(matches!(wide.validate(), Err(Error::InvalidConfig(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn overflowing_json_dims_are_rejected() {
        let json = r#"{
            "input": { "rows": 18446744073709551615, "cols": 2 },
            "layers": [
                { "weights": { "rows": 2, "cols": 4 }, "bias": { "rows": 2, "cols": 1 }, "activation": "softmax" }
            ]
        }"#;
        let err = Topology::from_json_str(json).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn parses_json_config() {
        let json = r#"{
            "input": { "rows": 2, "cols": 2 },
            "layers": [
                { "weights": { "rows": 3, "cols": 4 }, "bias": { "rows": 3, "cols": 1 }, "activation": "relu" },
                { "weights": { "rows": 2, "cols": 3 }, "bias": { "rows": 2, "cols": 1 }, "activation": "softmax" }
            ]
        }"#;
        let t = Topology::from_json_str(json).unwrap();
        assert_eq!(t.num_layers(), 2);
        assert_eq!(t.layers[1].activation, ActivationType::Softmax);

        let bad = json.replace(r#""cols": 3 }"#, r#""cols": 5 }"#);
        assert!(Topology::from_json_str(&bad).is_err());
    }
}
