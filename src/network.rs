use std::fmt;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::matrix::Dims;
use crate::topology::{LayerSpec, Topology};
use crate::{Activation, ActivationType, Dense, Error, Matrix, Result};

/// Classification result: the winning class and its softmax probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Digit {
    pub value: usize,
    pub probability: f32,
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (p={})", self.value, self.probability)
    }
}

/// A feed-forward stack of [`Dense`] layers whose parameter shapes are fixed by a [`Topology`].
///
/// Immutable after construction: inference takes `&self`, so repeated calls on the same input
/// give bit-identical results.
#[derive(Debug, Clone, PartialEq)]
pub struct MlpNetwork {
    topology: Topology,
    layers: Vec<Dense>,
}

impl MlpNetwork {
    /// Digit classifier from four weight and four bias matrices.
    ///
    /// See [`Topology::digits`] for the required shapes.
    pub fn new(weights: Vec<Matrix>, biases: Vec<Matrix>) -> Result<Self> {
        Self::with_topology(Topology::digits(), weights, biases)
    }

    /// Build a network and check every parameter against `topology`.
    ///
    /// All weight shapes are checked before any bias shape; the first mismatch is returned.
    pub fn with_topology(
        topology: Topology,
        weights: Vec<Matrix>,
        biases: Vec<Matrix>,
    ) -> Result<Self> {
        topology.validate()?;

        let n = topology.num_layers();
        if weights.len() != n || biases.len() != n {
            return Err(Error::InvalidConfig(format!(
                "expected {n} weight and {n} bias matrices, got {} and {}",
                weights.len(),
                biases.len()
            )));
        }

        for (i, (w, spec)) in weights.iter().zip(&topology.layers).enumerate() {
            check_param(i, "weights", spec.weights, w.dims())?;
        }
        for (i, (b, spec)) in biases.iter().zip(&topology.layers).enumerate() {
            check_param(i, "bias", spec.bias, b.dims())?;
        }

        let layers = weights
            .into_iter()
            .zip(biases)
            .zip(&topology.layers)
            .map(|((w, b), spec)| Dense::with_activation(w, b, activation_for(spec)))
            .collect();

        debug!(
            "built network with {n} layers, input {}",
            topology.input_vector_dims()
        );
        Ok(Self { topology, layers })
    }

    /// Network with He-uniform random weights and zero biases.
    pub fn new_with_seed(topology: Topology, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(topology, &mut rng)
    }

    pub fn new_with_rng<R: Rng + ?Sized>(topology: Topology, rng: &mut R) -> Result<Self> {
        topology.validate()?;

        let mut weights = Vec::with_capacity(topology.num_layers());
        let mut biases = Vec::with_capacity(topology.num_layers());
        for spec in &topology.layers {
            let limit = (6.0 / spec.in_dim() as f32).sqrt();
            let mut w = Matrix::zeros(spec.weights)?;
            for v in w.as_mut_slice() {
                *v = rng.gen_range(-limit..limit);
            }
            weights.push(w);
            biases.push(Matrix::zeros(spec.bias)?);
        }

        Self::with_topology(topology, weights, biases)
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Run `input` through every layer and return the final output vector.
    ///
    /// The input shape is not checked up front; the first layer's product rejects a mismatch.
    pub fn forward(&self, input: &Matrix) -> Result<Matrix> {
        let mut layers = self.layers.iter();
        let Some(first) = layers.next() else {
            return Err(Error::InvalidConfig("network has no layers".to_owned()));
        };

        let mut out = first.apply(input)?;
        for layer in layers {
            out = layer.apply(&out)?;
        }
        Ok(out)
    }

    /// Classify `input` (a vectorised image).
    ///
    /// The winner is the first strictly greatest probability, starting from a best of 0.
    pub fn infer(&self, input: &Matrix) -> Result<Digit> {
        let probs = self.forward(input)?;
        let (value, probability) = probs.argmax();
        Ok(Digit { value, probability })
    }
}

fn check_param(layer: usize, param: &'static str, expected: Dims, actual: Dims) -> Result<()> {
    if expected != actual {
        return Err(Error::LayerShape {
            layer,
            param,
            expected,
            actual,
        });
    }
    Ok(())
}

fn activation_for(spec: &LayerSpec) -> Activation {
    match spec.activation {
        ActivationType::Softmax => {
            Activation::with_expected_dims(ActivationType::Softmax, spec.bias)
        }
        kind => Activation::new(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_params(t: &Topology) -> (Vec<Matrix>, Vec<Matrix>) {
        let w = t.layers.iter().map(|l| Matrix::zeros(l.weights).unwrap()).collect();
        let b = t.layers.iter().map(|l| Matrix::zeros(l.bias).unwrap()).collect();
        (w, b)
    }

    #[test]
    fn zero_network_picks_class_zero() {
        let (w, b) = zero_params(&Topology::digits());
        let net = MlpNetwork::new(w, b).unwrap();
        let digit = net.infer(&Matrix::new(784, 1).unwrap()).unwrap();
        assert_eq!(digit.value, 0);
        assert!((digit.probability - 0.1).abs() < 1e-6);
    }

    #[test]
    fn wrong_weight_shape_is_rejected() {
        let (mut w, b) = zero_params(&Topology::digits());
        w[2] = Matrix::new(20, 65).unwrap();
        let err = MlpNetwork::new(w, b).unwrap_err();
        match err {
            Error::LayerShape {
                layer,
                param,
                expected,
                actual,
            } => {
                assert_eq!(layer, 2);
                assert_eq!(param, "weights");
                assert_eq!(expected, Dims::new(20, 64));
                assert_eq!(actual, Dims::new(20, 65));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn weights_are_checked_before_biases() {
        let (mut w, mut b) = zero_params(&Topology::digits());
        b[0] = Matrix::new(1, 1).unwrap();
        w[3] = Matrix::new(1, 1).unwrap();
        let err = MlpNetwork::new(w, b).unwrap_err();
        assert!(matches!(err, Error::LayerShape { layer: 3, param: "weights", .. }));
    }

    #[test]
    fn wrong_bias_shape_is_rejected() {
        let (w, mut b) = zero_params(&Topology::digits());
        b[3] = Matrix::new(1, 10).unwrap();
        let err = MlpNetwork::new(w, b).unwrap_err();
        assert!(matches!(err, Error::LayerShape { layer: 3, param: "bias", .. }));
    }

    #[test]
    fn wrong_matrix_count_is_rejected() {
        let (mut w, b) = zero_params(&Topology::digits());
        w.pop();
        assert!(matches!(MlpNetwork::new(w, b), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn wrong_input_shape_fails_in_first_layer() {
        let net = MlpNetwork::new_with_seed(Topology::digits(), 0).unwrap();
        let mut image = Matrix::new(28, 28).unwrap();
        assert!(matches!(
            net.infer(&image),
            Err(Error::ShapeMismatch { op: "*", .. })
        ));
        image.vectorize();
        assert!(net.infer(&image).is_ok());
    }

    #[test]
    fn seeded_init_is_deterministic() {
        let a = MlpNetwork::new_with_seed(Topology::digits(), 123).unwrap();
        let b = MlpNetwork::new_with_seed(Topology::digits(), 123).unwrap();
        assert_eq!(a, b);

        let input = Matrix::from_vec(784, 1, (0..784).map(|i| (i % 7) as f32 / 7.0).collect())
            .unwrap();
        let first = a.infer(&input).unwrap();
        let second = a.infer(&input).unwrap();
        assert_eq!(first.value, second.value);
        assert_eq!(first.probability.to_bits(), second.probability.to_bits());
        assert_eq!(first, b.infer(&input).unwrap());
    }

    #[test]
    fn hand_computed_two_layer_network() {
        let t = Topology::new(
            Dims::new(2, 1),
            vec![
                LayerSpec::dense(2, 2, ActivationType::Relu),
                LayerSpec::dense(2, 2, ActivationType::Softmax),
            ],
        )
        .unwrap();
        let w = vec![
            Matrix::from_rows(&[&[1.0, 0.0], &[0.0, -1.0]]).unwrap(),
            Matrix::identity(2).unwrap(),
        ];
        let b = vec![
            Matrix::new(2, 1).unwrap(),
            Matrix::from_vec(2, 1, vec![0.0, 2.0]).unwrap(),
        ];
        let net = MlpNetwork::with_topology(t, w, b).unwrap();

        // relu([1, -3]) = [1, 0]; + [0, 2] = [1, 2]; softmax -> class 1.
        let x = Matrix::from_vec(2, 1, vec![1.0, 3.0]).unwrap();
        let digit = net.infer(&x).unwrap();
        assert_eq!(digit.value, 1);
        let expected = 1.0 / (1.0 + (-1.0_f32).exp());
        assert!((digit.probability - expected).abs() < 1e-6);
        assert_eq!(digit.to_string(), format!("1 (p={})", digit.probability));
    }
}
