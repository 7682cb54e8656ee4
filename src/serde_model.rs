//! Network serialization/deserialization (feature: `serde`).
//!
//! A versioned JSON format holding the topology and every parameter. Internal structs are not
//! serialized directly, so the file format stays stable if their representation changes.
//! Loading validates the version, parameter lengths, and that all parameters are finite, then
//! goes through the regular [`MlpNetwork::with_topology`] shape checks.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::matrix::Dims;
use crate::topology::{LayerSpec, Topology};
use crate::{ActivationType, Error, Matrix, MlpNetwork, Result};

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SerializedNetwork {
    pub format_version: u32,
    pub input: Dims,
    pub layers: Vec<SerializedLayer>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SerializedLayer {
    /// Output dimension (weight rows, bias rows).
    pub rows: usize,
    /// Input dimension (weight cols).
    pub cols: usize,
    pub activation: ActivationType,
    /// Row-major (rows, cols).
    pub weights: Vec<f32>,
    pub biases: Vec<f32>,
}

impl SerializedLayer {
    fn validate(&self, i: usize) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::InvalidData(format!(
                "layer {i} dims must be > 0, got rows={} cols={}",
                self.rows, self.cols
            )));
        }
        let expected_w = self
            .rows
            .checked_mul(self.cols)
            .ok_or_else(|| Error::InvalidData(format!("layer {i} weight shape overflow")))?;
        if self.weights.len() != expected_w {
            return Err(Error::InvalidData(format!(
                "layer {i} weights length {} does not match rows * cols ({} * {})",
                self.weights.len(),
                self.rows,
                self.cols
            )));
        }
        if self.biases.len() != self.rows {
            return Err(Error::InvalidData(format!(
                "layer {i} biases length {} does not match rows {}",
                self.biases.len(),
                self.rows
            )));
        }
        if self.weights.iter().chain(&self.biases).any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(format!(
                "layer {i} parameters must be finite"
            )));
        }
        Ok(())
    }
}

impl SerializedNetwork {
    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported model format_version {}; expected {}",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate(i)?;
        }
        Ok(())
    }
}

impl From<&MlpNetwork> for SerializedNetwork {
    fn from(net: &MlpNetwork) -> Self {
        let layers = net
            .layers()
            .iter()
            .map(|d| SerializedLayer {
                rows: d.weights().rows(),
                cols: d.weights().cols(),
                activation: d.activation().kind(),
                weights: d.weights().as_slice().to_vec(),
                biases: d.bias().as_slice().to_vec(),
            })
            .collect();
        Self {
            format_version: MODEL_FORMAT_VERSION,
            input: net.topology().input,
            layers,
        }
    }
}

impl TryFrom<SerializedNetwork> for MlpNetwork {
    type Error = Error;

    fn try_from(value: SerializedNetwork) -> std::result::Result<Self, Self::Error> {
        value.validate()?;

        let specs = value
            .layers
            .iter()
            .map(|l| LayerSpec::dense(l.cols, l.rows, l.activation))
            .collect();
        let topology = Topology::new(value.input, specs)?;

        let mut weights = Vec::with_capacity(value.layers.len());
        let mut biases = Vec::with_capacity(value.layers.len());
        for l in value.layers {
            biases.push(Matrix::from_vec(l.rows, 1, l.biases)?);
            weights.push(Matrix::from_vec(l.rows, l.cols, l.weights)?);
        }

        MlpNetwork::with_topology(topology, weights, biases)
    }
}

impl MlpNetwork {
    /// Serialize the network to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&SerializedNetwork::from(self))
            .map_err(|e| Error::InvalidData(format!("failed to serialize network: {e}")))
    }

    /// Serialize the network to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(&SerializedNetwork::from(self))
            .map_err(|e| Error::InvalidData(format!("failed to serialize network: {e}")))
    }

    /// Parse a network from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let ser: SerializedNetwork = serde_json::from_str(s)
            .map_err(|e| Error::InvalidData(format!("failed to parse network json: {e}")))?;
        ser.try_into()
    }

    /// Save the network to a JSON file (pretty-printed).
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = self.to_json_string_pretty()?;
        let p = path.as_ref();
        std::fs::write(p, s)
            .map_err(|e| Error::InvalidData(format!("failed to write {}: {e}", p.display())))?;
        Ok(())
    }

    /// Load a network from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::InvalidData(format!("failed to read {}: {e}", p.display())))?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> MlpNetwork {
        let t = Topology::new(
            Dims::new(2, 1),
            vec![
                LayerSpec::dense(2, 3, ActivationType::Relu),
                LayerSpec::dense(3, 2, ActivationType::Softmax),
            ],
        )
        .unwrap();
        let w = vec![
            Matrix::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
            Matrix::from_vec(2, 3, vec![0.5, -0.5, 1.0, -1.0, 0.25, 0.0]).unwrap(),
        ];
        let b = vec![
            Matrix::from_vec(3, 1, vec![0.1, 0.2, 0.3]).unwrap(),
            Matrix::from_vec(2, 1, vec![0.0, 0.4]).unwrap(),
        ];
        MlpNetwork::with_topology(t, w, b).unwrap()
    }

    #[test]
    fn json_roundtrip_preserves_network() {
        let net = small();
        let json = net.to_json_string().unwrap();
        assert!(json.contains(r#""activation":"softmax""#));
        let loaded = MlpNetwork::from_json_str(&json).unwrap();
        assert_eq!(loaded, net);
    }

    #[test]
    fn rejects_unknown_version() {
        let bad = r#"{"format_version":999,"input":{"rows":1,"cols":1},"layers":[]}"#;
        let err = MlpNetwork::from_json_str(bad).unwrap_err();
        assert!(format!("{err}").contains("format_version"));
    }

    #[test]
    fn rejects_wrong_lengths_and_non_finite() {
        let mut ser = SerializedNetwork::from(&small());
        ser.layers[0].biases.pop();
        assert!(MlpNetwork::try_from(ser).is_err());

        let mut ser = SerializedNetwork::from(&small());
        ser.layers[1].weights[0] = f32::NAN;
        assert!(MlpNetwork::try_from(ser).is_err());
    }

    #[test]
    fn rejects_broken_chaining() {
        let mut ser = SerializedNetwork::from(&small());
        ser.layers[1].cols = 2;
        ser.layers[1].weights.truncate(4);
        let err = MlpNetwork::try_from(ser).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
