use thiserror::Error;

use crate::matrix::Dims;

/// Errors returned by the checked API.
///
/// Every variant corresponds to a contract violation that aborts the current inference. Callers
/// decide whether that ends the process (the CLI does) or is recovered from.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("out of bounds: {index} for matrix of shape {dims}")]
    OutOfBounds { index: String, dims: Dims },

    #[error("shape mismatch for {op}: {left} vs {right}")]
    ShapeMismatch {
        op: &'static str,
        left: Dims,
        right: Dims,
    },

    #[error("layer {layer} {param} has shape {actual}, expected {expected}")]
    LayerShape {
        layer: usize,
        param: &'static str,
        expected: Dims,
        actual: Dims,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
