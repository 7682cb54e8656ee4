//! Loading parameters and images from raw binary files.
//!
//! Files carry no header: exactly `rows * cols` little-endian `f32` values in row-major order,
//! with the shape supplied by the caller.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, warn};

use crate::matrix::Dims;
use crate::topology::Topology;
use crate::{Error, Matrix, MlpNetwork, Result};

const F32_BYTES: u64 = 4;

/// Read a `dims`-shaped matrix from `path`.
///
/// A file shorter than `dims.len()` values is an error; trailing bytes are ignored with a warning.
pub fn load_matrix<P: AsRef<Path>>(path: P, dims: Dims) -> Result<Matrix> {
    let p = path.as_ref();
    let file = File::open(p)
        .map_err(|e| Error::InvalidData(format!("failed to open {}: {e}", p.display())))?;

    let expected = dims
        .checked_len()
        .and_then(|n| (n as u64).checked_mul(F32_BYTES))
        .ok_or_else(|| Error::InvalidShape(format!("{dims} matrix overflows the file size")))?;
    let actual = file.metadata()?.len();
    if actual > expected {
        warn!(
            "{} has {actual} bytes, only the first {expected} are used for a {dims} matrix",
            p.display()
        );
    }

    let mut reader = BufReader::new(file);
    let m = Matrix::from_reader(dims.rows, dims.cols, &mut reader)
        .map_err(|e| match e {
            Error::InvalidData(msg) => Error::InvalidData(format!("{}: {msg}", p.display())),
            Error::Io(io) => {
                warn!("failed to read {}: {io}", p.display());
                Error::Io(io)
            }
            other => other,
        })?;
    debug!("loaded {dims} matrix from {}", p.display());
    Ok(m)
}

/// Read an image shaped like `topology.input` and vectorise it to a column.
pub fn load_image<P: AsRef<Path>>(path: P, topology: &Topology) -> Result<Matrix> {
    let mut image = load_matrix(path, topology.input)?;
    image.vectorize();
    Ok(image)
}

/// Read every layer's weights and bias with the shapes `topology` requires.
pub fn load_parameters<P: AsRef<Path>>(
    topology: &Topology,
    weight_paths: &[P],
    bias_paths: &[P],
) -> Result<(Vec<Matrix>, Vec<Matrix>)> {
    let n = topology.num_layers();
    if weight_paths.len() != n || bias_paths.len() != n {
        return Err(Error::InvalidConfig(format!(
            "expected {n} weight and {n} bias files, got {} and {}",
            weight_paths.len(),
            bias_paths.len()
        )));
    }

    let mut weights = Vec::with_capacity(n);
    let mut biases = Vec::with_capacity(n);
    for (spec, (w, b)) in topology.layers.iter().zip(weight_paths.iter().zip(bias_paths)) {
        weights.push(load_matrix(w, spec.weights)?);
        biases.push(load_matrix(b, spec.bias)?);
    }
    Ok((weights, biases))
}

/// Load parameters from disk and build the network.
pub fn load_network<P: AsRef<Path>>(
    topology: Topology,
    weight_paths: &[P],
    bias_paths: &[P],
) -> Result<MlpNetwork> {
    let (weights, biases) = load_parameters(&topology, weight_paths, bias_paths)?;
    MlpNetwork::with_topology(topology, weights, biases)
}
