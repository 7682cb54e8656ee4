//! Forward inference for a small fully connected digit classifier.
//!
//! `mlp-digits` runs a fixed 4-layer MLP (784 -> 128 -> 64 -> 20 -> 10) over a 28x28 grayscale
//! image and reports the most likely digit with its probability. The numeric core is a dense
//! row-major [`Matrix`], a [`Dense`] layer computing `activation(W x + b)`, and an
//! [`MlpNetwork`] chaining layers whose shapes are fixed by a [`Topology`].
//!
//! # Panics vs `Result`
//!
//! - Checked API: constructors, [`Matrix::get`], [`Matrix::matmul`], [`Matrix::try_add`],
//!   [`Dense::apply`] and [`MlpNetwork::infer`] return [`Result`]. A shape or bounds violation
//!   aborts the current computation; nothing is partially returned.
//! - Operators (`*`, `+`, `+=`, `m[(i, j)]`, `m[i]`) panic on the same violations.
//!
//! Two conditions are only reported through `log`: a softmax input whose shape differs from the
//! layer's expected output, and a parameter file longer than needed.
//!
//! # Data layout
//!
//! - Scalars are `f32`, stored row-major.
//! - Weights have shape `(out_dim, in_dim)`, biases `(out_dim, 1)`.
//! - Inputs are column vectors; a 28x28 image is [`Matrix::vectorize`]d to `784 x 1`.
//! - Parameter and image files are headerless little-endian `f32` streams (see [`io`]).
//!
//! # Quick start
//!
//! ```rust
//! use mlp_digits::{Matrix, MlpNetwork, Topology};
//!
//! # fn main() -> mlp_digits::Result<()> {
//! let topology = Topology::digits();
//! let weights = topology
//!     .layers
//!     .iter()
//!     .map(|l| Matrix::zeros(l.weights))
//!     .collect::<mlp_digits::Result<Vec<_>>>()?;
//! let biases = topology
//!     .layers
//!     .iter()
//!     .map(|l| Matrix::zeros(l.bias))
//!     .collect::<mlp_digits::Result<Vec<_>>>()?;
//! let net = MlpNetwork::new(weights, biases)?;
//!
//! let mut image = Matrix::new(28, 28)?;
//! image.vectorize();
//! let digit = net.infer(&image)?;
//! assert_eq!(digit.value, 0);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod dense;
pub mod error;
pub mod io;
pub(crate) mod matmul;
pub mod matrix;
pub mod network;
pub mod topology;

#[cfg(feature = "serde")]
pub mod serde_model;

pub use activation::{Activation, ActivationType};
pub use dense::Dense;
pub use error::{Error, Result};
pub use matrix::{Dims, Matrix};
pub use network::{Digit, MlpNetwork};
pub use topology::{LayerSpec, Topology};
