//! Layer composition and symbolic shape inference for computation graphs.
//!
//! # About shape inference
//!
//! When a computation graph is assembled, the sizes of some tensor
//! dimensions are not yet known: a batch size or sequence length is only
//! fixed once data arrives. Shape inference is the static-analysis pass
//! that runs over the graph anyway, before any computation, reconciling
//! possibly-unknown dimensions across the inputs of every node and
//! rejecting incompatible graphs while they are still cheap to fix.
//!
//! This crate provides the node types for that pass: a small closed set of
//! layers ([`ReplicateLayer`], [`ConcatenateLayer`], [`AddLayer`],
//! [`IdentityLayer`], [`FunctionLayer`]) operating on [`Shape`] descriptors
//! whose dimensions are either [`Dim::Known`] or the [`Dim::Unknown`]
//! wildcard. The crate never executes tensor operations itself; at
//! execution time each layer delegates to a caller-supplied [`Backend`].
//!
//! # The layer contract
//!
//! A layer goes through three phases:
//!
//! 1. **Construction** resolves the input signature from an [`InputSpec`]
//!    via [`resolve_input_shape`] and validates configuration
//!    ([`ConfigError`] on bad arguments).
//! 2. **Shape inference** ([`Layer::infer_output_shape`], any number of
//!    times) validates upstream shapes and computes the output signature
//!    ([`ShapeError`] on mismatch).
//! 3. **Feedforward** ([`Feedforward::feedforward`], any number of times)
//!    executes over concrete values. No shapes are re-validated here: the
//!    caller is responsible for running inference during assembly. This
//!    trust boundary is part of the contract; [`infer_checked`] and
//!    [`feedforward_checked`] make the assembler-side validation explicit.
//!
//! All operations take `&self` and share no mutable state, so layers can be
//! used freely across threads.
//!
//! # Example
//!
//! ```
//! use shapeflow::{shape, ConcatenateLayer, InputSpec, Layer, Signature};
//!
//! // A layer joining two 3-D inputs along their second axis.
//! let concat = ConcatenateLayer::new(1, InputSpec::with_dimensions(3).num_inputs(2)).unwrap();
//!
//! let inputs = Signature::Multi(vec![shape![2, 3, 4], shape![2, _, 4]]);
//! let output = concat.infer_output_shape(&inputs).unwrap();
//!
//! // The wildcard propagates into the concatenated dimension.
//! assert_eq!(output, Signature::Single(shape![2, _, 4]));
//!
//! // Off-axis dimensions must agree.
//! let inputs = Signature::Multi(vec![shape![2, 3, 4], shape![9, 3, 4]]);
//! assert!(concat.infer_output_shape(&inputs).is_err());
//! ```

pub mod backend;
pub mod layers;
pub mod resolver;
pub mod shape;

pub use backend::{Backend, ParameterRegistry};
pub use layers::{
    feedforward_checked, infer_checked, AddLayer, ConcatenateLayer, ConfigError, Feedforward,
    FunctionLayer, IdentityLayer, Layer, ReplicateLayer, ShapeError, Value,
};
pub use resolver::{resolve_input_shape, InputSpec};
pub use shape::{Dim, Shape, Signature};
