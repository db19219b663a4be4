//! Layer variants and the contract they share.
//!
//! Every layer resolves its input signature once at construction, after
//! which both operations can be called any number of times without altering
//! the layer: [`Layer::infer_output_shape`] validates upstream shapes and
//! computes the output signature, and [`Feedforward::feedforward`] executes
//! the operation over concrete values via a [`Backend`].
//!
//! Feedforward performs no dimension checks of its own. It trusts that the
//! graph assembler ran shape inference over the upstream shapes first; this
//! split is part of the layer contract, and [`feedforward_checked`] exists
//! for assemblers that want the structural pre-check made explicit.

use std::error::Error;
use std::fmt;
use std::iter::zip;

use crate::backend::Backend;
use crate::shape::{Shape, Signature};

mod add;
mod concat;
mod function;
mod identity;
mod replicate;

pub use add::AddLayer;
pub use concat::ConcatenateLayer;
pub use function::FunctionLayer;
pub use identity::IdentityLayer;
pub use replicate::ReplicateLayer;

/// Value(s) flowing into or out of a layer at execution time.
///
/// Mirrors the structure of [`Signature`]: a layer that resolves a
/// `Signature::Multi` input expects a `Value::Multi` at feedforward time.
#[derive(Clone, Debug, PartialEq)]
pub enum Value<V> {
    Single(V),
    Multi(Vec<V>),
}

impl<V> Value<V> {
    pub fn num_inputs(&self) -> usize {
        match self {
            Value::Single(_) => 1,
            Value::Multi(values) => values.len(),
        }
    }

    pub fn into_single(self) -> Option<V> {
        match self {
            Value::Single(value) => Some(value),
            Value::Multi(_) => None,
        }
    }

    pub fn into_multi(self) -> Option<Vec<V>> {
        match self {
            Value::Single(_) => None,
            Value::Multi(values) => Some(values),
        }
    }
}

/// Errors raised when a layer is constructed with invalid arguments.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested concatenation axis is not in the supported set.
    UnsupportedAxis { layer: String, axis: isize },

    /// The layer needs more inputs than its resolved signature provides.
    NotEnoughInputs { layer: String, num_inputs: usize },

    /// `num_replicate` must be positive.
    InvalidReplicaCount { layer: String },

    /// The requested input count disagrees with the known shape signature.
    ConflictingInputCounts {
        layer: String,
        requested: usize,
        resolved: usize,
    },

    /// A layer cannot take zero inputs.
    NoInputs { layer: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedAxis { layer, axis } => {
                write!(
                    f,
                    "{}: supported axes are 0, 1, 2, 3, 4 and -1, got {}",
                    layer, axis
                )
            }
            ConfigError::NotEnoughInputs { layer, num_inputs } => {
                write!(
                    f,
                    "{}: expected more than one input, resolved {}; provide \
                     `num_inputs` if no shape signature is given",
                    layer, num_inputs
                )
            }
            ConfigError::InvalidReplicaCount { layer } => {
                write!(f, "{}: `num_replicate` must be positive", layer)
            }
            ConfigError::ConflictingInputCounts {
                layer,
                requested,
                resolved,
            } => {
                write!(
                    f,
                    "{}: requested {} inputs but the known shape signature implies {}",
                    layer, requested, resolved
                )
            }
            ConfigError::NoInputs { layer } => {
                write!(f, "{}: a layer needs at least one input", layer)
            }
        }
    }
}

impl Error for ConfigError {}

/// Errors raised when shape inference rejects its inputs.
///
/// Each variant names the layer that failed; the dimensional variants also
/// carry the offending shapes for diagnostics.
#[derive(Debug, PartialEq, Eq)]
pub enum ShapeError {
    /// The layer takes several inputs but was given a single descriptor.
    ExpectedMultiInput { layer: String },

    /// The layer takes one input but was given a list of descriptors.
    ExpectedSingleInput { layer: String },

    /// The number of descriptors does not match the layer's input count.
    WrongInputCount {
        layer: String,
        expected: usize,
        actual: usize,
    },

    /// The configured axis lies outside the rank of an input shape.
    AxisOutOfRange {
        layer: String,
        axis: isize,
        ndim: usize,
    },

    /// Dimensions that must agree across inputs differ.
    IncompatibleShapes {
        layer: String,
        axis: Option<isize>,
        shapes: Vec<Shape>,
    },
}

fn fmt_shapes(f: &mut fmt::Formatter<'_>, shapes: &[Shape]) -> fmt::Result {
    write!(f, "[")?;
    for (i, shape) in shapes.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", shape)?;
    }
    write!(f, "]")
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::ExpectedMultiInput { layer } => {
                write!(
                    f,
                    "{}: expected one shape descriptor per input, got a single descriptor",
                    layer
                )
            }
            ShapeError::ExpectedSingleInput { layer } => {
                write!(
                    f,
                    "{}: expected a single shape descriptor, got a list of descriptors",
                    layer
                )
            }
            ShapeError::WrongInputCount {
                layer,
                expected,
                actual,
            } => {
                write!(f, "{}: expected {} inputs, got {}", layer, expected, actual)
            }
            ShapeError::AxisOutOfRange { layer, axis, ndim } => {
                write!(
                    f,
                    "{}: axis {} is out of range for a {}-dimensional input",
                    layer, axis, ndim
                )
            }
            ShapeError::IncompatibleShapes {
                layer,
                axis: Some(axis),
                shapes,
            } => {
                write!(f, "{}: input shapes ", layer)?;
                fmt_shapes(f, shapes)?;
                write!(
                    f,
                    " are not consistent for concatenation along axis {}; \
                     shapes must agree in every dimension except the {}-th",
                    axis, axis
                )
            }
            ShapeError::IncompatibleShapes {
                layer,
                axis: None,
                shapes,
            } => {
                write!(f, "{}: all inputs must have the same shape, got ", layer)?;
                fmt_shapes(f, shapes)
            }
        }
    }
}

impl Error for ShapeError {}

/// Shape contract implemented by every layer variant.
///
/// Inference is a pure computation over descriptors: it takes `&self`, does
/// no I/O and completes in time proportional to the shape length, so a
/// single layer can be inferred concurrently from several threads and
/// distinct layers never share state.
pub trait Layer {
    /// Display name of this layer kind, used in error diagnostics.
    fn name(&self) -> &str;

    /// The input signature resolved at construction time.
    fn input_signature(&self) -> &Signature;

    /// Validate `input` against this layer's structural rules and compute
    /// the shape(s) it would produce.
    fn infer_output_shape(&self, input: &Signature) -> Result<Signature, ShapeError>;
}

/// Execution contract of a layer over values of type `V`.
///
/// Errors from `feedforward` are structural only (single value where a list
/// was expected); dimensions are never re-validated here.
pub trait Feedforward<V: Clone>: Layer {
    fn feedforward(&self, input: Value<V>, backend: &dyn Backend<V>) -> Result<Value<V>, ShapeError>;
}

/// Run shape inference with a pre-check of `input` against the signature the
/// layer resolved at construction.
///
/// This is the validation step a graph assembler applies uniformly before
/// each layer's own inference: it rejects calls whose structure (single vs.
/// multi input, input count) or dimensions disagree with what the layer was
/// constructed for, then delegates to [`Layer::infer_output_shape`]. Keeping
/// it a free function keeps the check order visible and testable.
pub fn infer_checked(layer: &dyn Layer, input: &Signature) -> Result<Signature, ShapeError> {
    match (layer.input_signature(), input) {
        (Signature::Single(resolved), Signature::Single(given)) => {
            if !resolved.compatible_with(given) {
                return Err(ShapeError::IncompatibleShapes {
                    layer: layer.name().to_string(),
                    axis: None,
                    shapes: vec![resolved.clone(), given.clone()],
                });
            }
        }
        (Signature::Multi(resolved), Signature::Multi(given)) => {
            if resolved.len() != given.len() {
                return Err(ShapeError::WrongInputCount {
                    layer: layer.name().to_string(),
                    expected: resolved.len(),
                    actual: given.len(),
                });
            }
            for (resolved, given) in zip(resolved, given) {
                if !resolved.compatible_with(given) {
                    return Err(ShapeError::IncompatibleShapes {
                        layer: layer.name().to_string(),
                        axis: None,
                        shapes: vec![resolved.clone(), given.clone()],
                    });
                }
            }
        }
        (Signature::Single(_), Signature::Multi(_)) => {
            return Err(ShapeError::ExpectedSingleInput {
                layer: layer.name().to_string(),
            });
        }
        (Signature::Multi(_), Signature::Single(_)) => {
            return Err(ShapeError::ExpectedMultiInput {
                layer: layer.name().to_string(),
            });
        }
    }
    layer.infer_output_shape(input)
}

/// Pre-check the arity of execution-time inputs against the layer's
/// signature, then feed them forward.
///
/// Only structure is checked; shapes are trusted to have been validated by
/// [`infer_checked`] during assembly.
pub fn feedforward_checked<V: Clone>(
    layer: &dyn Feedforward<V>,
    input: Value<V>,
    backend: &dyn Backend<V>,
) -> Result<Value<V>, ShapeError> {
    match (layer.input_signature(), &input) {
        (Signature::Single(_), Value::Multi(_)) => Err(ShapeError::ExpectedSingleInput {
            layer: layer.name().to_string(),
        }),
        (Signature::Multi(_), Value::Single(_)) => Err(ShapeError::ExpectedMultiInput {
            layer: layer.name().to_string(),
        }),
        (Signature::Multi(shapes), Value::Multi(values)) if shapes.len() != values.len() => {
            Err(ShapeError::WrongInputCount {
                layer: layer.name().to_string(),
                expected: shapes.len(),
                actual: values.len(),
            })
        }
        _ => layer.feedforward(input, backend),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::backend::{Backend, ParameterRegistry};

    /// Backend over 1-D integer buffers, for exercising feedforward paths.
    pub struct VecBackend;

    impl Backend<Vec<i32>> for VecBackend {
        fn concatenate(&self, inputs: Vec<Vec<i32>>, _axis: isize) -> Vec<i32> {
            let mut out = Vec::new();
            for input in inputs {
                out.extend(input);
            }
            out
        }

        fn add_n(&self, inputs: Vec<Vec<i32>>) -> Vec<i32> {
            let mut iter = inputs.into_iter();
            let mut acc = iter.next().unwrap_or_default();
            for input in iter {
                for (a, b) in acc.iter_mut().zip(input) {
                    *a += b;
                }
            }
            acc
        }
    }

    /// Registry that records every handle it is given.
    #[derive(Default)]
    pub struct RecordingRegistry {
        pub registered: Vec<String>,
    }

    impl ParameterRegistry<String> for RecordingRegistry {
        fn register(&mut self, parameter: String) {
            self.registered.push(parameter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::VecBackend;
    use super::{feedforward_checked, infer_checked, Layer, ShapeError, Value};
    use crate::resolver::InputSpec;
    use crate::shape::Signature;
    use crate::{shape, AddLayer, IdentityLayer};

    #[test]
    fn test_infer_checked_structure() {
        let add = AddLayer::new(InputSpec::with_dimensions(2).num_inputs(2)).unwrap();

        // Structure mismatch is caught before the layer's own inference.
        let result = infer_checked(&add, &Signature::Single(shape![2, 2]));
        assert_eq!(
            result,
            Err(ShapeError::ExpectedMultiInput {
                layer: "Add".to_string()
            })
        );

        let result = infer_checked(
            &add,
            &Signature::Multi(vec![shape![2, 2], shape![2, 2], shape![2, 2]]),
        );
        assert_eq!(
            result,
            Err(ShapeError::WrongInputCount {
                layer: "Add".to_string(),
                expected: 2,
                actual: 3
            })
        );

        let result = infer_checked(&add, &Signature::Multi(vec![shape![2, 2], shape![2, 2]]));
        assert_eq!(result, Ok(Signature::Single(shape![2, 2])));
    }

    #[test]
    fn test_infer_checked_dimensions() {
        let identity =
            IdentityLayer::new(InputSpec::with_known_shape(shape![4, _])).unwrap();

        // A wildcard in the resolved signature matches any size.
        let result = infer_checked(&identity, &Signature::Single(shape![4, 9]));
        assert_eq!(result, Ok(Signature::Single(shape![4, 9])));

        // A known size must agree.
        let result = infer_checked(&identity, &Signature::Single(shape![5, 9]));
        assert!(matches!(
            result,
            Err(ShapeError::IncompatibleShapes { .. })
        ));

        let result = infer_checked(&identity, &Signature::Multi(vec![shape![4, 9]]));
        assert_eq!(
            result,
            Err(ShapeError::ExpectedSingleInput {
                layer: "Identity".to_string()
            })
        );
    }

    #[test]
    fn test_feedforward_checked_arity() {
        let add = AddLayer::new(InputSpec::with_dimensions(1).num_inputs(2)).unwrap();

        let result = feedforward_checked(&add, Value::Single(vec![1, 2]), &VecBackend);
        assert_eq!(
            result,
            Err(ShapeError::ExpectedMultiInput {
                layer: "Add".to_string()
            })
        );

        let result = feedforward_checked(
            &add,
            Value::Multi(vec![vec![1, 2], vec![3, 4], vec![5, 6]]),
            &VecBackend,
        );
        assert_eq!(
            result,
            Err(ShapeError::WrongInputCount {
                layer: "Add".to_string(),
                expected: 2,
                actual: 3
            })
        );

        let result = feedforward_checked(
            &add,
            Value::Multi(vec![vec![1, 2], vec![3, 4]]),
            &VecBackend,
        );
        assert_eq!(result, Ok(Value::Single(vec![4, 6])));
    }

    #[test]
    fn test_error_display() {
        let add = AddLayer::new(InputSpec::with_dimensions(2).num_inputs(2)).unwrap();
        let err = add
            .infer_output_shape(&Signature::Multi(vec![shape![2, 3], shape![2, 5]]))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Add"), "{}", message);
        assert!(message.contains("(2, 3)"), "{}", message);
        assert!(message.contains("(2, 5)"), "{}", message);
    }
}
