//! Canonicalization of construction-time shape information.

use crate::layers::ConfigError;
use crate::shape::{Shape, Signature};

/// Dimensionality assumed when neither `dimensions` nor a known shape is
/// given: inputs default to matrices.
const DEFAULT_DIMENSIONS: usize = 2;

/// Construction-time shape information accepted by every layer.
///
/// Callers may supply an explicit per-input dimensionality, an input count,
/// an already-known shape signature, or any combination;
/// [`resolve_input_shape`] normalizes this into one descriptor per input.
#[derive(Clone, Debug, Default)]
pub struct InputSpec {
    /// Number of dimensions per input, used when no known shape is
    /// available.
    pub dimensions: Option<usize>,

    /// Number of inputs the layer accepts.
    pub num_inputs: Option<usize>,

    /// Already-known shape signature, if the caller has one.
    pub known_shape: Option<Signature>,
}

impl InputSpec {
    /// Spec for inputs of `ndim` wildcard dimensions.
    pub fn with_dimensions(ndim: usize) -> InputSpec {
        InputSpec {
            dimensions: Some(ndim),
            ..Default::default()
        }
    }

    /// Spec built from an already-known shape signature.
    pub fn with_known_shape(signature: impl Into<Signature>) -> InputSpec {
        InputSpec {
            known_shape: Some(signature.into()),
            ..Default::default()
        }
    }

    /// Set the number of inputs.
    pub fn num_inputs(mut self, num_inputs: usize) -> InputSpec {
        self.num_inputs = Some(num_inputs);
        self
    }
}

/// Resolve an [`InputSpec`] into a canonical signature and input count.
///
/// Resolution rules, in order:
/// - A known multi-input signature fixes the input count; a `num_inputs`
///   request that disagrees is a [`ConfigError`].
/// - A known single shape combined with `num_inputs > 1` is replicated once
///   per input.
/// - With no known shape, each input gets `dimensions` wildcard dimensions
///   (two if unspecified).
///
/// `layer` names the caller in error diagnostics.
pub fn resolve_input_shape(
    spec: &InputSpec,
    layer: &str,
) -> Result<(Signature, usize), ConfigError> {
    if spec.num_inputs == Some(0) {
        return Err(ConfigError::NoInputs {
            layer: layer.to_string(),
        });
    }

    match &spec.known_shape {
        Some(Signature::Multi(shapes)) => {
            if shapes.is_empty() {
                return Err(ConfigError::NoInputs {
                    layer: layer.to_string(),
                });
            }
            if let Some(requested) = spec.num_inputs {
                if requested != shapes.len() {
                    return Err(ConfigError::ConflictingInputCounts {
                        layer: layer.to_string(),
                        requested,
                        resolved: shapes.len(),
                    });
                }
            }
            Ok((Signature::Multi(shapes.clone()), shapes.len()))
        }
        Some(Signature::Single(shape)) => {
            let num_inputs = spec.num_inputs.unwrap_or(1);
            Ok(replicate(shape.clone(), num_inputs))
        }
        None => {
            let shape = Shape::unknown(spec.dimensions.unwrap_or(DEFAULT_DIMENSIONS));
            let num_inputs = spec.num_inputs.unwrap_or(1);
            Ok(replicate(shape, num_inputs))
        }
    }
}

fn replicate(shape: Shape, num_inputs: usize) -> (Signature, usize) {
    if num_inputs > 1 {
        (Signature::Multi(vec![shape; num_inputs]), num_inputs)
    } else {
        (Signature::Single(shape), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_input_shape, InputSpec};
    use crate::layers::ConfigError;
    use crate::shape;
    use crate::shape::{Shape, Signature};

    #[test]
    fn test_resolve_defaults() {
        // No information at all: one matrix-shaped input.
        let (signature, num_inputs) =
            resolve_input_shape(&InputSpec::default(), "test").unwrap();
        assert_eq!(signature, Signature::Single(Shape::unknown(2)));
        assert_eq!(num_inputs, 1);
    }

    #[test]
    fn test_resolve_dimensions() {
        let (signature, num_inputs) =
            resolve_input_shape(&InputSpec::with_dimensions(4), "test").unwrap();
        assert_eq!(signature, Signature::Single(Shape::unknown(4)));
        assert_eq!(num_inputs, 1);

        let (signature, num_inputs) =
            resolve_input_shape(&InputSpec::with_dimensions(3).num_inputs(3), "test").unwrap();
        assert_eq!(
            signature,
            Signature::Multi(vec![Shape::unknown(3); 3])
        );
        assert_eq!(num_inputs, 3);
    }

    #[test]
    fn test_resolve_known_single_shape() {
        let (signature, num_inputs) =
            resolve_input_shape(&InputSpec::with_known_shape(shape![2, _, 4]), "test").unwrap();
        assert_eq!(signature, Signature::Single(shape![2, _, 4]));
        assert_eq!(num_inputs, 1);

        // A single known shape is replicated over the requested inputs.
        let (signature, num_inputs) = resolve_input_shape(
            &InputSpec::with_known_shape(shape![2, 3]).num_inputs(2),
            "test",
        )
        .unwrap();
        assert_eq!(
            signature,
            Signature::Multi(vec![shape![2, 3], shape![2, 3]])
        );
        assert_eq!(num_inputs, 2);
    }

    #[test]
    fn test_resolve_known_multi_shape() {
        let known = vec![shape![2, 3], shape![2, 5]];
        let (signature, num_inputs) =
            resolve_input_shape(&InputSpec::with_known_shape(known.clone()), "test").unwrap();
        assert_eq!(signature, Signature::Multi(known.clone()));
        assert_eq!(num_inputs, 2);

        let result = resolve_input_shape(
            &InputSpec::with_known_shape(known).num_inputs(3),
            "test",
        );
        assert_eq!(
            result.err(),
            Some(ConfigError::ConflictingInputCounts {
                layer: "test".to_string(),
                requested: 3,
                resolved: 2,
            })
        );
    }

    #[test]
    fn test_resolve_zero_inputs() {
        let result = resolve_input_shape(&InputSpec::default().num_inputs(0), "test");
        assert_eq!(
            result.err(),
            Some(ConfigError::NoInputs {
                layer: "test".to_string()
            })
        );

        let result =
            resolve_input_shape(&InputSpec::with_known_shape(Vec::<Shape>::new()), "test");
        assert!(result.is_err());
    }
}
