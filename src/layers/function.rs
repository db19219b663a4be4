use crate::backend::{Backend, ParameterRegistry};
use crate::resolver::{resolve_input_shape, InputSpec};
use crate::shape::Signature;

use super::{ConfigError, Feedforward, Layer, ShapeError, Value};

/// Layer that applies an arbitrary caller-supplied function to its input.
///
/// This is the escape hatch for transforms the shape inference pass cannot
/// describe. By default the layer assumes the function preserves shapes:
/// [`Layer::infer_output_shape`] returns its input unchanged regardless of
/// what the function does to data. That default is deliberately permissive
/// and not shape-safe; a mismatch surfaces at execution time instead of
/// during assembly. Callers that know the function's shape behavior should
/// install a callback with [`FunctionLayer::with_shape_inference`].
pub struct FunctionLayer<V> {
    function: Box<dyn Fn(Value<V>) -> Value<V>>,
    shape_inference: Box<dyn Fn(&Signature) -> Signature>,
    input_signature: Signature,
}

impl<V> FunctionLayer<V> {
    const NAME: &'static str = "Function";

    pub fn new(
        function: impl Fn(Value<V>) -> Value<V> + 'static,
        spec: InputSpec,
    ) -> Result<FunctionLayer<V>, ConfigError> {
        let (input_signature, _) = resolve_input_shape(&spec, Self::NAME)?;
        Ok(FunctionLayer {
            function: Box::new(function),
            // Identity is the documented default for opaque transforms.
            shape_inference: Box::new(|signature| signature.clone()),
            input_signature,
        })
    }

    /// Install a callback that computes the output signature from the input
    /// signature, replacing the identity default.
    pub fn with_shape_inference(
        mut self,
        shape_inference: impl Fn(&Signature) -> Signature + 'static,
    ) -> FunctionLayer<V> {
        self.shape_inference = Box::new(shape_inference);
        self
    }

    /// Register parameters used by the wrapped function with `registry`.
    ///
    /// The parameters are assumed to be captured by the function itself; the
    /// layer only forwards the handles and keeps no copy.
    pub fn register_parameters<P>(
        self,
        parameters: impl IntoIterator<Item = P>,
        registry: &mut dyn ParameterRegistry<P>,
    ) -> FunctionLayer<V> {
        for parameter in parameters {
            registry.register(parameter);
        }
        self
    }
}

impl<V> Layer for FunctionLayer<V> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn input_signature(&self) -> &Signature {
        &self.input_signature
    }

    fn infer_output_shape(&self, input: &Signature) -> Result<Signature, ShapeError> {
        Ok((self.shape_inference)(input))
    }
}

impl<V: Clone> Feedforward<V> for FunctionLayer<V> {
    fn feedforward(
        &self,
        input: Value<V>,
        _backend: &dyn Backend<V>,
    ) -> Result<Value<V>, ShapeError> {
        Ok((self.function)(input))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{RecordingRegistry, VecBackend};
    use super::{Feedforward, FunctionLayer, Layer, Value};
    use crate::resolver::InputSpec;
    use crate::shape;
    use crate::shape::{Shape, Signature};

    /// A transform that does not preserve shapes: it drops every other
    /// element of a 1-D buffer.
    fn halve(input: Value<Vec<i32>>) -> Value<Vec<i32>> {
        match input {
            Value::Single(values) => Value::Single(values.into_iter().step_by(2).collect()),
            other => other,
        }
    }

    #[test]
    fn test_default_shape_inference_is_identity() {
        let layer = FunctionLayer::new(halve, InputSpec::with_dimensions(1)).unwrap();

        // The default assumes a shape-preserving function even though this
        // one is not; the permissive passthrough is the documented contract,
        // not an error.
        let input = Signature::Single(shape![6]);
        assert_eq!(layer.infer_output_shape(&input), Ok(input.clone()));

        let output = layer
            .feedforward(Value::Single(vec![1, 2, 3, 4, 5, 6]), &VecBackend)
            .unwrap();
        assert_eq!(output, Value::Single(vec![1, 3, 5]));
    }

    #[test]
    fn test_custom_shape_inference() {
        let layer = FunctionLayer::new(halve, InputSpec::with_dimensions(1))
            .unwrap()
            .with_shape_inference(|signature| match signature {
                Signature::Single(shape) => Signature::Single(
                    shape
                        .iter()
                        .map(|dim| match dim.size() {
                            Some(size) => crate::Dim::Known(size.div_ceil(2)),
                            None => crate::Dim::Unknown,
                        })
                        .collect::<Shape>(),
                ),
                other => other.clone(),
            });

        let output = layer
            .infer_output_shape(&Signature::Single(shape![6]))
            .unwrap();
        assert_eq!(output, Signature::Single(shape![3]));

        let output = layer
            .infer_output_shape(&Signature::Single(shape![_]))
            .unwrap();
        assert_eq!(output, Signature::Single(shape![_]));
    }

    #[test]
    fn test_parameter_registration_is_forwarded() {
        let mut registry = RecordingRegistry::default();
        let _layer = FunctionLayer::new(
            |input: Value<Vec<i32>>| input,
            InputSpec::with_dimensions(2),
        )
        .unwrap()
        .register_parameters(
            ["weight".to_string(), "bias".to_string()],
            &mut registry,
        );
        assert_eq!(registry.registered, vec!["weight", "bias"]);
    }
}
