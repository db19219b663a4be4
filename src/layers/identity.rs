use crate::backend::Backend;
use crate::resolver::{resolve_input_shape, InputSpec};
use crate::shape::Signature;

use super::{ConfigError, Feedforward, Layer, ShapeError, Value};

/// Layer that passes its input through unchanged.
///
/// The minimal form of the layer contract: construction resolves the input
/// signature, and both operations return their argument as-is with no
/// validation.
#[derive(Debug)]
pub struct IdentityLayer {
    input_signature: Signature,
}

impl IdentityLayer {
    const NAME: &'static str = "Identity";

    pub fn new(spec: InputSpec) -> Result<IdentityLayer, ConfigError> {
        let spec = InputSpec {
            num_inputs: Some(1),
            ..spec
        };
        let (input_signature, _) = resolve_input_shape(&spec, Self::NAME)?;
        Ok(IdentityLayer { input_signature })
    }
}

impl Layer for IdentityLayer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn input_signature(&self) -> &Signature {
        &self.input_signature
    }

    fn infer_output_shape(&self, input: &Signature) -> Result<Signature, ShapeError> {
        Ok(input.clone())
    }
}

impl<V: Clone> Feedforward<V> for IdentityLayer {
    fn feedforward(
        &self,
        input: Value<V>,
        _backend: &dyn Backend<V>,
    ) -> Result<Value<V>, ShapeError> {
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::VecBackend;
    use super::{Feedforward, IdentityLayer, Layer, Value};
    use crate::resolver::InputSpec;
    use crate::shape;
    use crate::shape::Signature;

    #[test]
    fn test_identity_laws() {
        let layer = IdentityLayer::new(InputSpec::with_dimensions(3)).unwrap();

        let signatures = [
            Signature::Single(shape![2, 3, 4]),
            Signature::Single(shape![_, _, _]),
            Signature::Multi(vec![shape![1], shape![2]]),
        ];
        for signature in signatures {
            assert_eq!(layer.infer_output_shape(&signature), Ok(signature.clone()));
        }

        let value = Value::Single(vec![1, 2, 3]);
        assert_eq!(
            layer.feedforward(value.clone(), &VecBackend),
            Ok(value)
        );
    }
}
