use crate::backend::Backend;
use crate::resolver::{resolve_input_shape, InputSpec};
use crate::shape::Signature;

use super::{ConfigError, Feedforward, Layer, ShapeError, Value};

/// Layer that sums its inputs elementwise.
///
/// All inputs must have the same shape, with wildcards matching any size;
/// the output shape is the first input's shape unchanged.
#[derive(Debug)]
pub struct AddLayer {
    input_signature: Signature,
    num_inputs: usize,
}

impl AddLayer {
    const NAME: &'static str = "Add";

    /// Create an elementwise addition layer.
    ///
    /// Fails unless the resolved input count exceeds one: provide
    /// `spec.num_inputs` or a multi-input shape signature.
    pub fn new(spec: InputSpec) -> Result<AddLayer, ConfigError> {
        let (input_signature, num_inputs) = resolve_input_shape(&spec, Self::NAME)?;
        if num_inputs <= 1 {
            return Err(ConfigError::NotEnoughInputs {
                layer: Self::NAME.to_string(),
                num_inputs,
            });
        }
        Ok(AddLayer {
            input_signature,
            num_inputs,
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }
}

impl Layer for AddLayer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn input_signature(&self) -> &Signature {
        &self.input_signature
    }

    fn infer_output_shape(&self, input: &Signature) -> Result<Signature, ShapeError> {
        let Some(shapes) = input.as_multi() else {
            return Err(ShapeError::ExpectedMultiInput {
                layer: Self::NAME.to_string(),
            });
        };
        if shapes.len() != self.num_inputs {
            return Err(ShapeError::WrongInputCount {
                layer: Self::NAME.to_string(),
                expected: self.num_inputs,
                actual: shapes.len(),
            });
        }
        let [first, rest @ ..] = shapes else {
            // num_inputs > 1, so the count check above rejects empty lists.
            unreachable!();
        };
        for shape in rest {
            if !shape.compatible_with(first) {
                return Err(ShapeError::IncompatibleShapes {
                    layer: Self::NAME.to_string(),
                    axis: None,
                    shapes: shapes.to_vec(),
                });
            }
        }
        Ok(Signature::Single(first.clone()))
    }
}

impl<V: Clone> Feedforward<V> for AddLayer {
    fn feedforward(
        &self,
        input: Value<V>,
        backend: &dyn Backend<V>,
    ) -> Result<Value<V>, ShapeError> {
        let values = input.into_multi().ok_or_else(|| ShapeError::ExpectedMultiInput {
            layer: Self::NAME.to_string(),
        })?;
        Ok(Value::Single(backend.add_n(values)))
    }
}
