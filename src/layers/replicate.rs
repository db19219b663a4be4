use crate::backend::Backend;
use crate::resolver::{resolve_input_shape, InputSpec};
use crate::shape::Signature;

use super::{ConfigError, Feedforward, Layer, ShapeError, Value};

/// Layer that replicates its single input a fixed number of times.
///
/// Replication is by handle: feedforward returns `num_replicate` clones of
/// the same input value, so `V` should be cheap to clone. No tensor data is
/// copied by this crate.
#[derive(Debug)]
pub struct ReplicateLayer {
    num_replicate: usize,
    input_signature: Signature,
}

impl ReplicateLayer {
    const NAME: &'static str = "Replicate";

    /// Create a layer that replicates one input `num_replicate` times.
    ///
    /// The layer takes exactly one input; `spec.num_inputs` other than 1 is
    /// rejected.
    pub fn new(num_replicate: usize, spec: InputSpec) -> Result<ReplicateLayer, ConfigError> {
        if num_replicate == 0 {
            return Err(ConfigError::InvalidReplicaCount {
                layer: Self::NAME.to_string(),
            });
        }
        let spec = InputSpec {
            num_inputs: Some(1),
            ..spec
        };
        let (input_signature, _) = resolve_input_shape(&spec, Self::NAME)?;
        Ok(ReplicateLayer {
            num_replicate,
            input_signature,
        })
    }

    pub fn num_replicate(&self) -> usize {
        self.num_replicate
    }
}

impl Layer for ReplicateLayer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn input_signature(&self) -> &Signature {
        &self.input_signature
    }

    fn infer_output_shape(&self, input: &Signature) -> Result<Signature, ShapeError> {
        let shape = input.as_single().ok_or_else(|| ShapeError::ExpectedSingleInput {
            layer: Self::NAME.to_string(),
        })?;
        Ok(Signature::Multi(vec![shape.clone(); self.num_replicate]))
    }
}

impl<V: Clone> Feedforward<V> for ReplicateLayer {
    fn feedforward(
        &self,
        input: Value<V>,
        _backend: &dyn Backend<V>,
    ) -> Result<Value<V>, ShapeError> {
        let value = input.into_single().ok_or_else(|| ShapeError::ExpectedSingleInput {
            layer: Self::NAME.to_string(),
        })?;
        Ok(Value::Multi(vec![value; self.num_replicate]))
    }
}
