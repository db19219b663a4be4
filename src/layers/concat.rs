use crate::backend::Backend;
use crate::resolver::{resolve_input_shape, InputSpec};
use crate::shape::{Dim, Shape, Signature};

use super::{ConfigError, Feedforward, Layer, ShapeError, Value};

/// Axes supported for concatenation. `-1` selects each input's last axis.
const SUPPORTED_AXES: [isize; 6] = [0, 1, 2, 3, 4, -1];

/// Layer that concatenates its inputs along a configured axis.
///
/// All inputs must agree in every dimension except the concatenation axis.
/// The output's size along that axis is the sum of the inputs' sizes there;
/// a wildcard in any input makes it a wildcard in the output.
#[derive(Debug)]
pub struct ConcatenateLayer {
    axis: isize,
    input_signature: Signature,
    num_inputs: usize,
}

impl ConcatenateLayer {
    const NAME: &'static str = "Concatenate";

    pub fn new(axis: isize, spec: InputSpec) -> Result<ConcatenateLayer, ConfigError> {
        if !SUPPORTED_AXES.contains(&axis) {
            return Err(ConfigError::UnsupportedAxis {
                layer: Self::NAME.to_string(),
                axis,
            });
        }
        let (input_signature, num_inputs) = resolve_input_shape(&spec, Self::NAME)?;
        Ok(ConcatenateLayer {
            axis,
            input_signature,
            num_inputs,
        })
    }

    pub fn axis(&self) -> isize {
        self.axis
    }

    /// Resolve the configured axis against `shape`'s rank.
    fn resolved_axis(&self, shape: &Shape) -> Result<usize, ShapeError> {
        let ndim = shape.ndim();
        let axis = if self.axis == -1 {
            ndim.checked_sub(1)
        } else {
            let axis = self.axis as usize;
            (axis < ndim).then_some(axis)
        };
        axis.ok_or_else(|| ShapeError::AxisOutOfRange {
            layer: Self::NAME.to_string(),
            axis: self.axis,
            ndim,
        })
    }
}

/// Dims of `shape` with the dimension at `axis` removed.
fn drop_axis(shape: &Shape, axis: usize) -> Shape {
    shape
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != axis)
        .map(|(_, dim)| dim)
        .collect()
}

impl Layer for ConcatenateLayer {
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
        let [first, rest @ ..] = shapes else {
            return Err(ShapeError::WrongInputCount {
                layer: Self::NAME.to_string(),
                expected: self.num_inputs,
                actual: 0,
            });
        };

        let first_axis = self.resolved_axis(first)?;
        let off_axis = drop_axis(first, first_axis);
        let mut axis_total = first.dims()[first_axis].size();

        for shape in rest {
            let axis = self.resolved_axis(shape)?;
            if !drop_axis(shape, axis).compatible_with(&off_axis) {
                return Err(ShapeError::IncompatibleShapes {
                    layer: Self::NAME.to_string(),
                    axis: Some(self.axis),
                    shapes: shapes.to_vec(),
                });
            }
            axis_total = match (axis_total, shape.dims()[axis].size()) {
                (Some(total), Some(size)) => Some(total + size),
                _ => None,
            };
        }

        let axis_dim = axis_total.map_or(Dim::Unknown, Dim::Known);
        let output = first
            .iter()
            .take(first_axis)
            .chain(std::iter::once(axis_dim))
            .chain(first.iter().skip(first_axis + 1))
            .collect::<Shape>();
        Ok(Signature::Single(output))
    }
}

impl<V: Clone> Feedforward<V> for ConcatenateLayer {
    fn feedforward(
        &self,
        input: Value<V>,
        backend: &dyn Backend<V>,
    ) -> Result<Value<V>, ShapeError> {
        let values = input.into_multi().ok_or_else(|| ShapeError::ExpectedMultiInput {
            layer: Self::NAME.to_string(),
        })?;
        Ok(Value::Single(backend.concatenate(values, self.axis)))
    }
}
