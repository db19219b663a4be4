//! Call contracts for the external collaborators layers delegate to.

/// Numeric backend that executes tensor operations at feedforward time.
///
/// The shape inference core never touches tensor data itself. Once shapes
/// have been validated during graph assembly, a layer's `feedforward` hands
/// the concrete values to one of these operations. `V` is the backend's
/// tensor handle and is expected to be cheap to clone (a reference-counted
/// buffer, a view, an expression node).
pub trait Backend<V> {
    /// Concatenate `inputs` along `axis`. An axis of `-1` selects each
    /// input's last axis.
    fn concatenate(&self, inputs: Vec<V>, axis: isize) -> V;

    /// Elementwise sum over all of `inputs`.
    fn add_n(&self, inputs: Vec<V>) -> V;
}

/// Registry that takes ownership of parameters created alongside a
/// [`FunctionLayer`](crate::layers::FunctionLayer).
///
/// Registration is forward-only: the core hands parameter handles over and
/// relies on no return contract. Handles are opaque to this crate.
pub trait ParameterRegistry<P> {
    fn register(&mut self, parameter: P);
}
