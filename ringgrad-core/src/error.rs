use crate::algebra::Algebra;
use thiserror::Error;

/// Custom error type for the RingGrad engine.
///
/// Every variant is a programmer or model-construction error; none are
/// recoverable at runtime, so callers are expected to propagate them up to
/// whatever code assembled the graph.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum RingGradError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Rank mismatch: expected {expected} indices, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Algebra mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    AlgebraMismatch {
        expected: Algebra,
        actual: Algebra,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match dims {dims:?}")]
    TensorCreationError { data_len: usize, dims: Vec<usize> },

    #[error("Cycle detected in the computation graph at node {node}")]
    CycleDetected { node: String },

    #[error("Invalid leaf set: {message}")]
    InvalidLeafSet { message: String },

    #[error("Output of module '{module}' read before forward() was called")]
    UninitializedOutput { module: String },

    #[error("normalize() contradiction: sum is infinite but no entry is infinite")]
    NormalizationContradiction,

    #[error("Internal error: {0}")]
    InternalError(String),
}
