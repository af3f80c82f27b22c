// src/tensor/sparse.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::tensor::Tensor;
use std::collections::HashMap;

/// A 1-D vector backed by a sparse index map; missing entries are implicitly
/// zero.
///
/// The "missing = zero" convention only holds when zero is the Real additive
/// identity `0.0`, so construction rejects every other algebra. (In log
/// space the additive identity is `-inf`, and a map defaulting to `0.0` would
/// silently mean "probability one".)
#[derive(Debug, Clone)]
pub struct SparseVec {
    size: usize,
    entries: HashMap<usize, f64>,
}

impl SparseVec {
    /// Creates an empty sparse vector of the given length. Errors with
    /// `AlgebraMismatch` for any algebra other than `Real`.
    pub fn new(algebra: Algebra, size: usize) -> Result<Self, RingGradError> {
        if algebra != Algebra::Real {
            return Err(RingGradError::AlgebraMismatch {
                expected: Algebra::Real,
                actual: algebra,
                operation: "SparseVec::new".to_string(),
            });
        }
        Ok(SparseVec {
            size,
            entries: HashMap::new(),
        })
    }

    pub fn algebra(&self) -> Algebra {
        Algebra::Real
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of explicitly stored entries.
    pub fn num_explicit(&self) -> usize {
        self.entries.len()
    }

    fn check_idx(&self, idx: usize) -> Result<(), RingGradError> {
        if idx >= self.size {
            return Err(RingGradError::IndexOutOfBounds {
                index: vec![idx],
                shape: vec![self.size],
            });
        }
        Ok(())
    }

    pub fn get_value(&self, idx: usize) -> Result<f64, RingGradError> {
        self.check_idx(idx)?;
        Ok(self.entries.get(&idx).copied().unwrap_or(0.0))
    }

    /// Sets the entry, returning the previous value. Setting an entry to
    /// exactly `0.0` removes it from the map.
    pub fn set_value(&mut self, idx: usize, val: f64) -> Result<f64, RingGradError> {
        self.check_idx(idx)?;
        let prev = if val == 0.0 {
            self.entries.remove(&idx)
        } else {
            self.entries.insert(idx, val)
        };
        Ok(prev.unwrap_or(0.0))
    }

    /// Adds into the entry, returning the previous value.
    pub fn add_value(&mut self, idx: usize, val: f64) -> Result<f64, RingGradError> {
        let prev = self.get_value(idx)?;
        self.set_value(idx, prev + val)?;
        Ok(prev)
    }

    pub fn get_sum(&self) -> f64 {
        self.entries.values().sum()
    }

    /// Dot product against a dense tensor of the same length, visiting only
    /// the explicit entries.
    pub fn get_dot_product(&self, dense: &Tensor) -> Result<f64, RingGradError> {
        if dense.algebra() != Algebra::Real {
            return Err(RingGradError::AlgebraMismatch {
                expected: Algebra::Real,
                actual: dense.algebra(),
                operation: "SparseVec::get_dot_product".to_string(),
            });
        }
        if dense.size() != self.size {
            return Err(RingGradError::ShapeMismatch {
                expected: vec![self.size],
                actual: dense.dims().to_vec(),
                operation: "SparseVec::get_dot_product".to_string(),
            });
        }
        let mut acc = 0.0;
        for (&idx, &val) in &self.entries {
            acc += val * dense.get_value(idx)?;
        }
        Ok(acc)
    }

    /// Materializes the dense equivalent.
    pub fn to_dense(&self) -> Tensor {
        let t = Tensor::new(Algebra::Real, vec![self.size]);
        for (&idx, &val) in &self.entries {
            t.set_value(idx, val).expect("index within size");
        }
        t
    }
}
