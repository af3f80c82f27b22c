// src/tensor/mod.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod debug;
mod elementwise;
mod reduction;
mod shape;

pub mod create;
pub mod sparse;
pub mod utils;

pub use create::{full, ones, ones_like, zeros, zeros_like};
pub use sparse::SparseVec;

/// A dense multi-dimensional array whose entries live in one [`Algebra`].
///
/// The entries are `f64` *representations* interpreted by the tensor's
/// algebra (see [`crate::algebra`]); all arithmetic on them goes through the
/// algebra's operations. Layout is row-major over a flat backing buffer:
/// `strides[d] = Π dims[d+1..]` and the buffer slot of a coordinate vector is
/// `offset + Σ strides[i] * indices[i]`. A 1-D "flat" view (the `*_value`
/// methods) coexists with the multi-dimensional view over the same buffer.
///
/// `Clone` is a shallow alias: the clone shares the backing buffer, so
/// mutating either handle is visible through both. This is what lets a caller
/// hold on to a module's output/adjoint tensor and fill it externally. Use
/// [`Tensor::copy`] for a deep copy, and [`Tensor::view_of`] to deliberately
/// place several tensors into one shared allocation at distinct offsets
/// (callers are responsible for non-overlapping ranges when mutating).
#[derive(Clone)]
pub struct Tensor {
    algebra: Algebra,
    dims: Vec<usize>,
    strides: Vec<usize>,
    offset: usize,
    size: usize,
    /// Shared flat buffer; RwLock for interior mutability through `&self`.
    values: Arc<RwLock<Vec<f64>>>,
}

impl Tensor {
    /// Creates a tensor of the given shape filled with the algebra's zero.
    pub fn new(algebra: Algebra, dims: Vec<usize>) -> Self {
        let size: usize = dims.iter().product();
        let strides = utils::calculate_strides(&dims);
        Tensor {
            algebra,
            dims,
            strides,
            offset: 0,
            size,
            values: Arc::new(RwLock::new(vec![algebra.zero(); size])),
        }
    }

    /// Creates a tensor from a flat buffer of representation values.
    ///
    /// # Errors
    /// Returns `TensorCreationError` if the buffer length does not match the
    /// number of entries implied by `dims`.
    pub fn from_values(
        algebra: Algebra,
        dims: Vec<usize>,
        values: Vec<f64>,
    ) -> Result<Self, RingGradError> {
        let size: usize = dims.iter().product();
        if values.len() != size {
            return Err(RingGradError::TensorCreationError {
                data_len: values.len(),
                dims,
            });
        }
        let strides = utils::calculate_strides(&dims);
        Ok(Tensor {
            algebra,
            dims,
            strides,
            offset: 0,
            size,
            values: Arc::new(RwLock::new(values)),
        })
    }

    /// Creates a tensor from real numbers, mapping each through the algebra's
    /// `from_real`.
    pub fn from_reals(
        algebra: Algebra,
        dims: Vec<usize>,
        reals: Vec<f64>,
    ) -> Result<Self, RingGradError> {
        let values = reals.into_iter().map(|r| algebra.from_real(r)).collect();
        Tensor::from_values(algebra, dims, values)
    }

    /// Creates a view into `source`'s backing buffer starting at `offset`.
    ///
    /// No data is copied: the new tensor aliases the same allocation, which
    /// is the one sanctioned way to pack several tensors into one buffer.
    /// The caller keeps responsibility for non-overlapping offset ranges when
    /// mutation is expected.
    pub fn view_of(
        source: &Tensor,
        dims: Vec<usize>,
        offset: usize,
    ) -> Result<Self, RingGradError> {
        let size: usize = dims.iter().product();
        let buffer_len = source.read_values().len();
        if offset + size > buffer_len {
            return Err(RingGradError::IndexOutOfBounds {
                index: vec![offset + size],
                shape: vec![buffer_len],
            });
        }
        let strides = utils::calculate_strides(&dims);
        Ok(Tensor {
            algebra: source.algebra,
            dims,
            strides,
            offset,
            size,
            values: Arc::clone(&source.values),
        })
    }

    // --- Accessors ---

    pub fn algebra(&self) -> Algebra {
        self.algebra
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of entries (`Π dims`).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// True if both tensors share the same backing allocation.
    pub fn same_buffer(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }

    pub(crate) fn read_values(&self) -> RwLockReadGuard<'_, Vec<f64>> {
        self.values.read().expect("tensor buffer lock poisoned")
    }

    pub(crate) fn write_values(&self) -> RwLockWriteGuard<'_, Vec<f64>> {
        self.values.write().expect("tensor buffer lock poisoned")
    }

    // --- Multi-dimensional access ---

    /// The flat buffer slot for a coordinate vector:
    /// `offset + Σ strides[i] * indices[i]`, with rank and bounds checks.
    pub fn config_idx(&self, indices: &[usize]) -> Result<usize, RingGradError> {
        if indices.len() != self.dims.len() {
            return Err(RingGradError::DimensionMismatch {
                expected: self.dims.len(),
                actual: indices.len(),
            });
        }
        let mut idx = self.offset;
        for (d, &i) in indices.iter().enumerate() {
            if i >= self.dims[d] {
                return Err(RingGradError::IndexOutOfBounds {
                    index: indices.to_vec(),
                    shape: self.dims.clone(),
                });
            }
            idx += i * self.strides[d];
        }
        Ok(idx)
    }

    pub fn get(&self, indices: &[usize]) -> Result<f64, RingGradError> {
        let idx = self.config_idx(indices)?;
        Ok(self.read_values()[idx])
    }

    /// Sets the entry at `indices`, returning the previous value.
    pub fn set(&self, indices: &[usize], val: f64) -> Result<f64, RingGradError> {
        let idx = self.config_idx(indices)?;
        let mut guard = self.write_values();
        let prev = guard[idx];
        guard[idx] = val;
        Ok(prev)
    }

    /// Adds (algebra `plus`) into the entry at `indices`, returning the
    /// previous value.
    pub fn add(&self, indices: &[usize], val: f64) -> Result<f64, RingGradError> {
        let idx = self.config_idx(indices)?;
        let mut guard = self.write_values();
        let prev = guard[idx];
        guard[idx] = self.algebra.plus(prev, val);
        Ok(prev)
    }

    /// Subtracts (algebra `minus`) from the entry at `indices`, returning the
    /// previous value.
    pub fn subtract(&self, indices: &[usize], val: f64) -> Result<f64, RingGradError> {
        let idx = self.config_idx(indices)?;
        let mut guard = self.write_values();
        let prev = guard[idx];
        guard[idx] = self.algebra.minus(prev, val);
        Ok(prev)
    }

    // --- Flat 1-D view over the same storage ---

    fn flat_idx(&self, idx: usize) -> Result<usize, RingGradError> {
        if idx >= self.size {
            return Err(RingGradError::IndexOutOfBounds {
                index: vec![idx],
                shape: vec![self.size],
            });
        }
        Ok(self.offset + idx)
    }

    pub fn get_value(&self, idx: usize) -> Result<f64, RingGradError> {
        let i = self.flat_idx(idx)?;
        Ok(self.read_values()[i])
    }

    pub fn set_value(&self, idx: usize, val: f64) -> Result<f64, RingGradError> {
        let i = self.flat_idx(idx)?;
        let mut guard = self.write_values();
        let prev = guard[i];
        guard[i] = val;
        Ok(prev)
    }

    pub fn add_value(&self, idx: usize, val: f64) -> Result<f64, RingGradError> {
        let i = self.flat_idx(idx)?;
        let mut guard = self.write_values();
        let prev = guard[i];
        guard[i] = self.algebra.plus(prev, val);
        Ok(prev)
    }

    pub fn subtract_value(&self, idx: usize, val: f64) -> Result<f64, RingGradError> {
        let i = self.flat_idx(idx)?;
        let mut guard = self.write_values();
        let prev = guard[i];
        guard[i] = self.algebra.minus(prev, val);
        Ok(prev)
    }

    pub fn multiply_value(&self, idx: usize, val: f64) -> Result<f64, RingGradError> {
        let i = self.flat_idx(idx)?;
        let mut guard = self.write_values();
        let prev = guard[i];
        guard[i] = self.algebra.times(prev, val);
        Ok(prev)
    }

    pub fn divide_value(&self, idx: usize, val: f64) -> Result<f64, RingGradError> {
        let i = self.flat_idx(idx)?;
        let mut guard = self.write_values();
        let prev = guard[i];
        guard[i] = self.algebra.divide(prev, val);
        Ok(prev)
    }

    // --- Whole-tensor operations ---

    /// Overwrites this tensor's entries with `other`'s. Sizes and algebras
    /// must match. Works for same-buffer operands; overlapping ranges are the
    /// caller's responsibility.
    pub fn set_from(&self, other: &Tensor) -> Result<(), RingGradError> {
        self.check_binary_operand(other, "set_from")?;
        if self.same_buffer(other) {
            let mut guard = self.write_values();
            for i in 0..self.size {
                guard[self.offset + i] = guard[other.offset + i];
            }
        } else {
            let src = other.read_values();
            let mut dst = self.write_values();
            dst[self.offset..self.offset + self.size]
                .copy_from_slice(&src[other.offset..other.offset + self.size]);
        }
        Ok(())
    }

    /// Applies `f` to every entry in place.
    pub fn apply<F: Fn(f64) -> f64>(&self, f: F) {
        let mut guard = self.write_values();
        for v in guard[self.offset..self.offset + self.size].iter_mut() {
            *v = f(*v);
        }
    }

    /// Deep copy: fresh contiguous buffer, same algebra and dims.
    pub fn copy(&self) -> Tensor {
        let guard = self.read_values();
        let values = guard[self.offset..self.offset + self.size].to_vec();
        drop(guard);
        Tensor {
            algebra: self.algebra,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: 0,
            size: self.size,
            values: Arc::new(RwLock::new(values)),
        }
    }

    /// Deep copy with every entry replaced by `val`.
    pub fn copy_and_fill(&self, val: f64) -> Tensor {
        Tensor {
            algebra: self.algebra,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: 0,
            size: self.size,
            values: Arc::new(RwLock::new(vec![val; self.size])),
        }
    }

    /// Deep copy into another algebra, mapping every entry through
    /// `new.from_real(old.to_real(v))`.
    pub fn copy_and_convert_algebra(&self, new_algebra: Algebra) -> Tensor {
        let guard = self.read_values();
        let values = guard[self.offset..self.offset + self.size]
            .iter()
            .map(|&v| new_algebra.from_real(self.algebra.to_real(v)))
            .collect();
        drop(guard);
        Tensor {
            algebra: new_algebra,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: 0,
            size: self.size,
            values: Arc::new(RwLock::new(values)),
        }
    }

    /// Entry-wise approximate equality: same dims, same algebra, and every
    /// pair of entries within `delta` under the algebra's `eq`.
    pub fn equals(&self, other: &Tensor, delta: f64) -> bool {
        if self.algebra != other.algebra || self.dims != other.dims {
            return false;
        }
        for i in 0..self.size {
            let a = self.get_value(i).expect("size checked");
            let b = other.get_value(i).expect("size checked");
            if !self.algebra.eq(a, b, delta) {
                return false;
            }
        }
        true
    }

    pub(crate) fn check_binary_operand(
        &self,
        other: &Tensor,
        operation: &str,
    ) -> Result<(), RingGradError> {
        if self.algebra != other.algebra {
            return Err(RingGradError::AlgebraMismatch {
                expected: self.algebra,
                actual: other.algebra,
                operation: operation.to_string(),
            });
        }
        if self.size != other.size {
            return Err(RingGradError::ShapeMismatch {
                expected: self.dims.clone(),
                actual: other.dims.clone(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}
