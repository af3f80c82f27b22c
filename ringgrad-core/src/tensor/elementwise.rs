// src/tensor/elementwise.rs
//
// Scalar and elementwise in-place operations, plus `normalize` and its edge
// policies. Binary operations require equal size and equal algebra; operands
// sharing one backing buffer (views into a common allocation) are handled
// under a single write guard so the shared lock is never acquired twice.

use crate::error::RingGradError;
use crate::tensor::Tensor;

impl Tensor {
    /// Sets every entry to `val`.
    pub fn fill(&self, val: f64) {
        self.apply(|_| val);
    }

    /// Adds (algebra `plus`) `val` to every entry.
    pub fn add_scalar(&self, val: f64) {
        let alg = self.algebra();
        self.apply(|v| alg.plus(v, val));
    }

    /// Subtracts (algebra `minus`) `val` from every entry.
    pub fn subtract_scalar(&self, val: f64) {
        let alg = self.algebra();
        self.apply(|v| alg.minus(v, val));
    }

    /// Multiplies (algebra `times`) every entry by `val`.
    pub fn multiply_scalar(&self, val: f64) {
        let alg = self.algebra();
        self.apply(|v| alg.times(v, val));
    }

    /// Divides (algebra `divide`) every entry by `val`.
    pub fn divide_scalar(&self, val: f64) {
        let alg = self.algebra();
        self.apply(|v| alg.divide(v, val));
    }

    /// Entrywise `self[i] = f(self[i], other[i])`. Requires equal size and
    /// equal algebra.
    pub fn elem_op<F: Fn(f64, f64) -> f64>(
        &self,
        other: &Tensor,
        f: F,
    ) -> Result<(), RingGradError> {
        self.check_binary_operand(other, "elem_op")?;
        if self.same_buffer(other) {
            let mut guard = self.write_values();
            for i in 0..self.size() {
                let rhs = guard[other.offset() + i];
                let lhs = &mut guard[self.offset() + i];
                *lhs = f(*lhs, rhs);
            }
        } else {
            let rhs = other.read_values();
            let mut lhs = self.write_values();
            let off = self.offset();
            for i in 0..self.size() {
                lhs[off + i] = f(lhs[off + i], rhs[other.offset() + i]);
            }
        }
        Ok(())
    }

    pub fn elem_add(&self, other: &Tensor) -> Result<(), RingGradError> {
        let alg = self.algebra();
        self.elem_op(other, |a, b| alg.plus(a, b))
    }

    pub fn elem_subtract(&self, other: &Tensor) -> Result<(), RingGradError> {
        let alg = self.algebra();
        self.elem_op(other, |a, b| alg.minus(a, b))
    }

    pub fn elem_multiply(&self, other: &Tensor) -> Result<(), RingGradError> {
        let alg = self.algebra();
        self.elem_op(other, |a, b| alg.times(a, b))
    }

    pub fn elem_divide(&self, other: &Tensor) -> Result<(), RingGradError> {
        let alg = self.algebra();
        self.elem_op(other, |a, b| alg.divide(a, b))
    }

    /// Divides every entry by the tensor's sum so the entries sum to the
    /// algebra's `one()`.
    ///
    /// Edge policies:
    /// - sum == `zero()`: every entry becomes `one()/size` (uniform fallback);
    /// - sum is infinite: the entries equal to `pos_inf()` share the mass
    ///   uniformly (`one()/count`) and every other entry becomes `zero()`;
    /// - sum is infinite but no entry is infinite: `NormalizationContradiction`.
    ///
    /// Any NaN in the result of the ordinary division path is an error.
    pub fn normalize(&self) -> Result<(), RingGradError> {
        let alg = self.algebra();
        let sum = self.get_sum();
        if alg.eq(sum, alg.zero(), 0.0) {
            log::warn!(
                "normalize: zero sum over {} entries, falling back to uniform",
                self.size()
            );
            let uniform = alg.divide(alg.one(), alg.from_real(self.size() as f64));
            self.fill(uniform);
            return Ok(());
        }
        if alg.gte(sum, alg.pos_inf()) {
            let inf = alg.pos_inf();
            let count = (0..self.size())
                .filter(|&i| alg.gte(self.get_value(i).expect("in range"), inf))
                .count();
            if count == 0 {
                return Err(RingGradError::NormalizationContradiction);
            }
            log::warn!(
                "normalize: infinite sum, distributing mass over {} infinite entries",
                count
            );
            let share = alg.divide(alg.one(), alg.from_real(count as f64));
            self.apply(|v| if alg.gte(v, inf) { share } else { alg.zero() });
            return Ok(());
        }
        self.divide_scalar(sum);
        for i in 0..self.size() {
            if alg.is_nan(self.get_value(i).expect("in range")) {
                return Err(RingGradError::InternalError(format!(
                    "normalize produced NaN at entry {} (sum {:?})",
                    i, sum
                )));
            }
        }
        Ok(())
    }
}
