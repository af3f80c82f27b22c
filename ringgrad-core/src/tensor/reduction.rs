// src/tensor/reduction.rs

use crate::error::RingGradError;
use crate::tensor::Tensor;

impl Tensor {
    /// Algebra sum of all entries (`zero()` for an empty tensor).
    pub fn get_sum(&self) -> f64 {
        let alg = self.algebra();
        let guard = self.read_values();
        guard[self.offset()..self.offset() + self.size()]
            .iter()
            .fold(alg.zero(), |acc, &v| alg.plus(acc, v))
    }

    /// Algebra product of all entries (`one()` for an empty tensor).
    pub fn get_prod(&self) -> f64 {
        let alg = self.algebra();
        let guard = self.read_values();
        guard[self.offset()..self.offset() + self.size()]
            .iter()
            .fold(alg.one(), |acc, &v| alg.times(acc, v))
    }

    /// The maximum entry under the algebra's `gte`. Ties resolve to the last
    /// maximal entry (the scan replaces on `gte`), which is deterministic per
    /// algebra ordering.
    pub fn get_max(&self) -> f64 {
        let alg = self.algebra();
        let guard = self.read_values();
        let mut best = alg.min_value();
        for &v in &guard[self.offset()..self.offset() + self.size()] {
            if alg.gte(v, best) {
                best = v;
            }
        }
        best
    }

    /// The flat config index of the maximum entry (last maximal entry wins).
    pub fn get_argmax_config_id(&self) -> usize {
        let alg = self.algebra();
        let guard = self.read_values();
        let mut best = alg.min_value();
        let mut best_idx = 0;
        for (i, &v) in guard[self.offset()..self.offset() + self.size()]
            .iter()
            .enumerate()
        {
            if alg.gte(v, best) {
                best = v;
                best_idx = i;
            }
        }
        best_idx
    }

    /// The maximum absolute value of any entry (`zero()` for an empty
    /// tensor).
    pub fn get_inf_norm(&self) -> f64 {
        let alg = self.algebra();
        let guard = self.read_values();
        let mut best = alg.zero();
        for &v in &guard[self.offset()..self.offset() + self.size()] {
            let a = alg.abs(v);
            if alg.gte(a, best) {
                best = a;
            }
        }
        best
    }

    /// Number of entries exactly equal (bitwise float equality) to `val`.
    pub fn count(&self, val: f64) -> usize {
        let guard = self.read_values();
        guard[self.offset()..self.offset() + self.size()]
            .iter()
            .filter(|&&v| v == val)
            .count()
    }

    /// The algebra dot product `Σ_i self[i] ⊗ other[i]`. Requires equal size
    /// and equal algebra.
    pub fn get_dot_product(&self, other: &Tensor) -> Result<f64, RingGradError> {
        self.check_binary_operand(other, "get_dot_product")?;
        let alg = self.algebra();
        if self.same_buffer(other) {
            let guard = self.read_values();
            let mut acc = alg.zero();
            for i in 0..self.size() {
                acc = alg.plus(
                    acc,
                    alg.times(guard[self.offset() + i], guard[other.offset() + i]),
                );
            }
            return Ok(acc);
        }
        let a = self.read_values();
        let b = other.read_values();
        let mut acc = alg.zero();
        for i in 0..self.size() {
            acc = alg.plus(acc, alg.times(a[self.offset() + i], b[other.offset() + i]));
        }
        Ok(acc)
    }
}
