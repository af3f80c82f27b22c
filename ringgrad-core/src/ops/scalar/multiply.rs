// src/ops/scalar/multiply.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::module::{
    check_input_algebra, read_output, read_output_adj, Module, ModuleRef, OutputCache,
};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Scales the main input by entry `k` of the scalar module's output:
/// `y_i = x_i ⊗ s_k`.
#[derive(Debug)]
pub struct ScalarMultiply {
    x: ModuleRef,
    scalar: ModuleRef,
    k: usize,
    cache: OutputCache,
}

impl ScalarMultiply {
    pub fn new(x: ModuleRef, scalar: ModuleRef, k: usize) -> Result<Self, RingGradError> {
        let algebra = x.read().expect("module lock poisoned").algebra();
        check_input_algebra("ScalarMultiply", algebra, &scalar)?;
        Ok(ScalarMultiply {
            x,
            scalar,
            k,
            cache: OutputCache::new("ScalarMultiply", algebra),
        })
    }
}

impl Module for ScalarMultiply {
    fn name(&self) -> &'static str {
        "ScalarMultiply"
    }

    fn algebra(&self) -> Algebra {
        self.cache.algebra()
    }

    fn forward(&mut self) -> Result<Tensor, RingGradError> {
        let x = read_output(&self.x)?;
        let s = read_output(&self.scalar)?.get_value(self.k)?;
        let y = self.cache.reserve(x.dims());
        y.set_from(&x)?;
        y.multiply_scalar(s);
        Ok(y)
    }

    fn backward(&mut self) -> Result<(), RingGradError> {
        let y_adj = self.cache.output_adj()?;
        let x = read_output(&self.x)?;
        let s = read_output(&self.scalar)?.get_value(self.k)?;
        let tmp = y_adj.copy();
        tmp.multiply_scalar(s);
        read_output_adj(&self.x)?.elem_add(&tmp)?;
        // ds_k = Σ_i y_adj_i ⊗ x_i
        let ds = y_adj.get_dot_product(&x)?;
        read_output_adj(&self.scalar)?.add_value(self.k, ds)?;
        Ok(())
    }

    fn inputs(&self) -> Vec<ModuleRef> {
        vec![Arc::clone(&self.x), Arc::clone(&self.scalar)]
    }

    fn output(&self) -> Result<Tensor, RingGradError> {
        self.cache.output()
    }

    fn output_adj(&mut self) -> Result<Tensor, RingGradError> {
        self.cache.output_adj()
    }

    fn zero_output_adj(&mut self) {
        self.cache.zero_output_adj();
    }
}
