// src/ops/scalar/add.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::module::{
    check_input_algebra, read_output, read_output_adj, Module, ModuleRef, OutputCache,
};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Broadcast-adds entry `k` of the scalar module's output to every entry of
/// the main input: `y_i = x_i ⊕ s_k`.
#[derive(Debug)]
pub struct ScalarAdd {
    x: ModuleRef,
    scalar: ModuleRef,
    k: usize,
    cache: OutputCache,
}

impl ScalarAdd {
    pub fn new(x: ModuleRef, scalar: ModuleRef, k: usize) -> Result<Self, RingGradError> {
        let algebra = x.read().expect("module lock poisoned").algebra();
        check_input_algebra("ScalarAdd", algebra, &scalar)?;
        Ok(ScalarAdd {
            x,
            scalar,
            k,
            cache: OutputCache::new("ScalarAdd", algebra),
        })
    }
}

impl Module for ScalarAdd {
    fn name(&self) -> &'static str {
        "ScalarAdd"
    }

    fn algebra(&self) -> Algebra {
        self.cache.algebra()
    }

    fn forward(&mut self) -> Result<Tensor, RingGradError> {
        let x = read_output(&self.x)?;
        let s = read_output(&self.scalar)?.get_value(self.k)?;
        let y = self.cache.reserve(x.dims());
        y.set_from(&x)?;
        y.add_scalar(s);
        Ok(y)
    }

    fn backward(&mut self) -> Result<(), RingGradError> {
        let y_adj = self.cache.output_adj()?;
        read_output_adj(&self.x)?.elem_add(&y_adj)?;
        // the scalar entered every output entry, so its adjoint is the sum
        let total = y_adj.get_sum();
        read_output_adj(&self.scalar)?.add_value(self.k, total)?;
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
