// src/ops/elem/multiply.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::module::{
    check_input_algebra, read_output, read_output_adj, Module, ModuleRef, OutputCache,
};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Elementwise (Hadamard) product: `y_i = x_i ⊗ w_i`.
#[derive(Debug)]
pub struct ElemMultiply {
    x: ModuleRef,
    w: ModuleRef,
    cache: OutputCache,
}

impl ElemMultiply {
    pub fn new(x: ModuleRef, w: ModuleRef) -> Result<Self, RingGradError> {
        let algebra = x.read().expect("module lock poisoned").algebra();
        check_input_algebra("ElemMultiply", algebra, &w)?;
        Ok(ElemMultiply {
            x,
            w,
            cache: OutputCache::new("ElemMultiply", algebra),
        })
    }
}

impl Module for ElemMultiply {
    fn name(&self) -> &'static str {
        "ElemMultiply"
    }

    fn algebra(&self) -> Algebra {
        self.cache.algebra()
    }

    fn forward(&mut self) -> Result<Tensor, RingGradError> {
        let x = read_output(&self.x)?;
        let w = read_output(&self.w)?;
        let y = self.cache.reserve(x.dims());
        y.set_from(&x)?;
        y.elem_multiply(&w)?;
        Ok(y)
    }

    fn backward(&mut self) -> Result<(), RingGradError> {
        // product rule: dx += y_adj ⊗ w, dw += y_adj ⊗ x
        let y_adj = self.cache.output_adj()?;
        let x = read_output(&self.x)?;
        let w = read_output(&self.w)?;
        let tmp = y_adj.copy();
        tmp.elem_multiply(&w)?;
        read_output_adj(&self.x)?.elem_add(&tmp)?;
        let tmp = y_adj.copy();
        tmp.elem_multiply(&x)?;
        read_output_adj(&self.w)?.elem_add(&tmp)?;
        Ok(())
    }

    fn inputs(&self) -> Vec<ModuleRef> {
        vec![Arc::clone(&self.x), Arc::clone(&self.w)]
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
