// src/ops/elem/subtract.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::module::{
    check_input_algebra, read_output, read_output_adj, Module, ModuleRef, OutputCache,
};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Elementwise subtraction: `y_i = x_i ⊖ w_i`.
///
/// In the `Log` algebra subtraction is partial: entries where `w_i > x_i`
/// come out NaN. Graphs that subtract should run under `Real` or `LogSign`.
#[derive(Debug)]
pub struct ElemSubtract {
    x: ModuleRef,
    w: ModuleRef,
    cache: OutputCache,
}

impl ElemSubtract {
    pub fn new(x: ModuleRef, w: ModuleRef) -> Result<Self, RingGradError> {
        let algebra = x.read().expect("module lock poisoned").algebra();
        check_input_algebra("ElemSubtract", algebra, &w)?;
        Ok(ElemSubtract {
            x,
            w,
            cache: OutputCache::new("ElemSubtract", algebra),
        })
    }
}

impl Module for ElemSubtract {
    fn name(&self) -> &'static str {
        "ElemSubtract"
    }

    fn algebra(&self) -> Algebra {
        self.cache.algebra()
    }

    fn forward(&mut self) -> Result<Tensor, RingGradError> {
        let x = read_output(&self.x)?;
        let w = read_output(&self.w)?;
        let y = self.cache.reserve(x.dims());
        y.set_from(&x)?;
        y.elem_subtract(&w)?;
        Ok(y)
    }

    fn backward(&mut self) -> Result<(), RingGradError> {
        let y_adj = self.cache.output_adj()?;
        read_output_adj(&self.x)?.elem_add(&y_adj)?;
        read_output_adj(&self.w)?.elem_subtract(&y_adj)?;
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
