// src/ops/reduction/sum.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::module::{read_output, read_output_adj, Module, ModuleRef, OutputCache};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Reduces the input to its algebra sum, a tensor of dims `[1]`.
#[derive(Debug)]
pub struct Sum {
    x: ModuleRef,
    cache: OutputCache,
}

impl Sum {
    pub fn new(x: ModuleRef) -> Self {
        let algebra = x.read().expect("module lock poisoned").algebra();
        Sum {
            x,
            cache: OutputCache::new("Sum", algebra),
        }
    }
}

impl Module for Sum {
    fn name(&self) -> &'static str {
        "Sum"
    }

    fn algebra(&self) -> Algebra {
        self.cache.algebra()
    }

    fn forward(&mut self) -> Result<Tensor, RingGradError> {
        let x = read_output(&self.x)?;
        let y = self.cache.reserve(&[1]);
        y.set_value(0, x.get_sum())?;
        Ok(y)
    }

    fn backward(&mut self) -> Result<(), RingGradError> {
        // every input entry contributed with unit weight
        let adj = self.cache.output_adj()?.get_value(0)?;
        read_output_adj(&self.x)?.add_scalar(adj);
        Ok(())
    }

    fn inputs(&self) -> Vec<ModuleRef> {
        vec![Arc::clone(&self.x)]
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
