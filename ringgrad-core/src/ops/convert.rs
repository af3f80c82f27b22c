// src/ops/convert.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::module::{read_output, read_output_adj, Module, ModuleRef, OutputCache};
use crate::tensor::Tensor;
use std::sync::Arc;

/// The explicit bridge between algebras: re-encodes every entry of the input
/// into the target algebra via `to.from_real(from.to_real(v))`.
///
/// This is the only sanctioned way to connect modules of different algebras;
/// every multi-input operator rejects mixed algebras at construction, so a
/// cross-domain graph must route through one of these.
#[derive(Debug)]
pub struct ConvertAlgebra {
    x: ModuleRef,
    from: Algebra,
    cache: OutputCache,
}

impl ConvertAlgebra {
    pub fn new(x: ModuleRef, to: Algebra) -> Self {
        let from = x.read().expect("module lock poisoned").algebra();
        ConvertAlgebra {
            x,
            from,
            cache: OutputCache::new("ConvertAlgebra", to),
        }
    }
}

impl Module for ConvertAlgebra {
    fn name(&self) -> &'static str {
        "ConvertAlgebra"
    }

    fn algebra(&self) -> Algebra {
        self.cache.algebra()
    }

    fn forward(&mut self) -> Result<Tensor, RingGradError> {
        let to = self.cache.algebra();
        let from = self.from;
        let x = read_output(&self.x)?;
        let y = self.cache.reserve(x.dims());
        for i in 0..x.size() {
            y.set_value(i, to.from_real(from.to_real(x.get_value(i)?)))?;
        }
        Ok(y)
    }

    fn backward(&mut self) -> Result<(), RingGradError> {
        // the map is the identity on reals, so the adjoint converts straight
        // back into the source algebra
        let to = self.cache.algebra();
        let from = self.from;
        let y_adj = self.cache.output_adj()?;
        let x_adj = read_output_adj(&self.x)?;
        for i in 0..y_adj.size() {
            x_adj.add_value(i, from.from_real(to.to_real(y_adj.get_value(i)?)))?;
        }
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
