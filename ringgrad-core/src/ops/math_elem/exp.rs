// src/ops/math_elem/exp.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::module::{read_output, read_output_adj, Module, ModuleRef, OutputCache};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Elementwise exponential: `y_i = exp(x_i)` in the input's algebra.
#[derive(Debug)]
pub struct Exp {
    x: ModuleRef,
    cache: OutputCache,
}

impl Exp {
    pub fn new(x: ModuleRef) -> Self {
        let algebra = x.read().expect("module lock poisoned").algebra();
        Exp {
            x,
            cache: OutputCache::new("Exp", algebra),
        }
    }
}

impl Module for Exp {
    fn name(&self) -> &'static str {
        "Exp"
    }

    fn algebra(&self) -> Algebra {
        self.cache.algebra()
    }

    fn forward(&mut self) -> Result<Tensor, RingGradError> {
        let alg = self.cache.algebra();
        let x = read_output(&self.x)?;
        let y = self.cache.reserve(x.dims());
        y.set_from(&x)?;
        y.apply(|v| alg.exp(v));
        Ok(y)
    }

    fn backward(&mut self) -> Result<(), RingGradError> {
        // d exp(x) / dx = exp(x), which is the cached output
        let y_adj = self.cache.output_adj()?;
        let y = self.cache.output()?;
        let tmp = y_adj.copy();
        tmp.elem_multiply(&y)?;
        read_output_adj(&self.x)?.elem_add(&tmp)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::module_ref;
    use crate::ops::Identity;
    use approx::assert_relative_eq;

    #[test]
    fn test_forward_backward() {
        for alg in [Algebra::Real, Algebra::Log] {
            let x = Tensor::from_reals(alg, vec![2], vec![0.0, 1.0]).unwrap();
            let xm = module_ref(Identity::new(x));
            xm.write().unwrap().forward().unwrap();
            let mut exp = Exp::new(Arc::clone(&xm));
            let y = exp.forward().unwrap();
            assert_relative_eq!(alg.to_real(y.get_value(0).unwrap()), 1.0, max_relative = 1e-12);
            assert_relative_eq!(
                alg.to_real(y.get_value(1).unwrap()),
                1.0f64.exp(),
                max_relative = 1e-12
            );

            exp.output_adj().unwrap().fill(alg.one());
            exp.backward().unwrap();
            let x_adj = xm.write().unwrap().output_adj().unwrap();
            assert_relative_eq!(
                alg.to_real(x_adj.get_value(1).unwrap()),
                1.0f64.exp(),
                max_relative = 1e-12
            );
        }
    }
}
