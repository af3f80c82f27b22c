// src/ops/math_elem/log.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::module::{read_output, read_output_adj, Module, ModuleRef, OutputCache};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Elementwise natural log: `y_i = ln(x_i)` in the input's algebra.
#[derive(Debug)]
pub struct Log {
    x: ModuleRef,
    cache: OutputCache,
}

impl Log {
    pub fn new(x: ModuleRef) -> Self {
        let algebra = x.read().expect("module lock poisoned").algebra();
        Log {
            x,
            cache: OutputCache::new("Log", algebra),
        }
    }
}

impl Module for Log {
    fn name(&self) -> &'static str {
        "Log"
    }

    fn algebra(&self) -> Algebra {
        self.cache.algebra()
    }

    fn forward(&mut self) -> Result<Tensor, RingGradError> {
        let alg = self.cache.algebra();
        let x = read_output(&self.x)?;
        let y = self.cache.reserve(x.dims());
        y.set_from(&x)?;
        y.apply(|v| alg.log(v));
        Ok(y)
    }

    fn backward(&mut self) -> Result<(), RingGradError> {
        // d ln(x) / dx = 1 / x
        let y_adj = self.cache.output_adj()?;
        let x = read_output(&self.x)?;
        let tmp = y_adj.copy();
        tmp.elem_divide(&x)?;
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
    fn test_forward_backward_real() {
        let x = Tensor::from_values(Algebra::Real, vec![2], vec![1.0, 4.0]).unwrap();
        let xm = module_ref(Identity::new(x));
        xm.write().unwrap().forward().unwrap();
        let mut op = Log::new(Arc::clone(&xm));
        let y = op.forward().unwrap();
        assert_relative_eq!(y.get_value(0).unwrap(), 0.0);
        assert_relative_eq!(y.get_value(1).unwrap(), 4.0f64.ln());

        op.output_adj().unwrap().fill(1.0);
        op.backward().unwrap();
        let x_adj = xm.write().unwrap().output_adj().unwrap();
        assert_relative_eq!(x_adj.get_value(0).unwrap(), 1.0);
        assert_relative_eq!(x_adj.get_value(1).unwrap(), 0.25);
    }

    #[test]
    fn test_log_then_exp_is_identity() {
        let alg = Algebra::Log;
        let x = Tensor::from_reals(alg, vec![2], vec![0.2, 5.0]).unwrap();
        let xm = module_ref(Identity::new(x.clone()));
        xm.write().unwrap().forward().unwrap();
        let logm = module_ref(Log::new(xm));
        logm.write().unwrap().forward().unwrap();
        let mut expm = crate::ops::Exp::new(logm);
        let y = expm.forward().unwrap();
        assert!(y.equals(&x, 1e-12));
    }
}
