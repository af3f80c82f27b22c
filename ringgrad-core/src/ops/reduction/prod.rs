// src/ops/reduction/prod.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::module::{read_output, read_output_adj, Module, ModuleRef, OutputCache};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Reduces the input to its algebra product, a tensor of dims `[1]`.
///
/// Backward computes `dx_i = adj ⊗ (prod ⊘ x_i)`, reusing the cached forward
/// product; entries equal to the algebra's zero make the quotient undefined
/// (NaN), matching the true derivative's removable-singularity problem.
#[derive(Debug)]
pub struct Prod {
    x: ModuleRef,
    cache: OutputCache,
}

impl Prod {
    pub fn new(x: ModuleRef) -> Self {
        let algebra = x.read().expect("module lock poisoned").algebra();
        Prod {
            x,
            cache: OutputCache::new("Prod", algebra),
        }
    }
}

impl Module for Prod {
    fn name(&self) -> &'static str {
        "Prod"
    }

    fn algebra(&self) -> Algebra {
        self.cache.algebra()
    }

    fn forward(&mut self) -> Result<Tensor, RingGradError> {
        let x = read_output(&self.x)?;
        let y = self.cache.reserve(&[1]);
        y.set_value(0, x.get_prod())?;
        Ok(y)
    }

    fn backward(&mut self) -> Result<(), RingGradError> {
        let alg = self.cache.algebra();
        let adj = self.cache.output_adj()?.get_value(0)?;
        let prod = self.cache.output()?.get_value(0)?;
        let x = read_output(&self.x)?;
        let x_adj = read_output_adj(&self.x)?;
        for i in 0..x.size() {
            let xi = x.get_value(i)?;
            x_adj.add_value(i, alg.times(adj, alg.divide(prod, xi)))?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::module_ref;
    use crate::ops::Identity;
    use approx::assert_relative_eq;

    #[test]
    fn test_forward_backward() {
        for alg in [Algebra::Real, Algebra::Log] {
            let x = Tensor::from_reals(alg, vec![3], vec![2.0, 3.0, 4.0]).unwrap();
            let xm = module_ref(Identity::new(x));
            xm.write().unwrap().forward().unwrap();
            let mut prod = Prod::new(Arc::clone(&xm));
            let y = prod.forward().unwrap();
            assert_relative_eq!(alg.to_real(y.get_value(0).unwrap()), 24.0, max_relative = 1e-12);

            prod.output_adj().unwrap().fill(alg.one());
            prod.backward().unwrap();
            let x_adj = xm.write().unwrap().output_adj().unwrap();
            // d prod / dx_i = prod / x_i
            assert_relative_eq!(alg.to_real(x_adj.get_value(0).unwrap()), 12.0, max_relative = 1e-12);
            assert_relative_eq!(alg.to_real(x_adj.get_value(1).unwrap()), 8.0, max_relative = 1e-12);
            assert_relative_eq!(alg.to_real(x_adj.get_value(2).unwrap()), 6.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_log_space_stays_finite_for_tiny_factors() {
        // 100 factors of 1e-5: the real-space product underflows f64 at ~1e-308
        let alg = Algebra::Log;
        let x = Tensor::from_reals(alg, vec![100], vec![1e-5; 100]).unwrap();
        let xm = module_ref(Identity::new(x));
        xm.write().unwrap().forward().unwrap();
        let mut prod = Prod::new(xm);
        let y = prod.forward().unwrap();
        // ln(1e-500) is a perfectly representable log-space value
        assert_relative_eq!(
            y.get_value(0).unwrap(),
            100.0 * (1e-5f64).ln(),
            max_relative = 1e-12
        );
    }
}
