// src/ops/select.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::module::{read_output, read_output_adj, Module, ModuleRef, OutputCache};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Extracts the sub-tensor of the input at a fixed coordinate:
/// `y = x.select(dim, idx)`, rank reduced by one.
///
/// Backward is the exact inverse: the output adjoint is accumulated back
/// into the `(dim, idx)` slice of the input's adjoint via `add_tensor`.
#[derive(Debug)]
pub struct Select {
    x: ModuleRef,
    dim: usize,
    idx: usize,
    cache: OutputCache,
}

impl Select {
    pub fn new(x: ModuleRef, dim: usize, idx: usize) -> Self {
        let algebra = x.read().expect("module lock poisoned").algebra();
        Select {
            x,
            dim,
            idx,
            cache: OutputCache::new("Select", algebra),
        }
    }
}

impl Module for Select {
    fn name(&self) -> &'static str {
        "Select"
    }

    fn algebra(&self) -> Algebra {
        self.cache.algebra()
    }

    fn forward(&mut self) -> Result<Tensor, RingGradError> {
        let x = read_output(&self.x)?;
        let slice = x.select(self.dim, self.idx)?;
        let y = self.cache.reserve(slice.dims());
        y.set_from(&slice)?;
        Ok(y)
    }

    fn backward(&mut self) -> Result<(), RingGradError> {
        let y_adj = self.cache.output_adj()?;
        let x_adj = read_output_adj(&self.x)?;
        x_adj.add_tensor(&y_adj, self.dim, self.idx)?;
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
        let x =
            Tensor::from_values(Algebra::Real, vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
                .unwrap();
        let xm = module_ref(Identity::new(x));
        xm.write().unwrap().forward().unwrap();
        let mut sel = Select::new(Arc::clone(&xm), 0, 1);
        let y = sel.forward().unwrap();
        assert_eq!(y.dims(), &[3]);
        assert_relative_eq!(y.get_value(0).unwrap(), 4.0);

        sel.output_adj().unwrap().fill(7.0);
        sel.backward().unwrap();
        let x_adj = xm.write().unwrap().output_adj().unwrap();
        // only the selected row receives gradient
        assert_relative_eq!(x_adj.get(&[0, 0]).unwrap(), 0.0);
        assert_relative_eq!(x_adj.get(&[1, 0]).unwrap(), 7.0);
        assert_relative_eq!(x_adj.get(&[1, 2]).unwrap(), 7.0);
    }
}
