// src/ops/elem/divide.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::module::{
    check_input_algebra, read_output, read_output_adj, Module, ModuleRef, OutputCache,
};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Elementwise quotient: `y_i = x_i ⊘ w_i`.
///
/// The denominator's adjoint contribution is subtracted
/// (`dw -= y_adj ⊗ y ⊘ w`), so like [`super::ElemSubtract`] this operator
/// needs an algebra where subtraction closes for negative-gradient cases.
#[derive(Debug)]
pub struct ElemDivide {
    x: ModuleRef,
    w: ModuleRef,
    cache: OutputCache,
}

impl ElemDivide {
    pub fn new(x: ModuleRef, w: ModuleRef) -> Result<Self, RingGradError> {
        let algebra = x.read().expect("module lock poisoned").algebra();
        check_input_algebra("ElemDivide", algebra, &w)?;
        Ok(ElemDivide {
            x,
            w,
            cache: OutputCache::new("ElemDivide", algebra),
        })
    }
}

impl Module for ElemDivide {
    fn name(&self) -> &'static str {
        "ElemDivide"
    }

    fn algebra(&self) -> Algebra {
        self.cache.algebra()
    }

    fn forward(&mut self) -> Result<Tensor, RingGradError> {
        let x = read_output(&self.x)?;
        let w = read_output(&self.w)?;
        let y = self.cache.reserve(x.dims());
        y.set_from(&x)?;
        y.elem_divide(&w)?;
        Ok(y)
    }

    fn backward(&mut self) -> Result<(), RingGradError> {
        // dx += y_adj / w; dw -= y_adj * (x / w^2) = y_adj * y / w
        let y_adj = self.cache.output_adj()?;
        let y = self.cache.output()?;
        let w = read_output(&self.w)?;
        let tmp = y_adj.copy();
        tmp.elem_divide(&w)?;
        read_output_adj(&self.x)?.elem_add(&tmp)?;
        let tmp = y_adj.copy();
        tmp.elem_multiply(&y)?;
        tmp.elem_divide(&w)?;
        read_output_adj(&self.w)?.elem_subtract(&tmp)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::module_ref;
    use crate::ops::Identity;
    use approx::assert_relative_eq;

    #[test]
    fn test_forward_backward_real() {
        let x = Tensor::from_values(Algebra::Real, vec![2], vec![6.0, 1.0]).unwrap();
        let w = Tensor::from_values(Algebra::Real, vec![2], vec![2.0, 4.0]).unwrap();
        let xm = module_ref(Identity::new(x));
        let wm = module_ref(Identity::new(w));
        xm.write().unwrap().forward().unwrap();
        wm.write().unwrap().forward().unwrap();
        let mut div = ElemDivide::new(Arc::clone(&xm), Arc::clone(&wm)).unwrap();
        let y = div.forward().unwrap();
        assert_relative_eq!(y.get_value(0).unwrap(), 3.0);
        assert_relative_eq!(y.get_value(1).unwrap(), 0.25);

        div.output_adj().unwrap().fill(1.0);
        div.backward().unwrap();
        let x_adj = xm.write().unwrap().output_adj().unwrap();
        let w_adj = wm.write().unwrap().output_adj().unwrap();
        // d(x/w)/dx = 1/w
        assert_relative_eq!(x_adj.get_value(0).unwrap(), 0.5);
        // d(x/w)/dw = -x/w^2
        assert_relative_eq!(w_adj.get_value(0).unwrap(), -6.0 / 4.0);
        assert_relative_eq!(w_adj.get_value(1).unwrap(), -1.0 / 16.0);
    }
}
