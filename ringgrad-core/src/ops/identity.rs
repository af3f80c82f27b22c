// src/ops/identity.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::module::{Module, ModuleRef, OutputCache};
use crate::tensor::Tensor;

/// A leaf input module: wraps a caller-owned tensor and republishes it as the
/// module's output.
///
/// This is how external data enters a graph. The wrapped tensor handle is
/// shared, so the caller can mutate the values between forward passes (one
/// minibatch after another) without rebuilding anything. The accumulated
/// adjoint, the gradient with respect to this input, is read back through
/// `output_adj()` after a backward sweep.
#[derive(Debug)]
pub struct Identity {
    x: Tensor,
    cache: OutputCache,
}

impl Identity {
    pub fn new(x: Tensor) -> Self {
        let cache = OutputCache::new("Identity", x.algebra());
        Identity { x, cache }
    }
}

impl Module for Identity {
    fn name(&self) -> &'static str {
        "Identity"
    }

    fn algebra(&self) -> Algebra {
        self.cache.algebra()
    }

    fn forward(&mut self) -> Result<Tensor, RingGradError> {
        Ok(self.cache.publish(self.x.clone()))
    }

    fn backward(&mut self) -> Result<(), RingGradError> {
        // leaf: nowhere further to propagate
        Ok(())
    }

    fn inputs(&self) -> Vec<ModuleRef> {
        vec![]
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

    #[test]
    fn test_output_aliases_wrapped_tensor() {
        let t = Tensor::from_reals(Algebra::Real, vec![2], vec![1.0, 2.0]).unwrap();
        let mut id = Identity::new(t.clone());
        let y = id.forward().unwrap();
        assert!(y.same_buffer(&t));
        // external mutation shows up on the next read, no re-forward needed
        t.set_value(0, 9.0).unwrap();
        assert_eq!(id.output().unwrap().get_value(0).unwrap(), 9.0);
    }

    #[test]
    fn test_adjoint_matches_input_shape() {
        let t = Tensor::new(Algebra::Log, vec![2, 3]);
        let mut id = Identity::new(t);
        id.forward().unwrap();
        let adj = id.output_adj().unwrap();
        assert_eq!(adj.dims(), &[2, 3]);
        assert_eq!(adj.algebra(), Algebra::Log);
        assert_eq!(adj.get_value(0).unwrap(), Algebra::Log.zero());
    }
}
