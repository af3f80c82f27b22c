use ringgrad_core::algebra::Algebra;
use ringgrad_core::module::{module_ref, ModuleRef};
use ringgrad_core::ops::Identity;
use ringgrad_core::tensor::Tensor;

// Helpers shared by the integration test binaries.
// Added allow(dead_code) because usage across different test crates isn't
// detected easily.

/// Builds a leaf input for a test graph: the caller-owned tensor plus the
/// `Identity` module wrapping it.
#[allow(dead_code)]
pub fn input(alg: Algebra, reals: &[f64]) -> (Tensor, ModuleRef) {
    let t = Tensor::from_reals(alg, vec![reals.len()], reals.to_vec()).unwrap();
    (t.clone(), module_ref(Identity::new(t)))
}

/// Reads entry `idx` of a tensor back as a real number.
#[allow(dead_code)]
pub fn real_at(t: &Tensor, idx: usize) -> f64 {
    t.algebra().to_real(t.get_value(idx).unwrap())
}
