//! Runs the same product-of-probabilities graph in the Real and Log algebras.
//!
//! With a few hundred small factors the real-space product underflows to 0.0
//! and every gradient with it. The log-space run keeps the product and the
//! adjoints as perfectly finite log representations: identical graph
//! topology, one constructor argument changed.

use ringgrad_core::algebra::Algebra;
use ringgrad_core::module::{module_ref, Module, ModuleRef};
use ringgrad_core::ops::{Identity, Prod};
use ringgrad_core::tensor::Tensor;
use ringgrad_core::{RingGradError, TopoOrder};
use std::sync::Arc;

const N: usize = 200;
const P: f64 = 1e-3;

/// Returns the (representation-space) product and adjoint of the first
/// factor after one forward/backward cycle.
fn run(alg: Algebra) -> Result<(f64, f64), RingGradError> {
    let x = Tensor::from_reals(alg, vec![N], vec![P; N])?;
    let xm: ModuleRef = module_ref(Identity::new(x));
    let prod = module_ref(Prod::new(Arc::clone(&xm)));
    let mut topo = TopoOrder::with_leaves(vec![Arc::clone(&xm)], prod)?;

    xm.write().unwrap().forward()?;
    let y = topo.forward()?;
    topo.output_adj()?.fill(alg.one());
    topo.backward()?;

    let value = y.get_value(0)?;
    let adj = xm.write().unwrap().output_adj()?;
    let grad0 = adj.get_value(0)?;
    Ok((value, grad0))
}

fn main() -> Result<(), RingGradError> {
    println!("product of {} factors of {:e}", N, P);

    let (real_val, real_grad) = run(Algebra::Real)?;
    println!(
        "Real algebra:  prod = {:e}, d prod / dx_0 = {:e}  (underflowed)",
        real_val, real_grad
    );

    let (log_val, log_grad) = run(Algebra::Log)?;
    println!(
        "Log algebra:   ln(prod) = {:.3}, ln(d prod / dx_0) = {:.3}",
        log_val, log_grad
    );
    println!(
        "               (exact: {} * ln {:e} = {:.3})",
        N,
        P,
        N as f64 * P.ln()
    );
    Ok(())
}
