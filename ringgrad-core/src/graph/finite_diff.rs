// src/graph/finite_diff.rs

use crate::error::RingGradError;
use crate::graph::topo_order::TopoOrder;
use crate::module::Module;
use crate::tensor::Tensor;
use approx::relative_eq;
use thiserror::Error;

/// Error type specifically for finite-difference adjoint checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdjointCheckError {
    #[error("Adjoint check failed for leaf {leaf_index}, element {element_index}: analytical {analytical:?} != numerical {numerical:?} (difference {difference:?})")]
    Mismatch {
        leaf_index: usize,
        element_index: usize,
        analytical: f64,
        numerical: f64,
        difference: f64,
    },

    #[error("Numerical gradient is NaN or infinite for leaf {leaf_index}, element {element_index}: loss+ {loss_plus:?}, loss- {loss_minus:?}")]
    NumericalNonFinite {
        leaf_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Analytical adjoint is NaN or infinite for leaf {leaf_index}, element {element_index}: {value:?}")]
    AnalyticalNonFinite {
        leaf_index: usize,
        element_index: usize,
        value: f64,
    },

    #[error("Expected one input tensor per leaf module: {leaves} leaves, {inputs} inputs")]
    InputCountMismatch { leaves: usize, inputs: usize },

    #[error("Engine error during adjoint check: {0}")]
    Engine(#[from] RingGradError),
}

/// The scalar loss used for numerical differentiation: the real-space dot
/// product of the output with the seeded output adjoint,
/// `Σ_i to_real(y_i) · to_real(adj_i)`.
fn weighted_loss(output: &Tensor, output_adj: &Tensor) -> Result<f64, RingGradError> {
    output.check_binary_operand(output_adj, "weighted_loss (adjoint check)")?;
    let alg = output.algebra();
    let mut loss = 0.0;
    for i in 0..output.size() {
        loss += alg.to_real(output.get_value(i)?) * alg.to_real(output_adj.get_value(i)?);
    }
    Ok(loss)
}

/// Checks the reverse-mode adjoints of `topo` against symmetric finite
/// differences.
///
/// `inputs[i]` must be the caller-owned tensor wrapped by the i-th leaf of
/// `topo` (the handles passed to the `Identity` leaves). The check:
/// 1. runs one forward pass, seeds the root adjoint with `output_adj`, runs
///    one backward pass, and records the analytical leaf adjoints;
/// 2. for every input element, perturbs the *real* value by ±`epsilon`,
///    re-runs forward, and forms the symmetric difference quotient of the
///    adjoint-weighted loss;
/// 3. compares the two with relative tolerance `tolerance` (absolute near
///    zero).
///
/// Inputs are restored and a final forward pass leaves the graph in the
/// unperturbed state.
pub fn check_adjoints_by_finite_diffs(
    topo: &mut TopoOrder,
    inputs: &[Tensor],
    output_adj: &Tensor,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), AdjointCheckError> {
    let leaves = topo.inputs();
    if leaves.len() != inputs.len() {
        return Err(AdjointCheckError::InputCountMismatch {
            leaves: leaves.len(),
            inputs: inputs.len(),
        });
    }

    // --- Analytical pass ---
    for leaf in &leaves {
        leaf.write().expect("module lock poisoned").forward()?;
    }
    topo.forward()?;
    topo.zero_output_adj();
    topo.output_adj()?.set_from(output_adj)?;
    topo.backward()?;

    let mut analytical: Vec<Vec<f64>> = Vec::with_capacity(leaves.len());
    for leaf in &leaves {
        let adj = leaf.write().expect("module lock poisoned").output_adj()?;
        let alg = adj.algebra();
        let mut reals = Vec::with_capacity(adj.size());
        for e in 0..adj.size() {
            reals.push(alg.to_real(adj.get_value(e)?));
        }
        analytical.push(reals);
    }

    // --- Numerical pass, one element at a time ---
    for (i, input) in inputs.iter().enumerate() {
        let alg = input.algebra();
        for e in 0..input.size() {
            let original = input.get_value(e)?;
            let real = alg.to_real(original);

            input.set_value(e, alg.from_real(real + epsilon))?;
            topo.forward()?;
            let loss_plus = weighted_loss(&topo.output()?, output_adj)?;

            input.set_value(e, alg.from_real(real - epsilon))?;
            topo.forward()?;
            let loss_minus = weighted_loss(&topo.output()?, output_adj)?;

            input.set_value(e, original)?;

            let numerical = (loss_plus - loss_minus) / (2.0 * epsilon);
            if !numerical.is_finite() {
                return Err(AdjointCheckError::NumericalNonFinite {
                    leaf_index: i,
                    element_index: e,
                    loss_plus,
                    loss_minus,
                });
            }
            let a = analytical[i][e];
            if !a.is_finite() {
                return Err(AdjointCheckError::AnalyticalNonFinite {
                    leaf_index: i,
                    element_index: e,
                    value: a,
                });
            }
            if !relative_eq!(a, numerical, max_relative = tolerance, epsilon = tolerance) {
                return Err(AdjointCheckError::Mismatch {
                    leaf_index: i,
                    element_index: e,
                    analytical: a,
                    numerical,
                    difference: (a - numerical).abs(),
                });
            }
        }
    }

    // leave the graph evaluated at the unperturbed inputs
    topo.forward()?;
    Ok(())
}
