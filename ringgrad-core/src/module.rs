// src/module.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::tensor::Tensor;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

/// Shared handle to a graph node. Graphs are DAGs, so a module can appear as
/// an input of several consumers; `Arc` gives the shared ownership and the
/// `RwLock` the interior mutability that repeated in-place forward/backward
/// passes need.
pub type ModuleRef = Arc<RwLock<dyn Module>>;

/// One operator node in the computation graph.
///
/// Lifecycle per node: uninitialized -> forward-computed (after `forward`)
/// -> adjoint-accumulated (after one or more `backward` contributions from
/// consumers) -> zeroed (after `zero_output_adj`, back to forward-computed
/// with a fresh adjoint).
///
/// Adjoints *accumulate*: `backward` must add into each input's adjoint,
/// never overwrite it, and nothing resets them implicitly. That is what makes
/// minibatch gradient summation free (run several forward/backward cycles
/// and the leaf adjoints hold the sum), but it also means stale gradients
/// silently pile up unless `zero_output_adj` is called between independent
/// episodes.
pub trait Module: fmt::Debug + Send + Sync {
    /// Short operator name, used in error messages and graph dumps.
    fn name(&self) -> &'static str;

    /// The algebra the output's entries are drawn from.
    fn algebra(&self) -> Algebra;

    /// Recomputes the output from the *current* outputs of the inputs and
    /// returns it. Callable repeatedly; must be deterministic given the
    /// input state, with no memoization beyond the stored output buffer.
    fn forward(&mut self) -> Result<Tensor, RingGradError>;

    /// Reads this module's own output adjoint and adds the local partial
    /// derivative contracted with it into each input's adjoint. The caller
    /// (ultimately the outermost driver) is responsible for filling the
    /// root's adjoint before the backward sweep starts.
    fn backward(&mut self) -> Result<(), RingGradError>;

    /// The direct dependencies only (not transitive); stable for the
    /// lifetime of the module.
    fn inputs(&self) -> Vec<ModuleRef>;

    /// The stored output. Errors with `UninitializedOutput` before the first
    /// `forward`.
    fn output(&self) -> Result<Tensor, RingGradError>;

    /// The adjoint accumulator, lazily materialized as a zero-filled tensor
    /// of the output's shape on first access.
    fn output_adj(&mut self) -> Result<Tensor, RingGradError>;

    /// Resets the adjoint to the algebra's zero without deallocating it; a
    /// no-op if the adjoint was never materialized.
    fn zero_output_adj(&mut self);
}

/// Owns a module's output/adjoint pair and their lifecycle.
///
/// Concrete operators embed one of these and delegate the `output`/
/// `output_adj`/`zero_output_adj` trait methods to it. Buffers are reused
/// across repeated forward calls and only reallocated when the shape
/// changes.
#[derive(Debug)]
pub struct OutputCache {
    name: &'static str,
    algebra: Algebra,
    y: Option<Tensor>,
    y_adj: Option<Tensor>,
}

impl OutputCache {
    pub fn new(name: &'static str, algebra: Algebra) -> Self {
        OutputCache {
            name,
            algebra,
            y: None,
            y_adj: None,
        }
    }

    pub fn algebra(&self) -> Algebra {
        self.algebra
    }

    /// Returns the output buffer for the given shape, reusing the existing
    /// allocation when the shape matches.
    pub fn reserve(&mut self, dims: &[usize]) -> Tensor {
        match &self.y {
            Some(y) if y.dims() == dims => y.clone(),
            _ => {
                let t = Tensor::new(self.algebra, dims.to_vec());
                self.y = Some(t.clone());
                t
            }
        }
    }

    /// Publishes an externally owned tensor as the output (used by leaf
    /// modules that republish a caller-owned tensor).
    pub fn publish(&mut self, y: Tensor) -> Tensor {
        self.y = Some(y.clone());
        y
    }

    pub fn output(&self) -> Result<Tensor, RingGradError> {
        self.y
            .clone()
            .ok_or_else(|| RingGradError::UninitializedOutput {
                module: self.name.to_string(),
            })
    }

    pub fn output_adj(&mut self) -> Result<Tensor, RingGradError> {
        if self.y_adj.is_none() {
            let y = self
                .y
                .as_ref()
                .ok_or_else(|| RingGradError::UninitializedOutput {
                    module: self.name.to_string(),
                })?;
            self.y_adj = Some(Tensor::new(self.algebra, y.dims().to_vec()));
        }
        Ok(self.y_adj.clone().expect("just materialized"))
    }

    pub fn zero_output_adj(&mut self) {
        if let Some(adj) = &self.y_adj {
            adj.fill(self.algebra.zero());
        }
    }
}

/// Wraps a module into a shared graph handle.
pub fn module_ref<M: Module + 'static>(m: M) -> ModuleRef {
    Arc::new(RwLock::new(m))
}

/// Reads a module's current output through its lock.
pub(crate) fn read_output(m: &ModuleRef) -> Result<Tensor, RingGradError> {
    m.read().expect("module lock poisoned").output()
}

/// Materializes (if needed) and returns a module's adjoint accumulator.
pub(crate) fn read_output_adj(m: &ModuleRef) -> Result<Tensor, RingGradError> {
    m.write().expect("module lock poisoned").output_adj()
}

/// Asserts two connected modules agree on their algebra.
pub(crate) fn check_input_algebra(
    operation: &str,
    expected: Algebra,
    input: &ModuleRef,
) -> Result<(), RingGradError> {
    let actual = input.read().expect("module lock poisoned").algebra();
    if actual != expected {
        return Err(RingGradError::AlgebraMismatch {
            expected,
            actual,
            operation: operation.to_string(),
        });
    }
    Ok(())
}

/// A graph-node key with allocation identity: two `ModuleNode`s are equal iff
/// they wrap the same `Arc` allocation. Used by the toposort machinery, which
/// needs `Eq + Hash` over trait-object nodes.
#[derive(Clone)]
pub struct ModuleNode(pub ModuleRef);

impl ModuleNode {
    fn key(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub(crate) fn deps(&self) -> Vec<ModuleNode> {
        self.0
            .read()
            .expect("module lock poisoned")
            .inputs()
            .into_iter()
            .map(ModuleNode)
            .collect()
    }
}

impl PartialEq for ModuleNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ModuleNode {}

impl Hash for ModuleNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for ModuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // try_read so Debug never deadlocks on a node someone holds locked
        match self.0.try_read() {
            Ok(guard) => write!(f, "{}@{:#x}", guard.name(), self.key()),
            Err(_) => write!(f, "<locked>@{:#x}", self.key()),
        }
    }
}
