//! Graph algorithms and the composite execution engine.
//!
//! `toposort` is a pure algorithm over an abstract node type and a
//! dependencies-of function; `topo_order` applies it to [`crate::Module`]
//! graphs and drives forward/backward execution; `finite_diff` validates the
//! reverse-mode adjoints numerically.

pub mod finite_diff;
pub mod topo_order;
pub mod toposort;

pub use topo_order::TopoOrder;
