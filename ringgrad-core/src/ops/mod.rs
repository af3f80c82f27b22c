//! The primitive operator library.
//!
//! Every operator computes its forward value and its backward contribution
//! exclusively through [`crate::Algebra`] operations, so any graph built from
//! these modules runs unchanged in any algebra. Backward methods *add into*
//! the inputs' adjoints (never overwrite), per the [`crate::Module`]
//! contract.

pub mod convert;
pub mod elem;
pub mod identity;
pub mod math_elem;
pub mod reduction;
pub mod scalar;
pub mod select;

pub use convert::ConvertAlgebra;
pub use elem::{ElemAdd, ElemDivide, ElemMultiply, ElemSubtract};
pub use identity::Identity;
pub use math_elem::{Exp, Log};
pub use reduction::{Prod, Sum};
pub use scalar::{ScalarAdd, ScalarMultiply};
pub use select::Select;
