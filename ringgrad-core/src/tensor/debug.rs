// src/tensor/debug.rs

use crate::tensor::{utils, Tensor};
use std::fmt;

/// Human-readable listing: one `coords = representation (real)` line per
/// entry, preceded by the algebra and dims.
impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tensor({:?}, dims {:?})", self.algebra(), self.dims())?;
        for c in 0..self.size() {
            let coord = utils::index_to_coord(c, self.dims());
            let v = self.get_value(c).map_err(|_| fmt::Error)?;
            writeln!(
                f,
                "  {:?} = {:?} ({:?})",
                coord,
                v,
                self.algebra().to_real(v)
            )?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("algebra", &self.algebra())
            .field("dims", &self.dims())
            .field("offset", &self.offset())
            .field("size", &self.size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::algebra::Algebra;
    use crate::tensor::Tensor;

    #[test]
    fn test_display_lists_every_coordinate() {
        let t = Tensor::from_values(Algebra::Real, vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let s = format!("{}", t);
        assert!(s.contains("[0, 0]"));
        assert!(s.contains("[1, 1]"));
        assert!(s.contains("4.0"));
    }
}
