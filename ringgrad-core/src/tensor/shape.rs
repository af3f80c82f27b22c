// src/tensor/shape.rs
//
// Rank-changing operations. `select` extracts the sub-tensor at a fixed
// coordinate (rank reduced by one, copied into a fresh buffer); `add_tensor`
// is its additive inverse, accumulating a smaller tensor into the slice of a
// larger one. Over a zero-filled larger tensor the two are exact inverses.

use crate::error::RingGradError;
use crate::tensor::{utils, Tensor};

impl Tensor {
    /// Extracts the sub-tensor obtained by fixing coordinate `idx` of
    /// dimension `dim`. The result has rank one less and its own buffer.
    pub fn select(&self, dim: usize, idx: usize) -> Result<Tensor, RingGradError> {
        if dim >= self.rank() || idx >= self.dims()[dim] {
            return Err(RingGradError::IndexOutOfBounds {
                index: vec![dim, idx],
                shape: self.dims().to_vec(),
            });
        }
        let mut out_dims = self.dims().to_vec();
        out_dims.remove(dim);
        let out = Tensor::new(self.algebra(), out_dims.clone());
        let mut indices = Vec::with_capacity(self.rank());
        for c in 0..out.size() {
            indices.clear();
            indices.extend(utils::index_to_coord(c, &out_dims));
            indices.insert(dim, idx);
            out.set_value(c, self.get(&indices)?)?;
        }
        Ok(out)
    }

    /// Adds (algebra `plus`) `addend` elementwise into the slice of this
    /// tensor at coordinate `idx` of dimension `dim`. `addend` must have this
    /// tensor's shape with dimension `dim` removed.
    pub fn add_tensor(
        &self,
        addend: &Tensor,
        dim: usize,
        idx: usize,
    ) -> Result<(), RingGradError> {
        if dim >= self.rank() || idx >= self.dims()[dim] {
            return Err(RingGradError::IndexOutOfBounds {
                index: vec![dim, idx],
                shape: self.dims().to_vec(),
            });
        }
        if addend.algebra() != self.algebra() {
            return Err(RingGradError::AlgebraMismatch {
                expected: self.algebra(),
                actual: addend.algebra(),
                operation: "add_tensor".to_string(),
            });
        }
        let mut slice_dims = self.dims().to_vec();
        slice_dims.remove(dim);
        if addend.dims() != slice_dims.as_slice() {
            return Err(RingGradError::ShapeMismatch {
                expected: slice_dims,
                actual: addend.dims().to_vec(),
                operation: "add_tensor".to_string(),
            });
        }
        let mut indices = Vec::with_capacity(self.rank());
        for c in 0..addend.size() {
            indices.clear();
            indices.extend(utils::index_to_coord(c, &slice_dims));
            indices.insert(dim, idx);
            self.add(&indices, addend.get_value(c)?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::algebra::Algebra;
    use crate::tensor::Tensor;

    #[test]
    fn test_select_fixes_a_coordinate() {
        // [[1 2 3], [4 5 6]]
        let t =
            Tensor::from_values(Algebra::Real, vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
                .unwrap();
        let row = t.select(0, 1).unwrap();
        assert_eq!(row.dims(), &[3]);
        assert_eq!(row.get_value(0).unwrap(), 4.0);
        assert_eq!(row.get_value(2).unwrap(), 6.0);
        let col = t.select(1, 2).unwrap();
        assert_eq!(col.dims(), &[2]);
        assert_eq!(col.get_value(0).unwrap(), 3.0);
        assert_eq!(col.get_value(1).unwrap(), 6.0);
    }

    #[test]
    fn test_select_bounds() {
        let t = Tensor::new(Algebra::Real, vec![2, 3]);
        assert!(t.select(2, 0).is_err());
        assert!(t.select(1, 3).is_err());
    }

    #[test]
    fn test_add_tensor_into_slice() {
        let t = Tensor::new(Algebra::Real, vec![2, 3]);
        let s = Tensor::from_values(Algebra::Real, vec![3], vec![1.0, 2.0, 3.0]).unwrap();
        t.add_tensor(&s, 0, 1).unwrap();
        assert_eq!(t.get(&[0, 0]).unwrap(), 0.0);
        assert_eq!(t.get(&[1, 0]).unwrap(), 1.0);
        assert_eq!(t.get(&[1, 2]).unwrap(), 3.0);
    }

    #[test]
    fn test_select_add_tensor_inverse_law() {
        for alg in [Algebra::Real, Algebra::Log] {
            let s = Tensor::from_reals(alg, vec![2, 2], vec![0.5, 1.5, 2.0, 3.0]).unwrap();
            for dim in 0..3 {
                let zero = Tensor::new(alg, vec![2, 2, 2]);
                let idx = 1;
                zero.add_tensor(&s, dim, idx).unwrap();
                let back = zero.select(dim, idx).unwrap();
                assert!(back.equals(&s, 1e-12), "algebra {:?} dim {}", alg, dim);
            }
        }
    }

    #[test]
    fn test_add_tensor_shape_check() {
        let t = Tensor::new(Algebra::Real, vec![2, 3]);
        let wrong = Tensor::new(Algebra::Real, vec![2]);
        assert!(t.add_tensor(&wrong, 0, 0).is_err());
        let wrong_alg = Tensor::new(Algebra::Log, vec![3]);
        assert!(t.add_tensor(&wrong_alg, 0, 0).is_err());
    }
}
