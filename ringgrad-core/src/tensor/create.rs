// src/tensor/create.rs

use crate::algebra::Algebra;
use crate::error::RingGradError;
use crate::tensor::Tensor;
use rand::Rng;
use rand_distr::StandardNormal;

/// Creates a tensor filled with the algebra's zero.
pub fn zeros(algebra: Algebra, dims: &[usize]) -> Tensor {
    Tensor::new(algebra, dims.to_vec())
}

/// Creates a tensor filled with the algebra's one.
pub fn ones(algebra: Algebra, dims: &[usize]) -> Tensor {
    full(algebra, dims, algebra.one())
}

/// Creates a tensor filled with a specific representation value.
pub fn full(algebra: Algebra, dims: &[usize], value: f64) -> Tensor {
    let t = Tensor::new(algebra, dims.to_vec());
    t.fill(value);
    t
}

/// Creates a zero tensor with the same shape and algebra as the input.
pub fn zeros_like(tensor: &Tensor) -> Tensor {
    Tensor::new(tensor.algebra(), tensor.dims().to_vec())
}

/// Creates a one-filled tensor with the same shape and algebra as the input.
pub fn ones_like(tensor: &Tensor) -> Tensor {
    full(tensor.algebra(), tensor.dims(), tensor.algebra().one())
}

/// Creates a tensor of uniform random reals in `[0, 1)`, mapped through the
/// algebra's `from_real`.
pub fn rand(algebra: Algebra, dims: &[usize]) -> Result<Tensor, RingGradError> {
    let size: usize = dims.iter().product();
    let mut rng = rand::thread_rng();
    let reals: Vec<f64> = (0..size).map(|_| rng.gen::<f64>()).collect();
    Tensor::from_reals(algebra, dims.to_vec(), reals)
}

/// Creates a tensor of standard-normal random reals, mapped through the
/// algebra's `from_real`. Note negative draws are representable only in the
/// `Real`, `LogSign` and `Split` algebras.
pub fn randn(algebra: Algebra, dims: &[usize]) -> Result<Tensor, RingGradError> {
    let size: usize = dims.iter().product();
    let mut rng = rand::thread_rng();
    let reals: Vec<f64> = (0..size).map(|_| rng.sample(StandardNormal)).collect();
    Tensor::from_reals(algebra, dims.to_vec(), reals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_ones_full() {
        let z = zeros(Algebra::Log, &[2, 2]);
        let o = ones(Algebra::Log, &[2, 2]);
        for i in 0..4 {
            assert_eq!(z.get_value(i).unwrap(), Algebra::Log.zero());
            assert_eq!(o.get_value(i).unwrap(), Algebra::Log.one());
        }
        let f = full(Algebra::Real, &[3], 2.5);
        assert_eq!(f.get_value(2).unwrap(), 2.5);
    }

    #[test]
    fn test_like_constructors() {
        let t = Tensor::new(Algebra::LogSign, vec![2, 3]);
        let z = zeros_like(&t);
        assert_eq!(z.dims(), t.dims());
        assert_eq!(z.algebra(), t.algebra());
        let o = ones_like(&t);
        assert_eq!(o.get_value(0).unwrap(), Algebra::LogSign.one());
    }

    #[test]
    fn test_rand_in_unit_interval() {
        let t = rand(Algebra::Real, &[100]).unwrap();
        for i in 0..100 {
            let v = t.get_value(i).unwrap();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_rand_log_space_is_nonpositive() {
        // ln of a [0,1) draw is <= 0
        let t = rand(Algebra::Log, &[50]).unwrap();
        for i in 0..50 {
            assert!(t.get_value(i).unwrap() <= 0.0);
        }
    }

    #[test]
    fn test_randn_has_both_signs_eventually() {
        let t = randn(Algebra::Real, &[200]).unwrap();
        let mut pos = false;
        let mut neg = false;
        for i in 0..200 {
            let v = t.get_value(i).unwrap();
            pos |= v > 0.0;
            neg |= v < 0.0;
        }
        assert!(pos && neg);
    }
}
