//! Dual-number arithmetic packed into a single `f64`.
//!
//! A dual number `(primal, tangent)` is stored as two `f32` halves of the
//! `f64` bit pattern: primal in the high word, tangent in the low word.
//! Arithmetic follows the usual forward-mode rules, so running a graph under
//! this algebra with a tangent seeded at one input coordinate yields the
//! directional derivative of every node alongside its value. That makes
//! `Split` the cheap cross-check for the reverse-mode engine: the root's
//! tangent must match the corresponding leaf adjoint.
//!
//! The packed `f64` is opaque; never do float arithmetic on it directly.

/// Packs a `(primal, tangent)` pair.
pub fn pack(primal: f32, tangent: f32) -> f64 {
    let bits = ((primal.to_bits() as u64) << 32) | tangent.to_bits() as u64;
    f64::from_bits(bits)
}

/// The value half of a packed dual number.
pub fn primal(a: f64) -> f32 {
    f32::from_bits((a.to_bits() >> 32) as u32)
}

/// The derivative half of a packed dual number.
pub fn tangent(a: f64) -> f32 {
    f32::from_bits(a.to_bits() as u32)
}

pub fn plus(a: f64, b: f64) -> f64 {
    pack(primal(a) + primal(b), tangent(a) + tangent(b))
}

pub fn minus(a: f64, b: f64) -> f64 {
    pack(primal(a) - primal(b), tangent(a) - tangent(b))
}

pub fn times(a: f64, b: f64) -> f64 {
    let (pa, ta) = (primal(a), tangent(a));
    let (pb, tb) = (primal(b), tangent(b));
    pack(pa * pb, pa * tb + ta * pb)
}

pub fn divide(a: f64, b: f64) -> f64 {
    let (pa, ta) = (primal(a), tangent(a));
    let (pb, tb) = (primal(b), tangent(b));
    pack(pa / pb, (ta * pb - pa * tb) / (pb * pb))
}

pub fn exp(a: f64) -> f64 {
    let e = primal(a).exp();
    pack(e, tangent(a) * e)
}

pub fn log(a: f64) -> f64 {
    let p = primal(a);
    pack(p.ln(), tangent(a) / p)
}

pub fn abs(a: f64) -> f64 {
    let (p, t) = (primal(a), tangent(a));
    pack(p.abs(), if p < 0.0 { -t } else { t })
}

pub fn eq(a: f64, b: f64, delta: f32) -> bool {
    let (pa, pb) = (primal(a), primal(b));
    if pa.is_nan() || pb.is_nan() {
        return pa.is_nan() && pb.is_nan();
    }
    pa == pb || (pa - pb).abs() <= delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pack_round_trip() {
        let d = pack(2.5, -0.125);
        assert_eq!(primal(d), 2.5);
        assert_eq!(tangent(d), -0.125);
    }

    #[test]
    fn test_product_rule() {
        // d/dx (x * 3) at x = 2, seeded with tangent 1
        let x = pack(2.0, 1.0);
        let c = pack(3.0, 0.0);
        let y = times(x, c);
        assert_eq!(primal(y), 6.0);
        assert_eq!(tangent(y), 3.0);
    }

    #[test]
    fn test_quotient_rule() {
        // d/dx (1 / x) at x = 4 is -1/16
        let x = pack(4.0, 1.0);
        let one = pack(1.0, 0.0);
        let y = divide(one, x);
        assert_relative_eq!(tangent(y), -1.0 / 16.0, max_relative = 1e-6);
    }

    #[test]
    fn test_exp_chain_rule() {
        // d/dx exp(2x) at x = 0.5 is 2e
        let x = pack(0.5, 1.0);
        let two = pack(2.0, 0.0);
        let y = exp(times(two, x));
        assert_relative_eq!(tangent(y), 2.0 * 1.0f32.exp(), max_relative = 1e-6);
    }

    #[test]
    fn test_log_derivative() {
        // d/dx ln(x) at x = 8 is 1/8
        let x = pack(8.0, 1.0);
        let y = log(x);
        assert_relative_eq!(tangent(y), 0.125, max_relative = 1e-6);
    }
}
