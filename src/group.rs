//! Scalar and point primitives.
//!
//! The crate never reimplements curve or field arithmetic: every operation
//! here is a thin, named wrapper over `ark_ec`/`ark_ff` trait methods,
//! exactly as `shuffling/data_structures.rs` and
//! `shuffling/public_key_setup.rs` never hand-roll arithmetic. Scalar
//! inversion goes through `ark_ff::Field::inverse`, which is the only
//! inversion routine this crate uses anywhere (SPEC_FULL.md §4.1, §9).

use ark_ec::CurveGroup;
use ark_ff::{Field, PrimeField};

use crate::error::{Error, Result};

/// `scalar_mul(0, P) = O`; `scalar_mul(k, O) = O`; scalar inputs are used
/// via their canonical `[0, q)` representative (arkworks field elements are
/// always stored canonically, so no extra reduction step is needed here).
pub fn scalar_mul<C: CurveGroup>(scalar: C::ScalarField, point: C) -> C {
    point * scalar
}

pub fn point_add<C: CurveGroup>(a: C, b: C) -> C {
    a + b
}

pub fn point_neg<C: CurveGroup>(a: C) -> C {
    -a
}

/// Constant-time-friendly scalar inversion via `ark_ff::Field::inverse`.
/// Returns `Error::InvalidScalar` for a zero input, matching §4.1's
/// contract that inversion is undefined at zero.
pub fn scalar_inv<F: Field>(scalar: F) -> Result<F> {
    scalar.inverse().ok_or(Error::InvalidScalar)
}

/// Rejects the identity point. Used wherever §3 mandates a public value may
/// never be the group identity (keys, ciphertext components, reveal
/// tokens, commitments).
pub fn require_non_identity<C: CurveGroup>(point: C) -> Result<C> {
    if point.is_zero() {
        Err(Error::InvalidPoint)
    } else {
        Ok(point)
    }
}

/// Rejects a zero scalar. Used for secret keys and masking/rerandomization
/// factors, which §3 requires to live in `[1, q)`.
pub fn require_nonzero_scalar<F: PrimeField>(scalar: F) -> Result<F> {
    if scalar.is_zero() {
        Err(Error::InvalidScalar)
    } else {
        Ok(scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ec::PrimeGroup;
    use ark_grumpkin::{Fr, Projective};
    use ark_std::{test_rng, UniformRand, Zero};

    type C = Projective;

    #[test]
    fn scalar_mul_zero_is_identity() {
        let mut rng = test_rng();
        let p = C::generator() * Fr::rand(&mut rng);
        assert!(scalar_mul(Fr::from(0u64), p).is_zero());
    }

    #[test]
    fn scalar_mul_on_identity_is_identity() {
        let k = Fr::from(42u64);
        assert!(scalar_mul(k, C::zero()).is_zero());
    }

    #[test]
    fn group_laws_hold() {
        let mut rng = test_rng();
        let p = C::generator() * Fr::rand(&mut rng);
        let q = C::generator() * Fr::rand(&mut rng);
        let r = C::generator() * Fr::rand(&mut rng);

        assert_eq!(point_add(p, C::zero()), p);
        assert_eq!(point_add(p, point_neg(p)), C::zero());
        assert_eq!(point_add(p, q), point_add(q, p));
        assert_eq!(point_add(point_add(p, q), r), point_add(p, point_add(q, r)));

        let a = Fr::rand(&mut rng);
        let b = Fr::rand(&mut rng);
        assert_eq!(point_add(scalar_mul(a, p), scalar_mul(b, p)), scalar_mul(a + b, p));
        assert_eq!(scalar_mul(a, scalar_mul(b, p)), scalar_mul(a * b, p));
    }

    #[test]
    fn scalar_inv_rejects_zero() {
        assert!(scalar_inv(Fr::from(0u64)).is_err());
        assert!(scalar_inv(Fr::from(7u64)).is_ok());
    }

    #[test]
    fn identity_and_zero_scalar_are_rejected() {
        assert!(require_non_identity(C::zero()).is_err());
        assert!(require_nonzero_scalar(Fr::from(0u64)).is_err());
    }
}
