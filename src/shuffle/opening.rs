//! Linear openings: batched Schnorr proofs that a committed vector both
//! opens a Pedersen commitment and satisfies one public linear constraint.
//!
//! This generalizes `sigma::DleqProof`'s commit/respond/verify shape from a
//! scalar witness to a vector witness, the same way `shuffling/ipa/proof.rs`
//! generalizes single Chaum-Pedersen proofs into a folding argument — except
//! here the argument stays constant-round (one challenge, one vector
//! response) rather than folding, since the statement is fully linear in
//! the witness and needs no logarithmic compression to stay sound.
//!
//! Used by the multi-exponentiation argument (`shuffle::multiexp`) to tie a
//! committed scalar vector to a multi-scalar-multiplication target against
//! a *public point basis* — the permutation's output ciphertexts — without
//! ever revealing the vector itself.

use ark_ec::CurveGroup;
use ark_ff::UniformRand;
use ark_std::rand::Rng;

use crate::error::{Error, Result};
use crate::transcript::Transcript;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsmOpeningProof<C: CurveGroup> {
    pub(crate) t: C,
    pub(crate) t_point: C,
    pub(crate) z: Vec<C::ScalarField>,
    pub(crate) z_r: C::ScalarField,
}

/// Proves knowledge of `(w, r)` with `commitment = <w, g> + r*h` and
/// `<w, points> = claimed`, for a public point basis `points` distinct from
/// `g`.
pub fn prove<C: CurveGroup>(
    transcript: &mut Transcript<C::ScalarField>,
    g: &[C],
    h: C,
    points: &[C],
    w: &[C::ScalarField],
    r: C::ScalarField,
    rng: &mut impl Rng,
) -> Result<MsmOpeningProof<C>> {
    if g.len() != w.len() || points.len() != w.len() {
        return Err(Error::InvalidParameters("msm opening: mismatched vector lengths".into()));
    }

    let w_blind: Vec<_> = (0..w.len()).map(|_| C::ScalarField::rand(rng)).collect();
    let r_blind = C::ScalarField::rand(rng);

    let t = commit(g, h, &w_blind, r_blind);
    let t_point = msm(points, &w_blind);

    transcript.append_point(b"msm-t", &t);
    transcript.append_point(b"msm-t-point", &t_point);
    let e = transcript.challenge_scalar(b"msm-challenge");

    let z: Vec<_> = w_blind.iter().zip(w).map(|(blind, wi)| *blind + e * *wi).collect();
    let z_r = r_blind + e * r;

    Ok(MsmOpeningProof { t, t_point, z, z_r })
}

pub fn verify<C: CurveGroup>(
    transcript: &mut Transcript<C::ScalarField>,
    g: &[C],
    h: C,
    commitment: C,
    points: &[C],
    claimed: C,
    proof: &MsmOpeningProof<C>,
) -> bool {
    if g.len() != proof.z.len() || points.len() != proof.z.len() {
        return false;
    }

    transcript.append_point(b"msm-t", &proof.t);
    transcript.append_point(b"msm-t-point", &proof.t_point);
    let e = transcript.challenge_scalar(b"msm-challenge");

    let lhs_commit = commit(g, h, &proof.z, proof.z_r);
    let rhs_commit = proof.t + commitment * e;
    if lhs_commit != rhs_commit {
        return false;
    }

    let lhs_point = msm(points, &proof.z);
    let rhs_point = proof.t_point + claimed * e;
    lhs_point == rhs_point
}

fn commit<C: CurveGroup>(g: &[C], h: C, w: &[C::ScalarField], r: C::ScalarField) -> C {
    msm(g, w) + h * r
}

fn msm<C: CurveGroup>(bases: &[C], scalars: &[C::ScalarField]) -> C {
    bases.iter().zip(scalars).fold(C::zero(), |acc, (b, s)| acc + *b * *s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pedersen::derive_generators;
    use ark_grumpkin::{Fr, Projective};
    use ark_std::test_rng;

    type C = Projective;

    #[test]
    fn round_trip() {
        let n = 4;
        let g = derive_generators::<C>(b"opening-test-g", n).unwrap();
        let h = derive_generators::<C>(b"opening-test-h", 1).unwrap()[0];
        let points = derive_generators::<C>(b"opening-test-points", n).unwrap();

        let mut rng = test_rng();
        let w: Vec<Fr> = (0..n).map(|_| Fr::from((rng.next_u32() % 100) as u64)).collect();
        let r = Fr::from(7u64);

        let commitment = commit(&g, h, &w, r);
        let claimed = msm(&points, &w);

        let mut pt = Transcript::<Fr>::new(b"opening-test");
        let proof = prove(&mut pt, &g, h, &points, &w, r, &mut rng).unwrap();

        let mut vt = Transcript::<Fr>::new(b"opening-test");
        assert!(verify(&mut vt, &g, h, commitment, &points, claimed, &proof));
    }

    #[test]
    fn rejects_wrong_target() {
        let n = 3;
        let g = derive_generators::<C>(b"opening-test-g2", n).unwrap();
        let h = derive_generators::<C>(b"opening-test-h2", 1).unwrap()[0];
        let points = derive_generators::<C>(b"opening-test-points2", n).unwrap();

        let mut rng = test_rng();
        let w = vec![Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)];
        let r = Fr::from(9u64);
        let commitment = commit(&g, h, &w, r);

        let mut pt = Transcript::<Fr>::new(b"opening-test-2");
        let proof = prove(&mut pt, &g, h, &points, &w, r, &mut rng).unwrap();

        let wrong_target = points[0];
        let mut vt = Transcript::<Fr>::new(b"opening-test-2");
        assert!(!verify(&mut vt, &g, h, commitment, &points, wrong_target, &proof));
    }
}
