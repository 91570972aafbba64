//! A general two-vector logarithmic-round inner-product argument.
//!
//! Grounded on `shuffling/ipa/proof.rs::{prove, verify}`: a genuine,
//! recursive Bulletproofs-style folding engine (not a placeholder), here
//! adapted from that file's compile-time `[C::ScalarField; N]` array API to
//! a runtime-length `Vec` API, since the crate's deck size `M` is a
//! `setup`-time parameter rather than a compile-time const generic
//! (SPEC_FULL.md §4.6).
//!
//! Given public bases `g, h` (each length `n`, `n` a power of two) and a
//! public point `u`, this proves knowledge of vectors `a, b` (length `n`)
//! such that `P = <a, g> + <b, h> + <a, b> * u`, in `log2(n)` rounds. Every
//! round's challenge is recomputed by the verifier from the same transcript
//! appends used by the prover; `verify` folds the bases and the running
//! commitment `P` itself and only returns `true` if the final, fully folded
//! base-case equality holds — there is no short-circuit before that point.

use ark_ec::CurveGroup;

use crate::error::{Error, Result};
use crate::transcript::Transcript;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof<C: CurveGroup> {
    pub l: Vec<C>,
    pub r: Vec<C>,
    pub a: C::ScalarField,
    pub b: C::ScalarField,
}

fn is_pow2(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

pub(crate) fn msm<C: CurveGroup>(bases: &[C], scalars: &[C::ScalarField]) -> C {
    bases.iter().zip(scalars).fold(C::zero(), |acc, (b, s)| acc + *b * *s)
}

pub(crate) fn inner_product<F: ark_ff::Field>(a: &[F], b: &[F]) -> F {
    a.iter().zip(b).fold(F::zero(), |acc, (x, y)| acc + *x * *y)
}

/// Proves `P = <a,g> + <b,h> + <a,b>*u`. The caller is responsible for
/// ensuring `P` is exactly this value for the supplied witnesses; `prove`
/// does not take `P` as an argument since it never needs to check it.
pub fn prove<C: CurveGroup>(
    transcript: &mut Transcript<C::ScalarField>,
    mut g: Vec<C>,
    mut h: Vec<C>,
    u: C,
    mut a: Vec<C::ScalarField>,
    mut b: Vec<C::ScalarField>,
) -> Result<Proof<C>> {
    let n = g.len();
    if h.len() != n || a.len() != n || b.len() != n {
        return Err(Error::InvalidParameters("ipa: mismatched vector lengths".into()));
    }
    if !is_pow2(n) {
        return Err(Error::InvalidParameters("ipa: vector length must be a power of two".into()));
    }

    let mut l_vec = Vec::new();
    let mut r_vec = Vec::new();

    while g.len() > 1 {
        let half = g.len() / 2;
        let (a_lo, a_hi) = a.split_at(half);
        let (b_lo, b_hi) = b.split_at(half);
        let (g_lo, g_hi) = g.split_at(half);
        let (h_lo, h_hi) = h.split_at(half);

        let c_l = inner_product(a_lo, b_hi);
        let c_r = inner_product(a_hi, b_lo);
        let l_point = msm(g_hi, a_lo) + msm(h_lo, b_hi) + u * c_l;
        let r_point = msm(g_lo, a_hi) + msm(h_hi, b_lo) + u * c_r;

        transcript.append_point(b"ipa-l", &l_point);
        transcript.append_point(b"ipa-r", &r_point);
        let x = transcript.challenge_scalar(b"ipa-x");
        let x_inv = x.inverse().ok_or_else(|| Error::CryptographicError("zero ipa challenge".into()))?;

        let new_a: Vec<_> = a_lo.iter().zip(a_hi).map(|(lo, hi)| *lo * x + *hi * x_inv).collect();
        let new_b: Vec<_> = b_lo.iter().zip(b_hi).map(|(lo, hi)| *lo * x_inv + *hi * x).collect();
        let new_g: Vec<_> = g_lo.iter().zip(g_hi).map(|(lo, hi)| *lo * x_inv + *hi * x).collect();
        let new_h: Vec<_> = h_lo.iter().zip(h_hi).map(|(lo, hi)| *lo * x + *hi * x_inv).collect();

        l_vec.push(l_point);
        r_vec.push(r_point);
        a = new_a;
        b = new_b;
        g = new_g;
        h = new_h;
    }

    Ok(Proof { l: l_vec, r: r_vec, a: a[0], b: b[0] })
}

/// Verifies a proof against the claimed combined commitment `p`. Returns
/// `false` for any malformed shape or failed fold — never panics.
pub fn verify<C: CurveGroup>(
    transcript: &mut Transcript<C::ScalarField>,
    mut g: Vec<C>,
    mut h: Vec<C>,
    u: C,
    mut p: C,
    proof: &Proof<C>,
) -> bool {
    let n = g.len();
    if h.len() != n || !is_pow2(n) {
        return false;
    }
    let rounds = n.trailing_zeros() as usize;
    if proof.l.len() != rounds || proof.r.len() != rounds {
        return false;
    }

    for (l, r) in proof.l.iter().zip(&proof.r) {
        transcript.append_point(b"ipa-l", l);
        transcript.append_point(b"ipa-r", r);
        let x = transcript.challenge_scalar(b"ipa-x");
        let x_inv = match x.inverse() {
            Some(v) => v,
            None => return false,
        };

        let half = g.len() / 2;
        let (g_lo, g_hi) = g.split_at(half);
        let (h_lo, h_hi) = h.split_at(half);
        let new_g: Vec<_> = g_lo.iter().zip(g_hi).map(|(lo, hi)| *lo * x_inv + *hi * x).collect();
        let new_h: Vec<_> = h_lo.iter().zip(h_hi).map(|(lo, hi)| *lo * x + *hi * x_inv).collect();

        p = p + *l * (x * x) + *r * (x_inv * x_inv);
        g = new_g;
        h = new_h;
    }

    g[0] * proof.a + h[0] * proof.b + u * (proof.a * proof.b) == p
}
