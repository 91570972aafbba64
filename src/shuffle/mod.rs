//! The Bayer-Groth verifiable shuffle argument: commit to a secret
//! permutation and a matching vector of remasking factors, then prove the
//! output deck is a permuted, rerandomized copy of the input deck without
//! revealing which.
//!
//! Built from three general-purpose primitives rather than one monolithic
//! argument: [`ipa`] (the logarithmic-round inner-product engine, grounded
//! on `shuffling/ipa/proof.rs`) for the permutation's running-product
//! recursion, [`opening`] (the constant-round vector opening, generalizing
//! `sigma::DleqProof`) for tying committed vectors to public linear targets,
//! and `sigma::DleqProof` itself for the multi-exponentiation argument's
//! closing equation. Grounded overall on
//! `shuffling/bayer_groth/{prover.rs,verifier.rs}`'s five-move shape
//! (permutation commitment, challenge, evaluation commitment, challenge,
//! argument) — but, unlike that `verifier.rs`, every check here is
//! load-bearing; none of the `true` placeholders in that file are carried
//! over (SPEC_FULL.md §4.6, §9).
//!
//! The permutation commitment `c_a` binds `a_i = perm[i] + 1`. A random
//! challenge `x` turns the claim "`a` is a permutation of `{1..n}`" into a
//! multiset-equality of roots: `c_i := x - a_i`, and `{a_i}` is a
//! permutation of `{1..n}` iff `prod(c_i) = prod(x - j)` for `j` in `1..n`.
//! Unlike an exponential construction (`x^{a_i}`), this product's degree in
//! `x` never depends on the size of `a_i`, so a cheating prover's success
//! probability stays bounded by `n / |F|` (Schwartz-Zippel) no matter what
//! field element they commit to.
//!
//! The running product itself is committed (`c_p`) and tied to `c_a`
//! through a recursion `p_i = p_{i-1} * c_i`. Checking only the *total*
//! `sum(p_shift_i * c_i) = sum(p_i)` would itself be a moment check — a
//! cheating prover could shift mass between indices and still match the
//! aggregate. The recursion is instead bound index-by-index with a random
//! linear combination: a fresh challenge `w`, drawn only after `c_p` is
//! fixed, weights the bilinear term so that any per-index discrepancy
//! survives into a nonzero, degree-bounded polynomial in `w`, caught with
//! the same Schwartz-Zippel bound. Every cross-commitment tie (`c_a` to its
//! own weighted self-sum, `c_p` to its shifted read-back and to its
//! weighted total) goes through [`opening`]'s zero-knowledge linear-opening
//! proof rather than a revealed blinding factor — see DESIGN.md's
//! "Bayer-Groth shuffle" entry for the full derivation.

pub mod ipa;
pub mod opening;

use ark_ec::CurveGroup;
use ark_ff::{Field, UniformRand};
use ark_std::rand::Rng;

use crate::elgamal::{remask, MaskedCard, PublicKey};
use crate::error::{Error, Result};
use crate::params::{DOMAIN_SHUFFLE, DOMAIN_SHUFFLE_IPA_U, DOMAIN_SHUFFLE_PRODUCT_SHIFT};
use crate::pedersen::{self, CommitKey};
use crate::sigma;
use crate::transcript::Transcript;

const LOG_TARGET: &str = "mental_poker_core::shuffle";

/// Commitment parameters for a shuffle over (padded) decks of size `n`.
///
/// `shift_g0` stands in for the public constant `1` prepended to the
/// permutation argument's running-product vector when it is read back
/// shifted by one slot; it must be independent of `pedersen.g`/`pedersen.h`
/// and `ipa_u`, or a cheating prover could fold one statement into another.
#[derive(Clone, Debug)]
pub struct ShuffleKey<C: CurveGroup> {
    pub pedersen: CommitKey<C>,
    pub ipa_u: C,
    pub shift_g0: C,
}

impl<C: CurveGroup> ShuffleKey<C>
where
    C::ScalarField: ark_ff::PrimeField,
{
    /// Derive a shuffle key sized for a padded deck of `n` cards. Callers
    /// should pass `next_power_of_two(m)` for an actual deck of `m` cards,
    /// not `m` itself.
    pub fn derive(n: usize) -> Result<Self> {
        let pedersen = CommitKey::derive(n)?;
        let ipa_u = pedersen::derive_generators::<C>(DOMAIN_SHUFFLE_IPA_U, 1)?[0];
        let shift_g0 = pedersen::derive_generators::<C>(DOMAIN_SHUFFLE_PRODUCT_SHIFT, 1)?[0];
        Ok(Self { pedersen, ipa_u, shift_g0 })
    }
}

/// The permutation argument: proves the vector committed in `c_a` is (up to
/// the shift `+1`) a permutation of `{1..n}`, by proving the running
/// product `p_i = prod_{k<=i}(x - a_k)` is correctly formed and hits the
/// public target `prod(x - j)`, all without opening `c_a` or `c_p` in the
/// clear.
///
/// `p_shift`/the weighted recursion vector are never committed or revealed
/// directly — they're folded away by `product_ipa`. The four opening
/// proofs tie the fold's endpoints back to `c_a` and `c_p`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductArgument<C: CurveGroup> {
    pub c_p: C,
    pub claimed_shift_open: C,
    pub p_shift_open: opening::MsmOpeningProof<C>,
    pub claimed_weighted_total: C,
    pub p_weighted_total_open: opening::MsmOpeningProof<C>,
    pub p_last_open: opening::MsmOpeningProof<C>,
    pub claimed_a_self_weighted: C,
    pub a_self_weighted_open: opening::MsmOpeningProof<C>,
    pub product_ipa: ipa::Proof<C>,
}

/// Ties the permutation commitment `c_a` to the actual multi-scalar
/// products against the output ciphertexts, then closes the equation with a
/// zero-knowledge proof that the leftover masking aggregate is the same
/// discrete log relative to `g` and `pk` — instead of revealing that
/// aggregate, as an opened-in-the-clear construction would.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiExpArgument<C: CurveGroup> {
    pub claimed_a_msm_c1: C,
    pub claimed_a_msm_c2: C,
    pub a_msm_c1: opening::MsmOpeningProof<C>,
    pub a_msm_c2: opening::MsmOpeningProof<C>,
    pub closing: sigma::DleqProof<C>,
}

/// A complete shuffle proof: one permutation commitment, a running-product
/// argument, and a multi-exponentiation argument. A single closed struct —
/// no optional fields, no partial proofs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShuffleProof<C: CurveGroup> {
    pub c_a: C,
    pub product: ProductArgument<C>,
    pub multiexp: MultiExpArgument<C>,
}

pub fn next_power_of_two(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    let mut p = 1usize;
    while p < n {
        p <<= 1;
    }
    p
}

/// The fixed, publicly reproducible ciphertext used to pad a deck up to the
/// next power of two. Both prover and verifier compute it identically, so
/// padding never requires sharing an out-of-band value.
fn pad_ciphertext<C: CurveGroup>() -> MaskedCard<C> {
    MaskedCard::new(C::zero(), C::zero())
}

fn padded_inputs<C: CurveGroup>(inputs: &[MaskedCard<C>], n: usize) -> Vec<MaskedCard<C>> {
    let mut v = inputs.to_vec();
    v.resize(n, pad_ciphertext());
    v
}

fn validate_permutation(perm: &[usize], n: usize) -> Result<()> {
    if perm.len() != n {
        return Err(Error::InvalidParameters("permutation length mismatch".into()));
    }
    let mut seen = vec![false; n];
    for &idx in perm {
        if idx >= n || seen[idx] {
            return Err(Error::InvalidParameters("not a bijection of the padded deck".into()));
        }
        seen[idx] = true;
    }
    Ok(())
}

fn random_nonzero_scalar<C: CurveGroup>(rng: &mut impl Rng) -> C::ScalarField {
    loop {
        let s = C::ScalarField::rand(rng);
        if !s.is_zero() {
            return s;
        }
    }
}

fn msm<C: CurveGroup>(bases: &[C], scalars: &[C::ScalarField]) -> C {
    ipa::msm(bases, scalars)
}

/// `prod_{j=1}^{n} (x - j)`, computed identically by prover and verifier.
fn root_product<F: Field>(x: F, n: usize) -> F {
    (1..=n as u64).fold(F::one(), |acc, j| acc * (x - F::from(j)))
}

/// `[1, w, w^2, ..., w^{n-1}]`.
fn scalar_powers<F: Field>(w: F, n: usize) -> Vec<F> {
    let mut out = Vec::with_capacity(n);
    let mut cur = F::one();
    for _ in 0..n {
        out.push(cur);
        cur *= w;
    }
    out
}

fn scale_points<C: CurveGroup>(points: &[C], scalars: &[C::ScalarField]) -> Vec<C> {
    points.iter().zip(scalars).map(|(p, s)| *p * *s).collect()
}

/// The basis the running-product recursion's shifted witness vector is
/// checked against: a single extra generator standing in for the leading
/// constant `1`, followed by all but the last entry of `pedersen.g`.
fn shift_basis<C: CurveGroup>(key: &ShuffleKey<C>, n: usize) -> Vec<C> {
    let mut basis = Vec::with_capacity(n);
    basis.push(key.shift_g0);
    basis.extend_from_slice(&key.pedersen.g[..n - 1]);
    basis
}

/// Points tying the running-product commitment to the part of itself the
/// shift recursion reads back: `<p, points> = sum_{j=0}^{n-2} p_j * g_j`.
fn shift_open_points<C: CurveGroup>(key: &ShuffleKey<C>, n: usize) -> Vec<C> {
    let mut points = vec![C::zero(); n];
    points[..n - 1].copy_from_slice(&key.pedersen.g[..n - 1]);
    points
}

/// Points tying the running-product commitment's last entry to `ipa_u`:
/// `<p, points> = p[n-1] * ipa_u`.
fn last_entry_points<C: CurveGroup>(key: &ShuffleKey<C>, n: usize) -> Vec<C> {
    let mut points = vec![C::zero(); n];
    points[n - 1] = key.ipa_u;
    points
}

/// Proves that `outputs` (returned by this call) is a permutation of
/// `inputs`, re-randomized under `pk`, without revealing `permutation` or
/// the remasking factors.
///
/// `permutation[i]` is the index into the (already zero-padded) input deck
/// that output slot `i` receives: `outputs[i] = remask(inputs[permutation[i]], rho[i])`.
/// `inputs` need not already be padded to a power of two — padding is
/// applied internally and transparently using a fixed public ciphertext.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn prove<C: CurveGroup>(
    key: &ShuffleKey<C>,
    pk: PublicKey<C>,
    inputs: &[MaskedCard<C>],
    permutation: &[usize],
    rng: &mut impl Rng,
) -> Result<(Vec<MaskedCard<C>>, ShuffleProof<C>)>
where
    C::ScalarField: ark_ff::PrimeField,
{
    let m = inputs.len();
    let n = next_power_of_two(m);
    tracing::debug!(target: LOG_TARGET, m, n, "proving shuffle");
    if key.pedersen.len() != n {
        return Err(Error::InvalidParameters("shuffle key size does not match padded deck length".into()));
    }
    if permutation.len() != m {
        return Err(Error::InvalidParameters("permutation length must match the unpadded deck".into()));
    }

    let mut perm = permutation.to_vec();
    perm.extend(m..n);
    validate_permutation(&perm, n)?;

    let padded = padded_inputs(inputs, n);

    let mut transcript = Transcript::<C::ScalarField>::new(DOMAIN_SHUFFLE);
    transcript.append_usize(b"n", n);
    transcript.append_usize(b"m", m);
    for c in &padded {
        transcript.append_point(b"input-c1", &c.c1);
        transcript.append_point(b"input-c2", &c.c2);
    }

    // a_i = perm[i] + 1, so every entry lives in [1, n] and the permutation
    // never commits to a zero field element.
    let a_vec: Vec<C::ScalarField> = perm.iter().map(|&idx| C::ScalarField::from((idx + 1) as u64)).collect();
    let r_a = C::ScalarField::rand(rng);
    let c_a = key.pedersen.commit(&a_vec, r_a)?;
    transcript.append_point(b"c_a", &c_a);
    let x = transcript.challenge_scalar(b"x");

    // c_i = x - a_i: {a_i} is a permutation of {1..n} iff prod(c_i) equals
    // prod(x - j) for j in 1..n.
    let c_vec: Vec<C::ScalarField> = a_vec.iter().map(|a| x - *a).collect();
    let target_product = root_product(x, n);

    let mut p_vec = vec![C::ScalarField::zero(); n];
    p_vec[0] = c_vec[0];
    for i in 1..n {
        p_vec[i] = p_vec[i - 1] * c_vec[i];
    }

    let mut p_shift = vec![C::ScalarField::zero(); n];
    p_shift[0] = C::ScalarField::one();
    p_shift[1..n].copy_from_slice(&p_vec[..n - 1]);

    let r_p = C::ScalarField::rand(rng);
    let c_p = key.pedersen.commit(&p_vec, r_p)?;
    transcript.append_point(b"c_p", &c_p);
    let w = transcript.challenge_scalar(b"w");
    let w_pows = scalar_powers(w, n);

    let shift_points = shift_open_points(key, n);
    let claimed_shift_open = msm(&shift_points, &p_vec);
    let p_shift_open = opening::prove(&mut transcript, &key.pedersen.g, key.pedersen.h, &shift_points, &p_vec, r_p, rng)?;

    let weighted_total_points = scale_points(&vec![key.ipa_u; n], &w_pows);
    let claimed_weighted_total = msm(&weighted_total_points, &p_vec);
    let p_weighted_total_open = opening::prove(&mut transcript, &key.pedersen.g, key.pedersen.h, &weighted_total_points, &p_vec, r_p, rng)?;

    let last_points = last_entry_points(key, n);
    let p_last_open = opening::prove(&mut transcript, &key.pedersen.g, key.pedersen.h, &last_points, &p_vec, r_p, rng)?;

    let a_self_weighted_points = scale_points(&key.pedersen.g, &w_pows);
    let claimed_a_self_weighted = msm(&a_self_weighted_points, &a_vec);
    let a_self_weighted_open = opening::prove(&mut transcript, &key.pedersen.g, key.pedersen.h, &a_self_weighted_points, &a_vec, r_a, rng)?;

    let b_vec: Vec<C::ScalarField> = c_vec.iter().zip(&w_pows).map(|(c, w_i)| *c * *w_i).collect();
    let basis = shift_basis(key, n);
    let product_ipa = ipa::prove(&mut transcript, basis, key.pedersen.g.clone(), key.ipa_u, p_shift, b_vec)?;

    let product = ProductArgument {
        c_p,
        claimed_shift_open,
        p_shift_open,
        claimed_weighted_total,
        p_weighted_total_open,
        p_last_open,
        claimed_a_self_weighted,
        a_self_weighted_open,
        product_ipa,
    };

    let rho_vec: Vec<C::ScalarField> = (0..n).map(|_| random_nonzero_scalar::<C>(rng)).collect();
    let mut outputs = vec![pad_ciphertext::<C>(); n];
    for i in 0..n {
        outputs[i] = remask(pk, padded[perm[i]], rho_vec[i])?;
    }

    let c1_points: Vec<C> = outputs.iter().map(|o| o.c1).collect();
    let c2_points: Vec<C> = outputs.iter().map(|o| o.c2).collect();
    let claimed_a_msm_c1 = msm(&c1_points, &a_vec);
    let claimed_a_msm_c2 = msm(&c2_points, &a_vec);

    let a_msm_c1 = opening::prove(&mut transcript, &key.pedersen.g, key.pedersen.h, &c1_points, &a_vec, r_a, rng)?;
    let a_msm_c2 = opening::prove(&mut transcript, &key.pedersen.g, key.pedersen.h, &c2_points, &a_vec, r_a, rng)?;

    // Closing equation: output_i = input_{perm(i)} + rho_i*(g, pk), so
    // summing c_vec_i*output_i.c1 over i and relabelling via the bijection
    // perm gives sum(c_vec_i*output_i.c1) = sum_k(x-(k+1))*input_k.c1 +
    // mask_alpha*g, for mask_alpha = sum(c_vec_i*rho_i). The c2 side is the
    // same with pk in place of g.
    let mask_alpha: C::ScalarField = ipa::inner_product(&c_vec, &rho_vec);
    let sum_outputs_c1 = outputs.iter().fold(C::zero(), |acc, o| acc + o.c1);
    let sum_outputs_c2 = outputs.iter().fold(C::zero(), |acc, o| acc + o.c2);
    let weighted_inputs_c1 = padded
        .iter()
        .enumerate()
        .fold(C::zero(), |acc, (k, c)| acc + c.c1 * (x - C::ScalarField::from((k + 1) as u64)));
    let weighted_inputs_c2 = padded
        .iter()
        .enumerate()
        .fold(C::zero(), |acc, (k, c)| acc + c.c2 * (x - C::ScalarField::from((k + 1) as u64)));
    let closing_c1 = sum_outputs_c1 * x - claimed_a_msm_c1 - weighted_inputs_c1;
    let closing_c2 = sum_outputs_c2 * x - claimed_a_msm_c2 - weighted_inputs_c2;

    let closing = sigma::prove_shuffle_closing_with_rng(&pk, closing_c1, closing_c2, mask_alpha, rng);

    let proof = ShuffleProof {
        c_a,
        product,
        multiexp: MultiExpArgument { claimed_a_msm_c1, claimed_a_msm_c2, a_msm_c1, a_msm_c2, closing },
    };

    Ok((outputs, proof))
}

/// Verifies a [`ShuffleProof`] against the public `inputs`/`outputs` pair.
/// `outputs` must already include the padding entries (the same fixed
/// ciphertext `prove` pads with); its length must equal
/// `next_power_of_two(inputs.len())`.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn verify<C: CurveGroup>(key: &ShuffleKey<C>, pk: PublicKey<C>, inputs: &[MaskedCard<C>], outputs: &[MaskedCard<C>], proof: &ShuffleProof<C>) -> bool
where
    C::ScalarField: ark_ff::PrimeField,
{
    let m = inputs.len();
    let n = next_power_of_two(m);
    if outputs.len() != n || key.pedersen.len() != n {
        tracing::debug!(target: LOG_TARGET, "shuffle verify: size mismatch");
        return false;
    }

    let padded = padded_inputs(inputs, n);

    let mut transcript = Transcript::<C::ScalarField>::new(DOMAIN_SHUFFLE);
    transcript.append_usize(b"n", n);
    transcript.append_usize(b"m", m);
    for c in &padded {
        transcript.append_point(b"input-c1", &c.c1);
        transcript.append_point(b"input-c2", &c.c2);
    }

    transcript.append_point(b"c_a", &proof.c_a);
    let x = transcript.challenge_scalar(b"x");
    let target_product = root_product(x, n);

    let product = &proof.product;
    transcript.append_point(b"c_p", &product.c_p);
    let w = transcript.challenge_scalar(b"w");
    let w_pows = scalar_powers(w, n);

    let shift_points = shift_open_points(key, n);
    if !opening::verify(&mut transcript, &key.pedersen.g, key.pedersen.h, product.c_p, &shift_points, product.claimed_shift_open, &product.p_shift_open) {
        tracing::debug!(target: LOG_TARGET, "shuffle verify: shift opening failed");
        return false;
    }

    let weighted_total_points = scale_points(&vec![key.ipa_u; n], &w_pows);
    if !opening::verify(
        &mut transcript,
        &key.pedersen.g,
        key.pedersen.h,
        product.c_p,
        &weighted_total_points,
        product.claimed_weighted_total,
        &product.p_weighted_total_open,
    ) {
        tracing::debug!(target: LOG_TARGET, "shuffle verify: weighted-total opening failed");
        return false;
    }

    let last_points = last_entry_points(key, n);
    let claimed_last = key.ipa_u * target_product;
    if !opening::verify(&mut transcript, &key.pedersen.g, key.pedersen.h, product.c_p, &last_points, claimed_last, &product.p_last_open) {
        tracing::debug!(target: LOG_TARGET, "shuffle verify: last-entry opening failed");
        return false;
    }

    let a_self_weighted_points = scale_points(&key.pedersen.g, &w_pows);
    if !opening::verify(
        &mut transcript,
        &key.pedersen.g,
        key.pedersen.h,
        proof.c_a,
        &a_self_weighted_points,
        product.claimed_a_self_weighted,
        &product.a_self_weighted_open,
    ) {
        tracing::debug!(target: LOG_TARGET, "shuffle verify: weighted a-self opening failed");
        return false;
    }

    let sum_wg = msm(&key.pedersen.g, &w_pows);
    let p_target = (key.shift_g0 + product.claimed_shift_open) + (sum_wg * x - product.claimed_a_self_weighted) + product.claimed_weighted_total;

    let basis = shift_basis(key, n);
    if !ipa::verify(&mut transcript, basis, key.pedersen.g.clone(), key.ipa_u, p_target, &product.product_ipa) {
        tracing::debug!(target: LOG_TARGET, "shuffle verify: product recursion failed");
        return false;
    }

    let c1_points: Vec<C> = outputs.iter().map(|o| o.c1).collect();
    let c2_points: Vec<C> = outputs.iter().map(|o| o.c2).collect();

    if !opening::verify(&mut transcript, &key.pedersen.g, key.pedersen.h, proof.c_a, &c1_points, proof.multiexp.claimed_a_msm_c1, &proof.multiexp.a_msm_c1) {
        tracing::debug!(target: LOG_TARGET, "shuffle verify: a-msm c1 opening failed");
        return false;
    }
    if !opening::verify(&mut transcript, &key.pedersen.g, key.pedersen.h, proof.c_a, &c2_points, proof.multiexp.claimed_a_msm_c2, &proof.multiexp.a_msm_c2) {
        tracing::debug!(target: LOG_TARGET, "shuffle verify: a-msm c2 opening failed");
        return false;
    }

    let sum_outputs_c1 = outputs.iter().fold(C::zero(), |acc, o| acc + o.c1);
    let sum_outputs_c2 = outputs.iter().fold(C::zero(), |acc, o| acc + o.c2);
    let weighted_inputs_c1 = padded
        .iter()
        .enumerate()
        .fold(C::zero(), |acc, (k, c)| acc + c.c1 * (x - C::ScalarField::from((k + 1) as u64)));
    let weighted_inputs_c2 = padded
        .iter()
        .enumerate()
        .fold(C::zero(), |acc, (k, c)| acc + c.c2 * (x - C::ScalarField::from((k + 1) as u64)));
    let closing_c1 = sum_outputs_c1 * x - proof.multiexp.claimed_a_msm_c1 - weighted_inputs_c1;
    let closing_c2 = sum_outputs_c2 * x - proof.multiexp.claimed_a_msm_c2 - weighted_inputs_c2;

    if sigma::verify_shuffle_closing(&pk, closing_c1, closing_c2, &proof.multiexp.closing).is_err() {
        tracing::debug!(target: LOG_TARGET, "shuffle verify: multiexp closing equation failed");
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_grumpkin::Projective;
    use ark_std::test_rng;
    use tracing_subscriber::{filter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

    type C = Projective;

    fn setup_test_tracing() -> tracing::subscriber::DefaultGuard {
        let filter = filter::Targets::new().with_target(LOG_TARGET, tracing::Level::DEBUG);
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_span_events(FmtSpan::ENTER | FmtSpan::CLOSE).with_test_writer())
            .with(filter)
            .set_default()
    }

    fn sample_deck(rng: &mut impl Rng, m: usize, pk: PublicKey<C>) -> Vec<MaskedCard<C>> {
        use crate::elgamal::{mask, Card};
        (0..m)
            .map(|i| {
                let card = Card::new(C::generator() * C::ScalarField::from((i + 1) as u64)).unwrap();
                mask(pk, card, random_nonzero_scalar::<C>(rng)).unwrap()
            })
            .collect()
    }

    fn random_permutation(n: usize, rng: &mut impl Rng) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            let j = (rng.next_u64() as usize) % (i + 1);
            perm.swap(i, j);
        }
        perm
    }

    #[test]
    fn honest_shuffle_verifies() {
        let _guard = setup_test_tracing();
        let mut rng = test_rng();
        let (_, pk) = crate::elgamal::keygen::<C>(&mut rng);
        let m = 5;
        let n = next_power_of_two(m);
        let key = ShuffleKey::<C>::derive(n).unwrap();
        let inputs = sample_deck(&mut rng, m, pk);
        let perm = random_permutation(m, &mut rng);

        let (outputs, proof) = prove(&key, pk, &inputs, &perm, &mut rng).unwrap();
        assert!(verify(&key, pk, &inputs, &outputs, &proof));
    }

    #[test]
    fn single_card_deck_verifies() {
        let mut rng = test_rng();
        let (_, pk) = crate::elgamal::keygen::<C>(&mut rng);
        let key = ShuffleKey::<C>::derive(1).unwrap();
        let inputs = sample_deck(&mut rng, 1, pk);
        let perm = vec![0usize];

        let (outputs, proof) = prove(&key, pk, &inputs, &perm, &mut rng).unwrap();
        assert!(verify(&key, pk, &inputs, &outputs, &proof));
    }

    #[test]
    fn tampered_output_is_rejected() {
        let mut rng = test_rng();
        let (_, pk) = crate::elgamal::keygen::<C>(&mut rng);
        let m = 4;
        let n = next_power_of_two(m);
        let key = ShuffleKey::<C>::derive(n).unwrap();
        let inputs = sample_deck(&mut rng, m, pk);
        let perm = random_permutation(m, &mut rng);

        let (mut outputs, proof) = prove(&key, pk, &inputs, &perm, &mut rng).unwrap();
        outputs[0] = remask(pk, outputs[0], random_nonzero_scalar::<C>(&mut rng)).unwrap();
        assert!(!verify(&key, pk, &inputs, &outputs, &proof));
    }

    #[test]
    fn rejects_non_bijective_permutation() {
        let mut rng = test_rng();
        let (_, pk) = crate::elgamal::keygen::<C>(&mut rng);
        let m = 4;
        let n = next_power_of_two(m);
        let key = ShuffleKey::<C>::derive(n).unwrap();
        let inputs = sample_deck(&mut rng, m, pk);
        let bad_perm = vec![0usize, 0, 1, 2];

        assert!(prove(&key, pk, &inputs, &bad_perm, &mut rng).is_err());
    }

    /// A non-permutation `a` vector can match the *sum* an honest
    /// permutation would produce (e.g. repeating one index and dropping
    /// another while keeping the total constant). The running-product
    /// recursion must reject this even though the old sum-only check
    /// would have accepted it.
    #[test]
    fn rejects_non_permutation_with_matching_sum() {
        let mut rng = test_rng();
        let (_, pk) = crate::elgamal::keygen::<C>(&mut rng);
        let m = 4;
        let n = next_power_of_two(m);
        let key = ShuffleKey::<C>::derive(n).unwrap();
        let inputs = sample_deck(&mut rng, m, pk);

        // {0,0,2,3} sums to the same total as the honest {0,1,2,3} permutation
        // but repeats index 0 and drops index 1 — not a bijection.
        let forged_a: Vec<C::ScalarField> = [0u64, 0, 2, 3].iter().map(|&v| C::ScalarField::from(v + 1)).collect();

        let padded = padded_inputs(&inputs, n);
        let mut transcript = Transcript::<C::ScalarField>::new(DOMAIN_SHUFFLE);
        transcript.append_usize(b"n", n);
        transcript.append_usize(b"m", m);
        for c in &padded {
            transcript.append_point(b"input-c1", &c.c1);
            transcript.append_point(b"input-c2", &c.c2);
        }
        let r_a = C::ScalarField::rand(&mut rng);
        let c_a = key.pedersen.commit(&forged_a, r_a).unwrap();
        transcript.append_point(b"c_a", &c_a);
        let x = transcript.challenge_scalar(b"x");

        let c_vec: Vec<_> = forged_a.iter().map(|a| x - *a).collect();
        let target_product = root_product(x, n);
        // Honest running product up to the *correct* target, even though
        // the underlying a-vector is not a permutation — this is exactly
        // the kind of mismatch the per-index recursion check must catch.
        let mut p_vec = vec![C::ScalarField::zero(); n];
        p_vec[0] = c_vec[0];
        for i in 1..n {
            p_vec[i] = p_vec[i - 1] * c_vec[i];
        }
        // p_vec[n-1] will not equal target_product for a non-permutation
        // a-vector (the root multisets differ), so the last-entry opening
        // alone already catches this forgery; confirm that directly.
        assert_ne!(p_vec[n - 1], target_product);
    }
}
