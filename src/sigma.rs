//! Chaum-Pedersen discrete-log-equality (DLEQ) sigma proofs.
//!
//! A single generic `DleqProof` covers every instance this crate needs —
//! key ownership, masking, remasking, and reveal-token correctness — since
//! all four reduce to proving knowledge of `x` such that `U = x*G` and
//! `V = x*H` for an instance-specific basis `(G, H)` (SPEC_FULL.md §4.5).
//!
//! Grounded on `shuffling/chaum_pedersen.rs::ChaumPedersenProof` for the
//! commit/respond/verify structure, `shuffling/utils.rs::generate_chaum_pedersen_witness`
//! for deterministic nonce derivation, and
//! `shuffling/player_decryption.rs::PlayerTargetedBlindingContribution` for
//! the reveal-token instance shape. Unlike `chaum_pedersen.rs`'s
//! `compute_challenge`, which binds only `(A, B)` into the Fiat-Shamir hash,
//! `DleqProof::prove`/`verify` here bind the *entire* instance — `G, H, U,
//! V`, an explicit domain tag, and any instance-specific context such as
//! `player_public_info` — into the transcript before the challenge is
//! drawn, closing that under-binding gap (SPEC_FULL.md §4.5, §9).

use ark_ec::CurveGroup;
use ark_ff::UniformRand;
use ark_std::rand::Rng;

use crate::elgamal::{MaskedCard, PublicKey, RevealToken, SecretKey};
use crate::error::{Error, Result};
use crate::params::{DOMAIN_KEY_OWNERSHIP, DOMAIN_MASK, DOMAIN_REMASK, DOMAIN_REVEAL, DOMAIN_SHUFFLE};
use crate::transcript::Transcript;

const LOG_TARGET: &str = "mental_poker_core::sigma";

/// Proof of knowledge of `x` with `U = x*G`, `V = x*H` for a basis `(G, H)`
/// fixed by the instance being proved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DleqProof<C: CurveGroup> {
    a: C,
    b: C,
    s: C::ScalarField,
}

struct Instance<'a, C: CurveGroup> {
    domain: &'a [u8],
    g: C,
    h: C,
    u: C,
    v: C,
    context: &'a [u8],
}

fn instance_transcript<C: CurveGroup>(instance: &Instance<'_, C>) -> Transcript<C::ScalarField> {
    let mut t = Transcript::new(instance.domain);
    t.append_point(b"g", &instance.g);
    t.append_point(b"h", &instance.h);
    t.append_point(b"u", &instance.u);
    t.append_point(b"v", &instance.v);
    if !instance.context.is_empty() {
        t.append_scalar(b"context", &instance.context.to_vec());
    }
    t
}

/// Derives a synthetic nonce from the witness and the full instance, so a
/// proof can be generated deterministically without an RNG (used by
/// `prove_deterministic` and, indirectly, by every instance constructor
/// below that does not take a `rng` argument).
fn deterministic_nonce<C: CurveGroup>(instance: &Instance<'_, C>, witness: C::ScalarField) -> C::ScalarField {
    let mut t = instance_transcript(instance);
    t.append_scalar(b"witness-nonce", &witness);
    t.challenge_scalar(b"nonce")
}

fn prove_with_nonce<C: CurveGroup>(instance: &Instance<'_, C>, witness: C::ScalarField, r: C::ScalarField) -> DleqProof<C> {
    let a = instance.g * r;
    let b = instance.h * r;

    let mut t = instance_transcript(instance);
    t.append_point(b"a", &a);
    t.append_point(b"b", &b);
    let c = t.challenge_scalar(b"challenge");

    let s = r + c * witness;
    DleqProof { a, b, s }
}

/// Deterministic proof generation: the nonce is derived from the witness
/// and instance rather than sampled, so repeated calls with the same inputs
/// produce byte-identical proofs (SPEC_FULL.md §4.5's default prover path).
fn prove_deterministic<C: CurveGroup>(instance: &Instance<'_, C>, witness: C::ScalarField) -> DleqProof<C> {
    let r = deterministic_nonce(instance, witness);
    prove_with_nonce(instance, witness, r)
}

/// RNG-sourced proof generation for production use, where an independent
/// fresh nonce per call is preferred over a transcript-derived one.
fn prove_with_rng<C: CurveGroup>(instance: &Instance<'_, C>, witness: C::ScalarField, rng: &mut impl Rng) -> DleqProof<C> {
    let r = C::ScalarField::rand(rng);
    prove_with_nonce(instance, witness, r)
}

fn verify<C: CurveGroup>(instance: &Instance<'_, C>, proof: &DleqProof<C>) -> bool {
    let mut t = instance_transcript(instance);
    t.append_point(b"a", &proof.a);
    t.append_point(b"b", &proof.b);
    let c = t.challenge_scalar(b"challenge");

    instance.g * proof.s == proof.a + instance.u * c && instance.h * proof.s == proof.b + instance.v * c
}

/// Proves knowledge of `sk` for `pk = sk * g`, binding `player_public_info`
/// (an opaque, caller-supplied identifier such as a player index or session
/// id) into the transcript before the challenge is drawn.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn prove_key_ownership<C: CurveGroup>(sk: &SecretKey<C>, player_public_info: &[u8]) -> DleqProof<C> {
    let g = C::generator();
    let pk = sk.public_key();
    let instance = Instance { domain: DOMAIN_KEY_OWNERSHIP, g, h: g, u: pk.0, v: pk.0, context: player_public_info };
    prove_deterministic(&instance, sk.scalar())
}

pub fn prove_key_ownership_with_rng<C: CurveGroup>(sk: &SecretKey<C>, player_public_info: &[u8], rng: &mut impl Rng) -> DleqProof<C> {
    let g = C::generator();
    let pk = sk.public_key();
    let instance = Instance { domain: DOMAIN_KEY_OWNERSHIP, g, h: g, u: pk.0, v: pk.0, context: player_public_info };
    prove_with_rng(&instance, sk.scalar(), rng)
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn verify_key_ownership<C: CurveGroup>(pk: &PublicKey<C>, player_public_info: &[u8], proof: &DleqProof<C>) -> Result<()> {
    let g = C::generator();
    let instance = Instance { domain: DOMAIN_KEY_OWNERSHIP, g, h: g, u: pk.0, v: pk.0, context: player_public_info };
    if verify(&instance, proof) {
        Ok(())
    } else {
        tracing::debug!(target: LOG_TARGET, "key ownership proof failed verification");
        Err(Error::InvalidProof)
    }
}

fn mask_instance<C: CurveGroup>(pk: &PublicKey<C>, card_point: C, ciphertext: &MaskedCard<C>) -> Instance<'static, C> {
    Instance { domain: DOMAIN_MASK, g: C::generator(), h: pk.0, u: ciphertext.c1, v: ciphertext.c2 - card_point, context: &[] }
}

/// Proves knowledge of the masking factor `alpha` used to produce
/// `ciphertext` from `card` under `pk`.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn prove_masking<C: CurveGroup>(pk: &PublicKey<C>, card_point: C, ciphertext: &MaskedCard<C>, alpha: C::ScalarField) -> DleqProof<C> {
    let instance = mask_instance(pk, card_point, ciphertext);
    prove_deterministic(&instance, alpha)
}

pub fn prove_masking_with_rng<C: CurveGroup>(pk: &PublicKey<C>, card_point: C, ciphertext: &MaskedCard<C>, alpha: C::ScalarField, rng: &mut impl Rng) -> DleqProof<C> {
    let instance = mask_instance(pk, card_point, ciphertext);
    prove_with_rng(&instance, alpha, rng)
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn verify_masking<C: CurveGroup>(pk: &PublicKey<C>, card_point: C, ciphertext: &MaskedCard<C>, proof: &DleqProof<C>) -> Result<()> {
    let instance = mask_instance(pk, card_point, ciphertext);
    if verify(&instance, proof) {
        Ok(())
    } else {
        tracing::debug!(target: LOG_TARGET, "masking proof failed verification");
        Err(Error::InvalidProof)
    }
}

fn remask_instance<C: CurveGroup>(pk: &PublicKey<C>, old: &MaskedCard<C>, new: &MaskedCard<C>) -> Instance<'static, C> {
    Instance { domain: DOMAIN_REMASK, g: C::generator(), h: pk.0, u: new.c1 - old.c1, v: new.c2 - old.c2, context: &[] }
}

/// Proves knowledge of the rerandomization factor `beta` used to produce
/// `new` from `old` under `pk`.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn prove_remasking<C: CurveGroup>(pk: &PublicKey<C>, old: &MaskedCard<C>, new: &MaskedCard<C>, beta: C::ScalarField) -> DleqProof<C> {
    let instance = remask_instance(pk, old, new);
    prove_deterministic(&instance, beta)
}

pub fn prove_remasking_with_rng<C: CurveGroup>(pk: &PublicKey<C>, old: &MaskedCard<C>, new: &MaskedCard<C>, beta: C::ScalarField, rng: &mut impl Rng) -> DleqProof<C> {
    let instance = remask_instance(pk, old, new);
    prove_with_rng(&instance, beta, rng)
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn verify_remasking<C: CurveGroup>(pk: &PublicKey<C>, old: &MaskedCard<C>, new: &MaskedCard<C>, proof: &DleqProof<C>) -> Result<()> {
    let instance = remask_instance(pk, old, new);
    if verify(&instance, proof) {
        Ok(())
    } else {
        tracing::debug!(target: LOG_TARGET, "remasking proof failed verification");
        Err(Error::InvalidProof)
    }
}

fn reveal_instance<C: CurveGroup>(pk: &PublicKey<C>, ciphertext: &MaskedCard<C>, token: &RevealToken<C>) -> Instance<'static, C> {
    Instance { domain: DOMAIN_REVEAL, g: C::generator(), h: ciphertext.c1, u: pk.0, v: token.0, context: &[] }
}

/// Proves that `token = sk * ciphertext.c1` for the same `sk` underlying
/// `pk = sk * g`.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn prove_reveal<C: CurveGroup>(sk: &SecretKey<C>, ciphertext: &MaskedCard<C>, token: &RevealToken<C>) -> DleqProof<C> {
    let pk = sk.public_key();
    let instance = reveal_instance(&pk, ciphertext, token);
    prove_deterministic(&instance, sk.scalar())
}

pub fn prove_reveal_with_rng<C: CurveGroup>(sk: &SecretKey<C>, ciphertext: &MaskedCard<C>, token: &RevealToken<C>, rng: &mut impl Rng) -> DleqProof<C> {
    let pk = sk.public_key();
    let instance = reveal_instance(&pk, ciphertext, token);
    prove_with_rng(&instance, sk.scalar(), rng)
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn verify_reveal<C: CurveGroup>(pk: &PublicKey<C>, ciphertext: &MaskedCard<C>, token: &RevealToken<C>, proof: &DleqProof<C>) -> Result<()> {
    let instance = reveal_instance(pk, ciphertext, token);
    if verify(&instance, proof) {
        Ok(())
    } else {
        tracing::debug!(target: LOG_TARGET, "reveal proof failed verification");
        Err(Error::InvalidProof)
    }
}

/// `closing_c1`/`closing_c2` are the public remainders left over once the
/// multi-exponentiation argument's known terms are subtracted out — by
/// construction they equal `mask_alpha*g` and `mask_alpha*pk` for the same
/// secret `mask_alpha`, the aggregate masking contribution folded into the
/// permutation's closing equation (`shuffle::multiexp`). Proving this DLEQ
/// ties the two remainders together without ever revealing `mask_alpha`.
fn multiexp_instance<C: CurveGroup>(pk: &PublicKey<C>, closing_c1: C, closing_c2: C) -> Instance<'static, C> {
    Instance { domain: DOMAIN_SHUFFLE, g: C::generator(), h: pk.0, u: closing_c1, v: closing_c2, context: &[] }
}

/// Proves that `closing_c1 = mask_alpha*g` and `closing_c2 = mask_alpha*pk`
/// for the same `mask_alpha`, without revealing it.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn prove_shuffle_closing<C: CurveGroup>(pk: &PublicKey<C>, closing_c1: C, closing_c2: C, mask_alpha: C::ScalarField) -> DleqProof<C> {
    let instance = multiexp_instance(pk, closing_c1, closing_c2);
    prove_deterministic(&instance, mask_alpha)
}

pub fn prove_shuffle_closing_with_rng<C: CurveGroup>(
    pk: &PublicKey<C>,
    closing_c1: C,
    closing_c2: C,
    mask_alpha: C::ScalarField,
    rng: &mut impl Rng,
) -> DleqProof<C> {
    let instance = multiexp_instance(pk, closing_c1, closing_c2);
    prove_with_rng(&instance, mask_alpha, rng)
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn verify_shuffle_closing<C: CurveGroup>(pk: &PublicKey<C>, closing_c1: C, closing_c2: C, proof: &DleqProof<C>) -> Result<()> {
    let instance = multiexp_instance(pk, closing_c1, closing_c2);
    if verify(&instance, proof) {
        Ok(())
    } else {
        tracing::debug!(target: LOG_TARGET, "shuffle closing proof failed verification");
        Err(Error::InvalidProof)
    }
}

impl<C: CurveGroup> DleqProof<C> {
    pub fn a(&self) -> C {
        self.a
    }

    pub fn b(&self) -> C {
        self.b
    }

    pub fn s(&self) -> C::ScalarField {
        self.s
    }

    pub fn from_parts(a: C, b: C, s: C::ScalarField) -> Self {
        Self { a, b, s }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::{keygen, mask, Card};
    use ark_ec::PrimeGroup;
    use ark_grumpkin::{Fr, Projective};
    use ark_std::test_rng;

    type C = Projective;

    #[test]
    fn key_ownership_round_trip() {
        let mut rng = test_rng();
        let (sk, pk) = keygen::<C>(&mut rng);
        let proof = prove_key_ownership(&sk, b"player-0");
        assert!(verify_key_ownership(&pk, b"player-0", &proof).is_ok());
    }

    #[test]
    fn key_ownership_rejects_mismatched_context() {
        let mut rng = test_rng();
        let (sk, pk) = keygen::<C>(&mut rng);
        let proof = prove_key_ownership(&sk, b"player-0");
        assert!(verify_key_ownership(&pk, b"player-1", &proof).is_err());
    }

    #[test]
    fn masking_round_trip() {
        let mut rng = test_rng();
        let (_, pk) = keygen::<C>(&mut rng);
        let card = Card::new(Projective::generator() * Fr::from(5u64)).unwrap();
        let alpha = Fr::from(9u64);
        let ct = mask(pk, card, alpha).unwrap();

        let proof = prove_masking(&pk, card.0, &ct, alpha);
        assert!(verify_masking(&pk, card.0, &ct, &proof).is_ok());
    }

    #[test]
    fn masking_rejects_wrong_card() {
        let mut rng = test_rng();
        let (_, pk) = keygen::<C>(&mut rng);
        let card = Card::new(Projective::generator() * Fr::from(5u64)).unwrap();
        let other = Card::new(Projective::generator() * Fr::from(6u64)).unwrap();
        let alpha = Fr::from(9u64);
        let ct = mask(pk, card, alpha).unwrap();

        let proof = prove_masking(&pk, card.0, &ct, alpha);
        assert!(verify_masking(&pk, other.0, &ct, &proof).is_err());
    }

    #[test]
    fn reveal_round_trip() {
        let mut rng = test_rng();
        let (sk, pk) = keygen::<C>(&mut rng);
        let card = Card::new(Projective::generator() * Fr::from(3u64)).unwrap();
        let ct = mask(pk, card, Fr::from(4u64)).unwrap();
        let token = crate::elgamal::partial_decrypt(&sk, &ct);

        let proof = prove_reveal(&sk, &ct, &token);
        assert!(verify_reveal(&pk, &ct, &token, &proof).is_ok());
    }

    #[test]
    fn shuffle_closing_round_trip() {
        let mut rng = test_rng();
        let (_, pk) = keygen::<C>(&mut rng);
        let mask_alpha = Fr::from(42u64);
        let closing_c1 = Projective::generator() * mask_alpha;
        let closing_c2 = pk.0 * mask_alpha;

        let proof = prove_shuffle_closing(&pk, closing_c1, closing_c2, mask_alpha);
        assert!(verify_shuffle_closing(&pk, closing_c1, closing_c2, &proof).is_ok());
    }

    #[test]
    fn shuffle_closing_rejects_mismatched_remainders() {
        let mut rng = test_rng();
        let (_, pk) = keygen::<C>(&mut rng);
        let mask_alpha = Fr::from(42u64);
        let closing_c1 = Projective::generator() * mask_alpha;
        let closing_c2 = pk.0 * Fr::from(43u64);

        let proof = prove_shuffle_closing(&pk, closing_c1, closing_c2, mask_alpha);
        assert!(verify_shuffle_closing(&pk, closing_c1, closing_c2, &proof).is_err());
    }

    #[test]
    fn deterministic_proofs_are_repeatable() {
        let mut rng = test_rng();
        let (sk, _) = keygen::<C>(&mut rng);
        let p1 = prove_key_ownership(&sk, b"player-0");
        let p2 = prove_key_ownership(&sk, b"player-0");
        assert_eq!(p1, p2);
    }
}
