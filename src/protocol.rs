//! The protocol façade: the full operation list over one `Parameters<C>`
//! value, composing `elgamal`, `sigma`, `pedersen`, and `shuffle`.
//!
//! `Parameters` is an ordinary, freely-`Clone`-able value — no global
//! singleton. This deliberately drops `player_decryption.rs`'s
//! `once_cell::sync::Lazy` process-wide `CardValueMap` pattern: every
//! caller here constructs and threads its own `Parameters` instead of
//! reaching for ambient global state.

use ark_ec::CurveGroup;
use ark_ff::PrimeField;
use ark_std::rand::Rng;

use crate::elgamal::{self, Card, MaskedCard, PublicKey, RevealToken, SecretKey};
use crate::error::{Error, Result};
use crate::pedersen::CommitKey;
use crate::shuffle::{self, ShuffleKey, ShuffleProof};
use crate::sigma::{self, DleqProof};

const LOG_TARGET: &str = "mental_poker_core::protocol";

/// Protocol-wide public parameters for a table running with a (possibly
/// padded) deck of `n` cards: the base generator, the independent Pedersen
/// blinding generator, the commitment key, and the shuffle argument's own
/// generator basis.
#[derive(Clone, Debug)]
pub struct Parameters<C: CurveGroup>
where
    C::ScalarField: PrimeField,
{
    pub g: C,
    pub ck: CommitKey<C>,
    pub shuffle_key: ShuffleKey<C>,
}

impl<C: CurveGroup> Parameters<C>
where
    C::ScalarField: PrimeField,
{
    /// Derive parameters for a table whose deck has `m` cards. Internally
    /// sizes the shuffle argument's generators to `next_power_of_two(m)`.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn setup(m: usize) -> Result<Self> {
        if m == 0 {
            return Err(Error::InvalidParameters("deck size must be > 0".into()));
        }
        let n = shuffle::next_power_of_two(m);
        tracing::debug!(target: LOG_TARGET, m, n, "deriving table parameters");
        Ok(Self { g: C::generator(), ck: CommitKey::derive(n)?, shuffle_key: ShuffleKey::derive(n)? })
    }
}

/// `sk <-$ [1, q)`, `pk = sk*g`.
pub fn player_keygen<C: CurveGroup>(rng: &mut impl Rng) -> (SecretKey<C>, PublicKey<C>) {
    elgamal::keygen(rng)
}

pub fn prove_key_ownership<C: CurveGroup>(sk: &SecretKey<C>, player_public_info: &[u8], rng: &mut impl Rng) -> DleqProof<C> {
    sigma::prove_key_ownership_with_rng(sk, player_public_info, rng)
}

pub fn verify_key_ownership<C: CurveGroup>(pk: &PublicKey<C>, player_public_info: &[u8], proof: &DleqProof<C>) -> bool {
    sigma::verify_key_ownership(pk, player_public_info, proof).is_ok()
}

/// Aggregates verified per-player public keys into the table's joint key.
/// Callers must have already checked each player's `verify_key_ownership`
/// before calling this — aggregation itself does not re-verify ownership.
pub fn compute_aggregate_key<C: CurveGroup>(keys: &[PublicKey<C>]) -> Result<PublicKey<C>> {
    elgamal::aggregate_public_keys(keys)
}

pub fn mask<C: CurveGroup>(pk: PublicKey<C>, card: Card<C>, alpha: C::ScalarField) -> Result<MaskedCard<C>> {
    elgamal::mask(pk, card, alpha)
}

pub fn prove_masking<C: CurveGroup>(pk: &PublicKey<C>, card: &Card<C>, ciphertext: &MaskedCard<C>, alpha: C::ScalarField, rng: &mut impl Rng) -> DleqProof<C> {
    sigma::prove_masking_with_rng(pk, card.0, ciphertext, alpha, rng)
}

pub fn verify_mask<C: CurveGroup>(pk: &PublicKey<C>, card: &Card<C>, ciphertext: &MaskedCard<C>, proof: &DleqProof<C>) -> bool {
    sigma::verify_masking(pk, card.0, ciphertext, proof).is_ok()
}

pub fn remask<C: CurveGroup>(pk: PublicKey<C>, ciphertext: MaskedCard<C>, beta: C::ScalarField) -> Result<MaskedCard<C>> {
    elgamal::remask(pk, ciphertext, beta)
}

pub fn prove_remasking<C: CurveGroup>(pk: &PublicKey<C>, old: &MaskedCard<C>, new: &MaskedCard<C>, beta: C::ScalarField, rng: &mut impl Rng) -> DleqProof<C> {
    sigma::prove_remasking_with_rng(pk, old, new, beta, rng)
}

pub fn verify_remask<C: CurveGroup>(pk: &PublicKey<C>, old: &MaskedCard<C>, new: &MaskedCard<C>, proof: &DleqProof<C>) -> bool {
    sigma::verify_remasking(pk, old, new, proof).is_ok()
}

pub fn compute_reveal_token<C: CurveGroup>(sk: &SecretKey<C>, ciphertext: &MaskedCard<C>) -> RevealToken<C> {
    elgamal::partial_decrypt(sk, ciphertext)
}

pub fn prove_reveal<C: CurveGroup>(sk: &SecretKey<C>, ciphertext: &MaskedCard<C>, token: &RevealToken<C>, rng: &mut impl Rng) -> DleqProof<C> {
    sigma::prove_reveal_with_rng(sk, ciphertext, token, rng)
}

pub fn verify_reveal<C: CurveGroup>(pk: &PublicKey<C>, ciphertext: &MaskedCard<C>, token: &RevealToken<C>, proof: &DleqProof<C>) -> bool {
    sigma::verify_reveal(pk, ciphertext, token, proof).is_ok()
}

/// Recovers the plaintext card from a masked card and the full set of
/// per-player reveal tokens. Requires exactly `n_players` distinct tokens —
/// this crate does not support threshold-below-N reveal.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn unmask<C: CurveGroup>(ciphertext: &MaskedCard<C>, tokens: &[RevealToken<C>], n_players: usize) -> Result<Card<C>> {
    if tokens.len() != n_players {
        tracing::debug!(target: LOG_TARGET, got = tokens.len(), n_players, "reveal token count mismatch");
        return Err(Error::InsufficientRevealTokens);
    }
    let point = elgamal::combine(tokens, ciphertext.c2);
    Card::new(point)
}

/// Shuffles and re-randomizes `inputs` under a permutation chosen
/// internally, returning the new deck alongside a proof that it's a valid
/// permutation-and-remask of `inputs` relative to `params`.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn shuffle_and_remask<C: CurveGroup>(
    params: &Parameters<C>,
    pk: PublicKey<C>,
    inputs: &[MaskedCard<C>],
    permutation: &[usize],
    rng: &mut impl Rng,
) -> Result<(Vec<MaskedCard<C>>, ShuffleProof<C>)> {
    shuffle::prove(&params.shuffle_key, pk, inputs, permutation, rng)
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn verify_shuffle<C: CurveGroup>(params: &Parameters<C>, pk: PublicKey<C>, inputs: &[MaskedCard<C>], outputs: &[MaskedCard<C>], proof: &ShuffleProof<C>) -> bool {
    shuffle::verify(&params.shuffle_key, pk, inputs, outputs, proof)
}
