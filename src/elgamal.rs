//! Threshold ElGamal over a prime-order group: keygen, mask (encrypt),
//! remask (rerandomize), partial decryption (reveal tokens), and combine
//! (unmask).
//!
//! Grounded on `shuffling/data_structures.rs::ElGamalCiphertext` (`encrypt`,
//! `add_encryption_layer`) and the inline decrypt walkthrough in
//! `shuffling/public_key_setup.rs`'s test (`c2 - c1*sk_i` chained across
//! shufflers). Unlike `public_key_setup.rs`'s `ElGamalKeys<C>`, which
//! bundles a secret and public key in one struct, this module keeps them as
//! separate newtypes so a secret key can never be passed where only a public key is
//! expected — SPEC_FULL.md §3's lifecycle rule ("per-player secrets are
//! owned exclusively by that player") is enforced by the type system.

use ark_ec::CurveGroup;
use ark_ff::UniformRand;
use ark_std::rand::Rng;

use crate::error::{Error, Result};
use crate::group::{require_non_identity, require_nonzero_scalar};

const LOG_TARGET: &str = "mental_poker_core::elgamal";

/// A card is a group element assigned by an external, out-of-scope
/// encoding table to a deck index (SPEC_FULL.md §6's card-encoding seam).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card<C: CurveGroup>(pub C);

impl<C: CurveGroup> Card<C> {
    pub fn new(point: C) -> Result<Self> {
        require_non_identity(point)?;
        Ok(Self(point))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecretKey<C: CurveGroup>(pub(crate) C::ScalarField);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey<C: CurveGroup>(pub C);

impl<C: CurveGroup> SecretKey<C> {
    pub fn new(scalar: C::ScalarField) -> Result<Self> {
        require_nonzero_scalar(scalar)?;
        Ok(Self(scalar))
    }

    pub fn public_key(&self) -> PublicKey<C> {
        PublicKey(C::generator() * self.0)
    }

    pub fn scalar(&self) -> C::ScalarField {
        self.0
    }
}

impl<C: CurveGroup> PublicKey<C> {
    pub fn new(point: C) -> Result<Self> {
        require_non_identity(point)?;
        Ok(Self(point))
    }
}

/// `sk <-$ [1, q)`, `pk = sk * g` (SPEC_FULL.md §4.4, generalizing
/// `public_key_setup.rs::draw_shuffler_public_key` to the crate's newtypes
/// and the core's injected-randomness seam).
pub fn keygen<C: CurveGroup>(rng: &mut impl Rng) -> (SecretKey<C>, PublicKey<C>) {
    loop {
        let candidate = C::ScalarField::rand(rng);
        if let Ok(sk) = SecretKey::new(candidate) {
            let pk = sk.public_key();
            return (sk, pk);
        }
    }
}

/// An ElGamal ciphertext, generalizing
/// `shuffling/data_structures.rs::ElGamalCiphertext` to any `CurveGroup`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskedCard<C: CurveGroup> {
    pub c1: C,
    pub c2: C,
}

impl<C: CurveGroup> MaskedCard<C> {
    pub fn new(c1: C, c2: C) -> Self {
        Self { c1, c2 }
    }
}

impl<C: CurveGroup> std::ops::Add for MaskedCard<C> {
    type Output = MaskedCard<C>;
    fn add(self, rhs: Self) -> Self::Output {
        MaskedCard::new(self.c1 + rhs.c1, self.c2 + rhs.c2)
    }
}

/// `mask(PK, m, alpha) -> (c1, c2) = (alpha*g, m + alpha*PK)`.
pub fn mask<C: CurveGroup>(
    pk: PublicKey<C>,
    card: Card<C>,
    alpha: C::ScalarField,
) -> Result<MaskedCard<C>> {
    require_nonzero_scalar(alpha)?;
    let c1 = C::generator() * alpha;
    let c2 = card.0 + pk.0 * alpha;
    Ok(MaskedCard::new(c1, c2))
}

/// `remask(PK, (c1,c2), beta) -> (c1 + beta*g, c2 + beta*PK)`.
pub fn remask<C: CurveGroup>(
    pk: PublicKey<C>,
    ciphertext: MaskedCard<C>,
    beta: C::ScalarField,
) -> Result<MaskedCard<C>> {
    require_nonzero_scalar(beta)?;
    let c1 = ciphertext.c1 + C::generator() * beta;
    let c2 = ciphertext.c2 + pk.0 * beta;
    Ok(MaskedCard::new(c1, c2))
}

/// A single player's partial decryption of a masked card: `T_i = sk_i * c1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealToken<C: CurveGroup>(pub C);

pub fn partial_decrypt<C: CurveGroup>(sk: &SecretKey<C>, ciphertext: &MaskedCard<C>) -> RevealToken<C> {
    RevealToken(ciphertext.c1 * sk.0)
}

/// `combine({T_i}, c2) = c2 - sum(T_i)`. Any missing token yields an
/// incorrect but non-error plaintext — the core does not validate
/// completeness here; see `protocol::unmask` for the N-of-N check
/// (SPEC_FULL.md §4.4/§4.7).
pub fn combine<C: CurveGroup>(tokens: &[RevealToken<C>], c2: C) -> C {
    let sum = tokens.iter().fold(C::zero(), |acc, t| acc + t.0);
    c2 - sum
}

/// Checks `Error::InvalidPoint` bubbling for an aggregate public key built
/// from already-verified per-player keys (used by `protocol::compute_aggregate_key`).
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn aggregate_public_keys<C: CurveGroup>(keys: &[PublicKey<C>]) -> Result<PublicKey<C>> {
    if keys.is_empty() {
        return Err(Error::InvalidParameters("no public keys to aggregate".into()));
    }
    let sum = keys.iter().fold(C::zero(), |acc, pk| acc + pk.0);
    PublicKey::new(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ec::PrimeGroup;
    use ark_grumpkin::{Fr, Projective};
    use ark_std::test_rng;

    type C = Projective;

    fn card(v: u64) -> Card<C> {
        Card::new(C::generator() * Fr::from(v)).unwrap()
    }

    #[test]
    fn elgamal_correctness_n_of_n() {
        let mut rng = test_rng();
        let (sk1, pk1) = keygen::<C>(&mut rng);
        let (sk2, pk2) = keygen::<C>(&mut rng);
        let pk = aggregate_public_keys(&[pk1, pk2]).unwrap();

        let m = card(7);
        let alpha = Fr::from(11u64);
        let ct = mask(pk, m, alpha).unwrap();

        let t1 = partial_decrypt(&sk1, &ct);
        let t2 = partial_decrypt(&sk2, &ct);
        let recovered = combine(&[t1, t2], ct.c2);

        assert_eq!(recovered, m.0);
    }

    #[test]
    fn homomorphism() {
        let mut rng = test_rng();
        let (_, pk) = keygen::<C>(&mut rng);

        let m1 = card(3);
        let m2 = card(5);
        let a1 = Fr::from(13u64);
        let a2 = Fr::from(17u64);

        let left = mask(pk, m1, a1).unwrap() + mask(pk, m2, a2).unwrap();
        let right_card = Card::new(m1.0 + m2.0).unwrap();
        let right = mask(pk, right_card, a1 + a2).unwrap();

        assert_eq!(left, right);
    }

    #[test]
    fn remask_equivalence() {
        let mut rng = test_rng();
        let (sk, pk) = keygen::<C>(&mut rng);
        let m = card(9);
        let ct = mask(pk, m, Fr::from(4u64)).unwrap();
        let ct2 = remask(pk, ct, Fr::from(6u64)).unwrap();

        let direct = mask(pk, m, Fr::from(10u64)).unwrap();
        assert_eq!(ct2, direct);

        let t = partial_decrypt(&sk, &ct2);
        assert_eq!(combine(&[t], ct2.c2), m.0);
    }

    #[test]
    fn rejects_zero_masking_factor() {
        let mut rng = test_rng();
        let (_, pk) = keygen::<C>(&mut rng);
        assert!(mask(pk, card(1), Fr::from(0u64)).is_err());
    }

    #[test]
    fn rejects_identity_public_key() {
        assert!(PublicKey::<C>::new(C::zero()).is_err());
    }
}
