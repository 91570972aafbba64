//! The crate's single randomness seam: every `prove_*`/`mask`/`remask`/
//! `shuffle_and_remask` entry point takes its randomness as an explicit
//! `&mut impl Rng` parameter rather than reading OS entropy internally.
//!
//! Grounded on the uniform `R: Rng` / `ark_std::rand::Rng` generic threading
//! in `public_key_setup.rs::draw_shuffler_public_key`,
//! `ChaumPedersenProof::generate`, and `shuffling/ipa/proof.rs::prove` —
//! every one of those functions takes its RNG as a parameter rather than
//! reaching for a global. This module adds what those call sites leave
//! implicit: a trait-object seam for callers who don't want to monomorphize
//! over a concrete RNG type, and a seedable deterministic wrapper for
//! reproducible test vectors (their own tests lean on `ark_std::test_rng()`
//! for exactly this purpose).

use ark_std::rand::{CryptoRng, RngCore};

/// Object-safe alias for "a cryptographically secure RNG", so callers that
/// need dynamic dispatch (e.g. choosing the RNG implementation at runtime)
/// aren't forced to monomorphize every entry point.
pub trait SecureRng: RngCore + CryptoRng {}
impl<T: RngCore + CryptoRng> SecureRng for T {}

/// A seedable, deterministic RNG for reproducible test vectors. Wraps
/// `rand::rngs::StdRng`, the same ChaCha-family generator
/// `ark_std::test_rng()` itself wraps, just with an explicit seed instead of
/// a fixed one.
pub struct DeterministicRng(rand::rngs::StdRng);

impl DeterministicRng {
    pub fn from_seed(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }
}

impl RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for DeterministicRng {}
