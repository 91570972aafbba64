//! Compile-time protocol constants: domain-separation tags and the Poseidon
//! sponge configuration used as the sole Fiat-Shamir hash seam.
//!
//! Any deviation from these constants is a breaking protocol change (§6 of
//! SPEC_FULL.md) — implementations that want to interoperate must agree on
//! this module bit-for-bit.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Mutex;

use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_ff::{Field, PrimeField};
use once_cell::sync::Lazy;

/// Sponge width: rate (2) + capacity (1), matching `config.rs::poseidon_config`'s shape.
const T: usize = 3;
const RATE: usize = 2;
const CAPACITY: usize = 1;
const ALPHA: u64 = 5;
const FULL_ROUNDS: usize = 8;
const PARTIAL_ROUNDS: usize = 31;

/// Key-ownership proof domain tag. `player_public_info` is appended by the
/// caller after this tag (SPEC_FULL.md §4.5).
pub const DOMAIN_KEY_OWNERSHIP: &[u8] = b"mental-poker-core/v1/key-ownership";
pub const DOMAIN_MASK: &[u8] = b"mental-poker-core/v1/mask";
pub const DOMAIN_REMASK: &[u8] = b"mental-poker-core/v1/remask";
pub const DOMAIN_REVEAL: &[u8] = b"mental-poker-core/v1/reveal";
pub const DOMAIN_SHUFFLE: &[u8] = b"mental-poker-core/v1/shuffle";
pub const DOMAIN_PEDERSEN_G: &[u8] = b"mental-poker-core/v1/pedersen-g";
pub const DOMAIN_PEDERSEN_H: &[u8] = b"mental-poker-core/v1/pedersen-h";

/// Single cross-term point used by the shuffle argument's product
/// inner-product engine, kept disjoint from the Pedersen commitment key's
/// own `(g, h)` basis (SPEC_FULL.md §4.6).
pub const DOMAIN_SHUFFLE_IPA_U: &[u8] = b"mental-poker-core/v1/shuffle-ipa-u";

/// The extra generator standing in for the public constant prepended to the
/// permutation argument's running-product vector when it is read back
/// shifted by one slot (SPEC_FULL.md §4.6's product argument).
pub const DOMAIN_SHUFFLE_PRODUCT_SHIFT: &[u8] = b"mental-poker-core/v1/shuffle-product-shift";

/// Per-field memoization of [`poseidon_config`]'s output, keyed by
/// `TypeId`, so every `Transcript::new` call across a long-running process
/// doesn't re-derive the Cauchy MDS matrix and its field inversions from
/// scratch. Mirrors `player_decryption.rs::CARD_MAPS`'s TypeId-keyed
/// `Lazy<Mutex<HashMap<..>>>` cache for a derived-but-expensive-to-recompute
/// constant rather than mutable protocol state.
static POSEIDON_CONFIGS: Lazy<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Generate a reproducible, non-degenerate Poseidon configuration for field
/// `F`, computed once per field type and cached thereafter.
///
/// `config.rs::poseidon_config` leaves the MDS matrix and round constants
/// as an all-zero placeholder (its own comment: "will be replaced with
/// proper values"). This resolves Open Question 1 of SPEC_FULL.md with a
/// standard, deterministic construction:
///
/// - MDS: a `T x T` Cauchy matrix, `mds[i][j] = 1 / (x_i + y_j)` for
///   pairwise-distinct `x_i = i`, `y_j = T + j`. Cauchy matrices are always
///   invertible (and every square submatrix is too), which is exactly the
///   MDS property Poseidon's security proof requires.
/// - Round constants: one field element per `(round, lane)` pair, derived
///   by reducing a counter-labelled byte string mod the field's order. This
///   keeps parameter generation dependency-free and fully deterministic
///   without requiring a Grain-LFSR implementation.
pub fn poseidon_config<F: PrimeField + 'static>() -> PoseidonConfig<F> {
    let mut cache = POSEIDON_CONFIGS.lock().unwrap();
    cache
        .entry(TypeId::of::<F>())
        .or_insert_with(|| Box::new(build_poseidon_config::<F>()))
        .downcast_ref::<PoseidonConfig<F>>()
        .expect("cache entry keyed by TypeId::of::<F>() always downcasts to PoseidonConfig<F>")
        .clone()
}

fn build_poseidon_config<F: PrimeField>() -> PoseidonConfig<F> {
    let mds = cauchy_mds::<F>();
    let ark = round_constants::<F>();

    PoseidonConfig::new(FULL_ROUNDS, PARTIAL_ROUNDS, ALPHA, mds, ark, RATE, CAPACITY)
}

fn cauchy_mds<F: PrimeField>() -> Vec<Vec<F>> {
    let mut mds = vec![vec![F::zero(); T]; T];
    for (i, row) in mds.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            let x_i = F::from((i as u64) + 1);
            let y_j = F::from((T as u64) + (j as u64) + 1);
            let denom = x_i + y_j;
            *cell = denom.inverse().expect("Cauchy MDS denominators are nonzero by construction");
        }
    }
    mds
}

fn round_constants<F: PrimeField>() -> Vec<Vec<F>> {
    let rounds = FULL_ROUNDS + PARTIAL_ROUNDS;
    let mut ark = Vec::with_capacity(rounds);
    for round in 0..rounds {
        let mut row = Vec::with_capacity(T);
        for lane in 0..T {
            let label = format!("mental-poker-core/poseidon/v1/{round}/{lane}");
            row.push(F::from_le_bytes_mod_order(label.as_bytes()));
        }
        ark.push(row);
    }
    ark
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_grumpkin::Fq;

    #[test]
    fn config_shape_matches_declared_constants() {
        let config = poseidon_config::<Fq>();
        assert_eq!(config.full_rounds, FULL_ROUNDS);
        assert_eq!(config.partial_rounds, PARTIAL_ROUNDS);
        assert_eq!(config.alpha, ALPHA);
        assert_eq!(config.rate, RATE);
        assert_eq!(config.capacity, CAPACITY);
        assert_eq!(config.mds.len(), T);
        assert_eq!(config.ark.len(), FULL_ROUNDS + PARTIAL_ROUNDS);
        for row in &config.mds {
            assert_eq!(row.len(), T);
        }
        for row in &config.ark {
            assert_eq!(row.len(), T);
        }
    }

    #[test]
    fn config_is_deterministic() {
        let a = poseidon_config::<Fq>();
        let b = poseidon_config::<Fq>();
        assert_eq!(a.mds, b.mds);
        assert_eq!(a.ark, b.ark);
    }

    #[test]
    fn mds_matrix_has_no_zero_entries() {
        let config = poseidon_config::<Fq>();
        for row in &config.mds {
            for cell in row {
                assert!(!cell.is_zero());
            }
        }
    }
}
