//! Fixed, versionless wire encodings for the crate's public value types.
//!
//! Grounded on `crypto_serde.rs`'s wrapping pattern (one module per type,
//! paired `serialize`/`deserialize` functions) but replacing its serde/hex
//! string scheme with exact fixed-byte-length encodings, since this crate's
//! wire format is a closed binary layout rather than a JSON-embeddable
//! string — a cross-implementation verifier needs to parse these bytes
//! without pulling in `serde`.
//!
//! `scalar`/`point` encode/decode big-endian byte strings by reversing
//! `ark_serialize`'s own canonical little-endian encoding; neither module
//! reimplements field or curve-point arithmetic.

use ark_ec::CurveGroup;
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::error::{Error, Result};
use crate::sigma::DleqProof;

/// 32-byte big-endian scalar encoding, canonical in `[0, q)`.
pub mod scalar {
    use super::*;

    pub fn encode<F: PrimeField>(value: &F) -> Result<[u8; 32]> {
        let mut le = Vec::new();
        value.serialize_compressed(&mut le).map_err(|_| Error::InvalidScalar)?;
        if le.len() > 32 {
            return Err(Error::InvalidScalar);
        }
        le.resize(32, 0);
        le.reverse();
        let mut out = [0u8; 32];
        out.copy_from_slice(&le);
        Ok(out)
    }

    pub fn decode<F: PrimeField>(bytes: &[u8; 32]) -> Result<F> {
        let mut le = bytes.to_vec();
        le.reverse();
        F::deserialize_compressed(&le[..]).map_err(|_| Error::InvalidScalar)
    }
}

/// Tagged point encoding: `0x00` for the identity (no further bytes);
/// `0x02 ‖ body` for a compressed non-identity point; `0x04 ‖ body` for an
/// uncompressed non-identity point, where `body` is `ark_serialize`'s own
/// compressed/uncompressed canonical encoding of the affine point. The
/// `0x03` tag is reserved (decode accepts it identically to `0x02`) for a
/// future alternate compressed form; `encode` never emits it.
pub mod point {
    use super::*;

    pub fn encode<C: CurveGroup>(value: &C) -> Result<Vec<u8>> {
        if value.is_zero() {
            return Ok(vec![0x00]);
        }
        let affine = value.into_affine();
        let mut body = Vec::new();
        affine.serialize_compressed(&mut body).map_err(|_| Error::InvalidPoint)?;
        let mut out = vec![0x02];
        out.extend(body);
        Ok(out)
    }

    pub fn encode_uncompressed<C: CurveGroup>(value: &C) -> Result<Vec<u8>> {
        if value.is_zero() {
            return Ok(vec![0x00]);
        }
        let affine = value.into_affine();
        let mut body = Vec::new();
        affine.serialize_uncompressed(&mut body).map_err(|_| Error::InvalidPoint)?;
        let mut out = vec![0x04];
        out.extend(body);
        Ok(out)
    }

    pub fn decode<C: CurveGroup>(bytes: &[u8]) -> Result<C> {
        match bytes.split_first() {
            Some((0x00, rest)) if rest.is_empty() => Ok(C::zero()),
            Some((0x02 | 0x03, body)) => {
                let affine = C::Affine::deserialize_compressed(body).map_err(|_| Error::InvalidPoint)?;
                let point = C::from(affine);
                if point.is_zero() {
                    return Err(Error::InvalidPoint);
                }
                Ok(point)
            }
            Some((0x04, body)) => {
                let affine = C::Affine::deserialize_uncompressed(body).map_err(|_| Error::InvalidPoint)?;
                let point = C::from(affine);
                if point.is_zero() {
                    return Err(Error::InvalidPoint);
                }
                Ok(point)
            }
            _ => Err(Error::InvalidPoint),
        }
    }
}

/// Fixed 98-byte `DleqProof` layout: `a (33) ‖ b (33) ‖ s (32)` using
/// `point::encode`'s compressed tagged form for `a`/`b` and `scalar::encode`
/// for `s`. A non-identity point's compressed tagged encoding is always 33
/// bytes (1 tag byte + 32-byte body), so the total is fixed regardless of
/// the particular points involved, as long as neither `a` nor `b` is the
/// identity (which a well-formed `DleqProof` never produces).
pub mod sigma_proof {
    use super::*;

    pub fn encode<C: CurveGroup>(proof: &DleqProof<C>) -> Result<[u8; 98]> {
        let a = point::encode(&proof.a())?;
        let b = point::encode(&proof.b())?;
        let s = scalar::encode(&proof.s())?;
        if a.len() != 33 || b.len() != 33 {
            return Err(Error::InvalidProof);
        }
        let mut out = [0u8; 98];
        out[0..33].copy_from_slice(&a);
        out[33..66].copy_from_slice(&b);
        out[66..98].copy_from_slice(&s);
        Ok(out)
    }

    pub fn decode<C: CurveGroup>(bytes: &[u8; 98]) -> Result<DleqProof<C>> {
        let a: C = point::decode(&bytes[0..33])?;
        let b: C = point::decode(&bytes[33..66])?;
        let s_bytes: [u8; 32] = bytes[66..98].try_into().map_err(|_| Error::InvalidProof)?;
        let s: C::ScalarField = scalar::decode(&s_bytes)?;
        Ok(DleqProof::from_parts(a, b, s))
    }
}

/// The shuffle proof's structured concatenation, in the prover's own
/// emission order: `c_a ‖ product ‖ multiexp`, where `product` is
/// `c_p ‖ claimed_shift_open ‖ p_shift_open ‖ claimed_weighted_total ‖
/// p_weighted_total_open ‖ p_last_open ‖ claimed_a_self_weighted ‖
/// a_self_weighted_open ‖ product_ipa` (`product_ipa` itself
/// `round_count (8 bytes LE) ‖ (l_i ‖ r_i)* ‖ a ‖ b`) and `multiexp` is
/// `claimed_a_msm_c1 ‖ claimed_a_msm_c2 ‖ a_msm_c1 ‖ a_msm_c2 ‖ closing`,
/// with each `MsmOpeningProof` as `t ‖ t_point ‖ vec_len (8 bytes LE) ‖ z_i*
/// ‖ z_r` and `closing` as a 98-byte `sigma_proof`. Every point uses
/// `point::encode`'s tagged compressed form; every scalar uses
/// `scalar::encode`.
pub mod shuffle_proof {
    use super::*;
    use crate::shuffle::{opening::MsmOpeningProof, ipa, ProductArgument, ShuffleProof};

    fn push_point<C: CurveGroup>(out: &mut Vec<u8>, p: &C) -> Result<()> {
        out.extend(point::encode(p)?);
        Ok(())
    }

    fn push_scalar<F: PrimeField>(out: &mut Vec<u8>, s: &F) -> Result<()> {
        out.extend(scalar::encode(s)?);
        Ok(())
    }

    fn push_len(out: &mut Vec<u8>, n: usize) {
        out.extend((n as u64).to_le_bytes());
    }

    fn encode_opening<C: CurveGroup>(out: &mut Vec<u8>, proof: &MsmOpeningProof<C>) -> Result<()> {
        push_point(out, &proof.t)?;
        push_point(out, &proof.t_point)?;
        push_len(out, proof.z.len());
        for z_i in &proof.z {
            push_scalar(out, z_i)?;
        }
        push_scalar(out, &proof.z_r)
    }

    pub fn encode<C: CurveGroup>(proof: &ShuffleProof<C>) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        push_point(&mut out, &proof.c_a)?;

        let p = &proof.product;
        push_point(&mut out, &p.c_p)?;
        push_point(&mut out, &p.claimed_shift_open)?;
        encode_opening(&mut out, &p.p_shift_open)?;
        push_point(&mut out, &p.claimed_weighted_total)?;
        encode_opening(&mut out, &p.p_weighted_total_open)?;
        encode_opening(&mut out, &p.p_last_open)?;
        push_point(&mut out, &p.claimed_a_self_weighted)?;
        encode_opening(&mut out, &p.a_self_weighted_open)?;

        push_len(&mut out, p.product_ipa.l.len());
        for (l, r) in p.product_ipa.l.iter().zip(&p.product_ipa.r) {
            push_point(&mut out, l)?;
            push_point(&mut out, r)?;
        }
        push_scalar(&mut out, &p.product_ipa.a)?;
        push_scalar(&mut out, &p.product_ipa.b)?;

        push_point(&mut out, &proof.multiexp.claimed_a_msm_c1)?;
        push_point(&mut out, &proof.multiexp.claimed_a_msm_c2)?;
        encode_opening(&mut out, &proof.multiexp.a_msm_c1)?;
        encode_opening(&mut out, &proof.multiexp.a_msm_c2)?;
        out.extend(sigma_proof::encode(&proof.multiexp.closing)?);

        Ok(out)
    }

    struct Cursor<'a> {
        bytes: &'a [u8],
        pos: usize,
    }

    impl<'a> Cursor<'a> {
        fn new(bytes: &'a [u8]) -> Self {
            Self { bytes, pos: 0 }
        }

        fn take(&mut self, n: usize) -> Result<&'a [u8]> {
            let end = self.pos.checked_add(n).ok_or(Error::InvalidProof)?;
            let slice = self.bytes.get(self.pos..end).ok_or(Error::InvalidProof)?;
            self.pos = end;
            Ok(slice)
        }

        fn take_len(&mut self) -> Result<usize> {
            let bytes: [u8; 8] = self.take(8)?.try_into().map_err(|_| Error::InvalidProof)?;
            Ok(u64::from_le_bytes(bytes) as usize)
        }

        fn take_point<C: CurveGroup>(&mut self) -> Result<C> {
            // Tag byte determines the body length: 1 (identity), 33
            // (compressed), 65 (uncompressed).
            let tag = *self.bytes.get(self.pos).ok_or(Error::InvalidProof)?;
            let total = match tag {
                0x00 => 1,
                0x02 | 0x03 => 33,
                0x04 => 65,
                _ => return Err(Error::InvalidProof),
            };
            let slice = self.take(total)?;
            point::decode(slice)
        }

        fn take_scalar<F: PrimeField>(&mut self) -> Result<F> {
            let bytes: [u8; 32] = self.take(32)?.try_into().map_err(|_| Error::InvalidProof)?;
            scalar::decode(&bytes)
        }
    }

    fn decode_opening<C: CurveGroup>(cursor: &mut Cursor<'_>) -> Result<MsmOpeningProof<C>> {
        let t = cursor.take_point()?;
        let t_point = cursor.take_point()?;
        let len = cursor.take_len()?;
        let mut z = Vec::with_capacity(len);
        for _ in 0..len {
            z.push(cursor.take_scalar()?);
        }
        let z_r = cursor.take_scalar()?;
        Ok(MsmOpeningProof { t, t_point, z, z_r })
    }

    fn decode_closing<C: CurveGroup>(cursor: &mut Cursor<'_>) -> Result<DleqProof<C>> {
        let bytes: [u8; 98] = cursor.take(98)?.try_into().map_err(|_| Error::InvalidProof)?;
        sigma_proof::decode(&bytes)
    }

    pub fn decode<C: CurveGroup>(bytes: &[u8]) -> Result<ShuffleProof<C>> {
        let mut cursor = Cursor::new(bytes);
        let c_a = cursor.take_point()?;

        let c_p = cursor.take_point()?;
        let claimed_shift_open = cursor.take_point()?;
        let p_shift_open = decode_opening(&mut cursor)?;
        let claimed_weighted_total = cursor.take_point()?;
        let p_weighted_total_open = decode_opening(&mut cursor)?;
        let p_last_open = decode_opening(&mut cursor)?;
        let claimed_a_self_weighted = cursor.take_point()?;
        let a_self_weighted_open = decode_opening(&mut cursor)?;

        let rounds = cursor.take_len()?;
        let mut l = Vec::with_capacity(rounds);
        let mut r = Vec::with_capacity(rounds);
        for _ in 0..rounds {
            l.push(cursor.take_point()?);
            r.push(cursor.take_point()?);
        }
        let a = cursor.take_scalar()?;
        let b = cursor.take_scalar()?;
        let product_ipa = ipa::Proof { l, r, a, b };

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

        let claimed_a_msm_c1 = cursor.take_point()?;
        let claimed_a_msm_c2 = cursor.take_point()?;
        let a_msm_c1 = decode_opening(&mut cursor)?;
        let a_msm_c2 = decode_opening(&mut cursor)?;
        let closing = decode_closing(&mut cursor)?;

        Ok(ShuffleProof {
            c_a,
            product,
            multiexp: crate::shuffle::MultiExpArgument { claimed_a_msm_c1, claimed_a_msm_c2, a_msm_c1, a_msm_c2, closing },
        })
    }
}
