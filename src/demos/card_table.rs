//! A 52-point card-encoding table: `g^i` for `i` in `0..52`, with the
//! reverse lookup needed to turn a recovered group element back into a
//! card value.
//!
//! Grounded on `shuffling/player_decryption.rs::CardValueMap`, but built as
//! an ordinary value constructed by the caller rather than a
//! `once_cell::sync::Lazy` process-wide static keyed by `TypeId` — this
//! crate's [`crate::protocol::Parameters`] makes the same choice for the
//! same reason (SPEC_FULL.md §4.7, §6): a table should own its own state
//! rather than reach into ambient globals.

use std::collections::HashMap;

use ark_ec::CurveGroup;
use ark_ff::PrimeField;

const DECK_SIZE: u8 = 52;

/// Forward and reverse mapping between a standard 52-card deck's indices
/// and their `g^i` group-element encodings for a fixed curve.
#[derive(Clone, Debug)]
pub struct CardTable<C: CurveGroup> {
    value_to_element: Vec<C>,
    element_to_value: HashMap<C, u8>,
}

impl<C: CurveGroup> CardTable<C>
where
    C::ScalarField: PrimeField,
{
    /// Build the table by computing `g^i` for every `i` in `0..52`.
    pub fn new() -> Self {
        let generator = C::generator();
        let mut value_to_element = Vec::with_capacity(DECK_SIZE as usize);
        let mut element_to_value = HashMap::with_capacity(DECK_SIZE as usize);

        for i in 0..DECK_SIZE {
            let element = generator * C::ScalarField::from(i as u64);
            value_to_element.push(element);
            element_to_value.insert(element, i);
        }

        Self { value_to_element, element_to_value }
    }

    /// The group element encoding card value `value` (`0..52`), or `None`
    /// if out of range.
    pub fn encode(&self, value: u8) -> Option<C> {
        self.value_to_element.get(value as usize).copied()
    }

    /// The card value encoded by `element`, or `None` if `element` isn't
    /// one of the 52 points this table was built from.
    pub fn decode(&self, element: &C) -> Option<u8> {
        self.element_to_value.get(element).copied()
    }
}

impl<C: CurveGroup> Default for CardTable<C>
where
    C::ScalarField: PrimeField,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_grumpkin::Projective;

    type C = Projective;

    #[test]
    fn round_trips_every_card() {
        let table = CardTable::<C>::new();
        for value in 0u8..52 {
            let element = table.encode(value).unwrap();
            assert_eq!(table.decode(&element), Some(value));
        }
    }

    #[test]
    fn rejects_out_of_range_encode() {
        let table = CardTable::<C>::new();
        assert!(table.encode(52).is_none());
    }

    #[test]
    fn rejects_foreign_element() {
        let table = CardTable::<C>::new();
        let foreign = C::generator() * <C as CurveGroup>::ScalarField::from(1000u64);
        assert!(table.decode(&foreign).is_none());
    }
}
