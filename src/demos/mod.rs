//! Convenience helpers outside the core's public default surface, gated
//! behind the `demo` feature. Not part of the protocol itself — a table
//! using this crate is free to pick any card-encoding it likes.

pub mod card_table;
