pub mod codec;
pub mod elgamal;
pub mod error;
pub mod group;
pub mod params;
pub mod pedersen;
pub mod protocol;
pub mod rand_seam;
pub mod shuffle;
pub mod sigma;
pub mod transcript;

#[cfg(feature = "demo")]
pub mod demos;

pub use error::{Error, Result};
