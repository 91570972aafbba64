use thiserror::Error;

/// Error taxonomy for the mental-poker cryptographic core.
///
/// `verify_*` operations never return an `Error` — they return `bool`.
/// `prove_*`/`compute_*` operations return these on structurally invalid
/// input; they never fail on well-formed honest input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid point encoding or unexpected identity point")]
    InvalidPoint,

    #[error("scalar outside the required range")]
    InvalidScalar,

    #[error("proof verification failed")]
    InvalidProof,

    #[error("fewer than N distinct reveal tokens supplied to unmask")]
    InsufficientRevealTokens,

    #[error("internal arithmetic postcondition violated: {0}")]
    CryptographicError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
