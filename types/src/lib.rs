pub mod api;
pub mod builder;
pub mod crypto;
pub mod gas;
pub mod primitives;
pub mod schedule;
pub mod transaction;

pub use builder::Builder;
pub use crypto::{PrivateKey, Signature};
pub use primitives::{Address, BlockRef, Bytes32, U256};
pub use schedule::{Schedule, ScheduledTransaction};
pub use transaction::{Body, Clause, Reserved, Transaction};

use thiserror::Error;

/// Error type for encoding, decoding and signing transactions.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid rlp: {0}")]
    Rlp(#[from] rlp::DecoderError),
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid length for {context}: expected {expected}, got {got}")]
    InvalidLength {
        context: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("unexpected field count: {0}")]
    UnexpectedFieldCount(usize),
    #[error("trailing bytes after transaction: {0}")]
    TrailingBytes(usize),
    #[error("reserved fields not trimmed")]
    UntrimmedReserved,
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("transaction is not signed")]
    MissingSignature,
    #[error("transaction is not delegated")]
    NotDelegated,
    #[error("delegated transaction needs a delegator signature")]
    DelegatorRequired,
    #[error("invalid time: {0}")]
    InvalidTime(#[from] chrono::ParseError),
    #[error("intrinsic gas overflow")]
    GasOverflow,
}

/// Result type for transaction operations.
pub type Result<T> = std::result::Result<T, Error>;
