//! Hashing and secp256k1 signing used by Thor transactions.
//!
//! Signatures are 65 bytes, `r || s || v` with `v` either 0 or 1, and are
//! always produced in low-s form.

use crate::{
    primitives::{parse_hex, Address, Bytes32},
    Error, Result,
};
use blake2::{digest::consts::U32, Blake2b, Digest};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use sha3::Keccak256;
use std::fmt;

type Blake2b256 = Blake2b<U32>;

/// Length of a recoverable signature in bytes.
pub const SIGNATURE_LENGTH: usize = 65;

/// Length of a private key in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// BLAKE2b-256 over the concatenation of `parts`.
pub fn blake2b256(parts: &[&[u8]]) -> Bytes32 {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    Bytes32::from_slice(&hasher.finalize())
}

pub fn keccak256(data: &[u8]) -> Bytes32 {
    Bytes32::from_slice(&Keccak256::digest(data))
}

/// Derive the account address of a public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(/* compress = */ false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash.as_bytes()[12..])
}

/// secp256k1 private key.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(Error::InvalidLength {
                context: "private key",
                expected: PRIVATE_KEY_LENGTH,
                got: bytes.len(),
            });
        }
        SigningKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidPrivateKey)
    }

    pub fn from_hex(value: &str) -> Result<Self> {
        Self::from_slice(&parse_hex(value)?)
    }

    pub fn address(&self) -> Address {
        address_of(self.0.verifying_key())
    }

    /// Sign a 32 byte digest.
    pub fn sign(&self, hash: &Bytes32) -> Result<Signature> {
        let (signature, recovery_id) = self
            .0
            .sign_prehash_recoverable(hash.as_bytes())
            .map_err(|_| Error::InvalidSignature)?;

        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = recovery_id.to_byte();
        Ok(Signature(bytes))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Recoverable secp256k1 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_LENGTH]);

impl Signature {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SIGNATURE_LENGTH] =
            bytes.try_into().map_err(|_| Error::InvalidLength {
                context: "signature",
                expected: SIGNATURE_LENGTH,
                got: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Recover the address that produced this signature over `hash`.
    pub fn recover(&self, hash: &Bytes32) -> Result<Address> {
        let mut recid = self.0[64];
        if recid > 1 {
            return Err(Error::InvalidSignature);
        }
        let mut signature =
            EcdsaSignature::from_slice(&self.0[..64]).map_err(|_| Error::InvalidSignature)?;

        // Normalize and flip the recovery id if needed.
        if let Some(normalized) = signature.normalize_s() {
            signature = normalized;
            recid ^= 1;
        }
        let recid = RecoveryId::from_byte(recid).ok_or(Error::InvalidSignature)?;

        let key = VerifyingKey::recover_from_prehash(hash.as_bytes(), &signature, recid)
            .map_err(|_| Error::InvalidSignature)?;
        Ok(address_of(&key))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0x{})", hex::encode(self.0))
    }
}
