use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

pub use primitive_types::{H160 as Address, H256 as Bytes32, U256};

/// Length of a block reference in bytes.
pub const BLOCK_REF_LENGTH: usize = 8;

/// Decode a hex string with or without a `0x` prefix. `"0x"` decodes to no bytes.
pub fn parse_hex(value: &str) -> Result<Vec<u8>> {
    let value = value.trim();
    let value = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    Ok(hex::decode(value)?)
}

/// Encode bytes as a `0x` prefixed lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a fixed-width value (address, hash) from hex.
pub fn parse_fixed<const N: usize>(context: &'static str, value: &str) -> Result<[u8; N]> {
    let bytes = parse_hex(value)?;
    bytes.as_slice().try_into().map_err(|_| Error::InvalidLength {
        context,
        expected: N,
        got: bytes.len(),
    })
}

pub fn parse_address(value: &str) -> Result<Address> {
    parse_fixed::<20>("address", value).map(Address::from)
}

pub fn parse_bytes32(value: &str) -> Result<Bytes32> {
    parse_fixed::<32>("bytes32", value).map(Bytes32::from)
}

/// Reference to the block after which a transaction becomes valid.
///
/// It is the first 8 bytes of a block id, which hold the block number.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockRef(pub [u8; BLOCK_REF_LENGTH]);

impl BlockRef {
    pub fn from_u64(value: u64) -> Self {
        Self(value.to_be_bytes())
    }

    pub fn as_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    pub fn from_block_id(id: &Bytes32) -> Self {
        let mut bytes = [0u8; BLOCK_REF_LENGTH];
        bytes.copy_from_slice(&id.as_bytes()[..BLOCK_REF_LENGTH]);
        Self(bytes)
    }

    /// Block number encoded in the reference.
    pub fn number(&self) -> u32 {
        (self.as_u64() >> 32) as u32
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

impl fmt::Debug for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for BlockRef {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        parse_fixed::<BLOCK_REF_LENGTH>("block ref", value).map(Self)
    }
}

impl Serialize for BlockRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BlockRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `0x` prefixed byte strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_hex(&value).map_err(serde::de::Error::custom)
    }
}
