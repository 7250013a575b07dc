//! JSON bodies exchanged with a Thor node's REST API.

use crate::{
    primitives::{parse_hex, to_hex, Bytes32},
    transaction::Transaction,
    Result,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Path of the scheduling endpoint.
pub const SCHEDULE_PATH: &str = "transactions/schedule";
/// Path of the immediate submission endpoint.
pub const TRANSACTIONS_PATH: &str = "transactions";
/// Path prefix for block lookups.
pub const BLOCKS_PATH: &str = "blocks";

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value.trim())?.with_timezone(&Utc))
}

/// RFC 3339 in UTC with a `Z` suffix, e.g. `2012-01-05T15:04:05Z`.
pub mod rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(time: &DateTime<Utc>) -> String {
        time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_time(&value).map_err(serde::de::Error::custom)
    }
}

/// Body of `POST /transactions/schedule`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub raw: String,
    #[serde(with = "rfc3339")]
    pub time: DateTime<Utc>,
}

impl ScheduleRequest {
    pub fn new(tx: &Transaction, time: DateTime<Utc>) -> Self {
        Self {
            raw: to_hex(&tx.encode()),
            time,
        }
    }

    pub fn transaction(&self) -> Result<Transaction> {
        Transaction::decode(&parse_hex(&self.raw)?)
    }
}

/// Body of `POST /transactions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub raw: String,
}

impl RawTransaction {
    pub fn new(tx: &Transaction) -> Self {
        Self {
            raw: to_hex(&tx.encode()),
        }
    }

    pub fn transaction(&self) -> Result<Transaction> {
        Transaction::decode(&parse_hex(&self.raw)?)
    }
}

/// Node reply carrying the id of an accepted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIdResponse {
    pub id: Bytes32,
}

/// Subset of the block returned by `GET /blocks/{revision}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    pub number: u32,
    pub id: Bytes32,
    #[serde(rename = "parentID")]
    pub parent_id: Bytes32,
    pub timestamp: u64,
    pub gas_limit: u64,
}

impl BlockSummary {
    /// Chain tag of the network, valid when this is the genesis block.
    pub fn chain_tag(&self) -> u8 {
        self.id.as_bytes()[31]
    }
}
