use crate::{backoff::RetryPolicy, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use thor_schedule_types::{
    api::rfc3339,
    builder::random_nonce,
    primitives::parse_address,
    BlockRef, Builder, Bytes32, Clause, PrivateKey, Transaction, U256,
};

/// Well-known key of the first solo-mode development account.
pub const DEV_PRIVATE_KEY: &str =
    "99f0500549792796c14fed62011a51081dc5b5e68fe8bd8a13b86be829c4fd36";

/// Environment variable read for the signing key.
pub const PRIVATE_KEY_ENV: &str = "THOR_PRIVATE_KEY";

pub const DEFAULT_URL: &str = "http://localhost:8669";
pub const DEFAULT_RECIPIENT: &str = "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed";

/// 2012-01-05T15:04:05Z
const DEFAULT_TIME_SECS: i64 = 1_325_775_845;

/// Transaction and node settings, usually loaded from YAML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub url: String,
    pub private_key: String,
    pub chain_tag: u8,
    pub block_ref: BlockRef,
    pub expiration: u32,
    pub gas_price_coef: u8,
    /// Intrinsic gas of the clauses when absent.
    pub gas: Option<u64>,
    pub depends_on: Option<Bytes32>,
    /// Random when null.
    pub nonce: Option<u64>,
    pub features: u32,
    pub clauses: Vec<Clause>,
    #[serde(with = "rfc3339")]
    pub time: DateTime<Utc>,
    pub log_level: String,
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            private_key: DEV_PRIVATE_KEY.to_string(),
            chain_tag: 0xf5,
            block_ref: BlockRef::default(),
            expiration: 32,
            gas_price_coef: 128,
            gas: None,
            depends_on: None,
            nonce: Some(12_345_678),
            features: 0,
            clauses: vec![default_clause()],
            time: DateTime::from_timestamp(DEFAULT_TIME_SECS, 0).unwrap_or_default(),
            log_level: "info".to_string(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_clause() -> Clause {
    Clause {
        to: parse_address(DEFAULT_RECIPIENT).ok(),
        value: U256::from(10_000u64),
        data: Vec::new(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
        }
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    pub fn signer(&self) -> Result<PrivateKey> {
        Ok(PrivateKey::from_hex(&self.private_key)?)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.into()
    }

    /// Unsigned transaction described by this configuration.
    pub fn transaction(&self) -> Result<Transaction> {
        let mut builder = Builder::new()
            .chain_tag(self.chain_tag)
            .clauses(self.clauses.iter().cloned())
            .block_ref(self.block_ref)
            .expiration(self.expiration)
            .gas_price_coef(self.gas_price_coef)
            .depends_on(self.depends_on)
            .nonce(self.nonce.unwrap_or_else(random_nonce))
            .features(self.features);
        if let Some(gas) = self.gas {
            builder = builder.gas(gas);
        }
        Ok(builder.build()?)
    }
}
