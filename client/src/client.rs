use crate::{backoff::RetryPolicy, Error, Result};
use chrono::{DateTime, Utc};
use rand::thread_rng;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thor_schedule_types::{
    api::{
        BlockSummary, RawTransaction, ScheduleRequest, TxIdResponse, BLOCKS_PATH, SCHEDULE_PATH,
        TRANSACTIONS_PATH,
    },
    Bytes32, Transaction,
};
use tracing::{debug, warn};
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for a Thor node's REST API.
#[derive(Clone, Debug)]
pub struct Client {
    pub(crate) base_url: Url,
    pub(crate) http_client: reqwest::Client,
    retry_policy: RetryPolicy,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidScheme(scheme.to_string())),
        }

        // Relative joins replace the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url,
            http_client,
            retry_policy: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Send a request, retrying transport failures and 5xx answers per the retry policy.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let attempts = self.retry_policy.attempts();
        let mut attempt = 1;
        loop {
            let Some(this_try) = request.try_clone() else {
                return Ok(request.send().await?);
            };
            let retryable = match this_try.send().await {
                Ok(response) if response.status().is_server_error() && attempt < attempts => {
                    format!("status {}", response.status())
                }
                Ok(response) => return Ok(response),
                Err(err) if (err.is_connect() || err.is_timeout()) && attempt < attempts => {
                    err.to_string()
                }
                Err(err) => return Err(err.into()),
            };

            let delay = self.retry_policy.delay(&mut thread_rng(), attempt);
            warn!(attempt, attempts, ?delay, reason = %retryable, "request failed, retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Fail on non-2xx answers, keeping the body for the error.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!(?err, %status, "failed to read error body");
                String::new()
            }
        };
        if body.is_empty() {
            return Err(Error::Failed(status));
        }
        Err(Error::FailedWithBody { status, body })
    }

    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
        let request = self.http_client.post(self.url(path)?).json(body);
        let response = Self::check(self.send(request).await?).await?;
        Ok(response.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.http_client.get(self.url(path)?);
        let response = Self::check(self.send(request).await?).await?;
        Ok(response.json().await?)
    }

    /// Ask the node to release `tx` at `time`.
    ///
    /// Returns the transaction id when the node reports one.
    pub async fn schedule_transaction(
        &self,
        tx: &Transaction,
        time: DateTime<Utc>,
    ) -> Result<Option<Bytes32>> {
        let request = ScheduleRequest::new(tx, time);
        debug!(raw = %request.raw, %time, "scheduling transaction");
        let body = self.post_json(SCHEDULE_PATH, &request).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<TxIdResponse>(&body) {
            Ok(response) => Ok(Some(response.id)),
            Err(err) => {
                debug!(?err, body = %body, "schedule response carries no id");
                Ok(None)
            }
        }
    }

    /// Submit `tx` to the pool right away.
    pub async fn submit_transaction(&self, tx: &Transaction) -> Result<Bytes32> {
        let body = self
            .post_json(TRANSACTIONS_PATH, &RawTransaction::new(tx))
            .await?;
        let response: TxIdResponse = serde_json::from_str(&body)?;
        Ok(response.id)
    }

    /// Look up a block by revision (`best`, a number or an id).
    pub async fn block(&self, revision: &str) -> Result<Option<BlockSummary>> {
        self.get_json(&format!("{BLOCKS_PATH}/{revision}")).await
    }

    pub async fn best_block(&self) -> Result<BlockSummary> {
        self.block("best")
            .await?
            .ok_or_else(|| Error::BlockNotFound("best".to_string()))
    }

    pub async fn genesis_block(&self) -> Result<BlockSummary> {
        self.block("0")
            .await?
            .ok_or_else(|| Error::BlockNotFound("0".to_string()))
    }

    pub async fn chain_tag(&self) -> Result<u8> {
        Ok(self.genesis_block().await?.chain_tag())
    }
}
