//! # Key-Value Export
//!
//! Publishes claims to a key-value namespace so a claim front end can look
//! up a recipient's proof by address. Each claim becomes one pair:
//!
//! - key: the checksummed account address
//! - value: the claim record serialized as JSON
//!
//! Pairs are sent in batches to the namespace's bulk endpoint with `PUT`.
//! A batch fails on a non-2xx status or when the response body reports
//! `success: false`.

use std::time::Duration;

use mdist_core::ClaimRecord;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, KvConfig};
use crate::error::ExportError;
use crate::retry::retry_send;

/// Pairs per bulk request.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// One key-value pair in a bulk write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KvPair {
    pub key: String,
    pub value: String,
}

impl KvPair {
    /// Encode a claim as a pair keyed by its checksummed address.
    pub fn from_claim(claim: &ClaimRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            key: claim.address.to_checksum(),
            value: serde_json::to_string(claim)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

/// Bulk uploader for one namespace.
#[derive(Debug, Clone)]
pub struct KvUploader {
    client: reqwest::Client,
    endpoint: String,
}

impl KvUploader {
    /// Build an uploader with bearer authentication from `config`.
    pub fn new(config: &KvConfig) -> Result<Self, ExportError> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
            .map_err(|_| ConfigError::InvalidToken)?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let endpoint = config.bulk_endpoint();
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| ExportError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;

        Ok(Self { client, endpoint })
    }

    /// The bulk endpoint this uploader writes to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Write one batch of pairs.
    pub async fn upload_batch(&self, batch: &[KvPair]) -> Result<(), ExportError> {
        let resp = retry_send(|| self.client.put(&self.endpoint).json(batch).send())
            .await
            .map_err(|source| ExportError::Http {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ExportError::Api {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let body: BulkResponse = resp.json().await.map_err(|source| ExportError::Http {
            endpoint: self.endpoint.clone(),
            source,
        })?;
        if !body.success {
            return Err(ExportError::Rejected {
                endpoint: self.endpoint.clone(),
                errors: serde_json::Value::Array(body.errors).to_string(),
            });
        }
        Ok(())
    }

    /// Write every claim in batches of `batch_size`.
    ///
    /// Stops at the first failed batch. Returns the number of pairs written.
    pub async fn upload_claims(
        &self,
        claims: &[ClaimRecord],
        batch_size: usize,
    ) -> Result<usize, ExportError> {
        let pairs = claims
            .iter()
            .map(KvPair::from_claim)
            .collect::<Result<Vec<_>, _>>()?;
        let batch_size = batch_size.max(1);
        let batches = pairs.len().div_ceil(batch_size);

        let mut written = 0;
        for (n, batch) in pairs.chunks(batch_size).enumerate() {
            self.upload_batch(batch).await?;
            written += batch.len();
            tracing::info!(
                batch = n + 1,
                batches,
                written,
                total = pairs.len(),
                "uploaded batch"
            );
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdist_core::{Account, Amount, Hash32};

    #[test]
    fn pair_is_keyed_by_checksummed_address() {
        let address: Account = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        let claim = ClaimRecord {
            index: 3,
            address,
            amount: Amount::from(255),
            proof: vec![Hash32::new([7; 32])],
            flags: None,
        };
        let pair = KvPair::from_claim(&claim).unwrap();
        assert_eq!(pair.key, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        let back: ClaimRecord = serde_json::from_str(&pair.value).unwrap();
        assert_eq!(back, claim);
    }
}
