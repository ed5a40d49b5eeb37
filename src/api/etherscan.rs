//! Etherscan v2 client for gas prices and block height.

use super::{ensure_success, non_empty, ChainExplorer};
use crate::error::{SourceError, SourceResult};
use crate::models::GasPriceTiers;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.etherscan.io/v2/api";

/// Envelope shared by Etherscan's module endpoints and its proxy endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct GasOracle {
    #[serde(rename = "SafeGasPrice")]
    safe: String,
    #[serde(rename = "ProposeGasPrice")]
    propose: String,
    #[serde(rename = "FastGasPrice")]
    fast: String,
}

pub struct EtherscanClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    chain_id: u64,
}

impl EtherscanClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        chain_id: u64,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: non_empty(api_key),
            chain_id,
        }
    }

    async fn call(&self, module: &str, action: &str) -> SourceResult<Envelope> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingCredential("ETHERSCAN_API_KEY"))?;
        debug!("GET {} module={} action={}", self.base_url, module, action);

        let response = self.request(module, action, api_key).send().await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    fn request(&self, module: &str, action: &str, api_key: &str) -> reqwest::RequestBuilder {
        let chain_id = self.chain_id.to_string();
        let request = self.http.get(&self.base_url).query(&[
            ("chainid", chain_id.as_str()),
            ("module", module),
            ("action", action),
            ("apikey", api_key),
        ]);
        request
    }
}

#[async_trait]
impl ChainExplorer for EtherscanClient {
    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn gas_oracle(&self) -> SourceResult<GasPriceTiers> {
        let envelope = self.call("gastracker", "gasoracle").await?;
        parse_gas_oracle(envelope)
    }

    async fn latest_block(&self) -> SourceResult<u64> {
        let envelope = self.call("proxy", "eth_blockNumber").await?;
        parse_block_number(envelope)
    }
}

fn parse_gas_oracle(envelope: Envelope) -> SourceResult<GasPriceTiers> {
    if envelope.status.as_deref() != Some("1") {
        return Err(api_error(&envelope));
    }

    let oracle: GasOracle = serde_json::from_value(envelope.result)
        .map_err(|e| SourceError::Malformed(format!("gas oracle: {}", e)))?;

    Ok(GasPriceTiers {
        safe: parse_gwei(&oracle.safe)?,
        propose: parse_gwei(&oracle.propose)?,
        fast: parse_gwei(&oracle.fast)?,
    })
}

/// Proxy calls answer JSON-RPC style with a hex `result`; failures come back
/// in the module envelope with `status` "0".
fn parse_block_number(envelope: Envelope) -> SourceResult<u64> {
    match envelope.result.as_str() {
        Some(hex) if hex.starts_with("0x") => u64::from_str_radix(&hex[2..], 16)
            .map_err(|e| SourceError::Malformed(format!("block number {:?}: {}", hex, e))),
        _ => Err(api_error(&envelope)),
    }
}

fn parse_gwei(value: &str) -> SourceResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| SourceError::Malformed(format!("gas price {:?}", value)))
}

fn api_error(envelope: &Envelope) -> SourceError {
    let detail = envelope
        .result
        .as_str()
        .or(envelope.message.as_deref())
        .unwrap_or("unknown error");
    SourceError::Api(detail.to_string())
}
