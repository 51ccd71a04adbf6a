// Copyright 2025 The Suzaku CLI Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! P-Chain JSON-RPC client and L1 validator transactions.

use std::{
    fmt,
    str::FromStr,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use alloy::{primitives::B256, signers::local::PrivateKeySigner};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::{json, Value};
use url::Url;

use crate::{
    codec::CodecError,
    ids::{Id, IdError},
};

pub mod address;
pub mod fee;
pub mod tx;

pub use address::PChainAddress;
pub use tx::{SignedTx, TxBody, TxContext, UnsignedTx, Utxo};

/// Maximum number of UTXOs requested per `platform.getUTXOs` page.
const UTXO_PAGE_LIMIT: u64 = 1024;

/// Errors returned by P-Chain operations.
#[derive(Debug, thiserror::Error)]
pub enum PChainError {
    #[error("P-Chain request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{method} failed: {message}")]
    Rpc { method: &'static str, message: String },
    #[error("unexpected {method} response: {reason}")]
    InvalidResponse { method: &'static str, reason: String },
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("failed to sign transaction: {0}")]
    Signer(#[from] alloy::signers::Error),
    #[error("insufficient P-Chain funds: need {needed} nAVAX, {available} nAVAX spendable")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("transaction {tx_id} was dropped: {reason}")]
    TxDropped { tx_id: Id, reason: String },
    #[error("transaction {tx_id} not committed after {attempts} status checks")]
    ConfirmationTimeout { tx_id: Id, attempts: u32 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Status reported by `platform.getTxStatus`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxStatus {
    Committed,
    Processing,
    Dropped { reason: String },
    Unknown,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Committed => f.write_str("Committed"),
            TxStatus::Processing => f.write_str("Processing"),
            TxStatus::Dropped { reason } => write!(f, "Dropped ({reason})"),
            TxStatus::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Dynamic fee state of the P-Chain.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct FeeState {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub capacity: u64,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub excess: u64,
    /// Gas price in nAVAX.
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub price: u64,
}

/// AVAX balances of an address, in nAVAX.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub balance: u64,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub unlocked: u64,
}

/// A transaction accepted by the node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedTx {
    pub tx_id: Id,
    pub fee: u64,
}

fn u64_from_str_or_num<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Num(u64),
    }
    match StrOrNum::deserialize(deserializer)? {
        StrOrNum::Num(value) => Ok(value),
        StrOrNum::Str(value) => value.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
struct UtxoPage {
    utxos: Vec<String>,
    #[serde(rename = "numFetched", deserialize_with = "u64_from_str_or_num")]
    num_fetched: u64,
    #[serde(rename = "endIndex")]
    end_index: Value,
}

/// Client for the P-Chain API of an Avalanche node.
#[derive(Clone, Debug)]
pub struct PChainClient {
    http: Client,
    url: Url,
    network_id: u32,
    hrp: String,
}

impl PChainClient {
    /// Client for the node at `api_url`, on the network with `network_id` and address prefix `hrp`.
    pub fn new(api_url: &Url, network_id: u32, hrp: &str) -> Result<Self, PChainError> {
        let url = format!("{}/ext/bc/P", api_url.as_str().trim_end_matches('/'));
        let url = Url::parse(&url).map_err(|e| anyhow::anyhow!("invalid P-Chain API URL: {e}"))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("suzaku-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, url, network_id, hrp: hrp.to_string() })
    }

    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    /// Address of `signer` on this network.
    pub fn address_of(&self, signer: &PrivateKeySigner) -> Result<PChainAddress, PChainError> {
        Ok(PChainAddress::from_signer(signer, &self.hrp)?)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, PChainError> {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        tracing::trace!(%method, "P-Chain request");
        let resp: Value = self.http.post(self.url.clone()).json(&body).send().await?.json().await?;
        if let Some(err) = resp.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            return Err(PChainError::Rpc { method, message });
        }
        let result = resp.get("result").cloned().ok_or_else(|| PChainError::InvalidResponse {
            method,
            reason: "missing result".into(),
        })?;
        serde_json::from_value(result)
            .map_err(|e| PChainError::InvalidResponse { method, reason: e.to_string() })
    }

    pub async fn get_fee_state(&self) -> Result<FeeState, PChainError> {
        self.call("platform.getFeeState", json!({})).await
    }

    pub async fn get_staking_asset_id(&self) -> Result<B256, PChainError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Resp {
            asset_id: String,
        }
        let resp: Resp = self.call("platform.getStakingAssetID", json!({})).await?;
        Ok(Id::from_str(&resp.asset_id)?.0)
    }

    pub async fn get_balance(&self, address: &PChainAddress) -> Result<Balance, PChainError> {
        self.call("platform.getBalance", json!({ "addresses": [address.to_string()] })).await
    }

    /// All UTXOs referencing `address`, following pagination.
    pub async fn get_utxos(&self, address: &PChainAddress) -> Result<Vec<Utxo>, PChainError> {
        let mut utxos = Vec::new();
        let mut start_index: Option<Value> = None;
        loop {
            let mut params = json!({
                "addresses": [address.to_string()],
                "limit": UTXO_PAGE_LIMIT,
                "encoding": "hex",
            });
            if let Some(index) = start_index.take() {
                params["startIndex"] = index;
            }
            let page: UtxoPage = self.call("platform.getUTXOs", params).await?;
            for encoded in &page.utxos {
                if let Some(utxo) = Utxo::from_hex(encoded)? {
                    utxos.push(utxo);
                }
            }
            if page.num_fetched < UTXO_PAGE_LIMIT {
                break;
            }
            start_index = Some(page.end_index);
        }
        tracing::debug!(count = utxos.len(), %address, "fetched UTXOs");
        Ok(utxos)
    }

    pub async fn issue_tx(&self, tx: &SignedTx) -> Result<Id, PChainError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Resp {
            tx_id: String,
        }
        let resp: Resp =
            self.call("platform.issueTx", json!({ "tx": tx.to_hex(), "encoding": "hex" })).await?;
        Ok(resp.tx_id.parse()?)
    }

    pub async fn get_tx_status(&self, tx_id: &Id) -> Result<TxStatus, PChainError> {
        #[derive(Deserialize)]
        struct Resp {
            status: String,
            #[serde(default)]
            reason: Option<String>,
        }
        let resp: Resp =
            self.call("platform.getTxStatus", json!({ "txID": tx_id.to_string() })).await?;
        Ok(match resp.status.as_str() {
            "Committed" => TxStatus::Committed,
            "Processing" => TxStatus::Processing,
            "Dropped" => TxStatus::Dropped { reason: resp.reason.unwrap_or_default() },
            _ => TxStatus::Unknown,
        })
    }

    /// Poll the status of `tx_id` up to `retries` times, `interval` apart.
    pub async fn wait_for_tx(
        &self,
        tx_id: &Id,
        interval: Duration,
        retries: u32,
    ) -> Result<(), PChainError> {
        for attempt in 1..=retries {
            match self.get_tx_status(tx_id).await? {
                TxStatus::Committed => {
                    tracing::info!("P-Chain transaction {tx_id} committed");
                    return Ok(());
                }
                TxStatus::Dropped { reason } => {
                    return Err(PChainError::TxDropped { tx_id: *tx_id, reason });
                }
                status => {
                    tracing::debug!(%status, attempt, "waiting for P-Chain transaction {tx_id}");
                }
            }
            if attempt < retries {
                tokio::time::sleep(interval).await;
            }
        }
        Err(PChainError::ConfirmationTimeout { tx_id: *tx_id, attempts: retries })
    }

    /// Build a transaction carrying `body` funded by `signer`, sign it and issue it.
    pub async fn issue(
        &self,
        signer: &PrivateKeySigner,
        body: TxBody,
    ) -> Result<IssuedTx, PChainError> {
        let address = self.address_of(signer)?;
        let avax_asset_id = self.get_staking_asset_id().await?;
        let fee_state = self.get_fee_state().await?;
        let utxos = self.get_utxos(&address).await?;

        let now = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
        let ctx = TxContext {
            network_id: self.network_id,
            avax_asset_id,
            owner: address.short_id(),
            gas_price: fee_state.price,
            now,
        };
        let kind = body.kind();
        let unsigned = UnsignedTx::build(&ctx, &utxos, body)?;
        let signed = unsigned.sign(signer)?;
        tracing::info!(?kind, fee = unsigned.fee(), from = %address, "issuing P-Chain transaction");

        let tx_id = self.issue_tx(&signed).await?;
        if tx_id != signed.id() {
            tracing::warn!("node reported transaction ID {tx_id}, computed {}", signed.id());
        }
        Ok(IssuedTx { tx_id, fee: unsigned.fee() })
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;
    use crate::{codec::Packer, ids};

    const EWOQ_KEY: &str = "56289e99c94b6912bfc12adc093c9b51124f0dc54ac7a766b2bc5ccf558d8027";
    const ZERO_ID: &str = "11111111111111111111111111111111LpoYY";

    fn client(server: &MockServer) -> PChainClient {
        PChainClient::new(&Url::parse(&server.base_url()).unwrap(), 12345, "local").unwrap()
    }

    fn encoded_utxo(owner: [u8; 20], asset_id: B256, amount: u64) -> String {
        let mut packer = Packer::with_codec_version();
        packer
            .fixed(B256::repeat_byte(0x01).as_slice())
            .u32(0)
            .fixed(asset_id.as_slice())
            .u32(7)
            .u64(amount)
            .u64(0)
            .u32(1)
            .u32(1)
            .fixed(&owner);
        format!("0x{}", hex::encode(ids::with_checksum(&packer.finish())))
    }

    #[tokio::test]
    async fn parses_string_encoded_fee_state() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/ext/bc/P").body_contains("platform.getFeeState");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0", "id": 1,
                "result": {
                    "capacity": "20000", "excess": "0", "price": "1",
                    "timestamp": "2025-01-01T00:00:00Z"
                }
            }));
        });

        let state = client(&server).get_fee_state().await.unwrap();
        assert_eq!(state, FeeState { capacity: 20_000, excess: 0, price: 1 });
    }

    #[tokio::test]
    async fn rpc_errors_carry_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(json!({
                "jsonrpc": "2.0", "id": 1,
                "error": { "code": -32000, "message": "couldn't issue tx: insufficient funds" }
            }));
        });

        let err = client(&server).get_fee_state().await.unwrap_err();
        assert!(matches!(err, PChainError::Rpc { method: "platform.getFeeState", .. }), "{err}");
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[tokio::test]
    async fn wait_stops_after_configured_retries() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).body_contains("platform.getTxStatus");
            then.status(200)
                .json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": { "status": "Processing" } }));
        });

        let err = client(&server)
            .wait_for_tx(&Id::ZERO, Duration::from_millis(5), 3)
            .await
            .unwrap_err();
        mock.assert_hits(3);
        assert!(matches!(err, PChainError::ConfirmationTimeout { attempts: 3, .. }), "{err}");
    }

    #[tokio::test]
    async fn wait_fails_fast_on_dropped() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).body_contains("platform.getTxStatus");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0", "id": 1,
                "result": { "status": "Dropped", "reason": "failed to verify warp message" }
            }));
        });

        let err = client(&server)
            .wait_for_tx(&Id::ZERO, Duration::from_millis(5), 10)
            .await
            .unwrap_err();
        mock.assert_hits(1);
        assert!(err.to_string().contains("failed to verify warp message"), "{err}");
    }

    #[tokio::test]
    async fn wait_returns_on_commit() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).body_contains(ZERO_ID);
            then.status(200)
                .json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": { "status": "Committed" } }));
        });

        client(&server).wait_for_tx(&Id::ZERO, Duration::from_millis(5), 10).await.unwrap();
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn issues_funded_transaction() {
        let server = MockServer::start();
        let signer: PrivateKeySigner = EWOQ_KEY.parse().unwrap();
        let pchain = client(&server);
        let address = pchain.address_of(&signer).unwrap();
        let avax = B256::repeat_byte(0x3d);

        server.mock(|when, then| {
            when.method(POST).body_contains("platform.getStakingAssetID");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0", "id": 1, "result": { "assetID": Id(avax).to_string() }
            }));
        });
        server.mock(|when, then| {
            when.method(POST).body_contains("platform.getFeeState");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0", "id": 1,
                "result": { "capacity": "1", "excess": "0", "price": "1" }
            }));
        });
        let utxos = server.mock(|when, then| {
            when.method(POST).body_contains("platform.getUTXOs").body_contains(address.to_string());
            then.status(200).json_body(json!({
                "jsonrpc": "2.0", "id": 1,
                "result": {
                    "numFetched": "1",
                    "utxos": [encoded_utxo(address.short_id(), avax, 1_000_000_000)],
                    "endIndex": { "address": address.to_string(), "utxo": ZERO_ID },
                    "encoding": "hex"
                }
            }));
        });
        let issue = server.mock(|when, then| {
            when.method(POST).body_contains("platform.issueTx");
            then.status(200)
                .json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": { "txID": ZERO_ID } }));
        });

        let body = TxBody::IncreaseL1ValidatorBalance {
            validation_id: B256::repeat_byte(0x55),
            balance: 100_000_000,
        };
        let issued = pchain.issue(&signer, body).await.unwrap();

        utxos.assert();
        issue.assert();
        assert_eq!(issued.tx_id, Id::ZERO);
        assert!(issued.fee > 0);
    }
}
