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

//! Validator uptime as observed by the nodes of an L1.

use std::time::Duration;

use alloy::primitives::B256;
use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::{
    ids::{Id, NodeId},
    warp::{AddressedCall, UnsignedMessage, ValidationUptime},
};

/// A validator entry returned by `validators.getCurrentValidators`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentValidator {
    #[serde(rename = "validationID")]
    pub validation_id: String,
    #[serde(rename = "nodeID")]
    pub node_id: String,
    pub uptime_seconds: u64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_connected: bool,
}

impl CurrentValidator {
    /// The uptime of this validator as a [ValidationUptime] payload.
    pub fn validation_uptime(&self) -> Result<ValidationUptime> {
        let validation_id: Id = self
            .validation_id
            .parse()
            .with_context(|| format!("invalid validation ID {}", self.validation_id))?;
        Ok(ValidationUptime { validation_id: validation_id.0, uptime: self.uptime_seconds })
    }
}

#[derive(Deserialize)]
struct CurrentValidators {
    validators: Vec<CurrentValidator>,
}

/// Client for the `validators` API of an L1 node.
#[derive(Clone, Debug)]
pub struct ValidatorsClient {
    http: Client,
    url: Url,
}

impl ValidatorsClient {
    /// Client for the L1 chain served at `rpc_url`, e.g. `http://host:9650/ext/bc/<chain>`.
    pub fn new(rpc_url: &Url) -> Result<Self> {
        let url = Url::parse(&format!("{}/validators", rpc_url.as_str().trim_end_matches('/')))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, url })
    }

    pub async fn current_validator(&self, node_id: &NodeId) -> Result<CurrentValidator> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "validators.getCurrentValidators",
            "params": { "nodeIDs": [node_id.to_string()] },
        });
        let resp: Value = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to query validators at {}", self.url))?
            .json()
            .await
            .context("Invalid validators response")?;

        if let Some(err) = resp.get("error") {
            bail!("validators.getCurrentValidators failed: {err}");
        }
        let result = resp
            .get("result")
            .cloned()
            .ok_or_else(|| anyhow!("validators.getCurrentValidators returned no result"))?;
        let CurrentValidators { validators } = serde_json::from_value(result)?;
        validators.into_iter().next().ok_or_else(|| anyhow!("{node_id} is not a current validator"))
    }
}

/// Unsigned warp message attesting `uptime`, sourced from the L1 chain `source_chain_id`.
pub fn validation_uptime_message(
    network_id: u32,
    source_chain_id: B256,
    uptime: ValidationUptime,
) -> UnsignedMessage {
    let call = AddressedCall { source_address: Vec::new(), payload: uptime.to_bytes() };
    UnsignedMessage { network_id, source_chain_id, payload: call.to_bytes() }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    const NODE_ID: &str = "NodeID-P7oB2McjBGgW2NXXWVYjV8JEDFoW9xDE5";

    #[tokio::test]
    async fn fetches_uptime_for_node() {
        let server = MockServer::start();
        let validation_id = Id(B256::repeat_byte(0x0c));
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/ext/bc/chain/validators")
                .body_contains("validators.getCurrentValidators")
                .body_contains(NODE_ID);
            then.status(200).json_body(json!({
                "jsonrpc": "2.0", "id": 1,
                "result": { "validators": [{
                    "validationID": validation_id.to_string(),
                    "nodeID": NODE_ID,
                    "weight": 20,
                    "startTimestamp": 1_700_000_000u64,
                    "isActive": true,
                    "isL1Validator": true,
                    "isConnected": true,
                    "uptimePercentage": 99.5,
                    "uptimeSeconds": 86_000
                }]}
            }));
        });

        let client =
            ValidatorsClient::new(&Url::parse(&server.url("/ext/bc/chain")).unwrap()).unwrap();
        let validator = client.current_validator(&NODE_ID.parse().unwrap()).await.unwrap();
        mock.assert();

        let uptime = validator.validation_uptime().unwrap();
        assert_eq!(uptime, ValidationUptime { validation_id: validation_id.0, uptime: 86_000 });
        assert!(validator.is_active);
    }

    #[tokio::test]
    async fn unknown_node_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": { "validators": [] } }));
        });

        let client = ValidatorsClient::new(&Url::parse(&server.base_url()).unwrap()).unwrap();
        let err = client.current_validator(&NODE_ID.parse().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("is not a current validator"), "{err}");
    }

    #[test]
    fn message_wraps_uptime_in_addressed_call() {
        let chain = B256::repeat_byte(0x77);
        let uptime = ValidationUptime { validation_id: B256::repeat_byte(1), uptime: 3_600 };
        let message = validation_uptime_message(5, chain, uptime);

        let decoded = UnsignedMessage::from_bytes(&message.to_bytes()).unwrap();
        assert_eq!(decoded.network_id, 5);
        assert_eq!(decoded.source_chain_id, chain);
        let call = decoded.addressed_call().unwrap();
        assert!(call.source_address.is_empty());
        assert_eq!(call.payload, uptime.to_bytes());
        // codec version, type ID, validation ID, uptime
        assert_eq!(call.payload.len(), 2 + 4 + 32 + 8);
    }
}
