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

//! Client for the signature aggregation API.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ids::parse_hex;

#[derive(Serialize)]
struct AggregateRequest {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    justification: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregateResponse {
    signed_message: String,
}

/// Collects BLS signatures from the validators of a source chain over a warp message.
#[derive(Clone, Debug)]
pub struct SignatureAggregator {
    client: Client,
    url: Url,
    delay: Duration,
}

impl SignatureAggregator {
    /// Create a client posting to the aggregation endpoint at `url`.
    pub fn new(url: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("suzaku-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, url, delay: Duration::ZERO })
    }

    /// Wait `delay` before each aggregation request, so validators observe the source block.
    pub fn with_delay(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }

    /// Aggregate signatures over `message`, returning the signed warp message.
    pub async fn aggregate(&self, message: &[u8], justification: Option<&[u8]>) -> Result<Vec<u8>> {
        if !self.delay.is_zero() {
            tracing::info!(
                "Waiting {}s for validators to observe the message before aggregating signatures",
                self.delay.as_secs()
            );
            tokio::time::sleep(self.delay).await;
        }

        let body = AggregateRequest {
            message: hex::encode(message),
            justification: justification.map(hex::encode),
        };
        tracing::debug!(url = %self.url, message = %body.message, "requesting signature aggregation");

        let response = self
            .client
            .post(self.url.clone())
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send aggregation request to {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if text.is_empty() {
                bail!("Signature aggregation failed: HTTP {status}");
            }
            bail!("Signature aggregation failed: {text}");
        }

        let AggregateResponse { signed_message } = response
            .json()
            .await
            .with_context(|| format!("Failed to parse aggregation response from {}", self.url))?;
        parse_hex(&signed_message).context("Aggregator returned an invalid signed message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn aggregates_with_justification() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/aggregateSignatures")
                .json_body(json!({ "message": "0a0b", "justification": "ff" }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "signedMessage": "0a0b0c" }));
        });

        let aggregator =
            SignatureAggregator::new(Url::parse(&server.url("/aggregateSignatures")).unwrap())
                .unwrap();
        let signed = aggregator.aggregate(&[0x0a, 0x0b], Some(&[0xff])).await.unwrap();

        mock.assert();
        assert_eq!(signed, vec![0x0a, 0x0b, 0x0c]);
    }

    #[tokio::test]
    async fn omits_missing_justification() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).json_body(json!({ "message": "01" }));
            then.status(200).json_body(json!({ "signedMessage": "0x0102" }));
        });

        let aggregator = SignatureAggregator::new(Url::parse(&server.base_url()).unwrap()).unwrap();
        let signed = aggregator.aggregate(&[0x01], None).await.unwrap();

        mock.assert();
        assert_eq!(signed, vec![0x01, 0x02]);
    }

    #[tokio::test]
    async fn surfaces_error_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(500).body("not enough stake signed");
        });

        let aggregator = SignatureAggregator::new(Url::parse(&server.base_url()).unwrap()).unwrap();
        let err = aggregator.aggregate(&[0x01], None).await.unwrap_err();
        assert!(err.to_string().contains("not enough stake signed"), "{err}");
    }
}
