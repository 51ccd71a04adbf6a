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

//! Completion of validator lifecycle operations started on the middleware.
//!
//! Each flow reads the warp message emitted by the initiating transaction, has it signed by the
//! L1 validators, applies it on the P-Chain, and then proves the P-Chain outcome back to the
//! middleware with a second signed warp message carried in the access list.

use std::time::Duration;

use alloy::{
    primitives::{Address, FixedBytes, B256},
    providers::{DynProvider, Provider},
    signers::local::PrivateKeySigner,
};
use anyhow::{bail, ensure, Context};
use clap::Args;
use suzaku_sdk::{
    contracts::IAvalancheL1Middleware::{self, IAvalancheL1MiddlewareErrors},
    extract_warp_message, pack_warp_into_access_list,
    warp::{registration_justification, L1ValidatorRegistration, L1ValidatorWeight},
    Id, NodeId, PChainClient, SignatureAggregator, TxBody, UnsignedMessage, ValidatorMessage,
};

use crate::{
    config::GlobalConfig,
    parse::{format_avax, parse_avax, parse_bls_pop, parse_seconds},
    tx::{TxArgs, Writer},
};

/// Options of the P-Chain leg of a completion.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct PChainLegArgs {
    /// Private key paying for the P-Chain transaction, defaults to the signer.
    #[clap(long, env = "PCHAIN_TX_PRIVATE_KEY", hide_env_values = true)]
    pub pchain_tx_private_key: Option<PrivateKeySigner>,
    /// Seconds to wait before each signature aggregation.
    #[clap(long, value_parser = parse_seconds, default_value = "30")]
    pub aggregation_delay: Duration,
}

/// Complete the registration of a node added with `add-node`.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct CompleteValidatorRegistration {
    /// Operator owning the node.
    pub operator: Address,
    /// Node ID, e.g. `NodeID-...`.
    pub node_id: NodeId,
    /// Hash of the `add-node` transaction.
    pub add_node_tx_hash: B256,
    /// BLS proof of possession of the node.
    #[clap(value_parser = parse_bls_pop)]
    pub bls_pop: FixedBytes<96>,
    /// Initial P-Chain balance of the validator, in AVAX.
    #[clap(long, value_parser = parse_avax, default_value = "0.1")]
    pub initial_balance: u64,
    #[clap(flatten)]
    pub pchain: PChainLegArgs,
    #[clap(flatten)]
    pub tx: TxArgs,
}

/// Complete the removal of a node removed with `remove-node`.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct CompleteValidatorRemoval {
    /// Node ID, e.g. `NodeID-...`.
    pub node_id: NodeId,
    /// Hash of the `remove-node` transaction.
    pub remove_node_tx_hash: B256,
    /// Subnet ID of the L1, to recognize bootstrap validators.
    #[clap(long)]
    pub subnet_id: Option<Id>,
    /// First block searched for the registration message of the validator.
    #[clap(long, default_value_t = 0)]
    pub from_block: u64,
    #[clap(flatten)]
    pub pchain: PChainLegArgs,
    #[clap(flatten)]
    pub tx: TxArgs,
}

/// Complete a stake update started with `init-stake-update`.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct CompleteStakeUpdate {
    /// Node ID, e.g. `NodeID-...`.
    pub node_id: NodeId,
    /// Hash of the `init-stake-update` transaction.
    pub stake_update_tx_hash: B256,
    #[clap(flatten)]
    pub pchain: PChainLegArgs,
    #[clap(flatten)]
    pub tx: TxArgs,
}

/// Shared state of a completion flow.
struct Completion {
    provider: DynProvider,
    aggregator: SignatureAggregator,
    pchain: PChainClient,
    pchain_signer: PrivateKeySigner,
    poll_interval: Duration,
    poll_retries: u32,
}

impl Completion {
    /// Connect the EVM writer and resolve both signers before anything reaches the P-Chain.
    ///
    /// Calldata mode is refused.
    async fn start(
        global_config: &GlobalConfig,
        args: &PChainLegArgs,
        tx: &TxArgs,
    ) -> anyhow::Result<(Self, Writer)> {
        ensure!(
            !tx.calldata,
            "--calldata is not supported when completing a validator operation, as it issues a P-Chain transaction; \
             use `suzaku pchain` to issue it and send the completion from a signing wallet"
        );
        let writer = Writer::connect(global_config, tx).await?;
        let pchain_signer = match &args.pchain_tx_private_key {
            Some(signer) => signer.clone(),
            None => global_config.require_signer().await?,
        };
        let flow = Self {
            provider: writer.provider(),
            aggregator: global_config.aggregator(args.aggregation_delay)?,
            pchain: global_config.pchain_client()?,
            pchain_signer,
            poll_interval: global_config.pchain_poll_interval,
            poll_retries: global_config.pchain_poll_retries,
        };
        Ok((flow, writer))
    }

    /// Read the unsigned warp message emitted by `tx_hash` and decode its validator payload.
    async fn warp_message(&self, tx_hash: B256) -> anyhow::Result<(Vec<u8>, ValidatorMessage)> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .with_context(|| format!("Failed to get receipt of transaction {tx_hash}"))?
            .with_context(|| format!("Transaction {tx_hash} not found"))?;
        let message = extract_warp_message(&receipt)?.to_vec();
        let decoded = ValidatorMessage::from_unsigned_message(&message)
            .context("Failed to decode the warp message of the transaction")?;
        tracing::info!("Validation ID: {}", Id(decoded.validation_id()));
        Ok((message, decoded))
    }

    /// Issue `body` on the P-Chain and wait for it to be committed.
    async fn issue(&self, body: TxBody) -> anyhow::Result<()> {
        let address = self.pchain.address_of(&self.pchain_signer)?;
        let balance = self.pchain.get_balance(&address).await?;
        tracing::info!("P-Chain address {address} holds {} AVAX", format_avax(balance.unlocked));

        let issued = self.pchain.issue(&self.pchain_signer, body).await?;
        tracing::info!(
            "Issued P-Chain transaction {} (fee {} AVAX)",
            issued.tx_id,
            format_avax(issued.fee)
        );
        self.pchain.wait_for_tx(&issued.tx_id, self.poll_interval, self.poll_retries).await?;
        Ok(())
    }

    /// Sign a message sourced from the P-Chain.
    async fn sign_pchain_message(
        &self,
        payload: Vec<u8>,
        justification: Option<&[u8]>,
    ) -> anyhow::Result<Vec<u8>> {
        let message = UnsignedMessage::from_pchain(self.pchain.network_id(), payload);
        self.aggregator
            .aggregate(&message.to_bytes(), justification)
            .await
            .context("Failed to aggregate signatures over the P-Chain message")
    }
}

impl CompleteValidatorRegistration {
    /// Run the [CompleteValidatorRegistration] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let (flow, writer) = Completion::start(global_config, &self.pchain, &self.tx).await?;
        let (message, decoded) = flow.warp_message(self.add_node_tx_hash).await?;
        let ValidatorMessage::Register(register) = decoded else {
            bail!("Transaction {} did not emit a RegisterL1Validator message", self.add_node_tx_hash);
        };
        let validation_id = register.validation_id();

        let signed = flow
            .aggregator
            .aggregate(&message, None)
            .await
            .context("Failed to aggregate signatures over the RegisterL1Validator message")?;
        flow.issue(TxBody::RegisterL1Validator {
            balance: self.initial_balance,
            proof_of_possession: self.bls_pop.0,
            message: signed,
        })
        .await?;

        let registration = L1ValidatorRegistration { validation_id, registered: true };
        let signed = flow.sign_pchain_message(registration.to_bytes(), None).await?;

        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract
            .completeValidatorRegistration(self.operator, self.node_id.to_bytes32(), 0)
            .access_list(pack_warp_into_access_list(&signed));
        if writer
            .execute::<IAvalancheL1MiddlewareErrors, _>("Complete Validator Registration", call)
            .await?
            .is_some()
        {
            tracing::info!("Node {} registered, validation ID {}", self.node_id, Id(validation_id));
        }
        Ok(())
    }
}

impl CompleteValidatorRemoval {
    /// Run the [CompleteValidatorRemoval] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let (flow, writer) = Completion::start(global_config, &self.pchain, &self.tx).await?;
        let (message, decoded) = flow.warp_message(self.remove_node_tx_hash).await?;
        let ValidatorMessage::Weight(weight) = decoded else {
            bail!("Transaction {} did not emit an L1ValidatorWeight message", self.remove_node_tx_hash);
        };
        warn_on_nonzero_removal_weight(&weight);

        let signed = flow
            .aggregator
            .aggregate(&message, None)
            .await
            .context("Failed to aggregate signatures over the L1ValidatorWeight message")?;
        flow.issue(TxBody::SetL1ValidatorWeight { message: signed }).await?;

        let justification = registration_justification(
            &flow.provider,
            weight.validation_id,
            self.subnet_id.map(|id| id.0),
            self.from_block,
        )
        .await?;
        let registration =
            L1ValidatorRegistration { validation_id: weight.validation_id, registered: false };
        let signed =
            flow.sign_pchain_message(registration.to_bytes(), Some(&justification)).await?;

        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call =
            contract.completeValidatorRemoval(0).access_list(pack_warp_into_access_list(&signed));
        if writer
            .execute::<IAvalancheL1MiddlewareErrors, _>("Complete Validator Removal", call)
            .await?
            .is_some()
        {
            tracing::info!("Node {} removed", self.node_id);
        }
        Ok(())
    }
}

/// Removal messages are expected to set the weight to 0.
fn warn_on_nonzero_removal_weight(weight: &L1ValidatorWeight) {
    if weight.weight != 0 {
        tracing::warn!("Removal message sets weight {} instead of 0", weight.weight);
    }
}

impl CompleteStakeUpdate {
    /// Run the [CompleteStakeUpdate] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let (flow, writer) = Completion::start(global_config, &self.pchain, &self.tx).await?;
        let (message, decoded) = flow.warp_message(self.stake_update_tx_hash).await?;
        let ValidatorMessage::Weight(weight) = decoded else {
            bail!(
                "Transaction {} did not emit an L1ValidatorWeight message",
                self.stake_update_tx_hash
            );
        };

        let signed = flow
            .aggregator
            .aggregate(&message, None)
            .await
            .context("Failed to aggregate signatures over the L1ValidatorWeight message")?;
        flow.issue(TxBody::SetL1ValidatorWeight { message: signed }).await?;

        let signed = flow.sign_pchain_message(weight.to_bytes(), None).await?;

        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract
            .completeStakeUpdate(self.node_id.to_bytes32(), 0)
            .access_list(pack_warp_into_access_list(&signed));
        if writer
            .execute::<IAvalancheL1MiddlewareErrors, _>("Complete Stake Update", call)
            .await?
            .is_some()
        {
            tracing::info!(
                "Weight of node {} updated to {} (nonce {})",
                self.node_id,
                weight.weight,
                weight.nonce
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy::sol_types::SolEvent;
    use clap::Parser;
    use httpmock::prelude::*;
    use serde_json::json;
    use suzaku_sdk::{
        codec::Packer, contracts::IWarpMessenger, ids, warp::WARP_PRECOMPILE_ADDRESS,
    };
    use tracing_test::traced_test;

    use super::*;
    use crate::commands::middleware::{MiddlewareArgs, MiddlewareCommands};

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(flatten)]
        config: GlobalConfig,
        #[command(flatten)]
        args: MiddlewareArgs,
    }

    const EWOQ_KEY: &str = "0x56289e99c94b6912bfc12adc093c9b51124f0dc54ac7a766b2bc5ccf558d8027";
    const MIDDLEWARE: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const NODE_ID: &str = "NodeID-P7oB2McjBGgW2NXXWVYjV8JEDFoW9xDE5";
    const TX_HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
    const ZERO_ID: &str = "11111111111111111111111111111111LpoYY";

    fn parse(server: &MockServer, args: &[&str]) -> Cli {
        let rpc_url = server.url("/rpc");
        let aggregator_url = server.url("/aggregate");
        let pchain_url = server.base_url();
        let mut argv = vec![
            "suzaku",
            "--network",
            "anvil",
            "--rpc-url",
            &rpc_url,
            "--signature-aggregator-url",
            &aggregator_url,
            "--pchain-api-url",
            &pchain_url,
            "--pchain-poll-interval",
            "0",
            MIDDLEWARE,
        ];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    async fn completion(server: &MockServer) -> Completion {
        let cli = parse(
            server,
            &["complete-stake-update", NODE_ID, TX_HASH, "--aggregation-delay", "0", "-k", EWOQ_KEY],
        );
        let MiddlewareCommands::CompleteStakeUpdate(cmd) = cli.args.command else {
            panic!("expected complete-stake-update");
        };
        let (flow, _writer) = Completion::start(&cli.config, &cmd.pchain, &cmd.tx).await.unwrap();
        flow
    }

    fn completion_commands(pop: &str) -> Vec<Vec<&str>> {
        vec![
            vec!["complete-validator-registration", MIDDLEWARE, NODE_ID, TX_HASH, pop],
            vec!["complete-validator-removal", NODE_ID, TX_HASH],
            vec!["complete-stake-update", NODE_ID, TX_HASH],
        ]
    }

    fn receipt_with_warp_message(message: &[u8]) -> serde_json::Value {
        let event = IWarpMessenger::SendWarpMessage {
            sourceAddress: MIDDLEWARE.parse().unwrap(),
            unsignedMessageID: UnsignedMessage::from_bytes(message).unwrap().id(),
            message: message.to_vec().into(),
        };
        let log = event.encode_log_data();
        let block_hash = B256::repeat_byte(0x0b);
        json!({
            "transactionHash": TX_HASH,
            "transactionIndex": "0x0",
            "blockHash": block_hash,
            "blockNumber": "0x1",
            "from": MIDDLEWARE,
            "to": MIDDLEWARE,
            "cumulativeGasUsed": "0x5208",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x1",
            "contractAddress": null,
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "type": "0x2",
            "status": "0x1",
            "logs": [{
                "address": WARP_PRECOMPILE_ADDRESS,
                "topics": log.topics(),
                "data": log.data,
                "blockHash": block_hash,
                "blockNumber": "0x1",
                "transactionHash": TX_HASH,
                "transactionIndex": "0x0",
                "logIndex": "0x0",
                "removed": false
            }]
        })
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
    async fn calldata_mode_sends_nothing() {
        let server = MockServer::start();
        let any = server.mock(|_, then| {
            then.status(500);
        });

        let pop = "22".repeat(96);
        for command in completion_commands(&pop) {
            let mut args = command.clone();
            args.extend(["-k", EWOQ_KEY, "--calldata"]);
            let cli = parse(&server, &args);
            let err = cli.args.run(&cli.config).await.unwrap_err();
            assert!(err.to_string().contains("--calldata"), "{}: {err}", command[0]);
        }
        any.assert_hits(0);
    }

    #[tokio::test]
    async fn missing_signer_fails_before_pchain() {
        let server = MockServer::start();
        let issue = server.mock(|when, then| {
            when.method(POST).body_contains("platform.issueTx");
            then.status(200)
                .json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": { "txID": ZERO_ID } }));
        });
        let any = server.mock(|_, then| {
            then.status(500);
        });

        let pop = "22".repeat(96);
        for command in completion_commands(&pop) {
            let mut args = command.clone();
            args.extend(["--pchain-tx-private-key", EWOQ_KEY, "--aggregation-delay", "0"]);
            let cli = parse(&server, &args);
            let err = cli.args.run(&cli.config).await.unwrap_err();
            assert!(err.to_string().contains("Private key not provided"), "{}: {err}", command[0]);
        }
        issue.assert_hits(0);
        any.assert_hits(0);
    }

    #[tokio::test]
    async fn reads_warp_message_of_transaction() {
        let server = MockServer::start();
        let weight = L1ValidatorWeight { validation_id: B256::repeat_byte(0x42), nonce: 3, weight: 0 };
        let message = UnsignedMessage::from_pchain(12345, weight.to_bytes()).to_bytes();
        let receipt = server.mock(|when, then| {
            when.method(POST).path("/rpc").body_contains("eth_getTransactionReceipt");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0", "id": 0, "result": receipt_with_warp_message(&message)
            }));
        });

        let flow = completion(&server).await;
        let (raw, decoded) = flow.warp_message(TX_HASH.parse().unwrap()).await.unwrap();

        receipt.assert();
        assert_eq!(raw, message);
        assert_eq!(decoded, ValidatorMessage::Weight(weight));
    }

    #[tokio::test]
    async fn missing_transaction_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/rpc").body_contains("eth_getTransactionReceipt");
            then.status(200).json_body(json!({ "jsonrpc": "2.0", "id": 0, "result": null }));
        });

        let flow = completion(&server).await;
        let err = flow.warp_message(TX_HASH.parse().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("not found"), "{err}");
    }

    #[tokio::test]
    async fn issue_waits_for_commit() {
        let server = MockServer::start();
        let flow = completion(&server).await;
        let address = flow.pchain.address_of(&flow.pchain_signer).unwrap();
        let avax = B256::repeat_byte(0x3d);

        server.mock(|when, then| {
            when.method(POST).path("/ext/bc/P").body_contains("platform.getBalance");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0", "id": 1,
                "result": { "balance": "1000000000", "unlocked": "1000000000" }
            }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/ext/bc/P").body_contains("platform.getStakingAssetID");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0", "id": 1, "result": { "assetID": Id(avax).to_string() }
            }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/ext/bc/P").body_contains("platform.getFeeState");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0", "id": 1,
                "result": { "capacity": "1", "excess": "0", "price": "1" }
            }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/ext/bc/P").body_contains("platform.getUTXOs");
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
            when.method(POST).path("/ext/bc/P").body_contains("platform.issueTx");
            then.status(200)
                .json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": { "txID": ZERO_ID } }));
        });
        let status = server.mock(|when, then| {
            when.method(POST).path("/ext/bc/P").body_contains("platform.getTxStatus");
            then.status(200)
                .json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": { "status": "Committed" } }));
        });

        let body = TxBody::IncreaseL1ValidatorBalance {
            validation_id: B256::repeat_byte(0x55),
            balance: 100_000_000,
        };
        flow.issue(body).await.unwrap();

        issue.assert();
        status.assert();
    }

    #[tokio::test]
    async fn signs_pchain_message_with_justification() {
        let server = MockServer::start();
        let registration =
            L1ValidatorRegistration { validation_id: B256::repeat_byte(0x42), registered: false };
        let unsigned = UnsignedMessage::from_pchain(12345, registration.to_bytes()).to_bytes();
        let aggregate = server.mock(|when, then| {
            when.method(POST)
                .path("/aggregate")
                .body_contains(hex::encode(&unsigned))
                .body_contains(r#""justification":"abcd""#);
            then.status(200).json_body(json!({ "signedMessage": "0x0102" }));
        });

        let flow = completion(&server).await;
        let signed =
            flow.sign_pchain_message(registration.to_bytes(), Some(&[0xab, 0xcd])).await.unwrap();

        aggregate.assert();
        assert_eq!(signed, vec![0x01, 0x02]);
    }

    #[test]
    #[traced_test]
    fn removal_with_nonzero_weight_warns() {
        let validation_id = B256::repeat_byte(0x42);
        warn_on_nonzero_removal_weight(&L1ValidatorWeight { validation_id, nonce: 1, weight: 0 });
        assert!(!logs_contain("instead of 0"));

        warn_on_nonzero_removal_weight(&L1ValidatorWeight { validation_id, nonce: 2, weight: 7 });
        assert!(logs_contain("Removal message sets weight 7 instead of 0"));
    }
}
