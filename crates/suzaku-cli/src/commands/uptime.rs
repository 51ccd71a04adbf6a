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

//! Validator uptime: signed uptime proofs and the uptime tracker contract.

use std::time::Duration;

use alloy::primitives::{aliases::U48, Address, Bytes};
use anyhow::{ensure, Context};
use clap::Subcommand;
use suzaku_sdk::{
    contracts::IUptimeTracker::{self, IUptimeTrackerErrors},
    extract_tx_log, pack_warp_into_access_list, validation_uptime_message, Id, NodeId,
    ValidatorsClient,
};
use url::Url;

use crate::{
    config::GlobalConfig,
    display::table,
    parse::parse_seconds,
    tx::{read, TxArgs, Writer},
};

type Errors = IUptimeTrackerErrors;

/// Uptime commands.
#[derive(Subcommand, Clone, Debug)]
pub enum UptimeCommands {
    /// Build the uptime message of a validator and have it signed by the L1 validators.
    GetValidationUptimeMessage {
        /// RPC URL of an L1 node, e.g. `http://127.0.0.1:9650/ext/bc/<chain-id>`.
        rpc_url: Url,
        /// Node ID, e.g. `NodeID-...`.
        node_id: NodeId,
        /// Blockchain ID of the L1.
        source_chain_id: Id,
        /// Seconds to wait before the signature aggregation.
        #[clap(long, value_parser = parse_seconds, default_value = "0")]
        aggregation_delay: Duration,
    },
    /// Submit a signed uptime message to the uptime tracker.
    ComputeValidatorUptime {
        /// Uptime tracker address.
        tracker: Address,
        /// Signed uptime message, hex encoded.
        signed_message: Bytes,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Fetch, sign and submit the uptime of a validator.
    ReportValidatorUptime {
        /// RPC URL of an L1 node.
        rpc_url: Url,
        /// Blockchain ID of the L1.
        source_chain_id: Id,
        /// Node ID, e.g. `NodeID-...`.
        node_id: NodeId,
        /// Uptime tracker address.
        tracker: Address,
        /// Seconds to wait before the signature aggregation.
        #[clap(long, value_parser = parse_seconds, default_value = "0")]
        aggregation_delay: Duration,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Compute the uptime of an operator in an epoch from its validators.
    ComputeOperatorUptime {
        /// Uptime tracker address.
        tracker: Address,
        /// Operator address.
        operator: Address,
        /// Epoch.
        epoch: U48,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Compute the uptime of an operator for every epoch of a range, bounds included.
    ComputeOperatorUptimeRange {
        /// Uptime tracker address.
        tracker: Address,
        /// Operator address.
        operator: Address,
        /// First epoch.
        start: u64,
        /// Last epoch.
        end: u64,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Get the recorded uptime of a validator in an epoch.
    GetValidatorUptime {
        /// Uptime tracker address.
        tracker: Address,
        /// Validation ID, CB58 or hex.
        validation_id: Id,
        /// Epoch.
        epoch: U48,
    },
    /// Get the computed uptime of an operator in an epoch.
    GetOperatorUptime {
        /// Uptime tracker address.
        tracker: Address,
        /// Operator address.
        operator: Address,
        /// Epoch.
        epoch: U48,
    },
    /// Check whether the uptime of a validator is recorded for an epoch.
    CheckValidatorUptimeSet {
        /// Uptime tracker address.
        tracker: Address,
        /// Validation ID, CB58 or hex.
        validation_id: Id,
        /// Epoch.
        epoch: U48,
    },
    /// Check whether the uptime of an operator is computed for an epoch.
    CheckOperatorUptimeSet {
        /// Uptime tracker address.
        tracker: Address,
        /// Operator address.
        operator: Address,
        /// Epoch.
        epoch: U48,
    },
    /// Get the last uptime checkpoint of a validator.
    LastCheckpoint {
        /// Uptime tracker address.
        tracker: Address,
        /// Validation ID, CB58 or hex.
        validation_id: Id,
    },
}

/// Fetch the uptime of `node_id` from an L1 node and aggregate signatures over it.
async fn signed_uptime_message(
    global_config: &GlobalConfig,
    rpc_url: &Url,
    node_id: &NodeId,
    source_chain_id: &Id,
    aggregation_delay: Duration,
) -> anyhow::Result<Vec<u8>> {
    let validator = ValidatorsClient::new(rpc_url)?.current_validator(node_id).await?;
    let uptime = validator.validation_uptime()?;
    tracing::info!(
        "Validator {node_id} ({}) has {}s of uptime",
        validator.validation_id,
        uptime.uptime
    );

    let message =
        validation_uptime_message(global_config.profile().network_id, source_chain_id.0, uptime);
    let unsigned = message.to_bytes();
    tracing::info!("Unsigned uptime message: 0x{}", hex::encode(&unsigned));

    global_config
        .aggregator(aggregation_delay)?
        .aggregate(&unsigned, None)
        .await
        .context("Failed to aggregate signatures over the uptime message")
}

async fn submit_uptime(
    global_config: &GlobalConfig,
    tracker: Address,
    signed: &[u8],
    tx: &TxArgs,
) -> anyhow::Result<()> {
    let writer = Writer::connect(global_config, tx).await?;
    let contract = IUptimeTracker::new(tracker, writer.provider());
    let call = contract.computeValidatorUptime(0).access_list(pack_warp_into_access_list(signed));
    if let Some(receipt) = writer.execute::<Errors, _>("Compute Validator Uptime", call).await? {
        let log = extract_tx_log::<IUptimeTracker::ValidatorUptimeComputed>(&receipt)?;
        tracing::info!(
            "Recorded {}s of uptime for {} over {} epochs from epoch {}",
            log.data().uptimeSecondsAdded,
            Id(log.data().validationID),
            log.data().numberOfEpochs,
            log.data().firstEpoch
        );
    }
    Ok(())
}

impl UptimeCommands {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        match self {
            Self::GetValidationUptimeMessage {
                rpc_url,
                node_id,
                source_chain_id,
                aggregation_delay,
            } => {
                let signed = signed_uptime_message(
                    global_config,
                    rpc_url,
                    node_id,
                    source_chain_id,
                    *aggregation_delay,
                )
                .await?;
                tracing::info!("Signed uptime message:");
                println!("0x{}", hex::encode(signed));
            }
            Self::ComputeValidatorUptime { tracker, signed_message, tx } => {
                submit_uptime(global_config, *tracker, signed_message, tx).await?;
            }
            Self::ReportValidatorUptime {
                rpc_url,
                source_chain_id,
                node_id,
                tracker,
                aggregation_delay,
                tx,
            } => {
                let signed = signed_uptime_message(
                    global_config,
                    rpc_url,
                    node_id,
                    source_chain_id,
                    *aggregation_delay,
                )
                .await?;
                submit_uptime(global_config, *tracker, &signed, tx).await?;
            }
            Self::ComputeOperatorUptime { tracker, operator, epoch, tx } => {
                compute_operator_uptime(global_config, *tracker, *operator, *epoch, tx).await?;
            }
            Self::ComputeOperatorUptimeRange { tracker, operator, start, end, tx } => {
                ensure!(start <= end, "Start epoch {start} is after end epoch {end}");
                for epoch in *start..=*end {
                    let epoch = U48::try_from(epoch)
                        .with_context(|| format!("Epoch {epoch} does not fit in 48 bits"))?;
                    compute_operator_uptime(global_config, *tracker, *operator, epoch, tx).await?;
                }
            }
            Self::GetValidatorUptime { tracker, validation_id, epoch } => {
                let contract = IUptimeTracker::new(*tracker, global_config.read_provider().await?);
                let result = contract.validatorUptimePerEpoch(*epoch, validation_id.0).call().await;
                if let Some(uptime) = read::<Errors, _>("validator uptime", result) {
                    tracing::info!("Uptime of {validation_id} in epoch {epoch}: {uptime}s");
                }
            }
            Self::GetOperatorUptime { tracker, operator, epoch } => {
                let contract = IUptimeTracker::new(*tracker, global_config.read_provider().await?);
                let result = contract.operatorUptimePerEpoch(*epoch, *operator).call().await;
                if let Some(uptime) = read::<Errors, _>("operator uptime", result) {
                    tracing::info!("Uptime of operator {operator} in epoch {epoch}: {uptime}s");
                }
            }
            Self::CheckValidatorUptimeSet { tracker, validation_id, epoch } => {
                let contract = IUptimeTracker::new(*tracker, global_config.read_provider().await?);
                let result = contract.isValidatorUptimeSet(*epoch, validation_id.0).call().await;
                if let Some(set) = read::<Errors, _>("validator uptime status", result) {
                    tracing::info!("Uptime of {validation_id} set for epoch {epoch}: {set}");
                }
            }
            Self::CheckOperatorUptimeSet { tracker, operator, epoch } => {
                let contract = IUptimeTracker::new(*tracker, global_config.read_provider().await?);
                let result = contract.isOperatorUptimeSet(*epoch, *operator).call().await;
                if let Some(set) = read::<Errors, _>("operator uptime status", result) {
                    tracing::info!("Uptime of operator {operator} set for epoch {epoch}: {set}");
                }
            }
            Self::LastCheckpoint { tracker, validation_id } => {
                let contract = IUptimeTracker::new(*tracker, global_config.read_provider().await?);
                let result = contract.getLastUptimeCheckpoint(validation_id.0).call().await;
                if let Some(checkpoint) = read::<Errors, _>("last uptime checkpoint", result) {
                    let rows = [
                        vec!["Remaining uptime".to_string(), checkpoint.remainingUptime.to_string()],
                        vec!["Attributed uptime".to_string(), checkpoint.attributedUptime.to_string()],
                        vec!["Timestamp".to_string(), checkpoint.timestamp.to_string()],
                    ];
                    println!("{}", table(&["Checkpoint", "Value"], rows));
                }
            }
        }
        Ok(())
    }
}

async fn compute_operator_uptime(
    global_config: &GlobalConfig,
    tracker: Address,
    operator: Address,
    epoch: U48,
    tx: &TxArgs,
) -> anyhow::Result<()> {
    let writer = Writer::connect(global_config, tx).await?;
    let contract = IUptimeTracker::new(tracker, writer.provider());
    let call = contract.computeOperatorUptimeAt(operator, epoch);
    if let Some(receipt) = writer.execute::<Errors, _>("Compute Operator Uptime", call).await? {
        let log = extract_tx_log::<IUptimeTracker::OperatorUptimeComputed>(&receipt)?;
        tracing::info!("Uptime of operator {operator} in epoch {epoch}: {}s", log.data().uptime);
    }
    Ok(())
}
