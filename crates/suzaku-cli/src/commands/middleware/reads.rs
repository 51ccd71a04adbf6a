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

//! Read-only queries of a middleware.

use alloy::{
    primitives::{
        aliases::{U48, U96},
        Address,
    },
    providers::DynProvider,
};
use clap::Subcommand;
use suzaku_sdk::{
    contracts::IAvalancheL1Middleware::{self, IAvalancheL1MiddlewareInstance},
    Id, NodeId,
};

use super::Errors;
use crate::{config::GlobalConfig, display::table, tx::read};

/// Queries of epochs, stakes and nodes of a middleware.
#[derive(Subcommand, Clone, Debug)]
pub enum MiddlewareReads {
    /// Get the stake of an operator for an epoch and asset class.
    GetOperatorStake {
        /// Operator address.
        operator: Address,
        /// Epoch.
        epoch: U48,
        /// Asset class.
        asset_class: U96,
    },
    /// Get the current epoch.
    GetCurrentEpoch,
    /// Get the start timestamp of an epoch.
    GetEpochStartTs {
        /// Epoch.
        epoch: U48,
    },
    /// List the active nodes of an operator in an epoch.
    GetActiveNodesForEpoch {
        /// Operator address.
        operator: Address,
        /// Epoch.
        epoch: U48,
    },
    /// Get the number of nodes of an operator.
    GetOperatorNodesLength {
        /// Operator address.
        operator: Address,
    },
    /// Get the cached stake of a validator in an epoch.
    GetNodeStakeCache {
        /// Epoch.
        epoch: U48,
        /// Validation ID, CB58 or hex.
        validation_id: Id,
    },
    /// Get the locked stake of an operator.
    GetOperatorLockedStake {
        /// Operator address.
        operator: Address,
    },
    /// Check whether a validator is pending removal.
    NodePendingRemoval {
        /// Validation ID, CB58 or hex.
        validation_id: Id,
    },
    /// Check whether a validator has a pending stake update.
    NodePendingUpdate {
        /// Validation ID, CB58 or hex.
        validation_id: Id,
    },
    /// Get the stake used by the nodes of an operator in an epoch.
    GetOperatorUsedStake {
        /// Operator address.
        operator: Address,
        /// Epoch.
        epoch: U48,
        /// Asset class.
        asset_class: U96,
    },
    /// Get the stake an operator can still allocate to new nodes.
    GetOperatorAvailableStake {
        /// Operator address.
        operator: Address,
    },
    /// List every operator of the middleware.
    GetAllOperators,
}

impl MiddlewareReads {
    /// Run the query. Read failures are logged and do not fail the command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let contract = reader(middleware, global_config).await?;
        match self {
            Self::GetOperatorStake { operator, epoch, asset_class } => {
                let result = contract.getOperatorStake(*operator, *epoch, *asset_class).call().await;
                if let Some(stake) = read::<Errors, _>("operator stake", result) {
                    tracing::info!(
                        "Stake of operator {operator} in epoch {epoch} for asset class {asset_class}: {stake}"
                    );
                }
            }
            Self::GetCurrentEpoch => {
                let result = contract.getCurrentEpoch().call().await;
                if let Some(epoch) = read::<Errors, _>("current epoch", result) {
                    tracing::info!("Current epoch: {epoch}");
                }
            }
            Self::GetEpochStartTs { epoch } => {
                let result = contract.getEpochStartTs(*epoch).call().await;
                if let Some(ts) = read::<Errors, _>("epoch start", result) {
                    let start = chrono::DateTime::from_timestamp(ts.to::<i64>(), 0)
                        .map(|dt| dt.to_rfc3339())
                        .unwrap_or_default();
                    tracing::info!("Epoch {epoch} starts at {ts} ({start})");
                }
            }
            Self::GetActiveNodesForEpoch { operator, epoch } => {
                let result = contract.getActiveNodesForEpoch(*operator, *epoch).call().await;
                if let Some(nodes) = read::<Errors, _>("active nodes", result) {
                    tracing::info!("{} active nodes of {operator} in epoch {epoch}", nodes.len());
                    let rows = nodes
                        .iter()
                        .map(|node| vec![NodeId::from_bytes32(*node).to_string(), node.to_string()]);
                    println!("{}", table(&["Node ID", "Bytes32"], rows));
                }
            }
            Self::GetOperatorNodesLength { operator } => {
                let result = contract.getOperatorNodesLength(*operator).call().await;
                if let Some(count) = read::<Errors, _>("operator node count", result) {
                    tracing::info!("Operator {operator} has {count} nodes");
                }
            }
            Self::GetNodeStakeCache { epoch, validation_id } => {
                let result = contract.nodeStakeCache(*epoch, validation_id.0).call().await;
                if let Some(stake) = read::<Errors, _>("node stake cache", result) {
                    tracing::info!("Cached stake of {validation_id} in epoch {epoch}: {stake}");
                }
            }
            Self::GetOperatorLockedStake { operator } => {
                let result = contract.operatorLockedStake(*operator).call().await;
                if let Some(stake) = read::<Errors, _>("operator locked stake", result) {
                    tracing::info!("Locked stake of operator {operator}: {stake}");
                }
            }
            Self::NodePendingRemoval { validation_id } => {
                let result = contract.nodePendingRemoval(validation_id.0).call().await;
                if let Some(pending) = read::<Errors, _>("node pending removal", result) {
                    tracing::info!("Validator {validation_id} pending removal: {pending}");
                }
            }
            Self::NodePendingUpdate { validation_id } => {
                let result = contract.nodePendingUpdate(validation_id.0).call().await;
                if let Some(pending) = read::<Errors, _>("node pending update", result) {
                    tracing::info!("Validator {validation_id} pending update: {pending}");
                }
            }
            Self::GetOperatorUsedStake { operator, epoch, asset_class } => {
                let result = contract
                    .getOperatorUsedStakeCachedPerEpoch(*epoch, *operator, *asset_class)
                    .call()
                    .await;
                if let Some(stake) = read::<Errors, _>("operator used stake", result) {
                    tracing::info!(
                        "Used stake of operator {operator} in epoch {epoch} for asset class {asset_class}: {stake}"
                    );
                }
            }
            Self::GetOperatorAvailableStake { operator } => {
                let result = contract.getOperatorAvailableStake(*operator).call().await;
                if let Some(stake) = read::<Errors, _>("operator available stake", result) {
                    tracing::info!("Available stake of operator {operator}: {stake}");
                }
            }
            Self::GetAllOperators => {
                let result = contract.getAllOperators().call().await;
                if let Some(operators) = read::<Errors, _>("operators", result) {
                    tracing::info!("{} operators", operators.len());
                    println!("{}", table(&["Operator"], operators.iter().map(|op| vec![op])));
                }
            }
        }
        Ok(())
    }
}

async fn reader(
    middleware: Address,
    global_config: &GlobalConfig,
) -> anyhow::Result<IAvalancheL1MiddlewareInstance<DynProvider>> {
    let provider = global_config.read_provider().await?;
    Ok(IAvalancheL1Middleware::new(middleware, provider))
}
