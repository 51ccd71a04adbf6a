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

//! Read-only queries of a rewards contract.

use alloy::{
    primitives::{
        aliases::{U48, U96},
        Address,
    },
    providers::DynProvider,
};
use clap::{Subcommand, ValueEnum};
use suzaku_sdk::contracts::IRewards::{self, IRewardsInstance};

use super::{format_bps, Errors};
use crate::{config::GlobalConfig, display::table, tx::read};

/// Role whose last claimed epoch is queried.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimRole {
    Staker,
    Operator,
    Curator,
    Protocol,
}

/// Queries of amounts, shares and fees of a rewards contract.
#[derive(Subcommand, Clone, Debug)]
pub enum RewardsReads {
    /// Get the rewards amounts of an epoch, for every token or only one.
    Amounts {
        /// Epoch.
        epoch: U48,
        /// Only show this token.
        #[clap(long)]
        token: Option<Address>,
    },
    /// Get the rewards share of an operator in an epoch.
    OperatorShares {
        /// Epoch.
        epoch: U48,
        /// Operator address.
        operator: Address,
    },
    /// Get the rewards share of a vault in an epoch.
    VaultShares {
        /// Epoch.
        epoch: U48,
        /// Vault address.
        vault: Address,
    },
    /// Get the rewards share of a curator in an epoch.
    CuratorShares {
        /// Epoch.
        epoch: U48,
        /// Curator address.
        curator: Address,
    },
    /// Get the unclaimed protocol rewards of a token.
    ProtocolRewards {
        /// Rewards token.
        token: Address,
    },
    /// Get the distribution progress of an epoch.
    DistributionBatch {
        /// Epoch.
        epoch: U48,
    },
    /// Get the protocol, operator and curator fees.
    Fees,
    /// Get the rewards share of an asset class.
    AssetClassShare {
        /// Asset class.
        asset_class: U96,
    },
    /// Get the minimum uptime required to earn rewards.
    MinUptime,
    /// Get the last epoch claimed by an account in a role.
    LastClaimed {
        /// Role of the account.
        #[clap(value_enum)]
        role: ClaimRole,
        /// Account address.
        address: Address,
    },
}

impl RewardsReads {
    /// Run the query. Read failures are logged and do not fail the command.
    pub async fn run(&self, rewards: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let contract = reader(rewards, global_config).await?;
        match self {
            Self::Amounts { epoch, token } => match token {
                Some(token) => {
                    let result =
                        contract.getRewardsAmountPerTokenFromEpoch_0(*epoch, *token).call().await;
                    if let Some(amount) = read::<Errors, _>("rewards amount", result) {
                        tracing::info!("Rewards of epoch {epoch} in {token}: {amount}");
                    }
                }
                None => {
                    let result = contract.getRewardsAmountPerTokenFromEpoch_1(*epoch).call().await;
                    if let Some(amounts) = read::<Errors, _>("rewards amounts", result) {
                        let rows = amounts
                            .tokens
                            .iter()
                            .zip(&amounts.amounts)
                            .map(|(token, amount)| vec![token.to_string(), amount.to_string()]);
                        println!("{}", table(&["Token", "Amount"], rows));
                    }
                }
            },
            Self::OperatorShares { epoch, operator } => {
                let result = contract.operatorShares(*epoch, *operator).call().await;
                if let Some(share) = read::<Errors, _>("operator shares", result) {
                    tracing::info!("Share of operator {operator} in epoch {epoch}: {share}");
                }
            }
            Self::VaultShares { epoch, vault } => {
                let result = contract.vaultShares(*epoch, *vault).call().await;
                if let Some(share) = read::<Errors, _>("vault shares", result) {
                    tracing::info!("Share of vault {vault} in epoch {epoch}: {share}");
                }
            }
            Self::CuratorShares { epoch, curator } => {
                let result = contract.curatorShares(*epoch, *curator).call().await;
                if let Some(share) = read::<Errors, _>("curator shares", result) {
                    tracing::info!("Share of curator {curator} in epoch {epoch}: {share}");
                }
            }
            Self::ProtocolRewards { token } => {
                let result = contract.protocolRewards(*token).call().await;
                if let Some(amount) = read::<Errors, _>("protocol rewards", result) {
                    tracing::info!("Protocol rewards in {token}: {amount}");
                }
            }
            Self::DistributionBatch { epoch } => {
                let result = contract.distributionBatches(*epoch).call().await;
                if let Some(batch) = read::<Errors, _>("distribution batch", result) {
                    tracing::info!(
                        "Epoch {epoch}: last processed operator {}, complete: {}",
                        batch.lastProcessedOperator,
                        batch.isComplete
                    );
                }
            }
            Self::Fees => {
                let protocol = read::<Errors, _>("protocol fee", contract.protocolFee().call().await);
                let operator = read::<Errors, _>("operator fee", contract.operatorFee().call().await);
                let curator = read::<Errors, _>("curator fee", contract.curatorFee().call().await);
                if let (Some(protocol), Some(operator), Some(curator)) = (protocol, operator, curator) {
                    let rows = [
                        vec!["Protocol".to_string(), format_bps(protocol)],
                        vec!["Operator".to_string(), format_bps(operator)],
                        vec!["Curator".to_string(), format_bps(curator)],
                    ];
                    println!("{}", table(&["Fee", "Value"], rows));
                }
            }
            Self::AssetClassShare { asset_class } => {
                let result = contract.rewardsSharePerAssetClass(*asset_class).call().await;
                if let Some(share) = read::<Errors, _>("asset class share", result) {
                    tracing::info!("Rewards share of asset class {asset_class}: {}", format_bps(share));
                }
            }
            Self::MinUptime => {
                let result = contract.minRequiredUptime().call().await;
                if let Some(uptime) = read::<Errors, _>("minimum uptime", result) {
                    tracing::info!("Minimum required uptime: {uptime}s");
                }
            }
            Self::LastClaimed { role, address } => {
                let result = match role {
                    ClaimRole::Staker => contract.lastEpochClaimedStaker(*address).call().await,
                    ClaimRole::Operator => contract.lastEpochClaimedOperator(*address).call().await,
                    ClaimRole::Curator => contract.lastEpochClaimedCurator(*address).call().await,
                    ClaimRole::Protocol => contract.lastEpochClaimedProtocol(*address).call().await,
                };
                if let Some(epoch) = read::<Errors, _>("last claimed epoch", result) {
                    tracing::info!("Last epoch claimed by {role:?} {address}: {epoch}");
                }
            }
        }
        Ok(())
    }
}

async fn reader(
    rewards: Address,
    global_config: &GlobalConfig,
) -> anyhow::Result<IRewardsInstance<DynProvider>> {
    Ok(IRewards::new(rewards, global_config.read_provider().await?))
}
