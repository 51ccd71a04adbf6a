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

use alloy::primitives::{aliases::U96, Address, U256};
use clap::Subcommand;
use suzaku_sdk::contracts::IL1RestakeDelegator::{self, IL1RestakeDelegatorErrors};

use crate::{
    config::GlobalConfig,
    tx::{read, TxArgs, Writer},
};

/// Commands of L1 restake delegators.
#[derive(Subcommand, Clone, Debug)]
pub enum DelegatorCommands {
    /// Set the stake limit of an L1 for an asset class.
    SetL1Limit {
        /// Delegator address.
        delegator: Address,
        /// Validator manager of the L1.
        l1: Address,
        /// Asset class.
        asset_class: U96,
        /// Limit in wei.
        limit: U256,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Set the shares of an operator on an L1 for an asset class.
    SetOperatorL1Shares {
        /// Delegator address.
        delegator: Address,
        /// Validator manager of the L1.
        l1: Address,
        /// Asset class.
        asset_class: U96,
        /// Operator address.
        operator: Address,
        /// Number of shares.
        shares: U256,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Get the stake limit of an L1 for an asset class.
    GetL1Limit {
        /// Delegator address.
        delegator: Address,
        /// Validator manager of the L1.
        l1: Address,
        /// Asset class.
        asset_class: U96,
    },
    /// Get the shares of an operator on an L1 for an asset class.
    GetOperatorL1Shares {
        /// Delegator address.
        delegator: Address,
        /// Validator manager of the L1.
        l1: Address,
        /// Asset class.
        asset_class: U96,
        /// Operator address.
        operator: Address,
    },
    /// Get the stake delegated to an operator on an L1 for an asset class.
    Stake {
        /// Delegator address.
        delegator: Address,
        /// Validator manager of the L1.
        l1: Address,
        /// Asset class.
        asset_class: U96,
        /// Operator address.
        operator: Address,
    },
}

impl DelegatorCommands {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        type Errors = IL1RestakeDelegatorErrors;
        match self {
            Self::SetL1Limit { delegator, l1, asset_class, limit, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let contract = IL1RestakeDelegator::new(*delegator, writer.provider());
                let call = contract.setL1Limit(*l1, *asset_class, *limit);
                writer.execute::<Errors, _>("Set L1 Limit", call).await?;
            }
            Self::SetOperatorL1Shares { delegator, l1, asset_class, operator, shares, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let contract = IL1RestakeDelegator::new(*delegator, writer.provider());
                let call = contract.setOperatorL1Shares(*l1, *asset_class, *operator, *shares);
                writer.execute::<Errors, _>("Set Operator L1 Shares", call).await?;
            }
            Self::GetL1Limit { delegator, l1, asset_class } => {
                let provider = global_config.read_provider().await?;
                let contract = IL1RestakeDelegator::new(*delegator, provider);
                let result = contract.l1Limit(*l1, *asset_class).call().await;
                if let Some(limit) = read::<Errors, _>("L1 limit", result) {
                    tracing::info!("L1 limit of {l1} for asset class {asset_class}: {limit}");
                }
            }
            Self::GetOperatorL1Shares { delegator, l1, asset_class, operator } => {
                let provider = global_config.read_provider().await?;
                let contract = IL1RestakeDelegator::new(*delegator, provider);
                let result = contract.operatorL1Shares(*l1, *asset_class, *operator).call().await;
                if let Some(shares) = read::<Errors, _>("operator L1 shares", result) {
                    tracing::info!(
                        "Shares of operator {operator} on L1 {l1} for asset class {asset_class}: {shares}"
                    );
                }
            }
            Self::Stake { delegator, l1, asset_class, operator } => {
                let provider = global_config.read_provider().await?;
                let contract = IL1RestakeDelegator::new(*delegator, provider);
                let result = contract.stake(*l1, *asset_class, *operator).call().await;
                if let Some(stake) = read::<Errors, _>("operator stake", result) {
                    tracing::info!(
                        "Stake of operator {operator} on L1 {l1} for asset class {asset_class}: {stake}"
                    );
                }
            }
        }
        Ok(())
    }
}
