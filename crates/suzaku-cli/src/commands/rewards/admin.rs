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

//! Administration of a rewards contract: amounts, shares, roles and fees.

use alloy::primitives::{
    aliases::{U48, U96},
    Address, U256,
};
use clap::Args;
use suzaku_sdk::contracts::IRewards;

use super::{format_bps, parse_basis_points, Errors};
use crate::{
    config::GlobalConfig,
    tx::{TxArgs, Writer},
};

/// Command to set the rewards amount of a range of epochs.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct SetAmount {
    /// First epoch.
    pub start_epoch: U48,
    /// Number of epochs.
    pub epochs: U48,
    /// Rewards token.
    pub token: Address,
    /// Amount per epoch, in the token's smallest unit.
    pub amount: U256,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl SetAmount {
    /// Run the [SetAmount] command.
    pub async fn run(&self, rewards: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IRewards::new(rewards, writer.provider());
        let call =
            contract.setRewardsAmountForEpochs(self.start_epoch, self.epochs, self.token, self.amount);
        writer.execute::<Errors, _>("Set Rewards Amount For Epochs", call).await?;
        Ok(())
    }
}

/// Command to set the rewards share of an asset class.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct SetAssetClassShare {
    /// Asset class.
    pub asset_class: U96,
    /// Share in basis points.
    #[clap(value_parser = parse_basis_points)]
    pub share: u16,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl SetAssetClassShare {
    /// Run the [SetAssetClassShare] command.
    pub async fn run(&self, rewards: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IRewards::new(rewards, writer.provider());
        let call = contract.setRewardsShareForAssetClass(self.asset_class, self.share);
        if writer.execute::<Errors, _>("Set Rewards Share For Asset Class", call).await?.is_some() {
            tracing::info!(
                "Rewards share of asset class {} set to {}",
                self.asset_class,
                format_bps(self.share)
            );
        }
        Ok(())
    }
}

/// Command to set the minimum uptime required to earn rewards.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct SetMinUptime {
    /// Minimum uptime in seconds.
    pub seconds: U256,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl SetMinUptime {
    /// Run the [SetMinUptime] command.
    pub async fn run(&self, rewards: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IRewards::new(rewards, writer.provider());
        let call = contract.setMinRequiredUptime(self.seconds);
        writer.execute::<Errors, _>("Set Min Required Uptime", call).await?;
        Ok(())
    }
}

/// Command to grant the admin role to an address.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct SetAdmin {
    /// New admin.
    pub address: Address,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl SetAdmin {
    /// Run the [SetAdmin] command.
    pub async fn run(&self, rewards: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IRewards::new(rewards, writer.provider());
        writer.execute::<Errors, _>("Set Admin Role", contract.setAdminRole(self.address)).await?;
        Ok(())
    }
}

/// Command to set the protocol owner.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct SetProtocolOwner {
    /// New protocol owner.
    pub address: Address,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl SetProtocolOwner {
    /// Run the [SetProtocolOwner] command.
    pub async fn run(&self, rewards: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IRewards::new(rewards, writer.provider());
        let call = contract.setProtocolOwner(self.address);
        writer.execute::<Errors, _>("Set Protocol Owner", call).await?;
        Ok(())
    }
}

/// New fee in basis points.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct FeeUpdate {
    /// Fee in basis points, at most 10000.
    #[clap(value_parser = parse_basis_points)]
    pub bps: u16,
    #[clap(flatten)]
    pub tx: TxArgs,
}

/// Fee updated by a [FeeUpdate].
#[derive(Clone, Copy, Debug)]
pub(super) enum Fee {
    Protocol,
    Operator,
    Curator,
}

impl FeeUpdate {
    pub(super) async fn run(
        &self,
        rewards: Address,
        fee: Fee,
        global_config: &GlobalConfig,
    ) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IRewards::new(rewards, writer.provider());
        let executed = match fee {
            Fee::Protocol => {
                let call = contract.updateProtocolFee(self.bps);
                writer.execute::<Errors, _>("Update Protocol Fee", call).await?
            }
            Fee::Operator => {
                let call = contract.updateOperatorFee(self.bps);
                writer.execute::<Errors, _>("Update Operator Fee", call).await?
            }
            Fee::Curator => {
                let call = contract.updateCuratorFee(self.bps);
                writer.execute::<Errors, _>("Update Curator Fee", call).await?
            }
        };
        if executed.is_some() {
            tracing::info!("{fee:?} fee set to {}", format_bps(self.bps));
        }
        Ok(())
    }
}
