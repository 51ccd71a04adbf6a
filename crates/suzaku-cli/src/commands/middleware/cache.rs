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

//! Stake caches and node rebalancing of a middleware.

use alloy::primitives::{
    aliases::{U48, U96},
    Address, U256,
};
use clap::Args;
use suzaku_sdk::contracts::IAvalancheL1Middleware;

use super::Errors;
use crate::{
    config::GlobalConfig,
    tx::{TxArgs, Writer},
};

/// Command to calculate and cache the operator stakes of an asset class for an epoch.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct OperatorCache {
    /// Epoch.
    pub epoch: U48,
    /// Asset class.
    pub asset_class: U96,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl OperatorCache {
    /// Run the [OperatorCache] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract.calcAndCacheStakes(self.epoch, self.asset_class);
        writer.execute::<Errors, _>("Calc And Cache Stakes", call).await?;
        Ok(())
    }
}

/// Command to calculate and cache the node stakes of every operator.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct CalcNodeStakes {
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl CalcNodeStakes {
    /// Run the [CalcNodeStakes] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract.calcAndCacheNodeStakeForAllOperators();
        writer.execute::<Errors, _>("Calc Node Stakes", call).await?;
        Ok(())
    }
}

/// Command to rebalance the nodes of an operator to its available stake.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct ForceUpdateNodes {
    /// Operator address.
    pub operator: Address,
    /// Stake to remove at most, in wei, 0 for no limit.
    #[clap(long, default_value_t = U256::ZERO)]
    pub limit_stake: U256,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl ForceUpdateNodes {
    /// Run the [ForceUpdateNodes] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract.forceUpdateNodes(self.operator, self.limit_stake);
        writer.execute::<Errors, _>("Force Update Nodes", call).await?;
        Ok(())
    }
}

/// Command to process pending epochs of the node stake cache.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct ProcessNodeStakeCache {
    /// Number of epochs to process.
    pub epochs: U48,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl ProcessNodeStakeCache {
    /// Run the [ProcessNodeStakeCache] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract.manualProcessNodeStakeCache(self.epochs);
        writer.execute::<Errors, _>("Process Node Stake Cache", call).await?;
        Ok(())
    }
}
