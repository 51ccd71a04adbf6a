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

use alloy::primitives::{aliases::U48, Address};
use clap::Args;
use suzaku_sdk::contracts::IRewards;

use super::Errors;
use crate::{
    config::GlobalConfig,
    tx::{TxArgs, Writer},
};

/// Command to distribute the rewards of an epoch to a batch of operators.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct Distribute {
    /// Epoch to distribute.
    pub epoch: U48,
    /// Number of operators processed by this call.
    pub batch_size: U48,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl Distribute {
    /// Run the [Distribute] command.
    pub async fn run(&self, rewards: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IRewards::new(rewards, writer.provider());
        let call = contract.distributeRewards(self.epoch, self.batch_size);
        if writer.execute::<Errors, _>("Distribute Rewards", call).await?.is_some() {
            tracing::info!("Distributed a batch of {} operators for epoch {}", self.batch_size, self.epoch);
        }
        Ok(())
    }
}
