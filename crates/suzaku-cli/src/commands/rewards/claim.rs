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

//! Claims of rewards and fees.

use alloy::primitives::{aliases::U48, Address};
use clap::Args;
use suzaku_sdk::contracts::IRewards;

use super::Errors;
use crate::{
    config::GlobalConfig,
    tx::{TxArgs, Writer},
};

/// Claim of a rewards token.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct RewardsClaim {
    /// Rewards token.
    pub token: Address,
    /// Recipient of the claim, defaults to the signer.
    #[clap(long)]
    pub recipient: Option<Address>,
    #[clap(flatten)]
    pub tx: TxArgs,
}

/// Kind of claim made with a [RewardsClaim].
#[derive(Clone, Copy, Debug)]
pub(super) enum ClaimKind {
    Staker,
    Operator,
    Curator,
    Protocol,
    Undistributed(U48),
}

impl RewardsClaim {
    pub(super) async fn run(
        &self,
        rewards: Address,
        kind: ClaimKind,
        global_config: &GlobalConfig,
    ) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let recipient = match self.recipient {
            Some(recipient) => recipient,
            None => writer.sender()?,
        };
        let contract = IRewards::new(rewards, writer.provider());
        let token = self.token;
        let executed = match kind {
            ClaimKind::Staker => {
                let call = contract.claimRewards(token, recipient);
                writer.execute::<Errors, _>("Claim Rewards", call).await?
            }
            ClaimKind::Operator => {
                let call = contract.claimOperatorFee(token, recipient);
                writer.execute::<Errors, _>("Claim Operator Fee", call).await?
            }
            ClaimKind::Curator => {
                let call = contract.claimCuratorFee(token, recipient);
                writer.execute::<Errors, _>("Claim Curator Fee", call).await?
            }
            ClaimKind::Protocol => {
                let call = contract.claimProtocolFee(token, recipient);
                writer.execute::<Errors, _>("Claim Protocol Fee", call).await?
            }
            ClaimKind::Undistributed(epoch) => {
                let call = contract.claimUndistributedRewards(epoch, token, recipient);
                writer.execute::<Errors, _>("Claim Undistributed Rewards", call).await?
            }
        };
        if executed.is_some() {
            tracing::info!("Claimed {token} rewards to {recipient}");
        }
        Ok(())
    }
}

/// Command to claim the rewards of an epoch nobody was entitled to.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct ClaimUndistributed {
    /// Epoch.
    pub epoch: U48,
    #[clap(flatten)]
    pub claim: RewardsClaim,
}

impl ClaimUndistributed {
    /// Run the [ClaimUndistributed] command.
    pub async fn run(&self, rewards: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        self.claim.run(rewards, ClaimKind::Undistributed(self.epoch), global_config).await
    }
}
