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

//! Commands of a rewards contract: distribution, claims, administration and queries.

mod admin;
mod claim;
mod distribute;
mod reads;

pub use admin::{FeeUpdate, SetAdmin, SetAmount, SetAssetClassShare, SetMinUptime, SetProtocolOwner};
pub use claim::{ClaimUndistributed, RewardsClaim};
pub use distribute::Distribute;
pub use reads::{ClaimRole, RewardsReads};

use alloy::primitives::Address;
use anyhow::ensure;
use clap::{Args, Subcommand};
use suzaku_sdk::contracts::IRewards::IRewardsErrors;

use self::{admin::Fee, claim::ClaimKind};
use crate::config::GlobalConfig;

type Errors = IRewardsErrors;

/// Denominator of fees and shares expressed in basis points.
pub const BASIS_POINTS: u16 = 10_000;

/// Commands of a rewards contract.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct RewardsArgs {
    /// Address of the rewards contract.
    pub rewards: Address,
    #[command(subcommand)]
    pub command: RewardsCommands,
}

/// Rewards distribution and claims.
#[derive(Subcommand, Clone, Debug)]
pub enum RewardsCommands {
    /// Distribute the rewards of an epoch to a batch of operators.
    Distribute(Distribute),
    /// Claim the staker rewards of the signer.
    Claim(RewardsClaim),
    /// Claim the operator fees of the signer.
    ClaimOperatorFee(RewardsClaim),
    /// Claim the curator fees of the signer.
    ClaimCuratorFee(RewardsClaim),
    /// Claim the protocol fees.
    ClaimProtocolFee(RewardsClaim),
    /// Claim the rewards of an epoch nobody was entitled to.
    ClaimUndistributed(ClaimUndistributed),
    /// Set the rewards amount of a range of epochs.
    SetAmount(SetAmount),
    /// Set the rewards share of an asset class, in basis points.
    SetAssetClassShare(SetAssetClassShare),
    /// Set the minimum uptime, in seconds, required to earn rewards.
    SetMinUptime(SetMinUptime),
    /// Grant the admin role to an address.
    SetAdmin(SetAdmin),
    /// Set the protocol owner.
    SetProtocolOwner(SetProtocolOwner),
    /// Update the protocol fee, in basis points.
    UpdateProtocolFee(FeeUpdate),
    /// Update the operator fee, in basis points.
    UpdateOperatorFee(FeeUpdate),
    /// Update the curator fee, in basis points.
    UpdateCuratorFee(FeeUpdate),
    #[command(flatten)]
    Reads(RewardsReads),
}

impl RewardsArgs {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let rewards = self.rewards;
        match &self.command {
            RewardsCommands::Distribute(cmd) => cmd.run(rewards, global_config).await,
            RewardsCommands::Claim(cmd) => {
                cmd.run(rewards, ClaimKind::Staker, global_config).await
            }
            RewardsCommands::ClaimOperatorFee(cmd) => {
                cmd.run(rewards, ClaimKind::Operator, global_config).await
            }
            RewardsCommands::ClaimCuratorFee(cmd) => {
                cmd.run(rewards, ClaimKind::Curator, global_config).await
            }
            RewardsCommands::ClaimProtocolFee(cmd) => {
                cmd.run(rewards, ClaimKind::Protocol, global_config).await
            }
            RewardsCommands::ClaimUndistributed(cmd) => cmd.run(rewards, global_config).await,
            RewardsCommands::SetAmount(cmd) => cmd.run(rewards, global_config).await,
            RewardsCommands::SetAssetClassShare(cmd) => cmd.run(rewards, global_config).await,
            RewardsCommands::SetMinUptime(cmd) => cmd.run(rewards, global_config).await,
            RewardsCommands::SetAdmin(cmd) => cmd.run(rewards, global_config).await,
            RewardsCommands::SetProtocolOwner(cmd) => cmd.run(rewards, global_config).await,
            RewardsCommands::UpdateProtocolFee(update) => {
                update.run(rewards, Fee::Protocol, global_config).await
            }
            RewardsCommands::UpdateOperatorFee(update) => {
                update.run(rewards, Fee::Operator, global_config).await
            }
            RewardsCommands::UpdateCuratorFee(update) => {
                update.run(rewards, Fee::Curator, global_config).await
            }
            RewardsCommands::Reads(cmd) => cmd.run(rewards, global_config).await,
        }
    }
}

fn parse_basis_points(arg: &str) -> anyhow::Result<u16> {
    let bps: u16 = arg.parse()?;
    ensure!(bps <= BASIS_POINTS, "{bps} exceeds {BASIS_POINTS} basis points");
    Ok(bps)
}

fn format_bps(bps: u16) -> String {
    format!("{bps} bps ({}.{:02}%)", bps / 100, bps % 100)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::aliases::U48;
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(flatten)]
        args: RewardsArgs,
    }

    const REWARDS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const TOKEN: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    #[test]
    fn basis_points_are_bounded() {
        assert_eq!(parse_basis_points("250").unwrap(), 250);
        assert_eq!(parse_basis_points("10000").unwrap(), BASIS_POINTS);
        assert!(parse_basis_points("10001").is_err());
        assert!(parse_basis_points("-1").is_err());
    }

    #[test]
    fn bps_display() {
        assert_eq!(format_bps(250), "250 bps (2.50%)");
        assert_eq!(format_bps(5), "5 bps (0.05%)");
    }

    #[test]
    fn fee_updates_are_bounded() {
        let cli = Cli::try_parse_from(["cli", REWARDS, "update-operator-fee", "1500"]).unwrap();
        assert!(matches!(
            cli.args.command,
            RewardsCommands::UpdateOperatorFee(update) if update.bps == 1500
        ));
        assert!(Cli::try_parse_from(["cli", REWARDS, "update-curator-fee", "10001"]).is_err());
    }

    #[test]
    fn undistributed_claim_takes_epoch_and_token() {
        let cli = Cli::try_parse_from(["cli", REWARDS, "claim-undistributed", "7", TOKEN]).unwrap();
        let RewardsCommands::ClaimUndistributed(cmd) = cli.args.command else {
            panic!("expected claim-undistributed");
        };
        assert_eq!(cmd.epoch, U48::from(7u64));
        assert_eq!(cmd.claim.token, TOKEN.parse::<Address>().unwrap());
        assert!(cmd.claim.recipient.is_none());
    }

    #[test]
    fn last_claimed_takes_a_role() {
        let cli = Cli::try_parse_from(["cli", REWARDS, "last-claimed", "curator", TOKEN]).unwrap();
        assert!(matches!(
            cli.args.command,
            RewardsCommands::Reads(RewardsReads::LastClaimed { role: ClaimRole::Curator, .. })
        ));
        assert!(Cli::try_parse_from(["cli", REWARDS, "last-claimed", "nobody", TOKEN]).is_err());
    }
}
