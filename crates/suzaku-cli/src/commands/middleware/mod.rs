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

//! Commands of an Avalanche L1 middleware: operators, nodes, stake caches and epochs.

mod cache;
mod complete;
mod nodes;
mod operators;
mod reads;

pub use cache::{CalcNodeStakes, ForceUpdateNodes, OperatorCache, ProcessNodeStakeCache};
pub use complete::{
    CompleteStakeUpdate, CompleteValidatorRegistration, CompleteValidatorRemoval, PChainLegArgs,
};
pub use nodes::{AddNode, InitStakeUpdate, RemoveNode};
pub use operators::{DisableOperator, EnableOperator, RegisterOperator, RemoveOperator};
pub use reads::MiddlewareReads;

use alloy::primitives::Address;
use clap::{Args, Subcommand};
use suzaku_sdk::contracts::IAvalancheL1Middleware::IAvalancheL1MiddlewareErrors;

use crate::config::GlobalConfig;

type Errors = IAvalancheL1MiddlewareErrors;

/// Commands of an L1 middleware.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct MiddlewareArgs {
    /// Address of the middleware.
    pub middleware: Address,
    #[command(subcommand)]
    pub command: MiddlewareCommands,
}

/// L1 middleware operations.
#[derive(Subcommand, Clone, Debug)]
pub enum MiddlewareCommands {
    /// Register an operator on the middleware.
    RegisterOperator(RegisterOperator),
    /// Disable an operator.
    DisableOperator(DisableOperator),
    /// Enable a disabled operator.
    EnableOperator(EnableOperator),
    /// Remove a disabled operator once its grace period passed.
    RemoveOperator(RemoveOperator),
    /// Add a node of the signer, starting its validator registration.
    AddNode(AddNode),
    /// Complete the registration of a node through the P-Chain.
    CompleteValidatorRegistration(CompleteValidatorRegistration),
    /// Start the removal of a node.
    RemoveNode(RemoveNode),
    /// Complete the removal of a node through the P-Chain.
    CompleteValidatorRemoval(CompleteValidatorRemoval),
    /// Start a stake update of a node.
    InitStakeUpdate(InitStakeUpdate),
    /// Complete a stake update of a node through the P-Chain.
    CompleteStakeUpdate(CompleteStakeUpdate),
    /// Calculate and cache the operator stakes of an asset class for an epoch.
    OperatorCache(OperatorCache),
    /// Calculate and cache the node stakes of every operator.
    CalcNodeStakes(CalcNodeStakes),
    /// Rebalance the nodes of an operator to its available stake.
    ForceUpdateNodes(ForceUpdateNodes),
    /// Process pending epochs of the node stake cache.
    ProcessNodeStakeCache(ProcessNodeStakeCache),
    #[command(flatten)]
    Reads(MiddlewareReads),
}

impl MiddlewareArgs {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let middleware = self.middleware;
        match &self.command {
            MiddlewareCommands::RegisterOperator(cmd) => cmd.run(middleware, global_config).await,
            MiddlewareCommands::DisableOperator(cmd) => cmd.run(middleware, global_config).await,
            MiddlewareCommands::EnableOperator(cmd) => cmd.run(middleware, global_config).await,
            MiddlewareCommands::RemoveOperator(cmd) => cmd.run(middleware, global_config).await,
            MiddlewareCommands::AddNode(cmd) => cmd.run(middleware, global_config).await,
            MiddlewareCommands::CompleteValidatorRegistration(cmd) => {
                cmd.run(middleware, global_config).await
            }
            MiddlewareCommands::RemoveNode(cmd) => cmd.run(middleware, global_config).await,
            MiddlewareCommands::CompleteValidatorRemoval(cmd) => {
                cmd.run(middleware, global_config).await
            }
            MiddlewareCommands::InitStakeUpdate(cmd) => cmd.run(middleware, global_config).await,
            MiddlewareCommands::CompleteStakeUpdate(cmd) => cmd.run(middleware, global_config).await,
            MiddlewareCommands::OperatorCache(cmd) => cmd.run(middleware, global_config).await,
            MiddlewareCommands::CalcNodeStakes(cmd) => cmd.run(middleware, global_config).await,
            MiddlewareCommands::ForceUpdateNodes(cmd) => cmd.run(middleware, global_config).await,
            MiddlewareCommands::ProcessNodeStakeCache(cmd) => {
                cmd.run(middleware, global_config).await
            }
            MiddlewareCommands::Reads(cmd) => cmd.run(middleware, global_config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::{aliases::U48, U256};
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(flatten)]
        args: MiddlewareArgs,
    }

    const MIDDLEWARE: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const NODE_ID: &str = "NodeID-P7oB2McjBGgW2NXXWVYjV8JEDFoW9xDE5";

    #[test]
    fn add_node_defaults() {
        let bls_key = format!("0x{}", "aa".repeat(48));
        let cli = Cli::try_parse_from(["cli", MIDDLEWARE, "add-node", NODE_ID, &bls_key]).unwrap();
        let MiddlewareCommands::AddNode(cmd) = cli.args.command else {
            panic!("expected add-node");
        };
        assert_eq!(cmd.node_id.to_string(), NODE_ID);
        assert_eq!(cmd.initial_stake, U256::ZERO);
        assert_eq!(cmd.pchain_remaining_balance_owner_threshold, 1);
        assert_eq!(cmd.pchain_disable_owner_threshold, 1);
        assert!(cmd.pchain_disable_owner_address.is_empty());
        assert!(cmd.registration_expiry.is_none());
    }

    #[test]
    fn add_node_rejects_short_bls_key() {
        let bls_key = "aa".repeat(47);
        assert!(Cli::try_parse_from(["cli", MIDDLEWARE, "add-node", NODE_ID, &bls_key]).is_err());
    }

    #[test]
    fn epochs_are_48_bit() {
        let cli = Cli::try_parse_from(["cli", MIDDLEWARE, "get-epoch-start-ts", "42"]).unwrap();
        assert!(matches!(
            cli.args.command,
            MiddlewareCommands::Reads(MiddlewareReads::GetEpochStartTs { epoch })
                if epoch == U48::from(42u64)
        ));
        let too_large = (1u64 << 48).to_string();
        assert!(Cli::try_parse_from(["cli", MIDDLEWARE, "get-epoch-start-ts", &too_large]).is_err());

        let cli = Cli::try_parse_from(["cli", MIDDLEWARE, "calc-node-stakes", "--calldata"]).unwrap();
        assert!(matches!(cli.args.command, MiddlewareCommands::CalcNodeStakes(cmd) if cmd.tx.calldata));
    }

    #[test]
    fn registration_completion_defaults() {
        let hash = format!("0x{}", "11".repeat(32));
        let pop = "22".repeat(96);
        let cli = Cli::try_parse_from([
            "cli",
            MIDDLEWARE,
            "complete-validator-registration",
            MIDDLEWARE,
            NODE_ID,
            &hash,
            &pop,
        ])
        .unwrap();
        let MiddlewareCommands::CompleteValidatorRegistration(cmd) = cli.args.command else {
            panic!("expected complete-validator-registration");
        };
        assert_eq!(cmd.initial_balance, 100_000_000);
        assert_eq!(cmd.pchain.aggregation_delay, Duration::from_secs(30));
        assert!(cmd.pchain.pchain_tx_private_key.is_none());
    }
}
