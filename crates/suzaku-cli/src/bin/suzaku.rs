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

//! The Suzaku CLI is a command-line interface for the Suzaku restaking protocol.

const CLI_LONG_ABOUT: &str = r#"
The Suzaku CLI is a command-line interface for the Suzaku restaking protocol on Avalanche L1s.

It manages L1s, operators, vaults and their validators, and drives the P-Chain and warp
messaging steps of the validator lifecycle.
"#;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::aot::Shell;
use suzaku_cli::{
    commands::{
        balancer::BalancerArgs, delegator::DelegatorCommands, keystore::KeystoreCommands,
        l1::L1Commands, middleware::MiddlewareArgs, operator::OperatorCommands,
        opt_in::OptInCommands, pchain::PChainCommands, rewards::RewardsArgs,
        uptime::UptimeCommands, vault::VaultCommands, vault_manager::VaultManagerArgs,
    },
    config::GlobalConfig,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Subcommand, Clone, Debug)]
enum Command {
    /// Commands for L1s and the L1 registry
    #[command(subcommand)]
    L1(L1Commands),

    /// Commands for operators and the operator registry
    #[command(subcommand)]
    Operator(OperatorCommands),

    /// Commands for the vault manager of a middleware
    VaultManager(VaultManagerArgs),

    /// Commands for collateral vaults
    #[command(subcommand)]
    Vault(Box<VaultCommands>),

    /// Commands for the L1 restake delegator of a vault
    #[command(subcommand)]
    Delegator(DelegatorCommands),

    /// Commands for the L1 middleware and the validator lifecycle
    Middleware(Box<MiddlewareArgs>),

    /// Commands for operator opt-ins into L1s and vaults
    #[command(subcommand)]
    OptIn(OptInCommands),

    /// Commands for the balancer validator manager
    Balancer(BalancerArgs),

    /// Commands for the rewards contract
    Rewards(Box<RewardsArgs>),

    /// Commands for validator and operator uptime
    #[command(subcommand)]
    Uptime(Box<UptimeCommands>),

    /// Commands for P-Chain transactions
    #[command(subcommand)]
    Pchain(PChainCommands),

    /// Commands for the encrypted keystore
    #[command(subcommand)]
    Keystore(KeystoreCommands),

    #[command(hide = true)]
    Completions { shell: Shell },
}

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "CLI for the Suzaku restaking protocol",
    long_about = CLI_LONG_ABOUT,
    arg_required_else_help = true
)]
struct MainArgs {
    /// Subcommand to run
    #[command(subcommand)]
    command: Command,

    #[command(flatten, next_help_heading = "Global Options")]
    config: GlobalConfig,
}

#[tokio::main]
async fn main() {
    let args = MainArgs::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(args.config.log_level.into())
                .from_env_lossy(),
        )
        .init();

    if let Err(err) = run(&args).await {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(args: &MainArgs) -> Result<()> {
    let config = &args.config;
    config.validate()?;

    match &args.command {
        Command::L1(cmd) => cmd.run(config).await,
        Command::Operator(cmd) => cmd.run(config).await,
        Command::VaultManager(cmd) => cmd.run(config).await,
        Command::Vault(cmd) => cmd.run(config).await,
        Command::Delegator(cmd) => cmd.run(config).await,
        Command::Middleware(cmd) => cmd.run(config).await,
        Command::OptIn(cmd) => cmd.run(config).await,
        Command::Balancer(cmd) => cmd.run(config).await,
        Command::Rewards(cmd) => cmd.run(config).await,
        Command::Uptime(cmd) => cmd.run(config).await,
        Command::Pchain(cmd) => cmd.run(config).await,
        Command::Keystore(cmd) => cmd.run(config).await,

        Command::Completions { shell } => generate_shell_completions(shell),
    }
}

fn generate_shell_completions(shell: &Shell) -> Result<()> {
    clap_complete::generate(*shell, &mut MainArgs::command(), "suzaku", &mut std::io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        MainArgs::command().debug_assert();
    }

    #[test]
    fn pchain_is_a_single_word() {
        let args = MainArgs::try_parse_from([
            "suzaku",
            "pchain",
            "tx-status",
            "11111111111111111111111111111111LpoYY",
        ])
        .unwrap();
        assert!(matches!(args.command, Command::Pchain(PChainCommands::TxStatus { .. })));
    }
}
