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

//! Commands of tokenized vaults.

use alloy::primitives::{utils::format_ether, Address, U256};
use anyhow::Context;
use clap::{Args, Subcommand};
use suzaku_sdk::{
    contracts::{
        IVaultTokenized::{self, IVaultTokenizedErrors},
        IERC20::{self, IERC20Errors},
    },
    extract_tx_log, DecodeRevert,
};

use crate::{
    config::GlobalConfig,
    parse::parse_token_amount,
    tx::{read, TxArgs, Writer},
};

/// Commands of tokenized vaults.
#[derive(Subcommand, Clone, Debug)]
pub enum VaultCommands {
    /// Approve the vault collateral, then deposit it.
    Deposit(VaultDeposit),
    /// Request a withdrawal, claimable after the current epoch.
    Withdraw {
        /// Vault address.
        vault: Address,
        /// Amount of collateral, e.g. `1.5`.
        #[clap(value_parser = parse_token_amount)]
        amount: U256,
        /// Account allowed to claim the withdrawal, defaults to the signer.
        #[clap(long)]
        claimer: Option<Address>,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Claim a withdrawal requested in an epoch.
    Claim {
        /// Vault address.
        vault: Address,
        /// Epoch of the withdrawal request.
        epoch: U256,
        /// Recipient of the collateral, defaults to the signer.
        #[clap(long)]
        recipient: Option<Address>,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Get the collateral token of a vault.
    Collateral {
        /// Vault address.
        vault: Address,
    },
    /// Get the delegator of a vault.
    Delegator {
        /// Vault address.
        vault: Address,
    },
    /// Get the active balance of an account.
    ActiveBalanceOf {
        /// Vault address.
        vault: Address,
        /// Account address.
        account: Address,
    },
    /// Get the withdrawals of an account in an epoch.
    WithdrawalsOf {
        /// Vault address.
        vault: Address,
        /// Epoch of the withdrawal request.
        epoch: U256,
        /// Account address.
        account: Address,
    },
    /// Check whether the withdrawals of an account in an epoch were claimed.
    WithdrawalsClaimed {
        /// Vault address.
        vault: Address,
        /// Epoch of the withdrawal request.
        epoch: U256,
        /// Account address.
        account: Address,
    },
    /// Get the current epoch of a vault.
    CurrentEpoch {
        /// Vault address.
        vault: Address,
    },
}

impl VaultCommands {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        type Errors = IVaultTokenizedErrors;
        match self {
            Self::Deposit(cmd) => return cmd.run(global_config).await,
            Self::Withdraw { vault, amount, claimer, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let claimer = match claimer {
                    Some(claimer) => *claimer,
                    None => writer.sender()?,
                };
                let contract = IVaultTokenized::new(*vault, writer.provider());
                let call = contract.withdraw(claimer, *amount);
                if let Some(receipt) = writer.execute::<Errors, _>("Withdraw", call).await? {
                    let log = extract_tx_log::<IVaultTokenized::Withdraw>(&receipt)?;
                    tracing::info!(
                        "Withdrew {} from vault {vault}, claimable by {}",
                        format_ether(log.data().amount),
                        log.data().claimer
                    );
                }
            }
            Self::Claim { vault, epoch, recipient, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let recipient = match recipient {
                    Some(recipient) => *recipient,
                    None => writer.sender()?,
                };
                let contract = IVaultTokenized::new(*vault, writer.provider());
                let call = contract.claim(recipient, *epoch);
                if let Some(receipt) = writer.execute::<Errors, _>("Claim", call).await? {
                    let log = extract_tx_log::<IVaultTokenized::Claim>(&receipt)?;
                    tracing::info!(
                        "Claimed {} from vault {vault} for epoch {epoch} to {recipient}",
                        format_ether(log.data().amount)
                    );
                }
            }
            Self::Collateral { vault } => {
                let contract = IVaultTokenized::new(*vault, global_config.read_provider().await?);
                let result = contract.collateral().call().await;
                if let Some(collateral) = read::<Errors, _>("vault collateral", result) {
                    tracing::info!("Collateral of vault {vault}: {collateral}");
                }
            }
            Self::Delegator { vault } => {
                let contract = IVaultTokenized::new(*vault, global_config.read_provider().await?);
                let result = contract.delegator().call().await;
                if let Some(delegator) = read::<Errors, _>("vault delegator", result) {
                    tracing::info!("Delegator of vault {vault}: {delegator}");
                }
            }
            Self::ActiveBalanceOf { vault, account } => {
                let contract = IVaultTokenized::new(*vault, global_config.read_provider().await?);
                let result = contract.activeBalanceOf(*account).call().await;
                if let Some(balance) = read::<Errors, _>("active balance", result) {
                    tracing::info!(
                        "Active balance of {account} in vault {vault}: {} ({balance} wei)",
                        format_ether(balance)
                    );
                }
            }
            Self::WithdrawalsOf { vault, epoch, account } => {
                let contract = IVaultTokenized::new(*vault, global_config.read_provider().await?);
                let result = contract.withdrawalsOf(*epoch, *account).call().await;
                if let Some(amount) = read::<Errors, _>("withdrawals", result) {
                    tracing::info!(
                        "Withdrawals of {account} in epoch {epoch}: {} ({amount} wei)",
                        format_ether(amount)
                    );
                }
            }
            Self::WithdrawalsClaimed { vault, epoch, account } => {
                let contract = IVaultTokenized::new(*vault, global_config.read_provider().await?);
                let result = contract.isWithdrawalsClaimed(*epoch, *account).call().await;
                if let Some(claimed) = read::<Errors, _>("withdrawal claim status", result) {
                    tracing::info!("Withdrawals of {account} in epoch {epoch} claimed: {claimed}");
                }
            }
            Self::CurrentEpoch { vault } => {
                let contract = IVaultTokenized::new(*vault, global_config.read_provider().await?);
                let result = contract.currentEpoch().call().await;
                if let Some(epoch) = read::<Errors, _>("current epoch", result) {
                    tracing::info!("Current epoch of vault {vault}: {epoch}");
                }
            }
        }
        Ok(())
    }
}

/// Command to deposit collateral into a vault.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct VaultDeposit {
    /// Vault address.
    pub vault: Address,
    /// Amount of collateral, e.g. `1.5`.
    #[clap(value_parser = parse_token_amount)]
    pub amount: U256,
    /// Account credited with the deposit, defaults to the signer.
    #[clap(long)]
    pub on_behalf_of: Option<Address>,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl VaultDeposit {
    /// Run the [VaultDeposit] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let on_behalf_of = match self.on_behalf_of {
            Some(account) => account,
            None => writer.sender()?,
        };
        let vault = IVaultTokenized::new(self.vault, writer.provider());
        let collateral = vault
            .collateral()
            .call()
            .await
            .maybe_decode_revert::<IVaultTokenizedErrors>()
            .with_context(|| format!("Failed to get collateral of vault {}", self.vault))?;

        let token = IERC20::new(collateral, writer.provider());
        writer
            .execute::<IERC20Errors, _>("Approve", token.approve(self.vault, self.amount))
            .await?;

        let call = vault.deposit(on_behalf_of, self.amount);
        if let Some(receipt) = writer.execute::<IVaultTokenizedErrors, _>("Deposit", call).await? {
            let log = extract_tx_log::<IVaultTokenized::Deposit>(&receipt)?;
            tracing::info!(
                "Deposited {} into vault {} on behalf of {on_behalf_of}, minted {} shares",
                format_ether(log.data().amount),
                self.vault,
                log.data().shares
            );
        }
        Ok(())
    }
}
