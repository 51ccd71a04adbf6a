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
use clap::{Args, Subcommand};
use suzaku_sdk::contracts::IMiddlewareVaultManager::{self, IMiddlewareVaultManagerErrors};

use crate::{
    config::GlobalConfig,
    tx::{read, TxArgs, Writer},
};

/// Commands of a middleware vault manager.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct VaultManagerArgs {
    /// Address of the vault manager.
    pub vault_manager: Address,
    #[command(subcommand)]
    pub command: VaultManagerCommands,
}

/// Vault manager operations.
#[derive(Subcommand, Clone, Debug)]
pub enum VaultManagerCommands {
    /// Register a vault for an asset class with its maximum L1 limit.
    RegisterVault {
        /// Vault address.
        vault: Address,
        /// Asset class of the vault collateral.
        asset_class: U96,
        /// Maximum stake the vault can delegate to the L1, in wei.
        max_limit: U256,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Update the maximum L1 limit of a vault.
    UpdateVaultMaxL1Limit {
        /// Vault address.
        vault: Address,
        /// Asset class of the vault collateral.
        asset_class: U96,
        /// Maximum stake the vault can delegate to the L1, in wei.
        max_limit: U256,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Remove a vault.
    RemoveVault {
        /// Vault address.
        vault: Address,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Get the number of registered vaults.
    GetVaultCount,
    /// Get the vault at an index with its enabled and disabled times.
    GetVaultAtWithTimes {
        /// Index of the vault.
        index: U256,
    },
    /// Get the asset class of a vault.
    GetVaultAssetClass {
        /// Vault address.
        vault: Address,
    },
}

impl VaultManagerArgs {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        type Errors = IMiddlewareVaultManagerErrors;
        match &self.command {
            VaultManagerCommands::RegisterVault { vault, asset_class, max_limit, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let manager = IMiddlewareVaultManager::new(self.vault_manager, writer.provider());
                let call = manager.registerVault(*vault, *asset_class, *max_limit);
                writer.execute::<Errors, _>("Register Vault", call).await?;
            }
            VaultManagerCommands::UpdateVaultMaxL1Limit { vault, asset_class, max_limit, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let manager = IMiddlewareVaultManager::new(self.vault_manager, writer.provider());
                let call = manager.updateVaultMaxL1Limit(*vault, *asset_class, *max_limit);
                writer.execute::<Errors, _>("Update Vault Max L1 Limit", call).await?;
            }
            VaultManagerCommands::RemoveVault { vault, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let manager = IMiddlewareVaultManager::new(self.vault_manager, writer.provider());
                writer.execute::<Errors, _>("Remove Vault", manager.removeVault(*vault)).await?;
            }
            VaultManagerCommands::GetVaultCount => {
                let provider = global_config.read_provider().await?;
                let manager = IMiddlewareVaultManager::new(self.vault_manager, provider);
                let result = manager.getVaultCount().call().await;
                if let Some(count) = read::<Errors, _>("vault count", result) {
                    tracing::info!("Vault count: {count}");
                }
            }
            VaultManagerCommands::GetVaultAtWithTimes { index } => {
                let provider = global_config.read_provider().await?;
                let manager = IMiddlewareVaultManager::new(self.vault_manager, provider);
                let result = manager.getVaultAtWithTimes(*index).call().await;
                if let Some(vault) = read::<Errors, _>(format_args!("vault #{index}"), result) {
                    tracing::info!(
                        "Vault #{index}: {} (enabled at {}, disabled at {})",
                        vault.vault,
                        vault.enabledTime,
                        vault.disabledTime
                    );
                }
            }
            VaultManagerCommands::GetVaultAssetClass { vault } => {
                let provider = global_config.read_provider().await?;
                let manager = IMiddlewareVaultManager::new(self.vault_manager, provider);
                let result = manager.getVaultAssetClass(*vault).call().await;
                if let Some(asset_class) = read::<Errors, _>("vault asset class", result) {
                    tracing::info!("Asset class of vault {vault}: {asset_class}");
                }
            }
        }
        Ok(())
    }
}
