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

//! Commands of the operator registry, and stake views of an operator.

use std::collections::BTreeMap;

use alloy::{
    primitives::{Address, U256},
    providers::DynProvider,
};
use anyhow::Context;
use clap::{Args, Subcommand};
use suzaku_sdk::{
    contracts::{
        IL1Registry::{self, IL1RegistryErrors},
        IL1RestakeDelegator::{self, IL1RestakeDelegatorErrors},
        IMiddlewareVaultManager::{self, IMiddlewareVaultManagerErrors},
        IOperatorL1OptInService::{self, IOperatorL1OptInServiceErrors},
        IOperatorRegistry::{self, IOperatorRegistryErrors},
        IVaultTokenized::{self, IVaultTokenizedErrors},
        IERC20,
    },
    Deployment,
};

use crate::{
    config::GlobalConfig,
    display::table,
    parse::{format_token, TOKEN_DECIMALS},
    tx::{read, TxArgs, Writer},
};

/// Commands of the operator registry.
#[derive(Subcommand, Clone, Debug)]
pub enum OperatorCommands {
    /// Register the signer as an operator.
    Register {
        /// URL of the operator metadata.
        metadata_url: String,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// List the registered operators.
    List,
    /// Check whether an operator is registered.
    IsRegistered {
        /// Operator address.
        operator: Address,
    },
    /// List the L1s an operator is opted into.
    L1s {
        /// Operator address.
        operator: Address,
    },
    /// Show the stake of an operator in every vault, on every L1 it is opted into.
    Stakes(OperatorStakes),
    /// Show the stake of an operator in one vault on one L1.
    VaultL1Stake(OperatorVaultL1Stake),
}

impl OperatorCommands {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let deployment = global_config.deployment()?;
        match self {
            Self::Register { metadata_url, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let registry = IOperatorRegistry::new(deployment.operator_registry, writer.provider());
                let call = registry.registerOperator(metadata_url.clone());
                writer.execute::<IOperatorRegistryErrors, _>("Register Operator", call).await?;
                Ok(())
            }
            Self::List => {
                let provider = global_config.read_provider().await?;
                let registry = IOperatorRegistry::new(deployment.operator_registry, provider);
                let result = registry.getAllOperators().call().await;
                let Some(operators) = read::<IOperatorRegistryErrors, _>("operators", result) else {
                    return Ok(());
                };
                tracing::info!("{} registered operators", operators._0.len());
                let rows = operators._0.iter().zip(&operators._1).map(|(operator, url)| {
                    vec![operator.to_string(), url.clone()]
                });
                println!("{}", table(&["Operator", "Metadata URL"], rows));
                Ok(())
            }
            Self::IsRegistered { operator } => {
                let provider = global_config.read_provider().await?;
                let registry = IOperatorRegistry::new(deployment.operator_registry, provider);
                let result = registry.isRegistered(*operator).call().await;
                if let Some(registered) =
                    read::<IOperatorRegistryErrors, _>("operator registration", result)
                {
                    tracing::info!("Operator {operator} registered: {registered}");
                }
                Ok(())
            }
            Self::L1s { operator } => {
                let provider = global_config.read_provider().await?;
                let Some(l1s) = opted_in_l1s(&provider, &deployment, *operator).await else {
                    return Ok(());
                };
                tracing::info!("Operator {operator} is opted into {} L1s", l1s.len());
                println!("{}", table(&["L1"], l1s.iter().map(|l1| vec![l1])));
                Ok(())
            }
            Self::Stakes(cmd) => cmd.run(global_config).await,
            Self::VaultL1Stake(cmd) => cmd.run(global_config).await,
        }
    }
}

/// Command to show the stakes of an operator across vaults and L1s.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct OperatorStakes {
    /// Operator address.
    pub operator: Address,
    /// Vault manager listing the vaults.
    #[clap(long, env = "VAULT_MANAGER")]
    pub vault_manager: Address,
}

impl OperatorStakes {
    /// Run the [OperatorStakes] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let deployment = global_config.deployment()?;
        let provider = global_config.read_provider().await?;
        let manager = IMiddlewareVaultManager::new(self.vault_manager, &provider);

        let Some(l1s) = opted_in_l1s(&provider, &deployment, self.operator).await else {
            return Ok(());
        };
        let Some(vault_count) = read::<IMiddlewareVaultManagerErrors, _>(
            "vault count",
            manager.getVaultCount().call().await,
        ) else {
            return Ok(());
        };
        tracing::info!(
            "Operator {} is opted into {} L1s, {vault_count} vaults registered",
            self.operator,
            l1s.len()
        );

        let mut rows = Vec::new();
        let mut totals: BTreeMap<Address, U256> = BTreeMap::new();
        let vault_count = u64::try_from(vault_count).context("Vault count out of range")?;
        for index in 0..vault_count {
            let Some(vault) = read::<IMiddlewareVaultManagerErrors, _>(
                format!("vault #{index}"),
                manager.getVaultAtWithTimes(U256::from(index)).call().await,
            ) else {
                continue;
            };
            let vault = vault.vault;
            let Some(asset_class) = read::<IMiddlewareVaultManagerErrors, _>(
                format!("asset class of vault {vault}"),
                manager.getVaultAssetClass(vault).call().await,
            ) else {
                continue;
            };

            let vault_contract = IVaultTokenized::new(vault, &provider);
            let Some(delegator) = read::<IVaultTokenizedErrors, _>(
                format!("delegator of vault {vault}"),
                vault_contract.delegator().call().await,
            ) else {
                continue;
            };
            if delegator == Address::ZERO {
                tracing::debug!("Vault {vault} has no delegator, skipping");
                continue;
            }
            let Some(collateral) = read::<IVaultTokenizedErrors, _>(
                format!("collateral of vault {vault}"),
                vault_contract.collateral().call().await,
            ) else {
                continue;
            };

            let delegator = IL1RestakeDelegator::new(delegator, &provider);
            for l1 in &l1s {
                let Some(stake) = read::<IL1RestakeDelegatorErrors, _>(
                    format!("stake in vault {vault} on L1 {l1}"),
                    delegator.stake(*l1, asset_class, self.operator).call().await,
                ) else {
                    continue;
                };
                if stake.is_zero() {
                    continue;
                }
                rows.push(vec![
                    vault.to_string(),
                    l1.to_string(),
                    asset_class.to_string(),
                    stake.to_string(),
                ]);
                *totals.entry(collateral).or_default() += stake;
            }
        }

        if rows.is_empty() {
            tracing::info!("No stake found for operator {}", self.operator);
            return Ok(());
        }
        println!("{}", table(&["Vault", "L1", "Asset class", "Stake (wei)"], rows));

        let mut total_rows = Vec::new();
        for (collateral, total) in totals {
            let token = IERC20::new(collateral, &provider);
            let symbol = token.symbol().call().await.unwrap_or_else(|_| "?".to_string());
            let decimals = token.decimals().call().await.unwrap_or(TOKEN_DECIMALS);
            total_rows.push(vec![
                collateral.to_string(),
                symbol,
                total.to_string(),
                format_token(total, decimals),
            ]);
        }
        println!("{}", table(&["Collateral", "Symbol", "Total (wei)", "Total"], total_rows));
        Ok(())
    }
}

/// Command to show the stake of an operator in one vault on one L1.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct OperatorVaultL1Stake {
    /// Operator address.
    pub operator: Address,
    /// Vault address.
    pub vault: Address,
    /// Validator manager of the L1.
    pub l1: Address,
    /// Vault manager the vault is registered with.
    #[clap(long, env = "VAULT_MANAGER")]
    pub vault_manager: Address,
}

impl OperatorVaultL1Stake {
    /// Run the [OperatorVaultL1Stake] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.read_provider().await?;
        let manager = IMiddlewareVaultManager::new(self.vault_manager, &provider);
        let vault = IVaultTokenized::new(self.vault, &provider);

        let Some(asset_class) = read::<IMiddlewareVaultManagerErrors, _>(
            "vault asset class",
            manager.getVaultAssetClass(self.vault).call().await,
        ) else {
            return Ok(());
        };
        let Some(delegator) =
            read::<IVaultTokenizedErrors, _>("vault delegator", vault.delegator().call().await)
        else {
            return Ok(());
        };
        let delegator = IL1RestakeDelegator::new(delegator, &provider);
        let result = delegator.stake(self.l1, asset_class, self.operator).call().await;
        if let Some(stake) = read::<IL1RestakeDelegatorErrors, _>("operator stake", result) {
            tracing::info!(
                "Stake of operator {} in vault {} on L1 {}: {stake} (asset class {asset_class})",
                self.operator,
                self.vault,
                self.l1
            );
        }
        Ok(())
    }
}

/// L1s of the registry that `operator` is opted into.
///
/// Read failures are logged: `None` when the L1s cannot be listed, and L1s whose opt-in cannot
/// be checked are left out.
pub async fn opted_in_l1s(
    provider: &DynProvider,
    deployment: &Deployment,
    operator: Address,
) -> Option<Vec<Address>> {
    let registry = IL1Registry::new(deployment.l1_registry, provider);
    let opt_in = IOperatorL1OptInService::new(deployment.op_l1_opt_in, provider);

    let l1s = read::<IL1RegistryErrors, _>("L1s", registry.getAllL1s().call().await)?;

    let mut opted_in = Vec::new();
    for l1 in l1s._0 {
        let result = opt_in.isOptedIn(operator, l1).call().await;
        let what = format!("opt-in into L1 {l1}");
        if read::<IOperatorL1OptInServiceErrors, _>(what, result) == Some(true) {
            opted_in.push(l1);
        }
    }
    Some(opted_in)
}
