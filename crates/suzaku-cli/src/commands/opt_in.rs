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

//! Operator opt-in into L1s and vaults.

use alloy::primitives::Address;
use clap::Subcommand;
use suzaku_sdk::contracts::{
    IOperatorL1OptInService::{self, IOperatorL1OptInServiceErrors},
    IOperatorVaultOptInService::{self, IOperatorVaultOptInServiceErrors},
};

use crate::{
    config::GlobalConfig,
    tx::{read, TxArgs, Writer},
};

/// Commands of the opt-in services.
#[derive(Subcommand, Clone, Debug)]
pub enum OptInCommands {
    /// Opt the signer into an L1.
    L1In {
        /// Validator manager of the L1.
        l1: Address,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Opt the signer out of an L1.
    L1Out {
        /// Validator manager of the L1.
        l1: Address,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Check whether an operator is opted into an L1.
    CheckL1 {
        /// Operator address.
        operator: Address,
        /// Validator manager of the L1.
        l1: Address,
    },
    /// Opt the signer into a vault.
    VaultIn {
        /// Vault address.
        vault: Address,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Opt the signer out of a vault.
    VaultOut {
        /// Vault address.
        vault: Address,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Check whether an operator is opted into a vault.
    CheckVault {
        /// Operator address.
        operator: Address,
        /// Vault address.
        vault: Address,
    },
}

impl OptInCommands {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let deployment = global_config.deployment()?;
        match self {
            Self::L1In { l1, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let service = IOperatorL1OptInService::new(deployment.op_l1_opt_in, writer.provider());
                writer
                    .execute::<IOperatorL1OptInServiceErrors, _>("Opt In L1", service.optIn(*l1))
                    .await?;
            }
            Self::L1Out { l1, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let service = IOperatorL1OptInService::new(deployment.op_l1_opt_in, writer.provider());
                writer
                    .execute::<IOperatorL1OptInServiceErrors, _>("Opt Out L1", service.optOut(*l1))
                    .await?;
            }
            Self::CheckL1 { operator, l1 } => {
                let provider = global_config.read_provider().await?;
                let service = IOperatorL1OptInService::new(deployment.op_l1_opt_in, provider);
                let result = service.isOptedIn(*operator, *l1).call().await;
                if let Some(opted_in) =
                    read::<IOperatorL1OptInServiceErrors, _>("L1 opt-in status", result)
                {
                    tracing::info!("Operator {operator} opted into L1 {l1}: {opted_in}");
                }
            }
            Self::VaultIn { vault, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let service =
                    IOperatorVaultOptInService::new(deployment.op_vault_opt_in, writer.provider());
                writer
                    .execute::<IOperatorVaultOptInServiceErrors, _>(
                        "Opt In Vault",
                        service.optIn(*vault),
                    )
                    .await?;
            }
            Self::VaultOut { vault, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let service =
                    IOperatorVaultOptInService::new(deployment.op_vault_opt_in, writer.provider());
                writer
                    .execute::<IOperatorVaultOptInServiceErrors, _>(
                        "Opt Out Vault",
                        service.optOut(*vault),
                    )
                    .await?;
            }
            Self::CheckVault { operator, vault } => {
                let provider = global_config.read_provider().await?;
                let service = IOperatorVaultOptInService::new(deployment.op_vault_opt_in, provider);
                let result = service.isOptedIn(*operator, *vault).call().await;
                if let Some(opted_in) =
                    read::<IOperatorVaultOptInServiceErrors, _>("vault opt-in status", result)
                {
                    tracing::info!("Operator {operator} opted into vault {vault}: {opted_in}");
                }
            }
        }
        Ok(())
    }
}
