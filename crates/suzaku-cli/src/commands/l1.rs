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

//! Commands of the L1 registry.

use alloy::{
    primitives::{utils::format_ether, Address, U256},
    providers::DynProvider,
};
use clap::{Args, Subcommand};
use suzaku_sdk::{
    contracts::{
        IL1Registry::{self, IL1RegistryErrors},
        IOperatorL1OptInService::{self, IOperatorL1OptInServiceErrors},
        IOperatorRegistry::{self, IOperatorRegistryErrors},
    },
    Deployment,
};

use crate::{
    config::GlobalConfig,
    display::table,
    tx::{read, TxArgs, Writer},
};

/// Default fee paid to register an L1, in wei.
pub const DEFAULT_REGISTER_FEE: u128 = 10_000_000_000_000_000;

/// Commands of the L1 registry.
#[derive(Subcommand, Clone, Debug)]
pub enum L1Commands {
    /// Register an L1 with its middleware and metadata URL.
    Register(L1Register),
    /// List the registered L1s.
    List,
    /// Check whether an L1 is registered.
    IsRegistered {
        /// Validator manager of the L1.
        l1: Address,
    },
    /// Update the metadata URL of an L1.
    SetMetadataUrl {
        /// Validator manager of the L1.
        l1: Address,
        /// New metadata URL.
        metadata_url: String,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// Update the middleware of an L1.
    SetMiddleware {
        /// Validator manager of the L1.
        l1: Address,
        /// New middleware.
        middleware: Address,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// List the registered operators opted into an L1.
    Operators {
        /// Validator manager of the L1.
        l1: Address,
    },
}

impl L1Commands {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let deployment = global_config.deployment()?;
        match self {
            Self::Register(cmd) => cmd.run(global_config).await,
            Self::List => {
                let provider = global_config.read_provider().await?;
                let registry = IL1Registry::new(deployment.l1_registry, provider);
                let Some(l1s) =
                    read::<IL1RegistryErrors, _>("L1s", registry.getAllL1s().call().await)
                else {
                    return Ok(());
                };
                let rows = l1s._0.iter().zip(&l1s._1).zip(&l1s._2).map(|((l1, middleware), url)| {
                    vec![l1.to_string(), middleware.to_string(), url.clone()]
                });
                tracing::info!("{} registered L1s", l1s._0.len());
                println!("{}", table(&["L1", "Middleware", "Metadata URL"], rows));
                Ok(())
            }
            Self::IsRegistered { l1 } => {
                let provider = global_config.read_provider().await?;
                let registry = IL1Registry::new(deployment.l1_registry, provider);
                let result = registry.isRegistered(*l1).call().await;
                if let Some(registered) = read::<IL1RegistryErrors, _>("L1 registration", result) {
                    tracing::info!("L1 {l1} registered: {registered}");
                }
                Ok(())
            }
            Self::SetMetadataUrl { l1, metadata_url, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let registry = IL1Registry::new(deployment.l1_registry, writer.provider());
                let call = registry.setMetadataURL(*l1, metadata_url.clone());
                writer.execute::<IL1RegistryErrors, _>("Set Metadata URL", call).await?;
                Ok(())
            }
            Self::SetMiddleware { l1, middleware, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let registry = IL1Registry::new(deployment.l1_registry, writer.provider());
                let call = registry.setL1Middleware(*l1, *middleware);
                writer.execute::<IL1RegistryErrors, _>("Set L1 Middleware", call).await?;
                Ok(())
            }
            Self::Operators { l1 } => {
                let provider = global_config.read_provider().await?;
                let Some(operators) = opted_in_operators(&provider, &deployment, *l1).await else {
                    return Ok(());
                };
                tracing::info!("{} operators opted into L1 {l1}", operators.len());
                println!("{}", table(&["Operator"], operators.iter().map(|op| vec![op])));
                Ok(())
            }
        }
    }
}

/// Command to register an L1.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct L1Register {
    /// Validator manager of the L1.
    pub validator_manager: Address,
    /// Middleware of the L1.
    pub l1_middleware: Address,
    /// URL of the L1 metadata.
    pub metadata_url: String,
    /// Registration fee in wei.
    #[clap(long, default_value_t = U256::from(DEFAULT_REGISTER_FEE))]
    pub fee: U256,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl L1Register {
    /// Run the [L1Register] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let deployment = global_config.deployment()?;
        let writer = Writer::connect(global_config, &self.tx).await?;
        let registry = IL1Registry::new(deployment.l1_registry, writer.provider());
        tracing::debug!("Registering L1 with a fee of {} AVAX", format_ether(self.fee));

        let call = registry
            .registerL1(self.validator_manager, self.l1_middleware, self.metadata_url.clone())
            .value(self.fee);
        if writer.execute::<IL1RegistryErrors, _>("Register L1", call).await?.is_some() {
            tracing::info!("Registered L1 {}", self.validator_manager);
        }
        Ok(())
    }
}

/// Registered operators that are opted into `l1`.
///
/// Read failures are logged: `None` when the operators cannot be listed, and operators whose
/// opt-in cannot be checked are left out.
pub async fn opted_in_operators(
    provider: &DynProvider,
    deployment: &Deployment,
    l1: Address,
) -> Option<Vec<Address>> {
    let operator_registry = IOperatorRegistry::new(deployment.operator_registry, provider);
    let opt_in = IOperatorL1OptInService::new(deployment.op_l1_opt_in, provider);

    let result = operator_registry.getAllOperators().call().await;
    let operators = read::<IOperatorRegistryErrors, _>("operators", result)?;

    let mut opted_in = Vec::new();
    for operator in operators._0 {
        let result = opt_in.isOptedIn(operator, l1).call().await;
        let what = format!("opt-in of operator {operator}");
        if read::<IOperatorL1OptInServiceErrors, _>(what, result) == Some(true) {
            opted_in.push(operator);
        }
    }
    Some(opted_in)
}
