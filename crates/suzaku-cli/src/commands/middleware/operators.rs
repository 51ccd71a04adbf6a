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

//! Operator membership of a middleware.

use alloy::primitives::Address;
use clap::Args;
use suzaku_sdk::contracts::IAvalancheL1Middleware;

use super::Errors;
use crate::{
    config::GlobalConfig,
    tx::{TxArgs, Writer},
};

/// Command to register an operator on the middleware.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct RegisterOperator {
    /// Operator address.
    pub operator: Address,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl RegisterOperator {
    /// Run the [RegisterOperator] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract.registerOperator(self.operator);
        if writer.execute::<Errors, _>("Register Operator", call).await?.is_some() {
            tracing::info!("Operator {} registered on middleware {middleware}", self.operator);
        }
        Ok(())
    }
}

/// Command to disable an operator.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct DisableOperator {
    /// Operator address.
    pub operator: Address,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl DisableOperator {
    /// Run the [DisableOperator] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract.disableOperator(self.operator);
        writer.execute::<Errors, _>("Disable Operator", call).await?;
        Ok(())
    }
}

/// Command to enable a disabled operator.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct EnableOperator {
    /// Operator address.
    pub operator: Address,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl EnableOperator {
    /// Run the [EnableOperator] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract.enableOperator(self.operator);
        writer.execute::<Errors, _>("Enable Operator", call).await?;
        Ok(())
    }
}

/// Command to remove a disabled operator once its grace period passed.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct RemoveOperator {
    /// Operator address.
    pub operator: Address,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl RemoveOperator {
    /// Run the [RemoveOperator] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract.removeOperator(self.operator);
        writer.execute::<Errors, _>("Remove Operator", call).await?;
        Ok(())
    }
}
