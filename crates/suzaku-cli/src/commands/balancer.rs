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

use alloy::primitives::Address;
use clap::{Args, Subcommand};
use suzaku_sdk::{
    contracts::IBalancerValidatorManager::{self, IBalancerValidatorManagerErrors},
    Id, NodeId,
};

use crate::{
    config::GlobalConfig,
    display::table,
    tx::{read, TxArgs, Writer},
};

/// Commands of a balancer validator manager.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct BalancerArgs {
    /// Address of the balancer validator manager.
    pub balancer: Address,
    #[command(subcommand)]
    pub command: BalancerCommands,
}

/// Balancer validator manager operations.
#[derive(Subcommand, Clone, Debug)]
pub enum BalancerCommands {
    /// Register a security module, or update its maximum weight.
    SetUpSecurityModule {
        /// Security module, usually an L1 middleware.
        module: Address,
        /// Maximum validator weight the module may hold.
        max_weight: u64,
        #[clap(flatten)]
        tx: TxArgs,
    },
    /// List the security modules.
    GetSecurityModules,
    /// Get the current and maximum weight of a security module.
    GetSecurityModuleWeights {
        /// Security module address.
        module: Address,
    },
    /// Get a validator by validation ID.
    GetValidator {
        /// Validation ID, CB58 or hex.
        validation_id: Id,
    },
}

/// Human readable name of a validator status of the validator manager.
pub fn validator_status(status: u8) -> &'static str {
    match status {
        0 => "Unknown",
        1 => "PendingAdded",
        2 => "Active",
        3 => "PendingRemoved",
        4 => "Completed",
        5 => "Invalidated",
        _ => "Invalid",
    }
}

impl BalancerArgs {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        type Errors = IBalancerValidatorManagerErrors;
        match &self.command {
            BalancerCommands::SetUpSecurityModule { module, max_weight, tx } => {
                let writer = Writer::connect(global_config, tx).await?;
                let balancer = IBalancerValidatorManager::new(self.balancer, writer.provider());
                let call = balancer.setUpSecurityModule(*module, *max_weight);
                writer.execute::<Errors, _>("Set Up Security Module", call).await?;
            }
            BalancerCommands::GetSecurityModules => {
                let provider = global_config.read_provider().await?;
                let balancer = IBalancerValidatorManager::new(self.balancer, provider);
                let result = balancer.getSecurityModules().call().await;
                if let Some(modules) = read::<Errors, _>("security modules", result) {
                    tracing::info!("{} security modules", modules.len());
                    println!("{}", table(&["Security module"], modules.iter().map(|m| vec![m])));
                }
            }
            BalancerCommands::GetSecurityModuleWeights { module } => {
                let provider = global_config.read_provider().await?;
                let balancer = IBalancerValidatorManager::new(self.balancer, provider);
                let result = balancer.getSecurityModuleWeights(*module).call().await;
                if let Some(weights) = read::<Errors, _>("security module weights", result) {
                    tracing::info!(
                        "Security module {module}: weight {}, max weight {}",
                        weights.weight,
                        weights.maxWeight
                    );
                }
            }
            BalancerCommands::GetValidator { validation_id } => {
                let provider = global_config.read_provider().await?;
                let balancer = IBalancerValidatorManager::new(self.balancer, provider);
                let result = balancer.getValidator(validation_id.0).call().await;
                if let Some(validator) = read::<Errors, _>("validator", result) {
                    let node_id = match <[u8; 20]>::try_from(validator.nodeID.as_ref()) {
                        Ok(bytes) => NodeId::new(bytes).to_string(),
                        Err(_) => validator.nodeID.to_string(),
                    };
                    let rows = [
                        vec!["Validation ID".to_string(), validation_id.to_string()],
                        vec!["Node ID".to_string(), node_id],
                        vec!["Status".to_string(), validator_status(validator.status).to_string()],
                        vec!["Starting weight".to_string(), validator.startingWeight.to_string()],
                        vec!["Weight".to_string(), validator.weight.to_string()],
                        vec!["Message nonce".to_string(), validator.messageNonce.to_string()],
                        vec!["Started at".to_string(), validator.startedAt.to_string()],
                        vec!["Ended at".to_string(), validator.endedAt.to_string()],
                    ];
                    println!("{}", table(&["Field", "Value"], rows));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_status_names() {
        assert_eq!(validator_status(2), "Active");
        assert_eq!(validator_status(3), "PendingRemoved");
        assert_eq!(validator_status(42), "Invalid");
    }
}
