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

//! Starting the validator lifecycle operations of a node.

use std::time::Duration;

use alloy::primitives::{Address, FixedBytes, U256};
use clap::Args;
use suzaku_sdk::{
    contracts::IAvalancheL1Middleware::{self, PChainOwner},
    extract_tx_log, Id, NodeId,
};

use super::Errors;
use crate::{
    config::GlobalConfig,
    parse::{parse_bls_key, parse_pchain_owner, OwnerAddress},
    tx::{TxArgs, Writer},
};

/// Default validity of a registration message.
const DEFAULT_REGISTRATION_EXPIRY: Duration = Duration::from_secs(12 * 60 * 60);

/// Command to add a node to the middleware.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct AddNode {
    /// Node ID, e.g. `NodeID-...`.
    pub node_id: NodeId,
    /// Compressed BLS public key of the node.
    #[clap(value_parser = parse_bls_key)]
    pub bls_key: FixedBytes<48>,
    /// Stake of the node in wei, 0 for the operator's available stake.
    #[clap(long, default_value_t = U256::ZERO)]
    pub initial_stake: U256,
    /// Expiry of the registration message as a unix timestamp, defaults to 12 hours from now.
    #[clap(long)]
    pub registration_expiry: Option<u64>,
    /// Signatures required to spend the remaining P-Chain balance.
    #[clap(long, default_value_t = 1)]
    pub pchain_remaining_balance_owner_threshold: u32,
    /// Signatures required to disable the validator.
    #[clap(long, default_value_t = 1)]
    pub pchain_disable_owner_threshold: u32,
    /// Owner of the remaining P-Chain balance, repeatable, defaults to the signer.
    #[clap(long, value_parser = parse_pchain_owner)]
    pub pchain_remaining_balance_owner_address: Vec<OwnerAddress>,
    /// Owner allowed to disable the validator, repeatable, defaults to the signer.
    #[clap(long, value_parser = parse_pchain_owner)]
    pub pchain_disable_owner_address: Vec<OwnerAddress>,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl AddNode {
    /// Run the [AddNode] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let hrp = global_config.profile().hrp;
        let remaining_balance_owners = short_ids(&self.pchain_remaining_balance_owner_address, hrp)?;
        let disable_owners = short_ids(&self.pchain_disable_owner_address, hrp)?;

        let writer = Writer::connect(global_config, &self.tx).await?;
        let registration_expiry = match self.registration_expiry {
            Some(expiry) => expiry,
            None => {
                let now = u64::try_from(chrono::Utc::now().timestamp())?;
                now + DEFAULT_REGISTRATION_EXPIRY.as_secs()
            }
        };

        let owners_needed = remaining_balance_owners.is_empty() || disable_owners.is_empty();
        let default_owner = match owners_needed {
            true => vec![self.default_owner(global_config).await?],
            false => Vec::new(),
        };
        let owner = |threshold: u32, addresses: Vec<Address>| PChainOwner {
            threshold,
            addresses: match addresses.is_empty() {
                true => default_owner.clone(),
                false => addresses,
            },
        };
        let remaining_balance_owner =
            owner(self.pchain_remaining_balance_owner_threshold, remaining_balance_owners);
        let disable_owner = owner(self.pchain_disable_owner_threshold, disable_owners);

        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract.addNode(
            self.node_id.to_bytes32(),
            self.bls_key.to_vec().into(),
            registration_expiry,
            remaining_balance_owner,
            disable_owner,
            self.initial_stake,
        );
        if let Some(receipt) = writer.execute::<Errors, _>("Add Node", call).await? {
            let log = extract_tx_log::<IAvalancheL1Middleware::NodeAdded>(&receipt)?;
            tracing::info!(
                "Node {} added with stake {} and validation ID {}",
                self.node_id,
                log.data().stake,
                Id(log.data().validationID)
            );
        }
        Ok(())
    }

    /// P-Chain owner derived from the signer key.
    async fn default_owner(&self, global_config: &GlobalConfig) -> anyhow::Result<Address> {
        let signer = global_config.require_signer().await?;
        let address = global_config.pchain_client()?.address_of(&signer)?;
        Ok(Address::from(address.short_id()))
    }
}

fn short_ids(owners: &[OwnerAddress], hrp: &str) -> anyhow::Result<Vec<Address>> {
    owners.iter().map(|owner| owner.short_id(hrp)).collect()
}

/// Command to start the removal of a node.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct RemoveNode {
    /// Node ID, e.g. `NodeID-...`.
    pub node_id: NodeId,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl RemoveNode {
    /// Run the [RemoveNode] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract.removeNode(self.node_id.to_bytes32());
        if let Some(receipt) = writer.execute::<Errors, _>("Remove Node", call).await? {
            let log = extract_tx_log::<IAvalancheL1Middleware::NodeRemoved>(&receipt)?;
            tracing::info!(
                "Removal of node {} started, validation ID {}",
                self.node_id,
                Id(log.data().validationID)
            );
        }
        Ok(())
    }
}

/// Command to start a stake update of a node.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct InitStakeUpdate {
    /// Node ID, e.g. `NodeID-...`.
    pub node_id: NodeId,
    /// New stake of the node, in wei.
    pub new_stake: U256,
    #[clap(flatten)]
    pub tx: TxArgs,
}

impl InitStakeUpdate {
    /// Run the [InitStakeUpdate] command.
    pub async fn run(&self, middleware: Address, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let writer = Writer::connect(global_config, &self.tx).await?;
        let contract = IAvalancheL1Middleware::new(middleware, writer.provider());
        let call = contract.initializeValidatorStakeUpdate(self.node_id.to_bytes32(), self.new_stake);
        writer.execute::<Errors, _>("Initialize Stake Update", call).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use suzaku_sdk::PChainAddress;

    use super::*;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(flatten)]
        config: GlobalConfig,
        #[command(flatten)]
        add_node: AddNode,
    }

    const MIDDLEWARE: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const NODE_ID: &str = "NodeID-P7oB2McjBGgW2NXXWVYjV8JEDFoW9xDE5";
    const EWOQ_KEY: &str = "0x56289e99c94b6912bfc12adc093c9b51124f0dc54ac7a766b2bc5ccf558d8027";

    #[tokio::test]
    async fn owners_of_another_network_are_rejected() {
        let bls_key = format!("0x{}", "aa".repeat(48));
        let mainnet_owner = PChainAddress::new("avax", [0x3c; 20]).unwrap().to_string();
        let cli = Cli::try_parse_from([
            "cli",
            "--network",
            "fuji",
            "-k",
            EWOQ_KEY,
            NODE_ID,
            &bls_key,
            "--pchain-disable-owner-address",
            &mainnet_owner,
            "--calldata",
        ])
        .unwrap();

        let err = cli.add_node.run(MIDDLEWARE.parse().unwrap(), &cli.config).await.unwrap_err();
        assert!(err.to_string().contains("not on the selected network"), "{err}");
    }

    #[test]
    fn owners_resolve_to_short_ids() {
        let local = PChainAddress::new("local", [0x3c; 20]).unwrap().to_string();
        let hex = format!("0x{}", "4d".repeat(20));
        let owners = [parse_pchain_owner(&local).unwrap(), parse_pchain_owner(&hex).unwrap()];
        let ids = short_ids(&owners, "local").unwrap();
        assert_eq!(ids, vec![Address::repeat_byte(0x3c), Address::repeat_byte(0x4d)]);
        assert!(short_ids(&owners, "fuji").is_err());
    }
}
