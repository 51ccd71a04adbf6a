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

//! P-Chain transactions of the L1 validator lifecycle.

use std::time::Duration;

use alloy::primitives::{Bytes, FixedBytes};
use clap::Subcommand;
use colored::Colorize;
use suzaku_sdk::{pchain::TxStatus, Id, PChainAddress, TxBody};

use crate::{
    config::GlobalConfig,
    parse::{format_avax, parse_avax, parse_bls_pop},
};

/// P-Chain commands.
#[derive(Subcommand, Clone, Debug)]
pub enum PChainCommands {
    /// Print the P-Chain address of the signer.
    Address,
    /// Get the AVAX balance of a P-Chain address, defaults to the signer's.
    Balance {
        /// P-Chain address, e.g. `P-fuji1...`.
        address: Option<PChainAddress>,
    },
    /// Register an L1 validator from a signed RegisterL1Validator message.
    RegisterValidator {
        /// Signed warp message, hex encoded.
        signed_message: Bytes,
        /// BLS proof of possession of the node.
        #[clap(value_parser = parse_bls_pop)]
        bls_pop: FixedBytes<96>,
        /// Initial balance of the validator, in AVAX.
        #[clap(long, value_parser = parse_avax, default_value = "0.1")]
        balance: u64,
    },
    /// Apply a signed L1ValidatorWeight message.
    SetValidatorWeight {
        /// Signed warp message, hex encoded.
        signed_message: Bytes,
    },
    /// Top up the balance of an L1 validator.
    IncreaseValidatorBalance {
        /// Validation ID, CB58 or hex.
        validation_id: Id,
        /// Amount in AVAX.
        #[clap(value_parser = parse_avax)]
        amount: u64,
    },
    /// Disable an L1 validator, returning its remaining balance.
    DisableValidator {
        /// Validation ID, CB58 or hex.
        validation_id: Id,
    },
    /// Get the status of a P-Chain transaction.
    TxStatus {
        /// Transaction ID.
        tx_id: Id,
    },
    /// Aggregate the signatures of the L1 validators over a warp message.
    CollectSignatures {
        /// Unsigned warp message, hex encoded.
        message: Bytes,
        /// Justification of the message, hex encoded.
        #[clap(long)]
        justification: Option<Bytes>,
    },
}

impl PChainCommands {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let client = global_config.pchain_client()?;
        let body = match self {
            Self::Address => {
                let signer = global_config.require_signer().await?;
                println!("{}", client.address_of(&signer)?);
                return Ok(());
            }
            Self::Balance { address } => {
                let address = match address {
                    Some(address) => address.clone(),
                    None => client.address_of(&global_config.require_signer().await?)?,
                };
                let balance = client.get_balance(&address).await?;
                tracing::info!(
                    "{address}: {} AVAX ({} AVAX unlocked)",
                    format_avax(balance.balance),
                    format_avax(balance.unlocked)
                );
                return Ok(());
            }
            Self::TxStatus { tx_id } => {
                let status = client.get_tx_status(tx_id).await?;
                let status = match status {
                    TxStatus::Committed => status.to_string().green(),
                    TxStatus::Dropped { .. } => status.to_string().red(),
                    _ => status.to_string().yellow(),
                };
                tracing::info!("Transaction {tx_id}: {status}");
                return Ok(());
            }
            Self::CollectSignatures { message, justification } => {
                let signed = global_config
                    .aggregator(Duration::ZERO)?
                    .aggregate(message, justification.as_deref().map(|v| &**v))
                    .await?;
                println!("0x{}", hex::encode(signed));
                return Ok(());
            }
            Self::RegisterValidator { signed_message, bls_pop, balance } => {
                TxBody::RegisterL1Validator {
                    balance: *balance,
                    proof_of_possession: bls_pop.0,
                    message: signed_message.to_vec(),
                }
            }
            Self::SetValidatorWeight { signed_message } => {
                TxBody::SetL1ValidatorWeight { message: signed_message.to_vec() }
            }
            Self::IncreaseValidatorBalance { validation_id, amount } => {
                TxBody::IncreaseL1ValidatorBalance {
                    validation_id: validation_id.0,
                    balance: *amount,
                }
            }
            Self::DisableValidator { validation_id } => {
                TxBody::DisableL1Validator { validation_id: validation_id.0 }
            }
        };

        let signer = global_config.require_signer().await?;
        let issued = client.issue(&signer, body).await?;
        tracing::info!(
            "Issued P-Chain transaction {} (fee {} AVAX)",
            issued.tx_id,
            format_avax(issued.fee)
        );
        client
            .wait_for_tx(
                &issued.tx_id,
                global_config.pchain_poll_interval,
                global_config.pchain_poll_retries,
            )
            .await?;
        Ok(())
    }
}
