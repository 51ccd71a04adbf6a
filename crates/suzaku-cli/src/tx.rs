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

//! Sending contract calls: simulate, send and wait, or print the calldata.

use std::{
    fmt::{Debug, Display},
    time::Duration,
};

use alloy::{
    contract::{CallBuilder, CallDecoder},
    primitives::{Address, Bytes, TxKind, U256},
    providers::DynProvider,
    rpc::types::TransactionReceipt,
    sol_types::SolInterface,
};
use anyhow::{ensure, Context};
use clap::Args;
use suzaku_sdk::DecodeRevert;

use crate::config::GlobalConfig;

/// Options shared by every command sending a transaction.
#[derive(Args, Clone, Debug, Default)]
pub struct TxArgs {
    /// Only print the target, value and calldata of the transaction without sending it.
    #[clap(long)]
    pub calldata: bool,
}

/// A call prepared by a [Writer]: sent, or printed in calldata mode.
pub struct Writer {
    provider: DynProvider,
    sender: Option<Address>,
    calldata: bool,
    tx_timeout: Option<Duration>,
}

impl Writer {
    /// Connect a provider for a state-changing command.
    ///
    /// In calldata mode no signer is required, and the provider is only used to build calls.
    pub async fn connect(global_config: &GlobalConfig, tx: &TxArgs) -> anyhow::Result<Self> {
        let (provider, sender) = if tx.calldata {
            let sender = match global_config.has_signer() {
                true => Some(global_config.signer_address().await?),
                false => None,
            };
            (global_config.read_provider().await?, sender)
        } else {
            let (provider, signer) = global_config.write_provider().await?;
            (provider, Some(signer.address()))
        };
        Ok(Self { provider, sender, calldata: tx.calldata, tx_timeout: global_config.tx_timeout })
    }

    pub fn provider(&self) -> DynProvider {
        self.provider.clone()
    }

    /// Address of the signer, used as the default for optional account arguments.
    pub fn sender(&self) -> anyhow::Result<Address> {
        self.sender.context(
            "No signer configured; pass the account explicitly or set --private-key or --secret-name",
        )
    }

    /// Simulate `call`, then send it and wait for a successful receipt.
    ///
    /// Reverts are decoded with the errors of `E`. Returns `None` in calldata mode, after
    /// printing the call.
    pub async fn execute<E, D>(
        &self,
        name: &str,
        call: CallBuilder<&DynProvider, D>,
    ) -> anyhow::Result<Option<TransactionReceipt>>
    where
        E: SolInterface + Debug,
        D: CallDecoder,
    {
        if self.calldata {
            print_call(name, call.into_transaction_request());
            return Ok(None);
        }

        let call = match self.sender {
            Some(sender) => call.from(sender),
            None => call,
        };

        tracing::debug!(%name, "Simulating transaction");
        call.call()
            .await
            .maybe_decode_revert::<E>()
            .with_context(|| format!("{name} simulation failed"))?;

        let pending_tx = call
            .send()
            .await
            .maybe_decode_revert::<E>()
            .with_context(|| format!("Sending {name} transaction failed"))?;
        let tx_hash = *pending_tx.tx_hash();
        tracing::info!(%tx_hash, "Sent {name} transaction");

        let timeout = self.tx_timeout.or(pending_tx.timeout());
        tracing::debug!(?timeout, %tx_hash, "Waiting for transaction receipt");
        let receipt = pending_tx
            .with_timeout(timeout)
            .get_receipt()
            .await
            .with_context(|| format!("Failed to receive receipt of {name} transaction"))?;

        ensure!(receipt.status(), "{name} transaction failed: tx_hash = {}", receipt.transaction_hash);
        tracing::info!(
            tx_hash = %receipt.transaction_hash,
            block = ?receipt.block_number,
            "{name} transaction confirmed"
        );
        Ok(Some(receipt))
    }
}

fn print_call(name: &str, request: alloy::rpc::types::TransactionRequest) {
    let target = match request.to {
        Some(TxKind::Call(address)) => address.to_string(),
        _ => "<contract creation>".to_string(),
    };
    let calldata = request.input.input().cloned().unwrap_or_default();
    println!("{}", format_call(name, &target, request.value, &calldata));
}

/// Render a call the way `--calldata` prints it.
pub fn format_call(name: &str, target: &str, value: Option<U256>, calldata: &Bytes) -> String {
    let mut out = format!("========= {name} Call =========\nContract: {target}\n");
    if let Some(value) = value.filter(|value| !value.is_zero()) {
        out.push_str(&format!("Value: {value}\n"));
    }
    out.push_str(&format!("Calldata: 0x{}\n", hex::encode(calldata)));
    out.push_str(&"=".repeat(40));
    out
}

/// Unwrap the result of a read-only call, logging the failure instead of propagating it.
///
/// Reverts are decoded with the errors of `E`.
pub fn read<E, T>(what: impl Display, result: Result<T, alloy::contract::Error>) -> Option<T>
where
    E: SolInterface + Debug,
{
    match result.maybe_decode_revert::<E>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!("Failed to read {what}: {err:#}");
            None
        }
    }
}
