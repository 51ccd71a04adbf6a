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

//! Solidity interfaces of the Suzaku restaking contracts and receipt helpers.

use std::fmt::Debug;

use alloy::{
    primitives::Bytes,
    rpc::types::{Log, TransactionReceipt},
    sol_types::{SolEvent, SolInterface},
};
use anyhow::{anyhow, ensure, Context, Result};

use crate::warp::WARP_PRECOMPILE_ADDRESS;

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IL1Registry.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IOperatorRegistry.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IMiddlewareVaultManager.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IVaultTokenized.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IL1RestakeDelegator.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IAvalancheL1Middleware.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IOperatorL1OptInService.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IOperatorVaultOptInService.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IBalancerValidatorManager.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IRewards.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IUptimeTracker.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IERC20.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IWarpMessenger.sol"
);

/// Decode contract reverts into the custom errors of a Solidity interface.
pub trait DecodeRevert<T> {
    /// If the error carries revert data matching one of the errors of `E`, replace it with an
    /// error that displays the decoded variant. Any other error is passed through.
    fn maybe_decode_revert<E: SolInterface + Debug>(self) -> Result<T>;
}

impl<T> DecodeRevert<T> for Result<T, alloy::contract::Error> {
    fn maybe_decode_revert<E: SolInterface + Debug>(self) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => match err.as_decoded_interface_error::<E>() {
                Some(decoded) => Err(anyhow!("contract reverted with {decoded:?}")),
                None => Err(err.into()),
            },
        }
    }
}

/// Extract the single log of type `E` from a receipt.
pub fn extract_tx_log<E: SolEvent + Debug + Clone>(
    receipt: &TransactionReceipt,
) -> Result<Log<E>, anyhow::Error> {
    let logs = receipt
        .inner
        .logs()
        .iter()
        .filter(|log| log.topic0().map(|topic| E::SIGNATURE_HASH == *topic).unwrap_or(false))
        .map(|log| {
            log.log_decode::<E>().with_context(|| format!("failed to decode event {}", E::SIGNATURE))
        })
        .collect::<Result<Vec<_>>>()?;

    match &logs[..] {
        [log] => Ok(log.clone()),
        [] => Err(anyhow!(
            "transaction 0x{:x} did not emit event {}",
            receipt.transaction_hash,
            E::SIGNATURE
        )),
        _ => Err(anyhow!(
            "transaction 0x{:x} emitted {} events with signature {}",
            receipt.transaction_hash,
            logs.len(),
            E::SIGNATURE
        )),
    }
}

/// Extract the unsigned warp message sent through the warp precompile in a transaction.
pub fn extract_warp_message(receipt: &TransactionReceipt) -> Result<Bytes> {
    let log = extract_tx_log::<IWarpMessenger::SendWarpMessage>(receipt)?;
    ensure!(
        log.address() == WARP_PRECOMPILE_ADDRESS,
        "SendWarpMessage in transaction 0x{:x} was emitted by {}, not the warp precompile",
        receipt.transaction_hash,
        log.address()
    );
    tracing::debug!(
        message_id = %log.data().unsignedMessageID,
        source = %log.data().sourceAddress,
        "found warp message"
    );
    Ok(log.data().message.clone())
}
