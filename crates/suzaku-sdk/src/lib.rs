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

//! Bindings and protocol helpers for the Suzaku restaking contracts on Avalanche L1s.

pub mod aggregator;
pub mod codec;
pub mod contracts;
pub mod deployments;
pub mod ids;
pub mod keystore;
pub mod pchain;
pub mod uptime;
pub mod warp;

pub use aggregator::SignatureAggregator;
pub use contracts::{extract_tx_log, extract_warp_message, DecodeRevert};
pub use deployments::{Deployment, Network, NetworkProfile};
pub use ids::{Id, NodeId};
pub use keystore::{Keystore, KeystoreError};
pub use pchain::{PChainAddress, PChainClient, PChainError, TxBody};
pub use uptime::{validation_uptime_message, ValidatorsClient};
pub use warp::{pack_warp_into_access_list, UnsignedMessage, ValidatorMessage};

/// Decimals of AVAX on the P-Chain.
pub const PCHAIN_AVAX_DECIMALS: u8 = 9;
