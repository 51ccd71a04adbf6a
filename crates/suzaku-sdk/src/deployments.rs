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

//! Network profiles and protocol-wide contract deployments.

use std::fmt;

use alloy::primitives::{address, Address};
use clap::{Args, ValueEnum};
use derive_builder::Builder;

pub use alloy_chains::NamedChain;

/// The fixed set of networks the CLI can target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum Network {
    /// Avalanche Fuji testnet.
    #[default]
    Fuji,
    /// Avalanche mainnet.
    Mainnet,
    /// Local anvil node.
    Anvil,
}

/// Endpoints and identifiers associated with a [Network].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkProfile {
    /// EIP-155 chain ID of the C-Chain (or anvil).
    pub chain_id: u64,
    /// EVM JSON-RPC endpoint.
    pub rpc_url: &'static str,
    /// Base URL of the P-Chain API, without the `/ext/bc/P` suffix.
    pub pchain_api_url: &'static str,
    /// Signature aggregation endpoint, if one exists for the network.
    pub signature_aggregator_url: Option<&'static str>,
    /// Avalanche network ID used in warp messages and P-Chain transactions.
    pub network_id: u32,
    /// Bech32 human readable part of P-Chain addresses.
    pub hrp: &'static str,
}

const FUJI_PROFILE: NetworkProfile = NetworkProfile {
    chain_id: NamedChain::AvalancheFuji as u64,
    rpc_url: "https://api.avax-test.network/ext/bc/C/rpc",
    pchain_api_url: "https://api.avax-test.network",
    signature_aggregator_url: Some(
        "https://glacier-api-dev.avax.network/v1/signatureAggregator/fuji/aggregateSignatures",
    ),
    network_id: 5,
    hrp: "fuji",
};

const MAINNET_PROFILE: NetworkProfile = NetworkProfile {
    chain_id: NamedChain::Avalanche as u64,
    rpc_url: "https://api.avax.network/ext/bc/C/rpc",
    pchain_api_url: "https://api.avax.network",
    signature_aggregator_url: Some(
        "https://glacier-api.avax.network/v1/signatureAggregator/mainnet/aggregateSignatures",
    ),
    network_id: 1,
    hrp: "avax",
};

const ANVIL_PROFILE: NetworkProfile = NetworkProfile {
    chain_id: NamedChain::AnvilHardhat as u64,
    rpc_url: "http://127.0.0.1:8545",
    pchain_api_url: "http://127.0.0.1:9650",
    signature_aggregator_url: None,
    network_id: 12345,
    hrp: "local",
};

impl Network {
    /// The fixed [NetworkProfile] of this network.
    pub const fn profile(&self) -> &'static NetworkProfile {
        match self {
            Network::Fuji => &FUJI_PROFILE,
            Network::Mainnet => &MAINNET_PROFILE,
            Network::Anvil => &ANVIL_PROFILE,
        }
    }

    /// Whether this network settles real value.
    pub const fn is_mainnet(&self) -> bool {
        matches!(self, Network::Mainnet)
    }

    /// The built-in [Deployment] of the protocol registries on this network, if any.
    pub const fn deployment(&self) -> Option<Deployment> {
        match self {
            Network::Fuji => Some(FUJI),
            Network::Anvil => Some(ANVIL),
            Network::Mainnet => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Fuji => f.write_str("fuji"),
            Network::Mainnet => f.write_str("mainnet"),
            Network::Anvil => f.write_str("anvil"),
        }
    }
}

/// Addresses of the protocol-wide registries and opt-in services.
// NOTE: See https://github.com/clap-rs/clap/issues/5092#issuecomment-1703980717 about clap usage.
#[non_exhaustive]
#[derive(Clone, Debug, Builder, Args, PartialEq, Eq)]
#[group(
    requires = "l1_registry",
    requires = "operator_registry",
    requires = "op_l1_opt_in",
    requires = "op_vault_opt_in"
)]
pub struct Deployment {
    /// Address of the L1 registry contract.
    #[clap(long, env = "L1_REGISTRY", required = false)]
    #[builder(setter(into))]
    pub l1_registry: Address,

    /// Address of the operator registry contract.
    #[clap(long, env = "OPERATOR_REGISTRY", required = false)]
    #[builder(setter(into))]
    pub operator_registry: Address,

    /// Address of the operator to L1 opt-in service.
    #[clap(long, env = "OP_L1_OPT_IN", required = false)]
    #[builder(setter(into))]
    pub op_l1_opt_in: Address,

    /// Address of the operator to vault opt-in service.
    #[clap(long, env = "OP_VAULT_OPT_IN", required = false)]
    #[builder(setter(into))]
    pub op_vault_opt_in: Address,
}

impl Deployment {
    /// Create a new [DeploymentBuilder].
    pub fn builder() -> DeploymentBuilder {
        Default::default()
    }

    /// Lookup the [Deployment] for a [Network].
    pub const fn from_network(network: Network) -> Option<Deployment> {
        network.deployment()
    }

    /// Lookup the [Deployment] by EVM chain ID.
    pub fn from_chain_id(chain_id: impl Into<u64>) -> Option<Deployment> {
        match NamedChain::try_from(chain_id.into()).ok()? {
            NamedChain::AvalancheFuji => Some(FUJI),
            NamedChain::AnvilHardhat => Some(ANVIL),
            _ => None,
        }
    }
}

/// [Deployment] on the Fuji testnet.
pub const FUJI: Deployment = Deployment {
    l1_registry: address!("0xB9826Bbf0deB10cC3924449B93F418db6b16be36"),
    operator_registry: address!("0x46D45D6be6214F6bd8124187caD1a5302755d7A2"),
    op_l1_opt_in: address!("0x0360C1cB32A20D97b358538D9Db71339ce2c9592"),
    op_vault_opt_in: address!("0xC30c9f7482B2ED82d0532812285295f8b7453941"),
};

/// [Deployment] produced by the local anvil deployment scripts.
pub const ANVIL: Deployment = Deployment {
    l1_registry: address!("0x0165878A594ca255338adfa4d48449f69242Eb8F"),
    operator_registry: address!("0xa513E6E4b8f2a923D98304ec87F64353C4D5C853"),
    op_l1_opt_in: address!("0x8A791620dd6260079BF849Dc5567aDC3F2FdC318"),
    op_vault_opt_in: address!("0xa513E6E4b8f2a923D98304ec87F64353C4D5C853"),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_target_fixed_endpoints() {
        let fuji = Network::Fuji.profile();
        assert_eq!(fuji.chain_id, 43113);
        assert_eq!(fuji.rpc_url, "https://api.avax-test.network/ext/bc/C/rpc");
        assert_eq!(fuji.network_id, 5);
        assert_eq!(fuji.hrp, "fuji");

        let mainnet = Network::Mainnet.profile();
        assert_eq!(mainnet.chain_id, 43114);
        assert_eq!(mainnet.rpc_url, "https://api.avax.network/ext/bc/C/rpc");
        assert_eq!(mainnet.pchain_api_url, "https://api.avax.network");
        assert_eq!(mainnet.network_id, 1);
        assert_eq!(mainnet.hrp, "avax");

        let anvil = Network::Anvil.profile();
        assert_eq!(anvil.chain_id, 31337);
        assert_eq!(anvil.rpc_url, "http://127.0.0.1:8545");
        assert!(anvil.signature_aggregator_url.is_none());
    }

    #[test]
    fn mainnet_has_no_builtin_deployment() {
        assert!(Network::Mainnet.deployment().is_none());
        assert_eq!(Deployment::from_network(Network::Fuji), Some(FUJI));
        assert_eq!(Deployment::from_chain_id(31337u64), Some(ANVIL));
        assert_eq!(Deployment::from_chain_id(43114u64), None);
    }

    #[test]
    fn builder_requires_all_addresses() {
        let partial = Deployment::builder().l1_registry(Address::ZERO).build();
        assert!(partial.is_err());

        let full = Deployment::builder()
            .l1_registry(FUJI.l1_registry)
            .operator_registry(FUJI.operator_registry)
            .op_l1_opt_in(FUJI.op_l1_opt_in)
            .op_vault_opt_in(FUJI.op_vault_opt_in)
            .build()
            .unwrap();
        assert_eq!(full, FUJI);
    }

    #[test]
    fn network_names_match_value_enum() {
        for network in [Network::Fuji, Network::Mainnet, Network::Anvil] {
            let parsed = Network::from_str(&network.to_string(), false).unwrap();
            assert_eq!(parsed, network);
        }
    }
}
