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

//! Common configuration options for commands in the Suzaku CLI.

use std::{path::PathBuf, time::Duration};

use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use anyhow::{bail, Context, Result};
use clap::Args;
use suzaku_sdk::{
    keystore, Deployment, Keystore, Network, NetworkProfile, PChainClient, SignatureAggregator,
};
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::parse::parse_seconds;

/// Common configuration options for all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalConfig {
    /// Network to target
    #[clap(short, long, env = "SUZAKU_NETWORK", global = true, value_enum, default_value_t = Network::Fuji)]
    pub network: Network,

    /// URL of the EVM RPC endpoint, defaults to the network's public endpoint
    #[clap(long, env = "RPC_URL", global = true)]
    pub rpc_url: Option<Url>,

    /// Private key of the wallet
    ///
    /// Not accepted on mainnet, use --secret-name instead.
    #[clap(short = 'k', long, env = "PK", global = true, hide_env_values = true)]
    pub private_key: Option<PrivateKeySigner>,

    /// Name of the keystore secret holding the private key of the wallet
    #[clap(short, long, env = "SUZAKU_SECRET_NAME", global = true, conflicts_with = "private_key")]
    pub secret_name: Option<String>,

    /// Base URL of the P-Chain API, defaults to the network's public endpoint
    #[clap(long, env = "PCHAIN_API_URL", global = true)]
    pub pchain_api_url: Option<Url>,

    /// URL of the signature aggregation endpoint, defaults to the network's Glacier endpoint
    #[clap(long, env = "SIGNATURE_AGGREGATOR_URL", global = true)]
    pub signature_aggregator_url: Option<Url>,

    /// EVM transaction timeout in seconds.
    #[clap(long, env = "TX_TIMEOUT", global = true, value_parser = parse_seconds)]
    pub tx_timeout: Option<Duration>,

    /// Seconds between two P-Chain transaction status checks.
    #[clap(long, env = "PCHAIN_POLL_INTERVAL", global = true, value_parser = parse_seconds, default_value = "6")]
    pub pchain_poll_interval: Duration,

    /// Number of P-Chain transaction status checks before giving up.
    #[clap(long, env = "PCHAIN_POLL_RETRIES", global = true, default_value_t = 10)]
    pub pchain_poll_retries: u32,

    /// Log level (error, warn, info, debug, trace)
    #[clap(long, env = "LOG_LEVEL", global = true, default_value = "info")]
    pub log_level: LevelFilter,

    /// Directory holding the keystore, defaults to ~/.suzaku-cli
    #[clap(long, env = "SUZAKU_HOME", global = true)]
    pub suzaku_home: Option<PathBuf>,

    /// Configuration for the Suzaku deployment to use.
    #[clap(flatten, next_help_heading = "Suzaku Deployment")]
    pub deployment: Option<Deployment>,
}

impl GlobalConfig {
    /// Reject configurations that must fail before anything touches the network.
    pub fn validate(&self) -> Result<()> {
        if self.network.is_mainnet() && self.private_key.is_some() {
            bail!(
                "Raw private keys are not accepted on mainnet; store the key with `suzaku keystore create` and pass --secret-name"
            );
        }
        Ok(())
    }

    /// The fixed endpoints of the selected network.
    pub fn profile(&self) -> &'static NetworkProfile {
        self.network.profile()
    }

    /// The EVM RPC URL, either given explicitly or from the network profile.
    pub fn rpc_url(&self) -> Result<Url> {
        match &self.rpc_url {
            Some(url) => Ok(url.clone()),
            None => Url::parse(self.profile().rpc_url).context("Invalid network RPC URL"),
        }
    }

    /// The protocol registries, either given explicitly or built into the network.
    pub fn deployment(&self) -> Result<Deployment> {
        self.deployment.clone().or_else(|| self.network.deployment()).with_context(|| {
            format!(
                "No built-in Suzaku deployment for {}; please set --l1-registry, --operator-registry, --op-l1-opt-in and --op-vault-opt-in",
                self.network
            )
        })
    }

    /// The directory holding the keystore.
    pub fn suzaku_home(&self) -> Result<PathBuf> {
        match &self.suzaku_home {
            Some(home) => Ok(home.clone()),
            None => keystore::default_home()
                .context("Could not determine the home directory; please set --suzaku-home"),
        }
    }

    pub async fn keystore(&self) -> Result<Keystore> {
        Ok(Keystore::open(&self.suzaku_home()?).await?)
    }

    /// Whether a signer is configured, without resolving it.
    pub fn has_signer(&self) -> bool {
        self.private_key.is_some() || self.secret_name.is_some()
    }

    /// Resolve the signer from --private-key or from the keystore secret named by --secret-name.
    pub async fn require_signer(&self) -> Result<PrivateKeySigner> {
        if let Some(signer) = &self.private_key {
            return Ok(signer.clone());
        }
        let Some(name) = &self.secret_name else {
            bail!("Private key not provided; please set --private-key, --secret-name or the PK env var");
        };
        let secret = self.keystore().await?.show(name).await?;
        let key = secret.lines().next().unwrap_or_default().trim();
        key.parse::<PrivateKeySigner>()
            .with_context(|| format!("Keystore secret {name} does not hold a valid private key"))
    }

    /// Address of the configured signer.
    pub async fn signer_address(&self) -> Result<Address> {
        Ok(self.require_signer().await?.address())
    }

    /// A provider that can only read chain state.
    pub async fn read_provider(&self) -> Result<DynProvider> {
        let rpc_url = self.rpc_url()?;
        let provider = ProviderBuilder::new()
            .connect(rpc_url.as_str())
            .await
            .with_context(|| format!("failed to connect provider to {rpc_url}"))?;
        Ok(provider.erased())
    }

    /// A provider signing transactions with the configured signer.
    pub async fn write_provider(&self) -> Result<(DynProvider, PrivateKeySigner)> {
        let signer = self.require_signer().await?;
        let rpc_url = self.rpc_url()?;
        let provider = ProviderBuilder::new()
            .wallet(signer.clone())
            .connect(rpc_url.as_str())
            .await
            .with_context(|| format!("failed to connect provider to {rpc_url}"))?;
        Ok((provider.erased(), signer))
    }

    /// Signature aggregation client for the network, waiting `delay` before each request.
    pub fn aggregator(&self, delay: Duration) -> Result<SignatureAggregator> {
        let url = match (&self.signature_aggregator_url, self.profile().signature_aggregator_url) {
            (Some(url), _) => url.clone(),
            (None, Some(url)) => Url::parse(url).context("Invalid aggregator URL")?,
            (None, None) => bail!(
                "No signature aggregator for {}; please set --signature-aggregator-url",
                self.network
            ),
        };
        Ok(SignatureAggregator::new(url)?.with_delay(delay))
    }

    /// P-Chain API client for the network.
    pub fn pchain_client(&self) -> Result<PChainClient> {
        let profile = self.profile();
        let url = match &self.pchain_api_url {
            Some(url) => url.clone(),
            None => Url::parse(profile.pchain_api_url).context("Invalid P-Chain API URL")?,
        };
        Ok(PChainClient::new(&url, profile.network_id, profile.hrp)?)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct TestArgs {
        #[command(flatten)]
        config: GlobalConfig,
    }

    const KEY: &str = "0x56289e99c94b6912bfc12adc093c9b51124f0dc54ac7a766b2bc5ccf558d8027";

    fn parse(args: &[&str]) -> GlobalConfig {
        let mut argv = vec!["suzaku"];
        argv.extend_from_slice(args);
        TestArgs::try_parse_from(argv).unwrap().config
    }

    #[test]
    fn mainnet_rejects_raw_private_key() {
        let config = parse(&["--network", "mainnet", "--private-key", KEY]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("--secret-name"), "{err}");

        parse(&["--network", "fuji", "--private-key", KEY]).validate().unwrap();
        parse(&["--network", "mainnet", "--secret-name", "ops/key"]).validate().unwrap();
    }

    #[test]
    fn endpoints_follow_network() {
        let fuji = parse(&["--network", "fuji"]);
        assert_eq!(fuji.rpc_url().unwrap().as_str(), "https://api.avax-test.network/ext/bc/C/rpc");
        assert_eq!(fuji.pchain_poll_interval, Duration::from_secs(6));
        assert_eq!(fuji.pchain_poll_retries, 10);

        let anvil = parse(&["--network", "anvil"]);
        assert_eq!(anvil.rpc_url().unwrap().as_str(), "http://127.0.0.1:8545/");
        assert!(anvil.aggregator(Duration::ZERO).is_err());
        assert_eq!(anvil.pchain_client().unwrap().network_id(), 12345);

        let custom = parse(&["--network", "anvil", "--rpc-url", "http://10.0.0.1:9650/ext/bc/x/rpc"]);
        assert_eq!(custom.rpc_url().unwrap().as_str(), "http://10.0.0.1:9650/ext/bc/x/rpc");
    }

    #[test]
    fn mainnet_needs_explicit_deployment() {
        assert!(parse(&["--network", "mainnet"]).deployment().is_err());
        assert_eq!(parse(&["--network", "fuji"]).deployment().unwrap(), suzaku_sdk::deployments::FUJI);
    }

    #[tokio::test]
    async fn missing_signer_is_reported() {
        let err = parse(&[]).require_signer().await.unwrap_err();
        assert!(err.to_string().contains("Private key not provided"), "{err}");
    }
}
