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

//! Management of the GPG encrypted secret store used by `--secret-name`.

use anyhow::{ensure, Context};
use clap::Subcommand;
use colored::Colorize;
use suzaku_sdk::Keystore;

use crate::config::GlobalConfig;

/// Keystore commands.
#[derive(Subcommand, Clone, Debug)]
pub enum KeystoreCommands {
    /// List the GPG identities available to encrypt the keystore.
    ListGpgIds,
    /// Initialize the keystore, or re-encrypt it for a new set of GPG identities.
    Init {
        /// GPG identities the secrets are encrypted to.
        #[clap(required = true)]
        gpg_ids: Vec<String>,
    },
    /// Store a secret, e.g. a private key.
    Create {
        /// Name of the secret, e.g. `fuji/operator`.
        name: String,
        /// Value of the secret.
        value: String,
        /// Overwrite an existing secret.
        #[clap(long)]
        force: bool,
    },
    /// Remove a secret or a directory of secrets.
    Rm {
        /// Name of the secret or directory.
        name: String,
        /// Remove directories and their content.
        #[clap(long, short)]
        recursive: bool,
    },
    /// Move or rename a secret.
    Mv {
        /// Current name.
        from: String,
        /// New name.
        to: String,
        /// Overwrite an existing destination.
        #[clap(long)]
        force: bool,
    },
    /// Copy a secret.
    Cp {
        /// Source name.
        from: String,
        /// Destination name.
        to: String,
        /// Overwrite an existing destination.
        #[clap(long)]
        force: bool,
    },
    /// Print the secrets of the keystore as a tree.
    List,
}

impl KeystoreCommands {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        match self {
            Self::ListGpgIds => {
                let ids = Keystore::list_gpg_ids().await?;
                if ids.is_empty() {
                    tracing::warn!("No GPG key found; create one with `gpg --full-generate-key`");
                }
                for id in ids {
                    println!("{id}");
                }
            }
            Self::Init { gpg_ids } => {
                let home = global_config.suzaku_home()?;
                tokio::fs::create_dir_all(&home)
                    .await
                    .with_context(|| format!("Failed to create {}", home.display()))?;
                let keystore = Keystore::init(&home, gpg_ids).await?;
                tracing::info!(
                    "Keystore {} initialized for {}",
                    keystore.store_dir().display(),
                    gpg_ids.join(", ")
                );
            }
            Self::Create { name, value, force } => {
                ensure!(!value.is_empty(), "Secret value must not be empty");
                let mut keystore = global_config.keystore().await?;
                keystore.insert(name, value, *force).await?;
                tracing::info!("Secret {} stored", name.green());
            }
            Self::Rm { name, recursive } => {
                let mut keystore = global_config.keystore().await?;
                keystore.rm(name, *recursive, true).await?;
                tracing::info!("Removed {}", name.yellow());
            }
            Self::Mv { from, to, force } => {
                let mut keystore = global_config.keystore().await?;
                keystore.mv(from, to, *force).await?;
                tracing::info!("Moved {from} to {}", to.green());
            }
            Self::Cp { from, to, force } => {
                let mut keystore = global_config.keystore().await?;
                keystore.cp(from, to, *force).await?;
                tracing::info!("Copied {from} to {}", to.green());
            }
            Self::List => {
                let keystore = global_config.keystore().await?;
                println!("{}", keystore.render());
            }
        }
        Ok(())
    }
}
