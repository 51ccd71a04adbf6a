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

use std::{fmt, str::FromStr};

use alloy::signers::local::PrivateKeySigner;
use anyhow::{anyhow, Context};
use bech32::{Bech32, Hrp};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// A P-Chain address: `P-` followed by the bech32 encoding of a secp256k1 key hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PChainAddress {
    hrp: Hrp,
    short_id: [u8; 20],
}

impl PChainAddress {
    pub fn new(hrp: &str, short_id: [u8; 20]) -> anyhow::Result<Self> {
        let hrp = Hrp::parse(hrp).with_context(|| format!("invalid address prefix {hrp}"))?;
        Ok(Self { hrp, short_id })
    }

    /// Address controlled by the secp256k1 key of `signer`.
    pub fn from_signer(signer: &PrivateKeySigner, hrp: &str) -> anyhow::Result<Self> {
        let public_key = signer.credential().verifying_key().to_encoded_point(true);
        Self::new(hrp, short_id(public_key.as_bytes()))
    }

    /// ripemd160(sha256(key)) identifying the owner in transaction outputs.
    pub fn short_id(&self) -> [u8; 20] {
        self.short_id
    }

    pub fn hrp(&self) -> &str {
        self.hrp.as_str()
    }
}

/// ripemd160(sha256(compressed public key)).
pub fn short_id(compressed_public_key: &[u8]) -> [u8; 20] {
    let hash = Ripemd160::digest(Sha256::digest(compressed_public_key));
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash);
    out
}

impl fmt::Display for PChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = bech32::encode::<Bech32>(self.hrp, &self.short_id).map_err(|_| fmt::Error)?;
        write!(f, "P-{encoded}")
    }
}

impl FromStr for PChainAddress {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoded = s.strip_prefix("P-").unwrap_or(s);
        let (hrp, data) =
            bech32::decode(encoded).with_context(|| format!("invalid P-Chain address {s}"))?;
        let short_id: [u8; 20] = data
            .as_slice()
            .try_into()
            .map_err(|_| anyhow!("P-Chain address must encode 20 bytes, got {}", data.len()))?;
        Ok(Self { hrp, short_id })
    }
}
