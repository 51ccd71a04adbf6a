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

//! Value parsers for command line arguments.

use std::{num::ParseIntError, time::Duration};

use alloy::primitives::{
    utils::{format_units, parse_units},
    Address, FixedBytes, U256,
};
use anyhow::{anyhow, ensure, Context};
use suzaku_sdk::{ids::parse_fixed_hex, PChainAddress, PCHAIN_AVAX_DECIMALS};

/// Decimals of the ERC-20 collateral and reward tokens handled by the CLI.
pub const TOKEN_DECIMALS: u8 = 18;

pub fn parse_seconds(arg: &str) -> Result<Duration, ParseIntError> {
    Ok(Duration::from_secs(arg.parse()?))
}

/// Parse a decimal AVAX amount into nAVAX.
pub fn parse_avax(arg: &str) -> anyhow::Result<u64> {
    let amount: U256 = parse_units(arg, PCHAIN_AVAX_DECIMALS)
        .map_err(|e| anyhow!("Failed to parse AVAX amount {arg}: {e}"))?
        .into();
    u64::try_from(amount).with_context(|| format!("AVAX amount {arg} is too large"))
}

/// Parse a decimal token amount with [TOKEN_DECIMALS] decimals.
pub fn parse_token_amount(arg: &str) -> anyhow::Result<U256> {
    let amount: U256 = parse_units(arg, TOKEN_DECIMALS)
        .map_err(|e| anyhow!("Failed to parse token amount {arg}: {e}"))?
        .into();
    ensure!(!amount.is_zero(), "Amount is below the denomination minimum: {arg}");
    Ok(amount)
}

pub fn format_avax(amount: u64) -> String {
    format_units(U256::from(amount), PCHAIN_AVAX_DECIMALS).unwrap_or_else(|_| amount.to_string())
}

pub fn format_token(amount: U256, decimals: u8) -> String {
    format_units(amount, decimals).unwrap_or_else(|_| amount.to_string())
}

/// Parse a compressed BLS public key.
pub fn parse_bls_key(arg: &str) -> anyhow::Result<FixedBytes<48>> {
    Ok(parse_fixed_hex::<48>(arg)?)
}

/// Parse a BLS proof of possession.
pub fn parse_bls_pop(arg: &str) -> anyhow::Result<FixedBytes<96>> {
    Ok(parse_fixed_hex::<96>(arg)?)
}

/// Owner of a P-Chain validator as given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnerAddress {
    /// 20 byte hex short ID, valid on every network.
    ShortId(Address),
    /// P-Chain address, bound to the network of its prefix.
    Address(PChainAddress),
}

impl OwnerAddress {
    /// The short ID of the owner, rejecting addresses whose prefix is not `hrp`.
    pub fn short_id(&self, hrp: &str) -> anyhow::Result<Address> {
        match self {
            Self::ShortId(short_id) => Ok(*short_id),
            Self::Address(address) => {
                ensure!(
                    address.hrp() == hrp,
                    "P-Chain address {address} is not on the selected network, expected a P-{hrp}1... address"
                );
                Ok(Address::from(address.short_id()))
            }
        }
    }
}

/// Parse an owner of a P-Chain validator, as a 20 byte hex short ID or a P-Chain address.
pub fn parse_pchain_owner(arg: &str) -> anyhow::Result<OwnerAddress> {
    if arg.starts_with("0x") {
        let short_id = arg.parse().with_context(|| format!("Invalid owner address {arg}"))?;
        return Ok(OwnerAddress::ShortId(short_id));
    }
    Ok(OwnerAddress::Address(arg.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avax_amounts_use_nine_decimals() {
        assert_eq!(parse_avax("0.1").unwrap(), 100_000_000);
        assert_eq!(parse_avax("1").unwrap(), 1_000_000_000);
        assert_eq!(parse_avax("0.000000001").unwrap(), 1);
        assert!(parse_avax("99999999999999999999").is_err());
        assert_eq!(format_avax(1_500_000_000), "1.500000000");
    }

    #[test]
    fn token_amounts_keep_full_precision() {
        let amount = parse_token_amount("123456789.123456789123456789").unwrap();
        assert_eq!(amount, U256::from(123_456_789_123_456_789_123_456_789u128));
        assert_eq!(format_token(amount, TOKEN_DECIMALS), "123456789.123456789123456789");
        assert!(parse_token_amount("0").is_err());
    }

    #[test]
    fn bls_material_has_fixed_length() {
        let key = format!("0x{}", "ab".repeat(48));
        assert_eq!(parse_bls_key(&key).unwrap(), FixedBytes::<48>::repeat_byte(0xab));
        assert!(parse_bls_key(&"ab".repeat(47)).is_err());
        assert!(parse_bls_pop(&"cd".repeat(96)).is_ok());
    }

    #[test]
    fn pchain_owners_accept_both_encodings() {
        let short_id = [0x3c; 20];
        let address = PChainAddress::new("fuji", short_id).unwrap();
        let owner = parse_pchain_owner(&address.to_string()).unwrap();
        assert_eq!(owner.short_id("fuji").unwrap(), Address::from(short_id));
        let hex = format!("0x{}", "3c".repeat(20));
        let owner = parse_pchain_owner(&hex).unwrap();
        assert_eq!(owner.short_id("fuji").unwrap(), Address::from(short_id));
        assert_eq!(owner.short_id("avax").unwrap(), Address::from(short_id));
        assert!(parse_pchain_owner("P-fuji1invalid").is_err());
    }

    #[test]
    fn pchain_owner_must_match_network() {
        let mainnet = PChainAddress::new("avax", [0x3c; 20]).unwrap();
        let owner = parse_pchain_owner(&mainnet.to_string()).unwrap();
        let err = owner.short_id("fuji").unwrap_err();
        assert!(err.to_string().contains("P-fuji1"), "{err}");
        assert!(owner.short_id("avax").is_ok());
    }

    #[test]
    fn seconds() {
        assert_eq!(parse_seconds("90").unwrap(), Duration::from_secs(90));
        assert!(parse_seconds("1.5").is_err());
    }
}
