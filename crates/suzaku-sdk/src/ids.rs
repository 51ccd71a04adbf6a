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

//! Avalanche identifiers: CB58 encoding, node IDs and 32-byte IDs.

use std::{fmt, str::FromStr};

use alloy::primitives::{FixedBytes, B256};
use sha2::{Digest, Sha256};

/// Length of the checksum appended by CB58 and by the Avalanche hex encoding.
pub const CHECKSUM_LEN: usize = 4;

const NODE_ID_PREFIX: &str = "NodeID-";
const NODE_ID_LEN: usize = 20;

/// Errors produced when parsing identifiers.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    /// The string is not valid base58.
    #[error("invalid base58: {0}")]
    Base58(String),
    /// The string is not valid hex.
    #[error("invalid hex: {0}")]
    Hex(String),
    /// The payload is shorter than the checksum.
    #[error("encoded value is too short to carry a checksum")]
    TooShort,
    /// The trailing checksum does not match the payload.
    #[error("checksum mismatch")]
    Checksum,
    /// The decoded value does not have the expected length.
    #[error("expected {expected} bytes, got {actual}")]
    Length {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },
    /// A node ID is missing the `NodeID-` prefix.
    #[error("node ID must start with \"{NODE_ID_PREFIX}\"")]
    MissingPrefix,
}

/// Last four bytes of the sha256 digest of `payload`.
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    out
}

/// Append the checksum to `payload`.
pub fn with_checksum(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    out.extend_from_slice(payload);
    out.extend_from_slice(&checksum(payload));
    out
}

/// Split off and verify a trailing checksum, returning the payload.
pub fn strip_checksum(bytes: &[u8]) -> Result<&[u8], IdError> {
    if bytes.len() < CHECKSUM_LEN {
        return Err(IdError::TooShort);
    }
    let (payload, sum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if checksum(payload) != sum {
        return Err(IdError::Checksum);
    }
    Ok(payload)
}

/// Encode bytes as CB58.
pub fn cb58_encode(payload: &[u8]) -> String {
    bs58::encode(with_checksum(payload)).into_string()
}

/// Decode a CB58 string, verifying its checksum.
pub fn cb58_decode(encoded: &str) -> Result<Vec<u8>, IdError> {
    let raw = bs58::decode(encoded).into_vec().map_err(|e| IdError::Base58(e.to_string()))?;
    strip_checksum(&raw).map(<[u8]>::to_vec)
}

/// Parse hex with an optional `0x` prefix into exactly `N` bytes.
pub fn parse_fixed_hex<const N: usize>(value: &str) -> Result<FixedBytes<N>, IdError> {
    let raw = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(raw).map_err(|e| IdError::Hex(e.to_string()))?;
    if bytes.len() != N {
        return Err(IdError::Length { expected: N, actual: bytes.len() });
    }
    Ok(FixedBytes::from_slice(&bytes))
}

/// Parse hex with an optional `0x` prefix.
pub fn parse_hex(value: &str) -> Result<Vec<u8>, IdError> {
    let raw = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(raw).map_err(|e| IdError::Hex(e.to_string()))
}

/// An Avalanche node ID, `NodeID-` followed by the CB58 encoding of 20 bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId([u8; NODE_ID_LEN]);

impl NodeId {
    /// Wrap raw node ID bytes.
    pub const fn new(bytes: [u8; NODE_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw 20 bytes of the node ID.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Left-pad the node ID to the `bytes32` representation used by the contracts.
    pub fn to_bytes32(&self) -> B256 {
        let mut out = [0u8; 32];
        out[32 - NODE_ID_LEN..].copy_from_slice(&self.0);
        B256::from(out)
    }

    /// Recover a node ID from its left-padded `bytes32` representation.
    pub fn from_bytes32(value: B256) -> Self {
        let mut out = [0u8; NODE_ID_LEN];
        out.copy_from_slice(&value[32 - NODE_ID_LEN..]);
        Self(out)
    }
}

impl FromStr for NodeId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoded = s.strip_prefix(NODE_ID_PREFIX).ok_or(IdError::MissingPrefix)?;
        let bytes = cb58_decode(encoded)?;
        let bytes: [u8; NODE_ID_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| IdError::Length { expected: NODE_ID_LEN, actual: bytes.len() })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{NODE_ID_PREFIX}{}", cb58_encode(&self.0))
    }
}

/// A 32-byte Avalanche ID (transaction, blockchain, subnet or validation ID).
///
/// Displayed as CB58. Parses from CB58 or `0x`-prefixed hex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Id(pub B256);

impl Id {
    /// The all-zero ID, which is the blockchain ID of the P-Chain.
    pub const ZERO: Id = Id(B256::ZERO);
}

impl From<B256> for Id {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<Id> for B256 {
    fn from(value: Id) -> Self {
        value.0
    }
}

impl FromStr for Id {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") {
            return parse_fixed_hex::<32>(s).map(Id);
        }
        let bytes = cb58_decode(s)?;
        if bytes.len() != 32 {
            return Err(IdError::Length { expected: 32, actual: bytes.len() });
        }
        Ok(Id(B256::from_slice(&bytes)))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cb58_encode(self.0.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pchain_id_is_zero() {
        assert_eq!(Id::ZERO.to_string(), "11111111111111111111111111111111LpoYY");
        assert_eq!("11111111111111111111111111111111LpoYY".parse::<Id>().unwrap(), Id::ZERO);
    }

    #[test]
    fn node_id_round_trips_through_bytes32() {
        let node_id: NodeId = "NodeID-P7oB2McjBGgW2NXXWVYjV8JEDFoW9xDE5".parse().unwrap();
        let padded = node_id.to_bytes32();
        assert!(padded[..12].iter().all(|b| *b == 0));
        assert_eq!(NodeId::from_bytes32(padded), node_id);
        assert_eq!(node_id.to_string(), "NodeID-P7oB2McjBGgW2NXXWVYjV8JEDFoW9xDE5");
    }

    #[test]
    fn node_id_requires_prefix() {
        let err = "P7oB2McjBGgW2NXXWVYjV8JEDFoW9xDE5".parse::<NodeId>().unwrap_err();
        assert_eq!(err, IdError::MissingPrefix);
    }

    #[test]
    fn node_id_rejects_bad_checksum() {
        let node_id = NodeId::new([7u8; 20]);
        let mut raw = bs58::decode(node_id.to_string().trim_start_matches("NodeID-"))
            .into_vec()
            .unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = format!("NodeID-{}", bs58::encode(raw).into_string());
        assert_eq!(tampered.parse::<NodeId>().unwrap_err(), IdError::Checksum);
    }

    #[test]
    fn node_id_rejects_wrong_length() {
        let short = format!("NodeID-{}", cb58_encode(&[1u8; 19]));
        assert_eq!(
            short.parse::<NodeId>().unwrap_err(),
            IdError::Length { expected: 20, actual: 19 }
        );
    }

    #[test]
    fn fixed_hex_checks_length() {
        let key = parse_fixed_hex::<48>(&format!("0x{}", "ab".repeat(48))).unwrap();
        assert_eq!(key.len(), 48);
        assert_eq!(
            parse_fixed_hex::<96>(&"ab".repeat(48)).unwrap_err(),
            IdError::Length { expected: 96, actual: 48 }
        );
        assert!(matches!(parse_fixed_hex::<32>("0xzz"), Err(IdError::Hex(_))));
    }

    #[test]
    fn id_parses_hex_and_cb58() {
        let raw = B256::repeat_byte(0x42);
        let id = Id(raw);
        assert_eq!(id.to_string().parse::<Id>().unwrap(), id);
        assert_eq!(format!("{raw}").parse::<Id>().unwrap(), id);
    }
}
