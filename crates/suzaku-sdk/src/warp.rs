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

//! Warp message packing for the validator lifecycle.
//!
//! Messages exchanged with the P-Chain are an [UnsignedMessage] wrapping an [AddressedCall]
//! with an empty source address, whose payload is one of the validator messages defined here.
//! Signed messages are passed to contracts through the access list of the transaction, see
//! [pack_warp_into_access_list].

use alloy::{
    eips::eip2930::{AccessList, AccessListItem},
    primitives::{address, Address, FixedBytes, B256},
    providers::Provider,
    rpc::types::{BlockNumberOrTag, Filter},
    sol_types::SolEvent,
};
use anyhow::Context;
use sha2::{Digest, Sha256};

use crate::{
    codec::{CodecError, Packer, Unpacker},
    contracts::IWarpMessenger,
    ids::Id,
};

/// Address of the warp messenger precompile.
pub const WARP_PRECOMPILE_ADDRESS: Address =
    address!("0x0200000000000000000000000000000000000005");

const ADDRESSED_CALL_TYPE_ID: u32 = 1;
const SUBNET_TO_L1_CONVERSION_TYPE_ID: u32 = 0;
const REGISTER_L1_VALIDATOR_TYPE_ID: u32 = 1;
const L1_VALIDATOR_REGISTRATION_TYPE_ID: u32 = 2;
const L1_VALIDATOR_WEIGHT_TYPE_ID: u32 = 3;
const VALIDATION_UPTIME_TYPE_ID: u32 = 0;

const BLS_PUBLIC_KEY_LEN: usize = 48;

/// Number of bootstrap validator indices checked when building a registration justification.
pub const BOOTSTRAP_VALIDATORS_TO_SEARCH: u32 = 100;
/// Number of blocks per `eth_getLogs` request when searching for registration messages.
pub const LOG_SEARCH_BATCH_SIZE: u64 = 2048;

/// An unsigned warp message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedMessage {
    pub network_id: u32,
    pub source_chain_id: B256,
    pub payload: Vec<u8>,
}

impl UnsignedMessage {
    /// A message from the P-Chain carrying `payload` in an [AddressedCall].
    pub fn from_pchain(network_id: u32, payload: Vec<u8>) -> Self {
        let call = AddressedCall { source_address: Vec::new(), payload };
        Self { network_id, source_chain_id: Id::ZERO.0, payload: call.to_bytes() }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packer = Packer::with_codec_version();
        packer
            .u32(self.network_id)
            .fixed(self.source_chain_id.as_slice())
            .var_bytes(&self.payload);
        packer.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut unpacker = Unpacker::new(bytes);
        unpacker.codec_version()?;
        let network_id = unpacker.u32("network ID")?;
        let source_chain_id = B256::from(unpacker.array::<32>("source chain ID")?);
        let payload = unpacker.var_bytes("payload")?.to_vec();
        unpacker.finish()?;
        Ok(Self { network_id, source_chain_id, payload })
    }

    /// Decode the payload as an [AddressedCall].
    pub fn addressed_call(&self) -> Result<AddressedCall, CodecError> {
        AddressedCall::from_bytes(&self.payload)
    }

    /// The message ID, sha256 of the encoded message.
    pub fn id(&self) -> B256 {
        B256::from_slice(&Sha256::digest(self.to_bytes()))
    }
}

/// A call whose payload is attributed to an address on the source chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressedCall {
    pub source_address: Vec<u8>,
    pub payload: Vec<u8>,
}

impl AddressedCall {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packer = Packer::with_codec_version();
        packer.u32(ADDRESSED_CALL_TYPE_ID).var_bytes(&self.source_address).var_bytes(&self.payload);
        packer.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut unpacker = Unpacker::new(bytes);
        unpacker.codec_version()?;
        unpacker.type_id("addressed call", ADDRESSED_CALL_TYPE_ID)?;
        let source_address = unpacker.var_bytes("source address")?.to_vec();
        let payload = unpacker.var_bytes("payload")?.to_vec();
        unpacker.finish()?;
        Ok(Self { source_address, payload })
    }
}

/// Owner of the P-Chain balance or of the right to disable a validator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PChainOwner {
    pub threshold: u32,
    pub addresses: Vec<Address>,
}

impl PChainOwner {
    fn pack(&self, packer: &mut Packer) {
        packer.u32(self.threshold).u32(self.addresses.len() as u32);
        for address in &self.addresses {
            packer.fixed(address.as_slice());
        }
    }

    fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let threshold = unpacker.u32("owner threshold")?;
        let count = unpacker.u32("owner address count")?;
        let addresses = (0..count)
            .map(|_| unpacker.array::<20>("owner address").map(Address::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { threshold, addresses })
    }
}

/// Request to register a validator of an L1, emitted by the validator manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterL1Validator {
    pub subnet_id: B256,
    pub node_id: Vec<u8>,
    pub bls_public_key: FixedBytes<BLS_PUBLIC_KEY_LEN>,
    pub registration_expiry: u64,
    pub remaining_balance_owner: PChainOwner,
    pub disable_owner: PChainOwner,
    pub weight: u64,
}

impl RegisterL1Validator {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packer = Packer::with_codec_version();
        packer
            .u32(REGISTER_L1_VALIDATOR_TYPE_ID)
            .fixed(self.subnet_id.as_slice())
            .var_bytes(&self.node_id)
            .fixed(self.bls_public_key.as_slice())
            .u64(self.registration_expiry);
        self.remaining_balance_owner.pack(&mut packer);
        self.disable_owner.pack(&mut packer);
        packer.u64(self.weight);
        packer.finish()
    }

    /// Decode the payload, rejecting any trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut unpacker = Unpacker::new(bytes);
        unpacker.codec_version()?;
        unpacker.type_id("register L1 validator", REGISTER_L1_VALIDATOR_TYPE_ID)?;
        let subnet_id = B256::from(unpacker.array::<32>("subnet ID")?);
        let node_id = unpacker.var_bytes("node ID")?.to_vec();
        let bls_public_key = FixedBytes::from(unpacker.array::<BLS_PUBLIC_KEY_LEN>("BLS key")?);
        let registration_expiry = unpacker.u64("registration expiry")?;
        let remaining_balance_owner = PChainOwner::unpack(&mut unpacker)?;
        let disable_owner = PChainOwner::unpack(&mut unpacker)?;
        let weight = unpacker.u64("weight")?;
        unpacker.finish()?;
        Ok(Self {
            subnet_id,
            node_id,
            bls_public_key,
            registration_expiry,
            remaining_balance_owner,
            disable_owner,
            weight,
        })
    }

    /// The validation ID, sha256 of the encoded payload.
    pub fn validation_id(&self) -> B256 {
        B256::from_slice(&Sha256::digest(self.to_bytes()))
    }
}

/// P-Chain acknowledgement that a validation period started or ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct L1ValidatorRegistration {
    pub validation_id: B256,
    pub registered: bool,
}

impl L1ValidatorRegistration {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packer = Packer::with_codec_version();
        packer
            .u32(L1_VALIDATOR_REGISTRATION_TYPE_ID)
            .fixed(self.validation_id.as_slice())
            .bool(self.registered);
        packer.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut unpacker = Unpacker::new(bytes);
        unpacker.codec_version()?;
        unpacker.type_id("L1 validator registration", L1_VALIDATOR_REGISTRATION_TYPE_ID)?;
        let validation_id = B256::from(unpacker.array::<32>("validation ID")?);
        let registered = unpacker.bool("registered")?;
        unpacker.finish()?;
        Ok(Self { validation_id, registered })
    }
}

/// Weight change of a validator, sent by the validator manager and echoed by the P-Chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct L1ValidatorWeight {
    pub validation_id: B256,
    pub nonce: u64,
    pub weight: u64,
}

impl L1ValidatorWeight {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packer = Packer::with_codec_version();
        packer
            .u32(L1_VALIDATOR_WEIGHT_TYPE_ID)
            .fixed(self.validation_id.as_slice())
            .u64(self.nonce)
            .u64(self.weight);
        packer.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut unpacker = Unpacker::new(bytes);
        unpacker.codec_version()?;
        unpacker.type_id("L1 validator weight", L1_VALIDATOR_WEIGHT_TYPE_ID)?;
        let validation_id = B256::from(unpacker.array::<32>("validation ID")?);
        let nonce = unpacker.u64("nonce")?;
        let weight = unpacker.u64("weight")?;
        unpacker.finish()?;
        Ok(Self { validation_id, nonce, weight })
    }
}

/// Uptime of a validator over its current validation period, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationUptime {
    pub validation_id: B256,
    pub uptime: u64,
}

impl ValidationUptime {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packer = Packer::with_codec_version();
        packer
            .u32(VALIDATION_UPTIME_TYPE_ID)
            .fixed(self.validation_id.as_slice())
            .u64(self.uptime);
        packer.finish()
    }
}

/// Validator of a subnet at the time it was converted to an L1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitialValidator {
    pub node_id: Vec<u8>,
    pub bls_public_key: FixedBytes<BLS_PUBLIC_KEY_LEN>,
    pub weight: u64,
}

/// Data hashed into the ID of a subnet to L1 conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionData {
    pub subnet_id: B256,
    pub manager_chain_id: B256,
    pub manager_address: Vec<u8>,
    pub validators: Vec<InitialValidator>,
}

impl ConversionData {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packer = Packer::with_codec_version();
        packer
            .fixed(self.subnet_id.as_slice())
            .fixed(self.manager_chain_id.as_slice())
            .var_bytes(&self.manager_address)
            .u32(self.validators.len() as u32);
        for validator in &self.validators {
            packer
                .var_bytes(&validator.node_id)
                .fixed(validator.bls_public_key.as_slice())
                .u64(validator.weight);
        }
        packer.finish()
    }

    /// The conversion ID, sha256 of the encoded data.
    pub fn conversion_id(&self) -> B256 {
        B256::from_slice(&Sha256::digest(self.to_bytes()))
    }

    /// The payload acknowledging this conversion.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut packer = Packer::with_codec_version();
        packer.u32(SUBNET_TO_L1_CONVERSION_TYPE_ID).fixed(self.conversion_id().as_slice());
        packer.finish()
    }
}

/// A validator message decoded from the payload of an [AddressedCall].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidatorMessage {
    Register(RegisterL1Validator),
    Registration(L1ValidatorRegistration),
    Weight(L1ValidatorWeight),
}

impl ValidatorMessage {
    /// Decode an unsigned warp message emitted by a validator manager.
    pub fn from_unsigned_message(bytes: &[u8]) -> Result<Self, CodecError> {
        let message = UnsignedMessage::from_bytes(bytes)?;
        Self::from_payload(&message.addressed_call()?.payload)
    }

    /// Decode an addressed call payload, dispatching on its type ID.
    pub fn from_payload(payload: &[u8]) -> Result<Self, CodecError> {
        let mut unpacker = Unpacker::new(payload);
        unpacker.codec_version()?;
        match unpacker.u32("type ID")? {
            REGISTER_L1_VALIDATOR_TYPE_ID => RegisterL1Validator::from_bytes(payload).map(Self::Register),
            L1_VALIDATOR_REGISTRATION_TYPE_ID => {
                L1ValidatorRegistration::from_bytes(payload).map(Self::Registration)
            }
            L1_VALIDATOR_WEIGHT_TYPE_ID => L1ValidatorWeight::from_bytes(payload).map(Self::Weight),
            other => Err(CodecError::Invalid {
                field: "type ID",
                reason: format!("{other} is not a validator message"),
            }),
        }
    }

    /// The validation ID the message refers to.
    pub fn validation_id(&self) -> B256 {
        match self {
            Self::Register(msg) => msg.validation_id(),
            Self::Registration(msg) => msg.validation_id,
            Self::Weight(msg) => msg.validation_id,
        }
    }
}

/// Encode a signed warp message as storage keys of the warp precompile.
///
/// The message is terminated with `0xFF` and zero-padded to a multiple of 32 bytes.
pub fn pack_warp_into_access_list(message: &[u8]) -> AccessList {
    let mut bytes = message.to_vec();
    bytes.push(0xff);
    let padded_len = bytes.len().div_ceil(32) * 32;
    bytes.resize(padded_len, 0);
    let storage_keys = bytes.chunks_exact(32).map(B256::from_slice).collect();
    AccessList(vec![AccessListItem { address: WARP_PRECOMPILE_ADDRESS, storage_keys }])
}

fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn protobuf_bytes_field(tag: u8, value: &[u8], out: &mut Vec<u8>) {
    out.push(tag);
    encode_varint(value.len() as u64, out);
    out.extend_from_slice(value);
}

/// Validation ID of the bootstrap validator at `index` of a converted subnet.
pub fn bootstrap_validation_id(subnet_id: B256, index: u32) -> B256 {
    let mut hasher = Sha256::new();
    hasher.update(subnet_id);
    hasher.update(index.to_be_bytes());
    B256::from_slice(&hasher.finalize())
}

/// Justification for a bootstrap validator: `ConvertSubnetToL1TxData { subnet_id, index }`.
pub fn bootstrap_justification(subnet_id: B256, index: u32) -> Vec<u8> {
    let mut inner = Vec::new();
    protobuf_bytes_field(0x0a, subnet_id.as_slice(), &mut inner);
    inner.push(0x10);
    encode_varint(index as u64, &mut inner);

    let mut out = Vec::new();
    protobuf_bytes_field(0x0a, &inner, &mut out);
    out
}

/// Justification for a validator registered through a warp message: the raw
/// `RegisterL1Validator` payload.
pub fn register_message_justification(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    protobuf_bytes_field(0x12, payload, &mut out);
    out
}

/// Find the index of a bootstrap validator of `subnet_id` whose validation ID matches.
pub fn find_bootstrap_index(subnet_id: B256, validation_id: B256) -> Option<u32> {
    (0..BOOTSTRAP_VALIDATORS_TO_SEARCH)
        .find(|index| bootstrap_validation_id(subnet_id, *index) == validation_id)
}

/// Check whether a `SendWarpMessage` payload registers `validation_id`, returning the
/// justification if it does.
fn justification_from_warp_log(message: &[u8], validation_id: B256) -> Option<Vec<u8>> {
    let unsigned = UnsignedMessage::from_bytes(message).ok()?;
    let call = unsigned.addressed_call().ok()?;
    let register = RegisterL1Validator::from_bytes(&call.payload).ok()?;
    (register.validation_id() == validation_id)
        .then(|| register_message_justification(&call.payload))
}

/// Build the justification proving that `validation_id` was registered.
///
/// Bootstrap validators of `subnet_id` are checked first. Otherwise the `SendWarpMessage` logs
/// of the chain are searched backwards from the latest block, down to `from_block`, for the
/// `RegisterL1Validator` message whose hash is the validation ID.
pub async fn registration_justification(
    provider: impl Provider,
    validation_id: B256,
    subnet_id: Option<B256>,
    from_block: u64,
) -> anyhow::Result<Vec<u8>> {
    if let Some(subnet_id) = subnet_id {
        if let Some(index) = find_bootstrap_index(subnet_id, validation_id) {
            tracing::info!(%validation_id, index, "validation ID belongs to a bootstrap validator");
            return Ok(bootstrap_justification(subnet_id, index));
        }
    }

    let latest = provider.get_block_number().await.context("failed to get latest block number")?;
    let base_filter = Filter::new()
        .address(WARP_PRECOMPILE_ADDRESS)
        .event_signature(IWarpMessenger::SendWarpMessage::SIGNATURE_HASH);

    let mut to_block = latest;
    loop {
        let batch_from = to_block.saturating_sub(LOG_SEARCH_BATCH_SIZE - 1).max(from_block);
        tracing::debug!(batch_from, to_block, "searching warp logs for registration message");
        let filter = base_filter
            .clone()
            .from_block(BlockNumberOrTag::Number(batch_from))
            .to_block(BlockNumberOrTag::Number(to_block));
        let logs = provider
            .get_logs(&filter)
            .await
            .with_context(|| format!("failed to get warp logs for blocks {batch_from}..={to_block}"))?;

        for log in logs {
            let Ok(decoded) = log.log_decode::<IWarpMessenger::SendWarpMessage>() else {
                continue;
            };
            if let Some(justification) =
                justification_from_warp_log(&decoded.data().message, validation_id)
            {
                tracing::info!(
                    %validation_id,
                    tx_hash = ?log.transaction_hash,
                    "found registration message for validation ID"
                );
                return Ok(justification);
            }
        }

        if batch_from <= from_block {
            anyhow::bail!(
                "no registration message found for validation ID {validation_id} in blocks {from_block}..={latest}"
            );
        }
        to_block = batch_from - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_register() -> RegisterL1Validator {
        RegisterL1Validator {
            subnet_id: B256::repeat_byte(0x11),
            node_id: vec![0x22; 20],
            bls_public_key: FixedBytes::repeat_byte(0x33),
            registration_expiry: 1_700_000_000,
            remaining_balance_owner: PChainOwner {
                threshold: 1,
                addresses: vec![Address::repeat_byte(0x44)],
            },
            disable_owner: PChainOwner { threshold: 1, addresses: vec![Address::repeat_byte(0x55)] },
            weight: 100,
        }
    }

    #[test]
    fn register_payload_layout() {
        let bytes = sample_register().to_bytes();
        // codec + type + subnet + varbytes(20) + bls + expiry + 2 * (threshold + count + addr) + weight
        assert_eq!(bytes.len(), 2 + 4 + 32 + 24 + 48 + 8 + 2 * (4 + 4 + 20) + 8);
        assert_eq!(&bytes[..6], &[0, 0, 0, 0, 0, 1]);
        assert_eq!(RegisterL1Validator::from_bytes(&bytes).unwrap(), sample_register());
    }

    #[test]
    fn register_payload_rejects_trailing_bytes() {
        let mut bytes = sample_register().to_bytes();
        bytes.push(0);
        assert_eq!(RegisterL1Validator::from_bytes(&bytes).unwrap_err(), CodecError::TrailingBytes(1));
        bytes.truncate(178);
        assert!(matches!(
            RegisterL1Validator::from_bytes(&bytes),
            Err(CodecError::UnexpectedEnd { field: "weight", .. })
        ));
    }

    #[test]
    fn validation_id_is_hash_of_payload() {
        let register = sample_register();
        let expected = B256::from_slice(&Sha256::digest(register.to_bytes()));
        assert_eq!(register.validation_id(), expected);
    }

    #[test]
    fn pchain_registration_message_layout() {
        let validation_id = B256::repeat_byte(0xab);
        let payload = L1ValidatorRegistration { validation_id, registered: true }.to_bytes();
        let message = UnsignedMessage::from_pchain(5, payload.clone());
        let bytes = message.to_bytes();

        // codec, network ID 5, zero source chain, u32 length
        assert_eq!(&bytes[..6], &[0, 0, 0, 0, 0, 5]);
        assert!(bytes[6..38].iter().all(|b| *b == 0));
        let call_len = u32::from_be_bytes(bytes[38..42].try_into().unwrap()) as usize;
        assert_eq!(call_len, bytes.len() - 42);

        let decoded = UnsignedMessage::from_bytes(&bytes).unwrap();
        let call = decoded.addressed_call().unwrap();
        assert!(call.source_address.is_empty());
        assert_eq!(call.payload, payload);
        assert_eq!(
            ValidatorMessage::from_payload(&call.payload).unwrap(),
            ValidatorMessage::Registration(L1ValidatorRegistration { validation_id, registered: true })
        );
    }

    #[test]
    fn weight_message_decodes_from_unsigned_message() {
        let weight = L1ValidatorWeight { validation_id: B256::repeat_byte(1), nonce: 7, weight: 0 };
        let message = UnsignedMessage {
            network_id: 1,
            source_chain_id: B256::repeat_byte(9),
            payload: AddressedCall { source_address: vec![0xee; 20], payload: weight.to_bytes() }
                .to_bytes(),
        };
        let decoded = ValidatorMessage::from_unsigned_message(&message.to_bytes()).unwrap();
        assert_eq!(decoded, ValidatorMessage::Weight(weight));
        assert_eq!(decoded.validation_id(), B256::repeat_byte(1));
    }

    #[test]
    fn uptime_payload_uses_type_zero() {
        let bytes = ValidationUptime { validation_id: B256::repeat_byte(2), uptime: 3600 }.to_bytes();
        assert_eq!(bytes.len(), 2 + 4 + 32 + 8);
        assert_eq!(&bytes[2..6], &[0, 0, 0, 0]);
        assert_eq!(&bytes[38..], &3600u64.to_be_bytes());
    }

    #[test]
    fn access_list_is_terminated_and_padded() {
        let list = pack_warp_into_access_list(&[0x01; 40]);
        assert_eq!(list.0.len(), 1);
        let item = &list.0[0];
        assert_eq!(item.address, WARP_PRECOMPILE_ADDRESS);
        assert_eq!(item.storage_keys.len(), 2);
        assert_eq!(item.storage_keys[1][7], 0x01);
        assert_eq!(item.storage_keys[1][8], 0xff);
        assert!(item.storage_keys[1][9..].iter().all(|b| *b == 0));

        // A message of exactly 32 bytes still gets a terminator chunk.
        let list = pack_warp_into_access_list(&[0x01; 32]);
        assert_eq!(list.0[0].storage_keys.len(), 2);
        assert_eq!(list.0[0].storage_keys[1][0], 0xff);
    }

    #[test]
    fn bootstrap_justification_layout() {
        let subnet_id = B256::repeat_byte(0x07);
        let justification = bootstrap_justification(subnet_id, 3);
        let mut expected = vec![0x0a, 36, 0x0a, 32];
        expected.extend_from_slice(subnet_id.as_slice());
        expected.extend_from_slice(&[0x10, 3]);
        assert_eq!(justification, expected);

        let validation_id = bootstrap_validation_id(subnet_id, 3);
        assert_eq!(find_bootstrap_index(subnet_id, validation_id), Some(3));
        assert_eq!(find_bootstrap_index(subnet_id, B256::ZERO), None);
    }

    #[test]
    fn register_justification_uses_multi_byte_varint() {
        let payload = sample_register().to_bytes();
        let justification = register_message_justification(&payload);
        // 182 bytes encodes as a two byte varint
        assert_eq!(payload.len(), 182);
        assert_eq!(&justification[..3], &[0x12, 0xb6, 0x01]);
        assert_eq!(&justification[3..], payload.as_slice());
    }

    #[test]
    fn justification_found_in_matching_log() {
        let register = sample_register();
        let message = UnsignedMessage {
            network_id: 5,
            source_chain_id: B256::repeat_byte(3),
            payload: AddressedCall { source_address: vec![1; 20], payload: register.to_bytes() }
                .to_bytes(),
        }
        .to_bytes();
        assert!(justification_from_warp_log(&message, register.validation_id()).is_some());
        assert!(justification_from_warp_log(&message, B256::ZERO).is_none());
        assert!(justification_from_warp_log(&[0, 1, 2], B256::ZERO).is_none());
    }
}
