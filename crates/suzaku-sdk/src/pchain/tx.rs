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

//! P-Chain transactions managing L1 validators.
//!
//! Only single-signature secp256k1 UTXOs owned by the signing key are spent. Any value left
//! after the burned balance and the fee is returned to the same key in one change output.

use alloy::{
    primitives::B256,
    signers::{local::PrivateKeySigner, SignerSync},
};
use sha2::{Digest, Sha256};

use super::{
    fee::{self, TxKind},
    PChainError,
};
use crate::{
    codec::{CodecError, Packer, Unpacker},
    ids::{self, Id},
};

const SECP256K1_TRANSFER_INPUT_TYPE_ID: u32 = 5;
const SECP256K1_TRANSFER_OUTPUT_TYPE_ID: u32 = 7;
const SECP256K1_CREDENTIAL_TYPE_ID: u32 = 9;
const SECP256K1_AUTH_TYPE_ID: u32 = 10;

const REGISTER_L1_VALIDATOR_TX_TYPE_ID: u32 = 0x24;
const SET_L1_VALIDATOR_WEIGHT_TX_TYPE_ID: u32 = 0x25;
const INCREASE_L1_VALIDATOR_BALANCE_TX_TYPE_ID: u32 = 0x26;
const DISABLE_L1_VALIDATOR_TX_TYPE_ID: u32 = 0x27;

/// Length of a BLS proof of possession.
pub const PROOF_OF_POSSESSION_LEN: usize = 96;
const SIGNATURE_LEN: usize = 65;

/// An unspent secp256k1 transfer output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    pub tx_id: B256,
    pub output_index: u32,
    pub asset_id: B256,
    pub amount: u64,
    pub locktime: u64,
    pub threshold: u32,
    pub addresses: Vec<[u8; 20]>,
}

impl Utxo {
    /// Parse a UTXO as returned by `platform.getUTXOs` with hex encoding.
    ///
    /// Returns `None` for outputs that are not plain secp256k1 transfer outputs, such as
    /// stakeable locked outputs.
    pub fn from_hex(encoded: &str) -> Result<Option<Self>, PChainError> {
        let raw = ids::parse_hex(encoded)?;
        let bytes = ids::strip_checksum(&raw)?;
        Ok(Self::from_bytes(bytes)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Option<Self>, CodecError> {
        let mut unpacker = Unpacker::new(bytes);
        unpacker.codec_version()?;
        let tx_id = B256::from(unpacker.array::<32>("tx ID")?);
        let output_index = unpacker.u32("output index")?;
        let asset_id = B256::from(unpacker.array::<32>("asset ID")?);
        if unpacker.u32("output type ID")? != SECP256K1_TRANSFER_OUTPUT_TYPE_ID {
            return Ok(None);
        }
        let amount = unpacker.u64("amount")?;
        let locktime = unpacker.u64("locktime")?;
        let threshold = unpacker.u32("threshold")?;
        let count = unpacker.u32("address count")?;
        let addresses = (0..count)
            .map(|_| unpacker.array::<20>("address"))
            .collect::<Result<Vec<_>, _>>()?;
        unpacker.finish()?;
        Ok(Some(Self { tx_id, output_index, asset_id, amount, locktime, threshold, addresses }))
    }

    /// Signature index of `owner` if this UTXO can be spent by `owner` alone at `now`.
    fn spendable_by(&self, owner: &[u8; 20], asset_id: B256, now: u64) -> Option<u32> {
        if self.asset_id != asset_id || self.locktime > now || self.threshold != 1 {
            return None;
        }
        self.addresses.iter().position(|address| address == owner).map(|i| i as u32)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct TransferableInput {
    tx_id: B256,
    output_index: u32,
    asset_id: B256,
    amount: u64,
    sig_index: u32,
}

impl TransferableInput {
    fn pack(&self, packer: &mut Packer) {
        packer
            .fixed(self.tx_id.as_slice())
            .u32(self.output_index)
            .fixed(self.asset_id.as_slice())
            .u32(SECP256K1_TRANSFER_INPUT_TYPE_ID)
            .u64(self.amount)
            .u32(1)
            .u32(self.sig_index);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct TransferableOutput {
    asset_id: B256,
    amount: u64,
    owner: [u8; 20],
}

impl TransferableOutput {
    fn pack(&self, packer: &mut Packer) {
        packer
            .fixed(self.asset_id.as_slice())
            .u32(SECP256K1_TRANSFER_OUTPUT_TYPE_ID)
            .u64(self.amount)
            .u64(0)
            .u32(1)
            .u32(1)
            .fixed(&self.owner);
    }
}

/// The operation-specific part of an L1 validator transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxBody {
    /// Register a validator from a signed `RegisterL1ValidatorMessage`.
    RegisterL1Validator {
        balance: u64,
        proof_of_possession: [u8; PROOF_OF_POSSESSION_LEN],
        message: Vec<u8>,
    },
    /// Apply a signed `L1ValidatorWeightMessage`.
    SetL1ValidatorWeight { message: Vec<u8> },
    /// Add `balance` nAVAX to the continuous fee balance of a validator.
    IncreaseL1ValidatorBalance { validation_id: B256, balance: u64 },
    /// Disable a validator, authorized by its deactivation owner.
    DisableL1Validator { validation_id: B256 },
}

impl TxBody {
    pub fn kind(&self) -> TxKind {
        match self {
            TxBody::RegisterL1Validator { .. } => TxKind::RegisterL1Validator,
            TxBody::SetL1ValidatorWeight { .. } => TxKind::SetL1ValidatorWeight,
            TxBody::IncreaseL1ValidatorBalance { .. } => TxKind::IncreaseL1ValidatorBalance,
            TxBody::DisableL1Validator { .. } => TxKind::DisableL1Validator,
        }
    }

    fn type_id(&self) -> u32 {
        match self {
            TxBody::RegisterL1Validator { .. } => REGISTER_L1_VALIDATOR_TX_TYPE_ID,
            TxBody::SetL1ValidatorWeight { .. } => SET_L1_VALIDATOR_WEIGHT_TX_TYPE_ID,
            TxBody::IncreaseL1ValidatorBalance { .. } => INCREASE_L1_VALIDATOR_BALANCE_TX_TYPE_ID,
            TxBody::DisableL1Validator { .. } => DISABLE_L1_VALIDATOR_TX_TYPE_ID,
        }
    }

    /// AVAX moved out of the UTXO set into a validator balance.
    pub fn burned(&self) -> u64 {
        match self {
            TxBody::RegisterL1Validator { balance, .. }
            | TxBody::IncreaseL1ValidatorBalance { balance, .. } => *balance,
            _ => 0,
        }
    }

    /// Credentials required beyond the one per input.
    fn auth_credentials(&self) -> usize {
        matches!(self, TxBody::DisableL1Validator { .. }) as usize
    }

    fn pack(&self, packer: &mut Packer) {
        match self {
            TxBody::RegisterL1Validator { balance, proof_of_possession, message } => {
                packer.u64(*balance).fixed(proof_of_possession).var_bytes(message);
            }
            TxBody::SetL1ValidatorWeight { message } => {
                packer.var_bytes(message);
            }
            TxBody::IncreaseL1ValidatorBalance { validation_id, balance } => {
                packer.fixed(validation_id.as_slice()).u64(*balance);
            }
            TxBody::DisableL1Validator { validation_id } => {
                // The key signing the transaction is expected to be the sole deactivation owner.
                packer.fixed(validation_id.as_slice()).u32(SECP256K1_AUTH_TYPE_ID).u32(1).u32(0);
            }
        }
    }
}

/// Parameters shared by every transaction built for one key on one network.
#[derive(Clone, Debug)]
pub struct TxContext {
    pub network_id: u32,
    pub avax_asset_id: B256,
    pub owner: [u8; 20],
    /// Current gas price from `platform.getFeeState`.
    pub gas_price: u64,
    /// Unix timestamp used to decide which UTXOs are unlocked.
    pub now: u64,
}

/// A transaction ready to be signed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTx {
    network_id: u32,
    inputs: Vec<TransferableInput>,
    outputs: Vec<TransferableOutput>,
    body: TxBody,
    fee: u64,
}

impl UnsignedTx {
    /// Select inputs from `utxos` covering the burned balance and the fee, and build the
    /// transaction.
    pub fn build(ctx: &TxContext, utxos: &[Utxo], body: TxBody) -> Result<Self, PChainError> {
        let mut spendable: Vec<TransferableInput> = utxos
            .iter()
            .filter_map(|utxo| {
                utxo.spendable_by(&ctx.owner, ctx.avax_asset_id, ctx.now).map(|sig_index| {
                    TransferableInput {
                        tx_id: utxo.tx_id,
                        output_index: utxo.output_index,
                        asset_id: utxo.asset_id,
                        amount: utxo.amount,
                        sig_index,
                    }
                })
            })
            .collect();
        // Largest first keeps the input count, and so the fee, low.
        spendable.sort_by(|a, b| b.amount.cmp(&a.amount));

        let burned = body.burned();
        let mut tx = Self { network_id: ctx.network_id, inputs: vec![], outputs: vec![], body, fee: 0 };
        let mut total: u64 = 0;
        let mut needed = burned.saturating_add(tx.estimate_fee(ctx));

        for input in spendable {
            total = total.saturating_add(input.amount);
            tx.inputs.push(input);
            tx.inputs.sort_by(|a, b| (a.tx_id, a.output_index).cmp(&(b.tx_id, b.output_index)));

            let fee = tx.estimate_fee(ctx);
            needed = burned.saturating_add(fee);
            if total >= needed {
                tx.fee = fee;
                let change = total - needed;
                if change > 0 {
                    tx.outputs.push(TransferableOutput {
                        asset_id: ctx.avax_asset_id,
                        amount: change,
                        owner: ctx.owner,
                    });
                }
                tracing::debug!(inputs = tx.inputs.len(), fee, change, "selected UTXOs");
                return Ok(tx);
            }
        }

        Err(PChainError::InsufficientFunds { needed, available: total })
    }

    /// Fee of this transaction with one change output, as charged at `ctx.gas_price`.
    fn estimate_fee(&self, ctx: &TxContext) -> u64 {
        let mut with_change = self.clone();
        with_change.outputs = vec![TransferableOutput {
            asset_id: ctx.avax_asset_id,
            amount: 0,
            owner: ctx.owner,
        }];
        let signed_size = with_change.to_bytes().len() + credentials_len(with_change.credentials());
        let complexity =
            fee::tx_complexity(self.body.kind(), signed_size, self.inputs.len(), 1);
        fee::fee(complexity, ctx.gas_price)
    }

    fn credentials(&self) -> usize {
        self.inputs.len() + self.body.auth_credentials()
    }

    /// Fee paid by this transaction in nAVAX.
    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn body(&self) -> &TxBody {
        &self.body
    }

    /// Codec bytes of the unsigned transaction. Their sha256 is what each credential signs.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packer = Packer::with_codec_version();
        packer
            .u32(self.body.type_id())
            .u32(self.network_id)
            .fixed(B256::ZERO.as_slice())
            .u32(self.outputs.len() as u32);
        for output in &self.outputs {
            output.pack(&mut packer);
        }
        packer.u32(self.inputs.len() as u32);
        for input in &self.inputs {
            input.pack(&mut packer);
        }
        packer.var_bytes(&[]);
        self.body.pack(&mut packer);
        packer.finish()
    }

    /// Sign every input, and the disable authorization if any, with `signer`.
    pub fn sign(&self, signer: &PrivateKeySigner) -> Result<SignedTx, PChainError> {
        let unsigned = self.to_bytes();
        let hash = B256::from_slice(&Sha256::digest(&unsigned));
        let signature = signer.sign_hash_sync(&hash)?;

        let mut raw = [0u8; SIGNATURE_LEN];
        raw[..32].copy_from_slice(&signature.r().to_be_bytes::<32>());
        raw[32..64].copy_from_slice(&signature.s().to_be_bytes::<32>());
        raw[64] = signature.v() as u8;

        let mut packer = Packer::new();
        packer.fixed(&unsigned).u32(self.credentials() as u32);
        for _ in 0..self.credentials() {
            packer.u32(SECP256K1_CREDENTIAL_TYPE_ID).u32(1).fixed(&raw);
        }
        Ok(SignedTx { bytes: packer.finish() })
    }
}

fn credentials_len(count: usize) -> usize {
    4 + count * (4 + 4 + SIGNATURE_LEN)
}

/// A signed transaction ready to be issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTx {
    bytes: Vec<u8>,
}

impl SignedTx {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Transaction ID: the sha256 of the signed bytes.
    pub fn id(&self) -> Id {
        Id(B256::from_slice(&Sha256::digest(&self.bytes)))
    }

    /// `0x`-prefixed hex with checksum, as accepted by `platform.issueTx`.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(ids::with_checksum(&self.bytes)))
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Signature, U256};

    use super::*;

    const AVAX: B256 = B256::repeat_byte(0xaa);
    const OWNER: [u8; 20] = [0x11; 20];

    fn context(gas_price: u64) -> TxContext {
        TxContext { network_id: 5, avax_asset_id: AVAX, owner: OWNER, gas_price, now: 1_000 }
    }

    fn utxo(tx_byte: u8, index: u32, amount: u64) -> Utxo {
        Utxo {
            tx_id: B256::repeat_byte(tx_byte),
            output_index: index,
            asset_id: AVAX,
            amount,
            locktime: 0,
            threshold: 1,
            addresses: vec![OWNER],
        }
    }

    fn utxo_bytes(utxo: &Utxo, type_id: u32) -> Vec<u8> {
        let mut packer = Packer::with_codec_version();
        packer
            .fixed(utxo.tx_id.as_slice())
            .u32(utxo.output_index)
            .fixed(utxo.asset_id.as_slice())
            .u32(type_id)
            .u64(utxo.amount)
            .u64(utxo.locktime)
            .u32(utxo.threshold)
            .u32(utxo.addresses.len() as u32);
        for address in &utxo.addresses {
            packer.fixed(address);
        }
        packer.finish()
    }

    #[test]
    fn parses_transfer_output_utxo() {
        let expected = utxo(0x01, 3, 5_000);
        let encoded = format!(
            "0x{}",
            hex::encode(ids::with_checksum(&utxo_bytes(&expected, SECP256K1_TRANSFER_OUTPUT_TYPE_ID)))
        );
        assert_eq!(Utxo::from_hex(&encoded).unwrap(), Some(expected));
    }

    #[test]
    fn skips_other_output_types() {
        let bytes = utxo_bytes(&utxo(0x01, 0, 1), 22);
        assert_eq!(Utxo::from_bytes(&bytes).unwrap(), None);
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut raw = ids::with_checksum(&utxo_bytes(&utxo(0x01, 0, 1), 7));
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        let err = Utxo::from_hex(&hex::encode(raw)).unwrap_err();
        assert!(matches!(err, PChainError::Id(ids::IdError::Checksum)), "{err}");
    }

    #[test]
    fn increase_balance_layout() {
        let validation_id = B256::repeat_byte(0x42);
        let body = TxBody::IncreaseL1ValidatorBalance { validation_id, balance: 1_000 };
        let tx = UnsignedTx::build(&context(0), &[utxo(0x01, 0, 1_500)], body).unwrap();
        let bytes = tx.to_bytes();

        assert_eq!(&bytes[..2], &[0, 0]);
        assert_eq!(&bytes[2..6], &INCREASE_L1_VALIDATOR_BALANCE_TX_TYPE_ID.to_be_bytes());
        assert_eq!(&bytes[6..10], &5u32.to_be_bytes());
        assert_eq!(&bytes[10..42], B256::ZERO.as_slice());
        // One change output of 500 at zero gas price.
        assert_eq!(&bytes[42..46], &1u32.to_be_bytes());
        let output = &bytes[46..46 + 80];
        assert_eq!(&output[36..44], &500u64.to_be_bytes());
        assert_eq!(&output[52..56], &1u32.to_be_bytes());
        assert_eq!(&output[60..], &OWNER);
        // One input carrying signature index 0.
        let inputs = &bytes[46 + 80..];
        assert_eq!(&inputs[..4], &1u32.to_be_bytes());
        assert_eq!(&inputs[4..36], B256::repeat_byte(0x01).as_slice());
        let input_len = 32 + 4 + 32 + 4 + 8 + 4 + 4;
        assert_eq!(&inputs[input_len - 4..input_len], &0u32.to_be_bytes());
        // Empty memo then the body.
        let rest = &inputs[input_len..];
        assert_eq!(&rest[..4], &[0, 0, 0, 0]);
        assert_eq!(&rest[4..36], validation_id.as_slice());
        assert_eq!(&rest[36..], &1_000u64.to_be_bytes());
    }

    #[test]
    fn selects_inputs_until_fee_is_covered() {
        let utxos = [utxo(0x02, 0, 400_000), utxo(0x01, 0, 300_000), utxo(0x03, 0, 10)];
        let body = TxBody::SetL1ValidatorWeight { message: vec![0; 200] };
        let tx = UnsignedTx::build(&context(20), &utxos, body).unwrap();

        assert!(tx.fee() > 400_000, "fee {} should need two inputs", tx.fee());
        assert_eq!(tx.inputs.len(), 2);
        // Sorted by tx ID regardless of selection order.
        assert_eq!(tx.inputs[0].tx_id, B256::repeat_byte(0x01));
        assert_eq!(tx.inputs[1].tx_id, B256::repeat_byte(0x02));
        let change: u64 = tx.outputs.iter().map(|o| o.amount).sum();
        assert_eq!(change + tx.fee(), 700_000);
    }

    #[test]
    fn ignores_locked_and_foreign_utxos() {
        let mut locked = utxo(0x01, 0, 10_000);
        locked.locktime = 2_000;
        let mut foreign = utxo(0x02, 0, 10_000);
        foreign.addresses = vec![[0x22; 20]];
        let mut multisig = utxo(0x03, 0, 10_000);
        multisig.threshold = 2;

        let body = TxBody::IncreaseL1ValidatorBalance {
            validation_id: B256::ZERO,
            balance: 1,
        };
        let err = UnsignedTx::build(&context(0), &[locked, foreign, multisig], body).unwrap_err();
        assert!(
            matches!(err, PChainError::InsufficientFunds { needed: 1, available: 0 }),
            "{err}"
        );
    }

    #[test]
    fn insufficient_funds_reports_shortfall() {
        let body = TxBody::IncreaseL1ValidatorBalance {
            validation_id: B256::ZERO,
            balance: 1_000_000,
        };
        let err = UnsignedTx::build(&context(1), &[utxo(0x01, 0, 900_000)], body).unwrap_err();
        match err {
            PChainError::InsufficientFunds { needed, available } => {
                assert!(needed > 1_000_000);
                assert_eq!(available, 900_000);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn signature_recovers_to_signer() {
        let signer = PrivateKeySigner::random();
        let body = TxBody::DisableL1Validator { validation_id: B256::repeat_byte(7) };
        let tx = UnsignedTx::build(&context(0), &[utxo(0x01, 0, 5)], body).unwrap();
        let signed = tx.sign(&signer).unwrap();

        let unsigned = tx.to_bytes();
        let bytes = signed.as_bytes();
        assert_eq!(&bytes[..unsigned.len()], unsigned.as_slice());

        // One credential for the input plus one for the disable authorization.
        let creds = &bytes[unsigned.len()..];
        assert_eq!(&creds[..4], &2u32.to_be_bytes());
        assert_eq!(creds.len(), credentials_len(2));

        let raw = &creds[4 + 8..4 + 8 + SIGNATURE_LEN];
        let signature = Signature::new(
            U256::from_be_slice(&raw[..32]),
            U256::from_be_slice(&raw[32..64]),
            raw[64] == 1,
        );
        let hash = B256::from_slice(&Sha256::digest(&unsigned));
        assert_eq!(signature.recover_address_from_prehash(&hash).unwrap(), signer.address());

        assert_eq!(signed.id().0, B256::from_slice(&Sha256::digest(bytes)));
        assert!(signed.to_hex().starts_with("0x"));
    }
}
