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

//! Big-endian linear codec shared by warp messages and P-Chain transactions.

/// Version of the Avalanche linear codec. Only version 0 exists.
pub const CODEC_VERSION: u16 = 0;

/// Errors produced while decoding codec bytes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// The input ended before a field could be read.
    #[error("unexpected end of input reading {field}: need {needed} bytes at offset {offset}")]
    UnexpectedEnd {
        /// Name of the field being read.
        field: &'static str,
        /// Bytes needed.
        needed: usize,
        /// Offset the read started at.
        offset: usize,
    },
    /// The codec version is not zero.
    #[error("unsupported codec version {0}")]
    CodecVersion(u16),
    /// A type ID does not match the expected one.
    #[error("unexpected type ID for {what}: expected {expected}, got {actual}")]
    TypeId {
        /// What was being decoded.
        what: &'static str,
        /// Expected type ID.
        expected: u32,
        /// Actual type ID.
        actual: u32,
    },
    /// Bytes remained after decoding a complete value.
    #[error("{0} trailing bytes after decoding")]
    TrailingBytes(usize),
    /// A field has a value out of its allowed range.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// Why it is invalid.
        reason: String,
    },
}

/// Writer for the linear codec.
#[derive(Debug, Default, Clone)]
pub struct Packer {
    bytes: Vec<u8>,
}

impl Packer {
    /// Start a new buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a buffer with the codec version already written.
    pub fn with_codec_version() -> Self {
        let mut packer = Self::new();
        packer.u16(CODEC_VERSION);
        packer
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.u8(value as u8)
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.fixed(&value.to_be_bytes())
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.fixed(&value.to_be_bytes())
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.fixed(&value.to_be_bytes())
    }

    /// Raw bytes with no length prefix.
    pub fn fixed(&mut self, value: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(value);
        self
    }

    /// Bytes prefixed with their u32 length.
    pub fn var_bytes(&mut self, value: &[u8]) -> &mut Self {
        self.u32(value.len() as u32);
        self.fixed(value)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Reader for the linear codec.
#[derive(Debug, Clone)]
pub struct Unpacker<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Unpacker<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    /// Read and check the leading codec version.
    pub fn codec_version(&mut self) -> Result<(), CodecError> {
        match self.u16("codec version")? {
            CODEC_VERSION => Ok(()),
            other => Err(CodecError::CodecVersion(other)),
        }
    }

    /// Read a u32 type ID and check it against `expected`.
    pub fn type_id(&mut self, what: &'static str, expected: u32) -> Result<(), CodecError> {
        let actual = self.u32("type ID")?;
        if actual != expected {
            return Err(CodecError::TypeId { what, expected, actual });
        }
        Ok(())
    }

    pub fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or(CodecError::UnexpectedEnd { field, needed: len, offset: self.offset })?;
        let slice = &self.input[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(field, N)?);
        Ok(out)
    }

    pub fn u8(&mut self, field: &'static str) -> Result<u8, CodecError> {
        Ok(self.array::<1>(field)?[0])
    }

    pub fn bool(&mut self, field: &'static str) -> Result<bool, CodecError> {
        match self.u8(field)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::Invalid { field, reason: format!("{other} is not a bool") }),
        }
    }

    pub fn u16(&mut self, field: &'static str) -> Result<u16, CodecError> {
        self.array(field).map(u16::from_be_bytes)
    }

    pub fn u32(&mut self, field: &'static str) -> Result<u32, CodecError> {
        self.array(field).map(u32::from_be_bytes)
    }

    pub fn u64(&mut self, field: &'static str) -> Result<u64, CodecError> {
        self.array(field).map(u64::from_be_bytes)
    }

    pub fn var_bytes(&mut self, field: &'static str) -> Result<&'a [u8], CodecError> {
        let len = self.u32(field)? as usize;
        self.take(field, len)
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.offset
    }

    /// Fail if any input is left unread.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian() {
        let mut packer = Packer::with_codec_version();
        packer.u32(5).u64(0x0102).var_bytes(&[0xaa, 0xbb]).bool(true);
        let bytes = packer.finish();
        assert_eq!(
            bytes,
            [0, 0, 0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 1, 2, 0, 0, 0, 2, 0xaa, 0xbb, 1]
        );

        let mut unpacker = Unpacker::new(&bytes);
        unpacker.codec_version().unwrap();
        assert_eq!(unpacker.u32("network").unwrap(), 5);
        assert_eq!(unpacker.u64("value").unwrap(), 0x0102);
        assert_eq!(unpacker.var_bytes("payload").unwrap(), &[0xaa, 0xbb]);
        assert!(unpacker.bool("flag").unwrap());
        unpacker.finish().unwrap();
    }

    #[test]
    fn short_input_is_reported() {
        let mut unpacker = Unpacker::new(&[0, 0, 0, 0, 0, 9, 1]);
        unpacker.codec_version().unwrap();
        assert_eq!(
            unpacker.var_bytes("payload").unwrap_err(),
            CodecError::UnexpectedEnd { field: "payload", needed: 9, offset: 6 }
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut unpacker = Unpacker::new(&[0, 0, 7]);
        unpacker.codec_version().unwrap();
        assert_eq!(unpacker.finish().unwrap_err(), CodecError::TrailingBytes(1));
    }

    #[test]
    fn type_id_mismatch() {
        let mut unpacker = Unpacker::new(&[0, 0, 0, 3]);
        assert_eq!(
            unpacker.type_id("addressed call", 1).unwrap_err(),
            CodecError::TypeId { what: "addressed call", expected: 1, actual: 3 }
        );
    }
}
