//! # Canonical Buffer
//!
//! Owned bytes with a read cursor. A buffer is either being built (append
//! operations) or being consumed (read operations); callers never mix the
//! two on one buffer.

use super::errors::CodecError;

/// Largest payload a variable-length prefix can describe.
pub const MAX_VL_LENGTH: usize = 918_744;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalBuffer {
    bytes: Vec<u8>,
    cursor: usize,
}

impl CanonicalBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes, cursor: 0 }
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, CodecError> {
        let bytes = hex::decode(hex_str).map_err(|e| CodecError::invalid("buffer", e.to_string()))?;
        Ok(Self::from_bytes(bytes))
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn append(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Append a variable-length prefix for `len` payload bytes.
    pub fn append_vl_length(&mut self, len: usize) -> Result<(), CodecError> {
        if len <= 192 {
            self.push(len as u8);
        } else if len <= 12_480 {
            let n = len - 193;
            self.push(193 + (n >> 8) as u8);
            self.push((n & 0xff) as u8);
        } else if len <= MAX_VL_LENGTH {
            let n = len - 12_481;
            self.push(241 + (n >> 16) as u8);
            self.push(((n >> 8) & 0xff) as u8);
            self.push((n & 0xff) as u8);
        } else {
            return Err(CodecError::range(
                "length prefix",
                format!("{len} bytes exceeds {MAX_VL_LENGTH}"),
            ));
        }
        Ok(())
    }

    /// Append a length-prefixed payload.
    pub fn append_vl(&mut self, data: &[u8]) -> Result<(), CodecError> {
        self.append_vl_length(data.len())?;
        self.append(data);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Consumption
    // -------------------------------------------------------------------------

    pub fn read(&mut self, n: usize) -> Result<&[u8], CodecError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(CodecError::TruncatedBuffer {
                needed: n,
                remaining,
            });
        }
        let start = self.cursor;
        self.cursor += n;
        Ok(&self.bytes[start..self.cursor])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Read a variable-length prefix.
    pub fn read_vl_length(&mut self) -> Result<usize, CodecError> {
        let b0 = self.read_u8()? as usize;
        if b0 <= 192 {
            Ok(b0)
        } else if b0 <= 240 {
            let b1 = self.read_u8()? as usize;
            Ok(193 + (b0 - 193) * 256 + b1)
        } else if b0 <= 254 {
            let b1 = self.read_u8()? as usize;
            let b2 = self.read_u8()? as usize;
            Ok(12_481 + (b0 - 241) * 65_536 + b1 * 256 + b2)
        } else {
            Err(CodecError::invalid("length prefix", "leading byte 0xFF"))
        }
    }

    /// Read a length-prefixed payload.
    pub fn read_vl(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_vl_length()?;
        Ok(self.read(len)?.to_vec())
    }

    /// Read a field header, returning `(type code, field code)`.
    pub fn read_field_header(&mut self) -> Result<(u8, u8), CodecError> {
        let b = self.read_u8()?;
        let mut type_code = b >> 4;
        let mut field_code = b & 0x0f;
        if type_code == 0 {
            type_code = self.read_u8()?;
        }
        if field_code == 0 {
            field_code = self.read_u8()?;
        }
        Ok((type_code, field_code))
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Uppercase hex of the whole buffer.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.bytes)
    }
}
