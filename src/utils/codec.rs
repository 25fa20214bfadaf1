//! Byte-level encoding helpers shared by entries and transactions.

use crate::error::{FactomError, Result};

/// Longest varint needed for a u64
const MAX_VARINT_LEN: usize = 10;

/// Big-endian base-128 varint; every byte but the last carries the 0x80 flag
pub fn encode_varint(out: &mut Vec<u8>, value: u64) {
    let mut groups = [0u8; MAX_VARINT_LEN];
    let mut count = 0;
    let mut v = value;
    loop {
        groups[count] = (v & 0x7f) as u8;
        count += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        let flag = if i == 0 { 0x00 } else { 0x80 };
        out.push(groups[i] | flag);
    }
}

/// Write `bytes` behind a 2-byte big-endian length
pub fn write_length_prefixed(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    let len = u16::try_from(bytes.len()).map_err(|_| {
        FactomError::Serialization(format!(
            "Field of {} bytes exceeds 2-byte length prefix",
            bytes.len()
        ))
    })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

/// Cursor over a byte slice that fails with `TruncatedInput` instead of panicking
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(FactomError::TruncatedInput {
                needed: n,
                available: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array::<2>()?))
    }

    pub fn read_length_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u16_be()? as usize;
        self.read_bytes(len)
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        for _ in 0..MAX_VARINT_LEN {
            let b = self.read_u8()?;
            if value > (u64::MAX >> 7) {
                return Err(FactomError::Serialization("Varint overflows u64".to_string()));
            }
            value = (value << 7) | u64::from(b & 0x7f);
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(FactomError::Serialization("Varint too long".to_string()))
    }

    /// Everything not yet consumed
    pub fn rest(&mut self) -> &'a [u8] {
        let out = &self.data[self.pos..];
        self.pos = self.data.len();
        out
    }
}
