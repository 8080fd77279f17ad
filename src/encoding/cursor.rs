// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bounds-checked little-endian cursor over an in-memory payload.
//!
//! Both dashcam formats encode every multi-byte integer little-endian with
//! no alignment padding, so the cursor is a plain offset over a borrowed
//! slice. Short reads surface as [`RoscoError::TruncatedInput`] with the
//! caller-supplied context.

use crate::core::{Result, RoscoError};

/// Little-endian cursor that tracks position over a byte slice.
pub struct ByteCursor<'a> {
    /// The data buffer
    data: &'a [u8],
    /// Current read position
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a new cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Get the current position.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Get the remaining bytes available to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Check if at end of buffer.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    fn take(&mut self, count: usize, context: &str) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(RoscoError::truncated(context, count));
        }
        let start = self.offset;
        self.offset += count;
        Ok(&self.data[start..self.offset])
    }

    /// Read a single byte.
    pub fn read_u8(&mut self, context: &str) -> Result<u8> {
        Ok(self.take(1, context)?[0])
    }

    /// Read a signed byte.
    pub fn read_i8(&mut self, context: &str) -> Result<i8> {
        Ok(self.read_u8(context)? as i8)
    }

    /// Read a u16 value.
    pub fn read_u16(&mut self, context: &str) -> Result<u16> {
        let bytes = self.take(2, context)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read an i16 value.
    pub fn read_i16(&mut self, context: &str) -> Result<i16> {
        Ok(self.read_u16(context)? as i16)
    }

    /// Read a u32 value.
    pub fn read_u32(&mut self, context: &str) -> Result<u32> {
        let bytes = self.take(4, context)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an i32 value.
    pub fn read_i32(&mut self, context: &str) -> Result<i32> {
        Ok(self.read_u32(context)? as i32)
    }

    /// Read a u64 value.
    pub fn read_u64(&mut self, context: &str) -> Result<u64> {
        let bytes = self.take(8, context)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Read an i64 value.
    pub fn read_i64(&mut self, context: &str) -> Result<i64> {
        Ok(self.read_u64(context)? as i64)
    }

    /// Read an f64 value.
    pub fn read_f64(&mut self, context: &str) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64(context)?))
    }

    /// Read a byte slice.
    pub fn read_bytes(&mut self, count: usize, context: &str) -> Result<&'a [u8]> {
        self.take(count, context)
    }

    /// Skip bytes.
    pub fn skip(&mut self, count: usize, context: &str) -> Result<()> {
        self.take(count, context)?;
        Ok(())
    }
}
