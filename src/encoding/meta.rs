// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Self-describing metadata tree used by both dashcam formats.
//!
//! A metadata buffer is a sequence of entries, each a 1-byte type tag, a
//! NUL-terminated name, and a type-dependent value. Entries are decoded
//! until the buffer is exhausted. Names are not guaranteed unique, so the
//! tree preserves insertion order.
//!
//! Tag 8 is scope-sensitive: a 16-bit integer inside the file header, an
//! 8-bit integer inside a chunk's local metadata. The scope is passed
//! explicitly and inherited by nested trees (tag 4).

use std::fmt;

use crate::core::{Result, RoscoError};
use crate::encoding::cursor::ByteCursor;

/// Metadata type tags as they appear on disk.
pub const TYPE_FLOAT64: i8 = 0x01;
pub const TYPE_STRING: i8 = 0x02;
pub const TYPE_INT32: i8 = 0x03;
pub const TYPE_SUB: i8 = 0x04;
pub const TYPE_SMALL_INT: i8 = 0x08;
pub const TYPE_INT64: i8 = 0x09;
pub const TYPE_INT32_ALT: i8 = 0x10;

/// Where a metadata buffer was found; selects the width of tag-8 values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataScope {
    /// The file header region
    FileHeader,
    /// A chunk's local metadata
    Chunk,
}

/// A decoded metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// Tag 0x01: IEEE-754 64-bit float
    Float(f64),
    /// Tag 0x02: length-prefixed string, trailing NULs trimmed
    Str(String),
    /// Tags 0x03 and 0x10: signed 32-bit integer
    Int32(i32),
    /// Tag 0x04: nested metadata tree
    Sub(Metadata),
    /// Tag 0x08 in chunk scope: signed 8-bit integer
    Int8(i8),
    /// Tag 0x08 in file-header scope: signed 16-bit integer
    Int16(i16),
    /// Tag 0x09: signed 64-bit integer
    Int64(i64),
}

impl MetadataValue {
    /// The string content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The value widened to i64, if this is any integer variant.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetadataValue::Int8(v) => Some(i64::from(*v)),
            MetadataValue::Int16(v) => Some(i64::from(*v)),
            MetadataValue::Int32(v) => Some(i64::from(*v)),
            MetadataValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// The nested tree, if this is a sub-metadata value.
    pub fn as_sub(&self) -> Option<&Metadata> {
        match self {
            MetadataValue::Sub(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::Str(v) => write!(f, "{v}"),
            MetadataValue::Int32(v) => write!(f, "{v}"),
            MetadataValue::Sub(m) => write!(f, "<{} entries>", m.entries.len()),
            MetadataValue::Int8(v) => write!(f, "{v}"),
            MetadataValue::Int16(v) => write!(f, "{v}"),
            MetadataValue::Int64(v) => write!(f, "{v}"),
        }
    }
}

/// A single metadata entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    /// On-disk type tag
    pub type_tag: i8,
    /// Entry name (never contains NUL bytes)
    pub name: String,
    /// Decoded value
    pub value: MetadataValue,
}

/// An ordered collection of metadata entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Entries in on-disk order
    pub entries: Vec<MetadataEntry>,
}

impl Metadata {
    /// Create an empty metadata collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the first entry with the given name.
    pub fn get(&self, name: &str) -> Option<&MetadataValue> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.value)
    }

    /// Append an entry.
    pub fn push(&mut self, type_tag: i8, name: impl Into<String>, value: MetadataValue) {
        self.entries.push(MetadataEntry {
            type_tag,
            name: name.into(),
            value,
        });
    }
}

/// Decode a metadata buffer in the given scope.
///
/// Entries are read until the buffer is exhausted; a type tag of 0 is a
/// padding marker and produces no entry.
pub fn decode(buffer: &[u8], scope: MetadataScope) -> Result<Metadata> {
    let mut cursor = ByteCursor::new(buffer);
    let mut metadata = Metadata::new();

    for index in 0.. {
        if cursor.is_at_end() {
            break;
        }
        let type_tag = cursor.read_i8("metadata entry type")?;
        if type_tag == 0 {
            continue;
        }

        let name = read_name(&mut cursor)?;
        let value = decode_value(&mut cursor, type_tag, index, scope)?;
        metadata.entries.push(MetadataEntry {
            type_tag,
            name,
            value,
        });
    }

    Ok(metadata)
}

fn read_name(cursor: &mut ByteCursor<'_>) -> Result<String> {
    let mut name = String::new();
    loop {
        let byte = cursor.read_u8("metadata entry name")?;
        if byte == 0 {
            break;
        }
        name.push(byte as char);
    }
    Ok(name)
}

fn decode_value(
    cursor: &mut ByteCursor<'_>,
    type_tag: i8,
    index: usize,
    scope: MetadataScope,
) -> Result<MetadataValue> {
    match type_tag {
        TYPE_FLOAT64 => Ok(MetadataValue::Float(cursor.read_f64("float value")?)),
        TYPE_STRING => {
            let length = cursor.read_i32("string length")?;
            let bytes = cursor.read_bytes(length.max(0) as usize, "string value")?;
            let text: String = bytes.iter().map(|&b| b as char).collect();
            Ok(MetadataValue::Str(
                text.trim_end_matches('\0').to_string(),
            ))
        }
        TYPE_INT32 | TYPE_INT32_ALT => Ok(MetadataValue::Int32(cursor.read_i32("int32 value")?)),
        TYPE_SUB => {
            // The length field includes its own four bytes.
            let length = cursor.read_i32("sub-metadata length")?;
            let payload_len = (length - 4).max(0) as usize;
            let payload = cursor.read_bytes(payload_len, "sub-metadata value")?;
            Ok(MetadataValue::Sub(decode(payload, scope)?))
        }
        TYPE_SMALL_INT => match scope {
            MetadataScope::FileHeader => Ok(MetadataValue::Int16(cursor.read_i16("int16 value")?)),
            MetadataScope::Chunk => Ok(MetadataValue::Int8(cursor.read_i8("int8 value")?)),
        },
        TYPE_INT64 => Ok(MetadataValue::Int64(cursor.read_i64("int64 value")?)),
        _ => Err(RoscoError::unknown_metadata_type(index, type_tag)),
    }
}

/// Encode a metadata collection back into its on-disk form.
///
/// The inverse of [`decode`]; primarily used by tests to verify the codec
/// round-trips every value type in both scopes.
pub fn encode(metadata: &Metadata, scope: MetadataScope) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in &metadata.entries {
        out.push(entry.type_tag as u8);
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0);
        match &entry.value {
            MetadataValue::Float(v) => out.extend_from_slice(&v.to_le_bytes()),
            MetadataValue::Str(v) => {
                out.extend_from_slice(&(v.len() as i32).to_le_bytes());
                out.extend_from_slice(v.as_bytes());
            }
            MetadataValue::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
            MetadataValue::Sub(sub) => {
                let payload = encode(sub, scope);
                out.extend_from_slice(&((payload.len() + 4) as i32).to_le_bytes());
                out.extend_from_slice(&payload);
            }
            MetadataValue::Int8(v) => out.push(*v as u8),
            MetadataValue::Int16(v) => out.extend_from_slice(&v.to_le_bytes()),
            MetadataValue::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
        }
    }
    out
}
