// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bit-exact RIFF/AVI serialization.
//!
//! Layout produced:
//! - one outer `RIFF` chunk whose payload opens with `"AVI "`
//! - a `hdrl` LIST with the `avih` header and one `strl` LIST per stream
//! - a `movi` LIST with the data chunks in interleave order, odd-length
//!   chunks followed by a single pad byte that the length field excludes
//! - an `idx1` chunk when the has-index header flag is set
//!
//! Every chunk is a 4-byte FourCC plus a 32-bit little-endian length of the
//! data alone; LIST chunks carry an extra 4-byte type code counted within
//! their length.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::core::{Result, RoscoError};
use crate::riff::{AviFile, StreamChunk, AVIF_HAS_INDEX, AVIIF_KEYFRAME};

/// Serialize an AVI file.
pub fn write_avi<W: Write>(writer: &mut W, file: &AviFile) -> Result<()> {
    let mut payload = Vec::new();
    payload.extend_from_slice(b"AVI ");

    // "hdrl" list: the avih header plus one strl list per stream.
    {
        let mut header_list = Vec::new();
        write_chunk(&mut header_list, "avih", &file.header.bytes())?;
        for stream in &file.streams {
            let mut stream_list = Vec::new();
            write_chunk(&mut stream_list, "strh", &stream.header.bytes())?;
            write_chunk(&mut stream_list, "strf", &stream.format.bytes())?;
            write_list(&mut header_list, "strl", &stream_list)?;
        }
        write_list(&mut payload, "hdrl", &header_list)?;
    }

    // "movi" list plus its index.
    let interleaved = interleave(file);
    {
        let mut movie_list = Vec::new();
        for chunk in &interleaved {
            write_chunk(&mut movie_list, &chunk.id, &chunk.data)?;
            if chunk.data.len() % 2 != 0 {
                movie_list.push(0);
            }
        }
        write_list(&mut payload, "movi", &movie_list)?;
    }

    if file.header.flags & AVIF_HAS_INDEX != 0 {
        let index = build_index(&interleaved)?;
        write_chunk(&mut payload, "idx1", &index)?;
    }

    write_chunk(writer, "RIFF", &payload)
}

/// Merge every stream's chunks by ascending timestamp, stable with respect
/// to stream declaration order on ties.
fn interleave(file: &AviFile) -> Vec<&StreamChunk> {
    let mut chunks: Vec<&StreamChunk> = file
        .streams
        .iter()
        .flat_map(|stream| stream.chunks.iter())
        .collect();
    chunks.sort_by_key(|chunk| chunk.timestamp);
    chunks
}

/// Build the `idx1` payload for chunks in movi order.
///
/// Offsets are relative to the start of the movi list data; the leading 4
/// accounts for the list's FourCC type code, so offset + 8 is the position
/// of the chunk's data.
fn build_index(chunks: &[&StreamChunk]) -> Result<Vec<u8>> {
    let mut index = Vec::with_capacity(chunks.len() * 16);
    let mut offset = 4u32;
    for chunk in chunks {
        let id = fourcc(&chunk.id)?;
        index.extend_from_slice(&id);
        let flags = if chunk.is_keyframe { AVIIF_KEYFRAME } else { 0 };
        index.extend_from_slice(&flags.to_le_bytes());
        index.extend_from_slice(&offset.to_le_bytes());
        index.extend_from_slice(&(chunk.data.len() as u32).to_le_bytes());

        let padded = chunk.data.len() + chunk.data.len() % 2;
        offset += 8 + padded as u32;
    }
    Ok(index)
}

/// Write one chunk: FourCC, 32-bit data length, data.
pub(crate) fn write_chunk<W: Write>(writer: &mut W, chunk_type: &str, data: &[u8]) -> Result<()> {
    let id = fourcc(chunk_type)?;
    writer
        .write_all(&id)
        .map_err(|e| RoscoError::io("write chunk", e.to_string()))?;
    writer
        .write_i32::<LittleEndian>(data.len() as i32)
        .map_err(|e| RoscoError::io("write chunk", e.to_string()))?;
    writer
        .write_all(data)
        .map_err(|e| RoscoError::io("write chunk", e.to_string()))?;
    Ok(())
}

/// Write one LIST chunk: "LIST", length covering type code plus data, type
/// code, data.
pub(crate) fn write_list<W: Write>(writer: &mut W, list_type: &str, data: &[u8]) -> Result<()> {
    let type_code = fourcc(list_type)?;
    writer
        .write_all(b"LIST")
        .map_err(|e| RoscoError::io("write list", e.to_string()))?;
    writer
        .write_i32::<LittleEndian>((type_code.len() + data.len()) as i32)
        .map_err(|e| RoscoError::io("write list", e.to_string()))?;
    writer
        .write_all(&type_code)
        .map_err(|e| RoscoError::io("write list", e.to_string()))?;
    writer
        .write_all(data)
        .map_err(|e| RoscoError::io("write list", e.to_string()))?;
    Ok(())
}

fn fourcc(id: &str) -> Result<[u8; 4]> {
    let bytes = id.as_bytes();
    if bytes.len() != 4 {
        return Err(RoscoError::bad_fourcc(id));
    }
    Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
}
