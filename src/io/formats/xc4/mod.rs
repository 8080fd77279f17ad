// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! XC4 (NVR) container parser.
//!
//! An XC4 file is a fixed 0x10000-byte header region followed by a stream
//! of length-prefixed chunks. The header carries the `SAYS` magic, 32
//! opaque bytes, a NUL-padded filename, and the file metadata tree. Chunks
//! are video (`dc`), audio (`wb`), or (rarely) an embedded JFIF still.
//!
//! The audio layout is version-gated: recordings written by firmware older
//! than v1.6.0 store a second channel of equal length after the first.

pub mod jpeg;

use std::collections::HashMap;
use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use semver::Version;
use tracing::{debug, warn};

use crate::core::hexdump::hex_lines;
use crate::core::{Result, RoscoError};
use crate::encoding::cursor::ByteCursor;
use crate::encoding::meta::{self, MetadataScope};
use crate::io::records::{AudioChunk, Chunk, ChunkPayload, FileInfo, ImageChunk, VideoChunk};

/// Size of the file header region.
pub const HEADER_SIZE: usize = 0x10000;

/// Portion of the header region that carries meaningful fields.
const MAGIC_LEN: usize = 4;
const UNKNOWN_LEN: usize = 32;
const FILENAME_LEN: usize = 128;

/// Bytes of context dumped when an unknown chunk type is hit.
const DIAGNOSTIC_DUMP_LEN: usize = 4000;

/// Firmware version at which the audio layout changed from two channels to
/// one. Files older than this carry an `extra_media` run per audio chunk.
fn audio_layout_change_version() -> Version {
    Version::new(1, 6, 0)
}

/// Parse an XC4 stream. The reader must be positioned at byte 0.
pub fn parse_xc4<R: Read>(mut reader: R, header_only: bool) -> Result<FileInfo> {
    let mut header = vec![0u8; HEADER_SIZE];
    reader
        .read_exact(&mut header)
        .map_err(|e| read_err(e, "file header", HEADER_SIZE))?;

    let mut file_info = parse_file_header(&header)?;
    if header_only {
        return Ok(file_info);
    }

    let file_version = file_info.app_version();
    debug!(version = ?file_version, "file version");
    let legacy_audio = file_version
        .map(|v| v < audio_layout_change_version())
        .unwrap_or(false);

    let mut last_video_timestamps: HashMap<String, u64> = HashMap::new();
    for index in 0.. {
        let Some(head) = read_chunk_head(&mut reader)? else {
            break;
        };

        let id: String = head[0..2].iter().map(|&b| b as char).collect();
        let chunk_type: String = head[2..4].iter().map(|&b| b as char).collect();
        debug!(index, id = %id, chunk_type = %chunk_type, "chunk");

        let payload = match &head[2..4] {
            b"dc" => {
                let video = parse_video_chunk(&mut reader, index)?;
                if let Some(&last_ts) = last_video_timestamps.get(&id) {
                    if video.timestamp < last_ts {
                        warn!(
                            index,
                            stream = %id,
                            timestamp = video.timestamp,
                            previous = last_ts,
                            "video timestamp went backwards"
                        );
                    }
                }
                last_video_timestamps.insert(id.clone(), video.timestamp);
                ChunkPayload::Video(video)
            }
            b"wb" => ChunkPayload::Audio(parse_audio_chunk(&mut reader, index, legacy_audio)?),
            [0xff, 0xe0] => {
                // The four peeked bytes are the start of the JFIF stream;
                // hand them back to the scanner.
                let mut chained = std::io::Cursor::new(head).chain(&mut reader);
                let jfif = jpeg::scan_jpeg(&mut chained)?;
                let image = image::load_from_memory_with_format(&jfif, image::ImageFormat::Jpeg)
                    .map_err(|e| RoscoError::decode("JPEG", e.to_string()))?;
                debug!(width = image.width(), height = image.height(), "embedded image");
                ChunkPayload::Image(ImageChunk { jfif, image })
            }
            _ => {
                dump_unknown_chunk(&mut reader);
                return Err(RoscoError::unknown_chunk_type(index, chunk_type));
            }
        };

        file_info.chunks.push(Chunk {
            id,
            chunk_type,
            payload,
        });
    }

    Ok(file_info)
}

/// Parse the meaningful prefix of the 0x10000-byte header region.
fn parse_file_header(header: &[u8]) -> Result<FileInfo> {
    let mut cursor = ByteCursor::new(header);

    let magic = cursor.read_bytes(MAGIC_LEN, "file magic")?;
    if magic != b"SAYS" {
        return Err(RoscoError::unsupported_file_type(magic));
    }

    let header_unknown = cursor.read_bytes(UNKNOWN_LEN, "header unknown")?.to_vec();

    let filename_raw = cursor.read_bytes(FILENAME_LEN, "filename")?;
    let filename: String = filename_raw
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect();

    let metadata_length = cursor.read_i32("metadata length")?;
    debug!(metadata_length, "file metadata");
    let metadata_bytes = cursor.read_bytes(metadata_length.max(0) as usize, "file metadata")?;
    let metadata = meta::decode(metadata_bytes, MetadataScope::FileHeader)?;

    Ok(FileInfo {
        filename,
        header_unknown,
        metadata,
        chunks: Vec::new(),
    })
}

/// Read the 4-byte chunk head. A clean EOF (or a trailing partial head)
/// ends the chunk loop.
fn read_chunk_head<R: Read>(reader: &mut R) -> Result<Option<[u8; 4]>> {
    let mut head = [0u8; 4];
    let mut filled = 0usize;
    while filled < head.len() {
        match reader.read(&mut head[filled..]) {
            Ok(0) => {
                if filled > 0 {
                    debug!(bytes = filled, "trailing bytes after last chunk");
                }
                return Ok(None);
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(RoscoError::io("chunk head", e.to_string())),
        }
    }
    Ok(Some(head))
}

fn parse_video_chunk<R: Read>(reader: &mut R, index: usize) -> Result<VideoChunk> {
    let mut codec_bytes = [0u8; 4];
    reader
        .read_exact(&mut codec_bytes)
        .map_err(|e| read_err(e, "video codec", 4))?;
    let codec: String = codec_bytes.iter().map(|&b| b as char).collect();
    debug!(index, codec = %codec, "video chunk");

    let media_length = reader
        .read_i32::<LittleEndian>()
        .map_err(|e| read_err(e, "media length", 4))?;
    let metadata_length_small = reader
        .read_u16::<LittleEndian>()
        .map_err(|e| read_err(e, "small metadata length", 2))?;
    debug!(media_length, metadata_length_small, "video chunk lengths");

    let mut unknown1 = [0u8; 2];
    reader
        .read_exact(&mut unknown1)
        .map_err(|e| read_err(e, "video unknown1", 2))?;

    let timestamp = reader
        .read_u32::<LittleEndian>()
        .map_err(|e| read_err(e, "video timestamp", 4))?;

    // The 32-bit length is authoritative; it includes its own four bytes.
    let metadata_length_total = reader
        .read_i32::<LittleEndian>()
        .map_err(|e| read_err(e, "metadata length", 4))?;
    let metadata_payload_len = (metadata_length_total - 4).max(0) as usize;
    let mut metadata_bytes = vec![0u8; metadata_payload_len];
    reader
        .read_exact(&mut metadata_bytes)
        .map_err(|e| read_err(e, "chunk metadata", metadata_payload_len))?;
    let metadata = meta::decode(&metadata_bytes, MetadataScope::Chunk)?;

    // Media is stored padded to the next 8-byte boundary.
    let media_length = media_length.max(0) as usize;
    let padded_length = media_length.div_ceil(8) * 8;
    let mut media = vec![0u8; padded_length];
    reader
        .read_exact(&mut media)
        .map_err(|e| read_err(e, "video media", padded_length))?;
    media.truncate(media_length);

    Ok(VideoChunk {
        codec,
        timestamp: u64::from(timestamp),
        metadata,
        media,
        unknown1,
        metadata_length_small,
    })
}

fn parse_audio_chunk<R: Read>(
    reader: &mut R,
    index: usize,
    legacy_audio: bool,
) -> Result<AudioChunk> {
    let channel_length = reader
        .read_i16::<LittleEndian>()
        .map_err(|e| read_err(e, "audio channel length", 2))?;
    let first_channel_length = reader
        .read_i16::<LittleEndian>()
        .map_err(|e| read_err(e, "first audio channel length", 2))?;
    debug!(index, channel_length, first_channel_length, "audio chunk");

    // The first-channel length includes an 8-byte header, so the two
    // fields are redundant: first = channel + 8.
    if i32::from(first_channel_length) != i32::from(channel_length) + 8 {
        return Err(RoscoError::corrupt(
            "audio chunk",
            format!(
                "channel length arithmetic failed: {channel_length} vs {first_channel_length}"
            ),
        ));
    }

    let timestamp = reader
        .read_u32::<LittleEndian>()
        .map_err(|e| read_err(e, "audio timestamp", 4))?;

    let channel_length = channel_length.max(0) as usize;
    let mut media = vec![0u8; channel_length];
    reader
        .read_exact(&mut media)
        .map_err(|e| read_err(e, "audio media", channel_length))?;

    let extra_media = if legacy_audio {
        debug!(bytes = channel_length, "reading second audio channel");
        let mut extra = vec![0u8; channel_length];
        reader
            .read_exact(&mut extra)
            .map_err(|e| read_err(e, "audio extra media", channel_length))?;
        Some(extra)
    } else {
        None
    };

    Ok(AudioChunk {
        timestamp: u64::from(timestamp),
        media,
        extra_media,
    })
}

/// Read ahead and hex-dump up to 4,000 bytes of context for an unknown
/// chunk type.
fn dump_unknown_chunk<R: Read>(reader: &mut R) {
    let mut buffer = vec![0u8; DIAGNOSTIC_DUMP_LEN];
    let mut filled = 0usize;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(_) => break,
        }
    }
    if filled > 0 {
        debug!(bytes = filled, "context after unknown chunk:");
        for line in hex_lines(&buffer[..filled], 0, 80).lines() {
            debug!("{line}");
        }
    }
}

fn read_err(err: std::io::Error, context: &str, requested: usize) -> RoscoError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        RoscoError::truncated(context, requested)
    } else {
        RoscoError::io(context, err.to_string())
    }
}
