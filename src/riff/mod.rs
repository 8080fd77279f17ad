// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! RIFF/AVI container model and serialization.
//!
//! The structs here mirror the on-disk AVI header layouts; each knows how
//! to serialize itself little-endian. The writer in [`write`] assembles the
//! RIFF tree and the `idx1` index; [`wav`] holds the standalone WAVE
//! encoder used for audio exports.

pub mod wav;
pub mod write;

/// AVI header flags.
pub const AVIF_HAS_INDEX: i32 = 0x0000_0010;
pub const AVIF_MUST_USE_INDEX: i32 = 0x0000_0020;
pub const AVIF_IS_INTERLEAVED: i32 = 0x0000_0100;
pub const AVIF_TRUST_CK_TYPE: i32 = 0x0000_0800;
pub const AVIF_WAS_CAPTURE_FILE: i32 = 0x0001_0000;
pub const AVIF_COPYRIGHTED: i32 = 0x0002_0000;

/// `idx1` entry flag marking a keyframe.
pub const AVIIF_KEYFRAME: u32 = 0x0000_0010;

/// A complete AVI file ready for serialization.
#[derive(Debug, Clone, Default)]
pub struct AviFile {
    /// The main `avih` header
    pub header: AviHeader,
    /// Streams in declaration order
    pub streams: Vec<Stream>,
}

/// The main AVI header (`avih` chunk payload).
#[derive(Debug, Clone, Default)]
pub struct AviHeader {
    pub micro_sec_per_frame: i32,
    pub max_bytes_per_sec: i32,
    pub padding_granularity: i32,
    pub flags: i32,
    pub total_frames: i32,
    pub initial_frames: i32,
    pub streams: i32,
    pub suggested_buffer_size: i32,
    pub width: i32,
    pub height: i32,
    pub scale: i32,
    pub rate: i32,
    pub start: i32,
    pub length: i32,
}

impl AviHeader {
    /// Serialize the header little-endian.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(56);
        for value in [
            self.micro_sec_per_frame,
            self.max_bytes_per_sec,
            self.padding_granularity,
            self.flags,
            self.total_frames,
            self.initial_frames,
            self.streams,
            self.suggested_buffer_size,
            self.width,
            self.height,
            self.scale,
            self.rate,
            self.start,
            self.length,
        ] {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out
    }
}

/// One AVI stream: header, format, and data chunks.
#[derive(Debug, Clone)]
pub struct Stream {
    /// The `strh` header
    pub header: StreamHeader,
    /// The `strf` format (video- or audio-shaped)
    pub format: StreamFormat,
    /// Data chunks in timestamp order
    pub chunks: Vec<StreamChunk>,
}

/// An AVI stream header (`strh` chunk payload).
#[derive(Debug, Clone, Default)]
pub struct StreamHeader {
    /// Stream type FourCC ("vids", "auds")
    pub fcc_type: [u8; 4],
    /// Codec handler FourCC
    pub handler: [u8; 4],
    pub flags: i32,
    pub priority: i16,
    pub language: i16,
    pub initial_frames: i32,
    pub scale: i32,
    /// rate / scale == samples per second
    pub rate: i32,
    pub start: i32,
    /// Stream length, in rate/scale units
    pub length: i32,
    pub suggested_buffer_size: i32,
    pub quality: i32,
    pub sample_size: i32,
    pub width: i16,
    pub height: i16,
}

impl StreamHeader {
    /// Serialize the header little-endian.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(52);
        out.extend_from_slice(&self.fcc_type);
        out.extend_from_slice(&self.handler);
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.priority.to_le_bytes());
        out.extend_from_slice(&self.language.to_le_bytes());
        out.extend_from_slice(&self.initial_frames.to_le_bytes());
        out.extend_from_slice(&self.scale.to_le_bytes());
        out.extend_from_slice(&self.rate.to_le_bytes());
        out.extend_from_slice(&self.start.to_le_bytes());
        out.extend_from_slice(&self.length.to_le_bytes());
        out.extend_from_slice(&self.suggested_buffer_size.to_le_bytes());
        out.extend_from_slice(&self.quality.to_le_bytes());
        out.extend_from_slice(&self.sample_size.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out
    }
}

/// Stream format chunk payload, shaped by the stream type.
#[derive(Debug, Clone)]
pub enum StreamFormat {
    /// BITMAPINFOHEADER for video streams
    Video(VideoFormat),
    /// Wave format for audio streams
    Audio(AudioFormat),
}

impl StreamFormat {
    /// Serialize the format little-endian.
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            StreamFormat::Video(format) => format.bytes(),
            StreamFormat::Audio(format) => format.bytes(),
        }
    }
}

/// Video stream format (BITMAPINFOHEADER layout, 40 bytes).
#[derive(Debug, Clone, Default)]
pub struct VideoFormat {
    /// Size of this structure
    pub size: i32,
    pub width: i32,
    pub height: i32,
    pub planes: i16,
    pub bit_count: i16,
    /// Compression FourCC
    pub compression: [u8; 4],
    pub size_image: i32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
    pub clr_used: i32,
    pub clr_important: i32,
}

/// Serialized size of [`VideoFormat`].
pub const VIDEO_FORMAT_SIZE: i32 = 40;

impl VideoFormat {
    /// Serialize the format little-endian.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(VIDEO_FORMAT_SIZE as usize);
        out.extend_from_slice(&self.size.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.planes.to_le_bytes());
        out.extend_from_slice(&self.bit_count.to_le_bytes());
        out.extend_from_slice(&self.compression);
        out.extend_from_slice(&self.size_image.to_le_bytes());
        out.extend_from_slice(&self.x_pels_per_meter.to_le_bytes());
        out.extend_from_slice(&self.y_pels_per_meter.to_le_bytes());
        out.extend_from_slice(&self.clr_used.to_le_bytes());
        out.extend_from_slice(&self.clr_important.to_le_bytes());
        out
    }
}

/// Audio stream format (16 bytes).
#[derive(Debug, Clone, Default)]
pub struct AudioFormat {
    /// Wave format tag (0x0001 PCM, 0x0007 μ-law)
    pub format_tag: u16,
    pub channels: i16,
    pub samples_per_sec: i32,
    pub avg_bytes_per_sec: i32,
    pub block_align: i16,
    pub bits_per_sample: i16,
}

impl AudioFormat {
    /// Serialize the format little-endian.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16);
        out.extend_from_slice(&self.format_tag.to_le_bytes());
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.samples_per_sec.to_le_bytes());
        out.extend_from_slice(&self.avg_bytes_per_sec.to_le_bytes());
        out.extend_from_slice(&self.block_align.to_le_bytes());
        out.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        out
    }
}

/// One data chunk inside the `movi` list.
#[derive(Debug, Clone)]
pub struct StreamChunk {
    /// Chunk FourCC (e.g. "00dc", "01wb")
    pub id: String,
    /// Chunk payload
    pub data: Vec<u8>,
    /// Whether the `idx1` entry gets the keyframe flag
    pub is_keyframe: bool,
    /// Timestamp in microseconds, used for interleaving
    pub timestamp: u64,
}
