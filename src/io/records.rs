// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Parsed-file record types shared by both dashcam formats.
//!
//! A [`FileInfo`] is produced by a parser, is immutable from the muxer's
//! perspective, and lives for the duration of one transcode. The chunk list
//! preserves on-disk order; parsers never re-sort it.

use semver::Version;
use tracing::warn;

use crate::encoding::meta::{Metadata, MetadataValue};

/// Well-known metadata entry names.
pub const META_APP_VERSION: &str = "appVersion";
pub const META_AUDIO_BIT_DEPTH: &str = "_audioBitDepth";
pub const META_WAV_AUDIO_FORMAT: &str = "_wavAudioFormat";
pub const META_DURATION: &str = "_duration";

/// Root record of a parsed dashcam file.
#[derive(Debug, Clone, Default)]
pub struct FileInfo {
    /// Recording filename as stored in the file (or synthesized for XC)
    pub filename: String,
    /// Opaque header bytes (32 for XC4, empty for XC)
    pub header_unknown: Vec<u8>,
    /// File-level metadata tree
    pub metadata: Metadata,
    /// Media chunks in on-disk order
    pub chunks: Vec<Chunk>,
}

impl FileInfo {
    /// All stream IDs present, sorted and deduplicated.
    pub fn stream_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.chunks.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// All chunks carrying the given stream ID, in file order.
    pub fn chunks_for_stream(&self, stream_id: &str) -> Vec<&Chunk> {
        self.chunks.iter().filter(|c| c.id == stream_id).collect()
    }

    /// The parsed `appVersion` metadata, if present and parseable.
    ///
    /// Unparseable versions are a warning, never an error; callers treat
    /// them as the modern layout.
    pub fn app_version(&self) -> Option<Version> {
        let value = self.metadata.get(META_APP_VERSION)?;
        let Some(text) = value.as_str() else {
            warn!(value = %value, "appVersion is not a string");
            return None;
        };
        parse_version(text)
    }

    /// Source audio bit depth from `_audioBitDepth`, defaulting to 8.
    pub fn audio_bit_depth(&self) -> u32 {
        self.metadata
            .get(META_AUDIO_BIT_DEPTH)
            .and_then(MetadataValue::as_i64)
            .map(|v| v as u32)
            .unwrap_or(8)
    }

    /// WAVE format tag from `_wavAudioFormat`, defaulting to 0x0007 (μ-law).
    pub fn wav_audio_format(&self) -> u16 {
        self.metadata
            .get(META_WAV_AUDIO_FORMAT)
            .and_then(MetadataValue::as_i64)
            .map(|v| v as u16)
            .unwrap_or(0x0007)
    }

    /// Recording duration in whole seconds from `_duration`, if present.
    pub fn duration_seconds(&self) -> Option<i64> {
        self.metadata.get(META_DURATION).and_then(MetadataValue::as_i64)
    }
}

/// Parse a version string of the `v1.6.5` form.
fn parse_version(text: &str) -> Option<Version> {
    let trimmed = text.trim().trim_start_matches('v');
    // Recordings sometimes carry two-part versions; pad to semver's three.
    let candidate = match trimmed.split('.').count() {
        1 => format!("{trimmed}.0.0"),
        2 => format!("{trimmed}.0"),
        _ => trimmed.to_string(),
    };
    match Version::parse(&candidate) {
        Ok(version) => Some(version),
        Err(err) => {
            warn!(version = text, error = %err, "could not parse version string");
            None
        }
    }
}

/// One time-stamped media record.
///
/// The stream ID is two ASCII characters: the first identifies the logical
/// camera, the second the substream kind ('0' = keyframe-bearing video,
/// '7' = μ-law PCM audio, '9' = Opus audio).
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Two-character stream ID
    pub id: String,
    /// Two-character type code ("dc" video, "wb" audio)
    pub chunk_type: String,
    /// The media payload
    pub payload: ChunkPayload,
}

/// Chunk payload: exactly one media kind per chunk.
#[derive(Debug, Clone)]
pub enum ChunkPayload {
    /// Audio samples
    Audio(AudioChunk),
    /// Video NAL units (or JFIF for JPEG substreams)
    Video(VideoChunk),
    /// A still frame embedded in the stream
    Image(ImageChunk),
}

impl Chunk {
    /// The audio payload, if this is an audio chunk.
    pub fn audio(&self) -> Option<&AudioChunk> {
        match &self.payload {
            ChunkPayload::Audio(audio) => Some(audio),
            _ => None,
        }
    }

    /// The video payload, if this is a video chunk.
    pub fn video(&self) -> Option<&VideoChunk> {
        match &self.payload {
            ChunkPayload::Video(video) => Some(video),
            _ => None,
        }
    }

    /// The image payload, if this is an embedded still.
    pub fn image(&self) -> Option<&ImageChunk> {
        match &self.payload {
            ChunkPayload::Image(image) => Some(image),
            _ => None,
        }
    }

    /// The media timestamp in microseconds, where the payload carries one.
    pub fn timestamp(&self) -> Option<u64> {
        match &self.payload {
            ChunkPayload::Audio(audio) => Some(audio.timestamp),
            ChunkPayload::Video(video) => Some(video.timestamp),
            ChunkPayload::Image(_) => None,
        }
    }
}

/// An audio chunk.
#[derive(Debug, Clone, Default)]
pub struct AudioChunk {
    /// Microseconds relative to the file's zero
    pub timestamp: u64,
    /// Primary channel payload
    pub media: Vec<u8>,
    /// Second channel payload; XC4 files with appVersion < v1.6.0 only
    pub extra_media: Option<Vec<u8>>,
}

/// A video chunk.
#[derive(Debug, Clone, Default)]
pub struct VideoChunk {
    /// Codec FourCC (e.g. "H264")
    pub codec: String,
    /// Microseconds relative to the file's zero
    pub timestamp: u64,
    /// Per-chunk metadata tree
    pub metadata: Metadata,
    /// Raw media payload (NAL units for H264)
    pub media: Vec<u8>,
    /// Two opaque bytes between the metadata lengths and the timestamp
    pub unknown1: [u8; 2],
    /// The 16-bit metadata length; recorded for diagnostics, never consumed
    pub metadata_length_small: u16,
}

/// A still frame scanned out of an XC4 stream.
#[derive(Debug, Clone)]
pub struct ImageChunk {
    /// The JFIF bytes exactly as they appeared on disk
    pub jfif: Vec<u8>,
    /// Decoded pixels
    pub image: image::DynamicImage,
}
