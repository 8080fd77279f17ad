// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Audio transcoding: chunk payloads to uniform integer sample buffers.
//!
//! Dashcam audio arrives either as raw samples (8 kHz mono PCM or μ-law
//! bytes) or as Opus packets. Both paths produce a [`SampleBuffer`], which
//! the exporters serialize back to little-endian bytes.
//!
//! An Opus decoder carries prediction state between packets of one stream,
//! so the transcoder owns its decoder and must be constructed once per
//! output stream and reused for every chunk of that stream.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::core::{Result, RoscoError};

/// Sample rate of the raw PCM / μ-law substreams.
pub const RAW_SAMPLE_RATE: u32 = 8000;
/// Opus always decodes at 48 kHz here.
pub const OPUS_SAMPLE_RATE: u32 = 48000;
/// Decode frame capacity; 60 ms is the largest Opus frame duration.
const OPUS_FRAME_MS: usize = 60;

/// A decoded run of audio samples with its format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    /// Number of interleaved channels
    pub channels: u16,
    /// Samples per second
    pub sample_rate: u32,
    /// Bit depth of the source samples (8 or 16)
    pub source_bit_depth: u32,
    /// Widened samples, one entry per source sample
    pub data: Vec<i32>,
}

impl SampleBuffer {
    /// Create an empty buffer with the given format.
    pub fn new(channels: u16, sample_rate: u32, source_bit_depth: u32) -> Self {
        Self {
            channels,
            sample_rate,
            source_bit_depth,
            data: Vec::new(),
        }
    }

    /// Append another buffer's samples. The formats must already agree.
    pub fn extend(&mut self, other: &SampleBuffer) {
        self.data.extend_from_slice(&other.data);
    }

    /// Serialize the samples as little-endian signed integers at the source
    /// bit depth.
    pub fn raw_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.data.len() * (self.source_bit_depth as usize / 8));
        for &sample in &self.data {
            match self.source_bit_depth {
                8 => out.write_i8(sample as i8)?,
                16 => out.write_i16::<LittleEndian>(sample as i16)?,
                other => return Err(RoscoError::unsupported_bit_depth(other)),
            }
        }
        Ok(out)
    }
}

/// Per-stream audio transcoder.
///
/// The raw variant is stateless; the Opus variant holds the stream's shared
/// decoder.
pub enum AudioTranscoder {
    /// Interpret payloads as raw little-endian signed samples
    Raw {
        /// Source bit depth (8 or 16)
        bit_depth: u32,
    },
    /// Decode payloads as Opus packets
    Opus {
        /// Shared decoder; prediction state spans packets
        decoder: opus::Decoder,
    },
}

impl AudioTranscoder {
    /// Create a raw-PCM transcoder for the given bit depth.
    pub fn raw(bit_depth: u32) -> Self {
        AudioTranscoder::Raw { bit_depth }
    }

    /// Create an Opus transcoder (48 kHz mono).
    pub fn opus() -> Result<Self> {
        let decoder = opus::Decoder::new(OPUS_SAMPLE_RATE, opus::Channels::Mono)
            .map_err(|e| RoscoError::decode("Opus", e.to_string()))?;
        Ok(AudioTranscoder::Opus { decoder })
    }

    /// Transcode one chunk payload into a sample buffer.
    pub fn transcode(&mut self, media: &[u8]) -> Result<SampleBuffer> {
        match self {
            AudioTranscoder::Raw { bit_depth } => decode_raw(media, *bit_depth),
            AudioTranscoder::Opus { decoder } => decode_opus(decoder, media),
        }
    }

    /// The sample rate this transcoder produces.
    pub fn sample_rate(&self) -> u32 {
        match self {
            AudioTranscoder::Raw { .. } => RAW_SAMPLE_RATE,
            AudioTranscoder::Opus { .. } => OPUS_SAMPLE_RATE,
        }
    }

    /// The source bit depth this transcoder produces.
    pub fn bit_depth(&self) -> u32 {
        match self {
            AudioTranscoder::Raw { bit_depth } => *bit_depth,
            AudioTranscoder::Opus { .. } => 16,
        }
    }
}

fn decode_raw(media: &[u8], bit_depth: u32) -> Result<SampleBuffer> {
    let mut buffer = SampleBuffer::new(1, RAW_SAMPLE_RATE, bit_depth);
    match bit_depth {
        8 => {
            buffer.data.reserve(media.len());
            for &byte in media {
                buffer.data.push(i32::from(byte as i8));
            }
        }
        16 => {
            buffer.data.reserve(media.len() / 2);
            for pair in media.chunks_exact(2) {
                buffer
                    .data
                    .push(i32::from(i16::from_le_bytes([pair[0], pair[1]])));
            }
        }
        other => return Err(RoscoError::unsupported_bit_depth(other)),
    }
    Ok(buffer)
}

fn decode_opus(decoder: &mut opus::Decoder, media: &[u8]) -> Result<SampleBuffer> {
    let frame_capacity = OPUS_FRAME_MS * OPUS_SAMPLE_RATE as usize / 1000;
    let mut pcm = vec![0i16; frame_capacity];
    let decoded = decoder
        .decode(media, &mut pcm, false)
        .map_err(|e| RoscoError::decode("Opus", e.to_string()))?;

    let mut buffer = SampleBuffer::new(1, OPUS_SAMPLE_RATE, 16);
    buffer.data.reserve(decoded);
    for &sample in &pcm[..decoded] {
        buffer.data.push(i32::from(sample));
    }
    Ok(buffer)
}
