// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Standalone RIFF/WAVE encoder for audio exports.
//!
//! Canonical layout: `RIFF` size `WAVE`, a 16-byte `fmt ` chunk, then
//! `data` holding little-endian signed PCM. Unlike general WAV crates this
//! encoder accepts an arbitrary format tag, which the μ-law exports need
//! (FormatTag 0x0007).

use std::io::Write;

use crate::core::{Result, RoscoError};
use crate::encoding::pcm::SampleBuffer;
use crate::riff::write::write_chunk;

/// Wave format tag for integer PCM.
pub const WAVE_FORMAT_PCM: u16 = 0x0001;
/// Wave format tag for μ-law.
pub const WAVE_FORMAT_MULAW: u16 = 0x0007;

/// Serialize a sample buffer as a WAVE file with the given format tag.
pub fn write_wav<W: Write>(writer: &mut W, format_tag: u16, buffer: &SampleBuffer) -> Result<()> {
    let data = buffer.raw_bytes()?;
    let bytes_per_sample = buffer.source_bit_depth / 8;
    let channels = u32::from(buffer.channels);

    let mut fmt = Vec::with_capacity(16);
    fmt.extend_from_slice(&format_tag.to_le_bytes());
    fmt.extend_from_slice(&buffer.channels.to_le_bytes());
    fmt.extend_from_slice(&buffer.sample_rate.to_le_bytes());
    fmt.extend_from_slice(&(buffer.sample_rate * channels * bytes_per_sample).to_le_bytes());
    fmt.extend_from_slice(&((channels * bytes_per_sample) as u16).to_le_bytes());
    fmt.extend_from_slice(&(buffer.source_bit_depth as u16).to_le_bytes());

    let mut payload = Vec::with_capacity(4 + 8 + fmt.len() + 8 + data.len() + 1);
    payload.extend_from_slice(b"WAVE");
    write_chunk(&mut payload, "fmt ", &fmt)?;
    write_chunk(&mut payload, "data", &data)?;
    if data.len() % 2 != 0 {
        payload.push(0);
    }

    write_chunk(writer, "RIFF", &payload)?;
    writer
        .flush()
        .map_err(|e| RoscoError::io("write wav", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::pcm::RAW_SAMPLE_RATE;

    fn buffer_16(data: Vec<i32>) -> SampleBuffer {
        SampleBuffer {
            channels: 1,
            sample_rate: RAW_SAMPLE_RATE,
            source_bit_depth: 16,
            data,
        }
    }

    #[test]
    fn test_canonical_layout() {
        let buffer = buffer_16(vec![1, -1]);
        let mut out = Vec::new();
        write_wav(&mut out, WAVE_FORMAT_PCM, &buffer).unwrap();

        // 44-byte header plus 4 data bytes.
        assert_eq!(out.len(), 48);
        assert_eq!(&out[0..4], b"RIFF");
        let declared = u32::from_le_bytes([out[4], out[5], out[6], out[7]]) as usize;
        assert_eq!(declared, out.len() - 8);
        assert_eq!(&out[8..12], b"WAVE");
        assert_eq!(&out[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes([out[16], out[17], out[18], out[19]]), 16);
        assert_eq!(&out[36..40], b"data");
        assert_eq!(u32::from_le_bytes([out[40], out[41], out[42], out[43]]), 4);
        assert_eq!(&out[44..48], &[0x01, 0x00, 0xff, 0xff]);
    }

    #[test]
    fn test_fmt_fields_16_bit() {
        let buffer = buffer_16(vec![0; 4]);
        let mut out = Vec::new();
        write_wav(&mut out, WAVE_FORMAT_PCM, &buffer).unwrap();

        let fmt = &out[20..36];
        assert_eq!(u16::from_le_bytes([fmt[0], fmt[1]]), WAVE_FORMAT_PCM);
        assert_eq!(u16::from_le_bytes([fmt[2], fmt[3]]), 1); // channels
        assert_eq!(u32::from_le_bytes([fmt[4], fmt[5], fmt[6], fmt[7]]), 8000);
        assert_eq!(u32::from_le_bytes([fmt[8], fmt[9], fmt[10], fmt[11]]), 16000); // avg bytes/sec
        assert_eq!(u16::from_le_bytes([fmt[12], fmt[13]]), 2); // block align
        assert_eq!(u16::from_le_bytes([fmt[14], fmt[15]]), 16); // bits/sample
    }

    #[test]
    fn test_mulaw_format_tag() {
        let buffer = SampleBuffer {
            channels: 1,
            sample_rate: RAW_SAMPLE_RATE,
            source_bit_depth: 8,
            data: vec![0, 1, 2, 3],
        };
        let mut out = Vec::new();
        write_wav(&mut out, WAVE_FORMAT_MULAW, &buffer).unwrap();
        let fmt = &out[20..36];
        assert_eq!(u16::from_le_bytes([fmt[0], fmt[1]]), WAVE_FORMAT_MULAW);
        assert_eq!(u32::from_le_bytes([fmt[8], fmt[9], fmt[10], fmt[11]]), 8000);
        assert_eq!(u16::from_le_bytes([fmt[12], fmt[13]]), 1);
    }

    #[test]
    fn test_odd_data_padded() {
        let buffer = SampleBuffer {
            channels: 1,
            sample_rate: RAW_SAMPLE_RATE,
            source_bit_depth: 8,
            data: vec![5],
        };
        let mut out = Vec::new();
        write_wav(&mut out, WAVE_FORMAT_MULAW, &buffer).unwrap();
        // data chunk declares 1 byte; a pad byte follows it.
        assert_eq!(u32::from_le_bytes([out[40], out[41], out[42], out[43]]), 1);
        assert_eq!(out.len(), 46);
        let declared = u32::from_le_bytes([out[4], out[5], out[6], out[7]]) as usize;
        assert_eq!(declared, out.len() - 8);
    }

    #[test]
    fn test_unsupported_depth_propagates() {
        let buffer = SampleBuffer {
            channels: 1,
            sample_rate: RAW_SAMPLE_RATE,
            source_bit_depth: 24,
            data: vec![0],
        };
        let mut out = Vec::new();
        let err = write_wav(&mut out, WAVE_FORMAT_PCM, &buffer).unwrap_err();
        assert!(matches!(err, RoscoError::UnsupportedBitDepth { .. }));
    }
}
