// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! AVI muxer: assembles parsed chunks into a [`riff::AviFile`].
//!
//! The muxer derives video geometry from in-band SPS NAL units, drops the
//! undecodable lead-in before the first keyframe, computes the frame rate
//! from the retained timestamps, and transcodes the matching audio
//! substream one chunk at a time.

use tracing::{debug, warn};

use crate::convert::audio::resolve_audio_stream;
use crate::core::Result;
use crate::encoding::h264;
use crate::encoding::pcm::AudioTranscoder;
use crate::io::records::{Chunk, FileInfo};
use crate::riff::{
    AudioFormat, AviFile, AviHeader, Stream, StreamChunk, StreamFormat, StreamHeader, VideoFormat,
    AVIF_HAS_INDEX, AVIF_IS_INTERLEAVED, AVIF_TRUST_CK_TYPE, VIDEO_FORMAT_SIZE,
};

/// SPS profiles whose geometry is trusted.
const GEOMETRY_PROFILES: [u8; 7] = [66, 77, 88, 100, 110, 122, 244];

/// Buffer size hint written into every stream header.
const SUGGESTED_BUFFER_SIZE: i32 = 65536;

/// Fallback timing when the retained chunk set cannot yield a rate.
const FALLBACK_MICRO_SEC_PER_FRAME: i32 = 33333;
const FALLBACK_RATE: i32 = 30000;

/// Frame-rate scale; rate = round(1000 × fps).
const RATE_SCALE: i32 = 1000;

/// Build an AVI file from the streams matching `stream_id`.
///
/// A one-character selector exports a whole logical camera (all matching
/// substreams, with the first audio-bearing substream as the soundtrack);
/// a two-character selector exports that exact substream.
pub fn make_avi(info: &FileInfo, stream_id: &str) -> Result<AviFile> {
    let video_stream_ids: Vec<String> = info
        .stream_ids()
        .into_iter()
        .filter(|id| match stream_id.len() {
            1 => id.starts_with(stream_id),
            2 => id.as_str() == stream_id,
            _ => false,
        })
        .collect();
    let audio_stream_id = resolve_audio_stream(info, stream_id);

    // Collect and order the video chunks.
    let mut video_chunks: Vec<&Chunk> = Vec::new();
    for id in &video_stream_ids {
        video_chunks.extend(
            info.chunks_for_stream(id)
                .into_iter()
                .filter(|chunk| chunk.video().is_some()),
        );
    }
    video_chunks.sort_by_key(|chunk| chunk.timestamp());

    let (video_width, video_height) = discover_geometry(&video_chunks);
    debug!(width = video_width, height = video_height, "video geometry");

    // Decoding cannot begin before a keyframe.
    let first_keyframe = video_chunks
        .iter()
        .position(|chunk| chunk.id.ends_with('0'))
        .unwrap_or(0);
    let video_chunks = &video_chunks[first_keyframe..];

    let timing = derive_timing(video_chunks);
    debug!(
        fps = timing.fps,
        micro_sec_per_frame = timing.micro_sec_per_frame,
        "video timing"
    );

    let mut video_stream = Stream {
        header: StreamHeader {
            fcc_type: *b"vids",
            handler: *b"H264",
            scale: RATE_SCALE,
            rate: timing.rate,
            length: video_chunks.len() as i32,
            suggested_buffer_size: SUGGESTED_BUFFER_SIZE,
            width: video_width as i16,
            height: video_height as i16,
            ..StreamHeader::default()
        },
        format: StreamFormat::Video(VideoFormat {
            size: VIDEO_FORMAT_SIZE,
            width: video_width,
            height: video_height,
            planes: 1,
            bit_count: 24,
            compression: *b"H264",
            size_image: video_width * video_height * 3,
            ..VideoFormat::default()
        }),
        chunks: Vec::with_capacity(video_chunks.len()),
    };
    for chunk in video_chunks {
        let Some(video) = chunk.video() else {
            continue;
        };
        video_stream.chunks.push(StreamChunk {
            id: "00dc".to_string(),
            data: video.media.clone(),
            is_keyframe: chunk.id.ends_with('0'),
            timestamp: video.timestamp,
        });
    }

    let mut file = AviFile {
        header: AviHeader {
            micro_sec_per_frame: timing.micro_sec_per_frame,
            flags: AVIF_IS_INTERLEAVED | AVIF_TRUST_CK_TYPE | AVIF_HAS_INDEX,
            total_frames: video_stream.chunks.len() as i32,
            suggested_buffer_size: SUGGESTED_BUFFER_SIZE,
            width: video_width,
            height: video_height,
            ..AviHeader::default()
        },
        streams: Vec::new(),
    };
    file.streams.push(video_stream);
    file.header.streams += 1;

    debug!(stream = %audio_stream_id, "audio stream");
    if audio_stream_id.ends_with('7') || audio_stream_id.ends_with('9') {
        if let Some(audio_stream) = build_audio_stream(info, &audio_stream_id)? {
            file.streams.push(audio_stream);
            file.header.streams += 1;
        }
    }

    Ok(file)
}

/// Running-maximum SPS geometry over the keyframe-bearing substreams.
fn discover_geometry(video_chunks: &[&Chunk]) -> (i32, i32) {
    let mut width = 0u32;
    let mut height = 0u32;
    for chunk in video_chunks {
        if !chunk.id.ends_with('0') {
            continue;
        }
        let Some(video) = chunk.video() else {
            continue;
        };
        for nal in h264::split_nal_units(&video.media) {
            let Some(sps) = h264::parse_sps(nal) else {
                continue;
            };
            if !GEOMETRY_PROFILES.contains(&sps.profile_idc) {
                continue;
            }
            width = width.max(sps.width);
            height = height.max(sps.height);
        }
    }
    (width as i32, height as i32)
}

struct Timing {
    fps: f64,
    rate: i32,
    micro_sec_per_frame: i32,
}

/// Derive the frame rate from the retained chunk timestamps.
fn derive_timing(video_chunks: &[&Chunk]) -> Timing {
    let count = video_chunks.len() as u64;
    let duration = match (video_chunks.first(), video_chunks.last()) {
        (Some(first), Some(last)) => {
            let first_ts = first.timestamp().unwrap_or(0);
            let last_ts = last.timestamp().unwrap_or(0);
            last_ts.saturating_sub(first_ts)
        }
        _ => 0,
    };

    if count == 0 || duration == 0 {
        return Timing {
            fps: 30.0,
            rate: FALLBACK_RATE,
            micro_sec_per_frame: FALLBACK_MICRO_SEC_PER_FRAME,
        };
    }

    let fps = 1_000_000.0 * count as f64 / duration as f64;
    Timing {
        fps,
        rate: (fps * f64::from(RATE_SCALE)).round() as i32,
        micro_sec_per_frame: (duration / count) as i32,
    }
}

/// Transcode the audio substream, one AVI chunk per input chunk.
fn build_audio_stream(info: &FileInfo, stream_id: &str) -> Result<Option<Stream>> {
    let mut transcoder = if stream_id.ends_with('7') {
        AudioTranscoder::raw(info.audio_bit_depth())
    } else {
        AudioTranscoder::opus()?
    };
    let format_tag = info.wav_audio_format();

    let sample_rate = transcoder.sample_rate() as i32;
    let bit_depth = transcoder.bit_depth() as i32;
    let bytes_per_sample = bit_depth / 8;
    let channels = 1i16;

    let mut stream = Stream {
        header: StreamHeader {
            fcc_type: *b"auds",
            handler: *b"    ",
            scale: 1,
            rate: sample_rate,
            suggested_buffer_size: SUGGESTED_BUFFER_SIZE,
            ..StreamHeader::default()
        },
        format: StreamFormat::Audio(AudioFormat {
            format_tag,
            channels,
            samples_per_sec: sample_rate,
            avg_bytes_per_sec: sample_rate * i32::from(channels) * bytes_per_sample,
            block_align: channels * bytes_per_sample as i16,
            bits_per_sample: bit_depth as i16,
        }),
        chunks: Vec::new(),
    };

    for chunk in info.chunks_for_stream(stream_id) {
        let Some(audio) = chunk.audio() else {
            continue;
        };
        let decoded = transcoder.transcode(&audio.media)?;
        stream.chunks.push(StreamChunk {
            id: "01wb".to_string(),
            data: decoded.raw_bytes()?,
            is_keyframe: false,
            timestamp: audio.timestamp,
        });
    }

    if stream.chunks.is_empty() {
        warn!(stream = %stream_id, "no audio data in stream");
        return Ok(None);
    }
    Ok(Some(stream))
}
