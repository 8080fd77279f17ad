// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Stream-level audio assembly for exports.
//!
//! Resolves a stream selector to a concrete audio substream, runs every
//! chunk through one shared transcoder, and concatenates the results into
//! a single sample buffer.

use tracing::debug;

use crate::core::Result;
use crate::encoding::pcm::{AudioTranscoder, SampleBuffer};
use crate::io::records::FileInfo;

/// A fully-decoded audio stream.
#[derive(Debug, Clone)]
pub struct StreamAudio {
    /// The substream the selector resolved to
    pub stream_id: String,
    /// Whether the source was raw samples (μ-law / PCM) rather than Opus
    pub raw_pcm: bool,
    /// The concatenated samples
    pub buffer: SampleBuffer,
}

/// Resolve a selector to the audio-bearing substream.
///
/// A one-character selector picks the first substream of that logical
/// camera that actually carries audio chunks; a two-character selector is
/// used as-is.
pub fn resolve_audio_stream(info: &FileInfo, selector: &str) -> String {
    if selector.len() != 1 {
        return selector.to_string();
    }
    for id in info.stream_ids() {
        if !id.starts_with(selector) {
            continue;
        }
        let has_audio = info
            .chunks_for_stream(&id)
            .iter()
            .any(|chunk| chunk.audio().is_some());
        if has_audio {
            return id;
        }
    }
    selector.to_string()
}

/// Decode every audio chunk of the selected stream into one buffer.
///
/// Returns `None` when the stream carries no audio. The μ-law/PCM path
/// derives its bit depth from the file's `_audioBitDepth` metadata; the
/// Opus path decodes through one shared decoder, as the codec's prediction
/// state requires.
pub fn collect_stream_audio(info: &FileInfo, selector: &str) -> Result<Option<StreamAudio>> {
    let stream_id = resolve_audio_stream(info, selector);
    let raw_pcm = stream_id.ends_with('7');
    debug!(stream = %stream_id, raw_pcm, "collecting audio");

    let mut transcoder = if raw_pcm {
        AudioTranscoder::raw(info.audio_bit_depth())
    } else {
        AudioTranscoder::opus()?
    };

    let mut combined: Option<SampleBuffer> = None;
    for chunk in info.chunks_for_stream(&stream_id) {
        let Some(audio) = chunk.audio() else {
            continue;
        };
        let decoded = transcoder.transcode(&audio.media)?;
        match &mut combined {
            Some(buffer) => buffer.extend(&decoded),
            None => combined = Some(decoded),
        }
    }

    Ok(combined.map(|buffer| StreamAudio {
        stream_id,
        raw_pcm,
        buffer,
    }))
}
