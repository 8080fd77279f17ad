// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Converters from parsed dashcam records to output containers.

pub mod audio;
pub mod avi;

pub use audio::{collect_stream_audio, resolve_audio_stream, StreamAudio};
pub use avi::make_avi;
