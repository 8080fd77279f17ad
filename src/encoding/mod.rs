// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Byte-level codecs: slice cursor, metadata tree, H.264 helpers, audio
//! transcoding.

pub mod cursor;
pub mod h264;
pub mod meta;
pub mod pcm;

pub use cursor::ByteCursor;
pub use meta::{Metadata, MetadataEntry, MetadataScope, MetadataValue};
pub use pcm::{AudioTranscoder, SampleBuffer};
