// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Dashcam file I/O: detection, parsing, and the parsed-record model.

pub mod detection;
pub mod formats;
pub mod reader;
pub mod records;

pub use detection::DashcamFormat;
pub use reader::{parse_file, parse_reader};
pub use records::{AudioChunk, Chunk, ChunkPayload, FileInfo, ImageChunk, VideoChunk};
