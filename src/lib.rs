// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Roscodec
//!
//! Parsing and transcoding for Rosco dashcam recordings.
//!
//! Rosco devices write two unrelated proprietary container formats, neither
//! publicly specified:
//! - **XC4/NVR**: a block-structured format in [`io::formats::xc4`]
//! - **XC/ASD**: a packet-based format in [`io::formats::xc`]
//!
//! Both carry a typed key/value metadata tree, timestamped media chunks,
//! and version-conditioned encoding variants. Parsed files are transcoded
//! into standards-compliant RIFF/AVI (or standalone WAV / raw PCM audio):
//! - `encoding/` - metadata tree codec, H.264 SPS helpers, audio transcoding
//! - `convert/` - the AVI muxer and audio stream assembly
//! - `riff/` - RIFF/AVI serialization and the WAVE encoder
//!
//! ## Example: parsing a recording
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let info = roscodec::parse_file("recording.nvr", false)?;
//! for stream_id in info.stream_ids() {
//!     println!("stream {stream_id}: {} chunks", info.chunks_for_stream(&stream_id).len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: exporting to AVI
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let info = roscodec::parse_file("recording.nvr", false)?;
//! let avi = roscodec::convert::make_avi(&info, "1")?;
//! let mut out = std::fs::File::create("recording.avi")?;
//! roscodec::riff::write::write_avi(&mut out, &avi)?;
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use self::core::{Result, RoscoError};

// Byte-level codecs
pub mod encoding;

// Dashcam file I/O
pub mod io;

// Re-export the parse facade and record types
pub use io::{parse_file, parse_reader, Chunk, ChunkPayload, FileInfo};

// RIFF/AVI output
pub mod riff;

// Converters
pub mod convert;

pub use convert::make_avi;
